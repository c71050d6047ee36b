// Rating lookup and the per-article reduction of claim verdicts.

use crate::types::FactStatus;

/// Ratings that settle a claim as true.
const FACT_RATINGS: &[&str] = &["true", "fact", "correct", "accurate", "mostly true", "verified"];

/// Ratings that settle a claim as false.
const MYTH_RATINGS: &[&str] = &[
    "false",
    "myth",
    "mostly false",
    "pants on fire",
    "fake",
    "incorrect",
    "misleading",
    "hoax",
    "fabricated",
    "scam",
    "wrong",
    "baseless",
];

/// Keywords matched inside longer ratings ("False: no evidence ...").
/// Checked in order: hedges, then negations, then every Myth term, and only
/// then the Fact stems, so "inaccurate" never reaches "accurate".
const KEYWORDS: &[(&str, FactStatus)] = &[
    ("half true", FactStatus::Unsure),
    ("half-true", FactStatus::Unsure),
    ("partly", FactStatus::Unsure),
    ("mix", FactStatus::Unsure),
    ("unproven", FactStatus::Unsure),
    ("unverified", FactStatus::Unsure),
    ("not verified", FactStatus::Unsure),
    ("missing context", FactStatus::Unsure),
    ("satire", FactStatus::Unsure),
    ("not true", FactStatus::Myth),
    ("untrue", FactStatus::Myth),
    ("not accurate", FactStatus::Myth),
    ("inaccurate", FactStatus::Myth),
    ("not correct", FactStatus::Myth),
    ("incorrect", FactStatus::Myth),
    ("not a fact", FactStatus::Myth),
    ("not factual", FactStatus::Myth),
    ("mostly false", FactStatus::Myth),
    ("pants on fire", FactStatus::Myth),
    ("false", FactStatus::Myth),
    ("myth", FactStatus::Myth),
    ("fake", FactStatus::Myth),
    ("misleading", FactStatus::Myth),
    ("hoax", FactStatus::Myth),
    ("fabricated", FactStatus::Myth),
    ("scam", FactStatus::Myth),
    ("wrong", FactStatus::Myth),
    ("baseless", FactStatus::Myth),
    ("mostly true", FactStatus::Fact),
    ("true", FactStatus::Fact),
    ("correct", FactStatus::Fact),
    ("accurate", FactStatus::Fact),
    ("verified", FactStatus::Fact),
    ("fact", FactStatus::Fact),
];

/// Map a publisher's free-form rating onto Fact / Myth / Unsure.
pub fn status_from_rating(rating: &str) -> FactStatus {
    let normalized = rating
        .trim()
        .trim_end_matches(['.', '!'])
        .to_lowercase();

    if normalized.is_empty() {
        return FactStatus::Unsure;
    }
    if FACT_RATINGS.contains(&normalized.as_str()) {
        return FactStatus::Fact;
    }
    if MYTH_RATINGS.contains(&normalized.as_str()) {
        return FactStatus::Myth;
    }

    KEYWORDS
        .iter()
        .find(|(keyword, _)| normalized.contains(keyword))
        .map(|(_, status)| *status)
        .unwrap_or(FactStatus::Unsure)
}

/// Reduce per-claim statuses to an article's overall status.
///
/// Any Myth wins; otherwise at least one Fact is required for Fact; an
/// article with no claims, or only Unsure claims, is Unsure.
pub fn overall_status<I>(statuses: I) -> FactStatus
where
    I: IntoIterator<Item = FactStatus>,
{
    let mut any_fact = false;
    for status in statuses {
        match status {
            FactStatus::Myth => return FactStatus::Myth,
            FactStatus::Fact => any_fact = true,
            FactStatus::Unsure => {}
        }
    }

    if any_fact {
        FactStatus::Fact
    } else {
        FactStatus::Unsure
    }
}
