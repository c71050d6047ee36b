// Page metadata from raw HTML: title, description, author, publication date.

use factlens_common::PageMetadata;

/// Pull what we can out of the document head. Missing pieces stay `None`.
pub fn extract_metadata(html: &str) -> PageMetadata {
    PageMetadata {
        title: extract_title(html),
        description: meta_content(html, "name", "description")
            .or_else(|| meta_content(html, "property", "og:description")),
        author: meta_content(html, "name", "author")
            .or_else(|| meta_content(html, "property", "article:author")),
        published: extract_published(html),
    }
}

/// Title priority: `og:title`, then `<title>`.
pub fn extract_title(html: &str) -> Option<String> {
    meta_content(html, "property", "og:title").or_else(|| title_element(html))
}

fn title_element(html: &str) -> Option<String> {
    let re = regex::Regex::new(r"(?is)<title[^>]*>(.*?)</title>").ok()?;
    let cap = re.captures(html)?;
    non_empty(decode_entities(&cap[1]))
}

/// Publication date as the page states it. Not parsed; stored verbatim.
fn extract_published(html: &str) -> Option<String> {
    if let Some(date) = meta_content(html, "property", "article:published_time") {
        return Some(date);
    }
    for name in ["date", "publish_date", "pubdate", "publish-date", "DC.date.issued"] {
        if let Some(date) = meta_content(html, "name", name) {
            return Some(date);
        }
    }

    let re = regex::Regex::new(r#"(?i)<time[^>]*datetime\s*=\s*["']([^"']+)["']"#).ok()?;
    re.captures(html).and_then(|cap| non_empty(cap[1].to_string()))
}

/// `<meta {attr}="{key}" content="...">`, accepting either attribute order.
fn meta_content(html: &str, attr: &str, key: &str) -> Option<String> {
    let key = regex::escape(key);
    let patterns = [
        format!(
            r#"(?i)<meta[^>]*{attr}\s*=\s*["']{key}["'][^>]*content\s*=\s*["']([^"']*)["']"#
        ),
        format!(
            r#"(?i)<meta[^>]*content\s*=\s*["']([^"']*)["'][^>]*{attr}\s*=\s*["']{key}["']"#
        ),
    ];

    patterns.iter().find_map(|pattern| {
        let re = regex::Regex::new(pattern).ok()?;
        let cap = re.captures(html)?;
        non_empty(decode_entities(&cap[1]))
    })
}

fn decode_entities(raw: &str) -> String {
    raw.replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Derive a display title from a URL when the page gives none.
///
/// Last path segment with `-`/`_` turned into spaces and title-cased
/// (`/news/gmo-seed-patents.html` → `Gmo Seed Patents`); otherwise the host
/// without `www.`; otherwise `Untitled`.
pub fn title_from_url(page_url: &str) -> String {
    let Ok(parsed) = url::Url::parse(page_url) else {
        return "Untitled".to_string();
    };

    let segment = parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(|s| s.split('.').next().unwrap_or(s).to_string())
        .unwrap_or_default();

    let words: Vec<String> = segment
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect();
    if !words.is_empty() {
        return words.join(" ");
    }

    match parsed.host_str() {
        Some(host) if !host.is_empty() => host.strip_prefix("www.").unwrap_or(host).to_string(),
        _ => "Untitled".to_string(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}
