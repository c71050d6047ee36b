//! Per-stage JSON snapshots of a run.
//!
//! Each stage writes `{TEMP_DIR}/{stage}_articles_{unix_ts}.json` holding the
//! full article list as it left that stage.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use factlens_common::Article;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Scraped,
    Summarized,
    FactChecked,
    Analyzed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Scraped => "scraped",
            Stage::Summarized => "summarized",
            Stage::FactChecked => "fact_checked",
            Stage::Analyzed => "analyzed",
        }
    }
}

pub struct StageFiles {
    dir: PathBuf,
}

impl StageFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Serialize `articles` for `stage`. Returns the file path.
    pub fn write(&self, stage: Stage, articles: &[Article]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let path = self.dir.join(format!(
            "{}_articles_{}.json",
            stage.as_str(),
            Utc::now().timestamp()
        ));

        std::fs::write(&path, serde_json::to_string_pretty(articles)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), articles = articles.len(), "Stage file saved");

        Ok(path)
    }

    /// Like `write`, but a failure only logs. Stage files never stop a run.
    pub fn record(&self, stage: Stage, articles: &[Article]) -> Option<PathBuf> {
        match self.write(stage, articles) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(stage = stage.as_str(), error = %e, "Failed to write stage file");
                None
            }
        }
    }

    /// Read a stage file back.
    pub fn load(path: &Path) -> Result<Vec<Article>> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_follows_stage_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let files = StageFiles::new(dir.path().join("temp"));

        let path = files
            .write(Stage::FactChecked, &[Article::failed("https://a", "A", "e")])
            .unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("fact_checked_articles_"));
        assert!(name.ends_with(".json"));
    }

    #[test]
    fn written_articles_load_back_equal() {
        let dir = tempfile::tempdir().unwrap();
        let files = StageFiles::new(dir.path());
        let articles = vec![
            Article::failed("https://a.example", "A", "HTTP 404"),
            Article::failed("https://b.example", "B", "timeout"),
        ];

        let path = files.write(Stage::Scraped, &articles).unwrap();
        assert_eq!(StageFiles::load(&path).unwrap(), articles);
    }

    #[test]
    fn unwritable_dir_is_logged_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        let files = StageFiles::new(blocker.join("nested"));
        assert!(files.record(Stage::Analyzed, &[]).is_none());
    }
}
