use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::Result;
use crate::model::{Artifact, ArtifactMeta, ChampionRecord, CounterPair};

pub const ARTIFACT_VERSION: &str = "1.0.0";

pub fn build_artifact(
    champions: Vec<ChampionRecord>,
    counter_pairs: Vec<CounterPair>,
    pages_scraped: usize,
    scraped_at: chrono::DateTime<chrono::Utc>,
) -> Artifact {
    Artifact {
        meta: ArtifactMeta {
            scraped_at: scraped_at.to_rfc3339(),
            champion_count: champions.len(),
            version: ARTIFACT_VERSION.to_string(),
            pages_scraped,
        },
        champions,
        counter_pairs,
    }
}

/// Writes the artifact atomically: a killed process leaves either the old file or the new one.
pub struct ArtifactWriter {
    path: PathBuf,
}

impl ArtifactWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn write(&self, artifact: &Artifact) -> Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer_pretty(&mut tmp, artifact)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        info!(path = %self.path.display(), champions = artifact.meta.champion_count, "output written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn writes_schema_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("raw-data.json");
        let mut ahri = ChampionRecord::untiered("Ahri", "https://wr-meta.com/1-ahri.html");
        ahri.is_scraped = true;
        let at = chrono::Utc.with_ymd_and_hms(2026, 2, 25, 12, 0, 0).unwrap();
        let artifact = build_artifact(
            vec![ahri],
            vec![CounterPair {
                champion_id: "ahri".into(),
                threat_id: "zed".into(),
                category: "extreme".into(),
            }],
            1,
            at,
        );

        ArtifactWriter::new(&path).write(&artifact).unwrap();

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["meta"]["championCount"], 1);
        assert_eq!(json["meta"]["version"], "1.0.0");
        assert_eq!(json["meta"]["pagesScraped"], 1);
        assert_eq!(json["meta"]["scrapedAt"], "2026-02-25T12:00:00+00:00");
        assert_eq!(json["champions"][0]["detailPageUrl"], "https://wr-meta.com/1-ahri.html");
        assert_eq!(json["champions"][0]["isScraped"], true);
        assert_eq!(json["counterPairs"][0]["threatId"], "zed");

        let back: Artifact = serde_json::from_value(json).unwrap();
        assert_eq!(back, artifact);
    }

    #[test]
    fn overwrites_previous_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw-data.json");
        fs::write(&path, "old").unwrap();
        let artifact = build_artifact(Vec::new(), Vec::new(), 0, chrono::Utc::now());
        ArtifactWriter::new(&path).write(&artifact).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("\"championCount\": 0"));
    }
}
