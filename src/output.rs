use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::field_position::FieldPositionRate;
use crate::league_rates::LeagueRate;
use crate::pipeline::RateSets;
use crate::play::PlayTable;
use crate::player_rates::PlayerRate;
use crate::team_rates::TeamRate;

pub const DEFAULT_OUTPUT_PATH: &str = "probability-data.json";

const DESCRIPTION: &str = "NFL probability data for live game simulator";
const SOURCE: &str = "nflverse/nflverse-data";
const NOTE: &str = "For entertainment purposes only";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub description: String,
    pub source: String,
    pub note: String,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            description: DESCRIPTION.to_string(),
            source: SOURCE.to_string(),
            note: NOTE.to_string(),
        }
    }
}

/// The single artifact a run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDocument {
    pub generated_at: String,
    pub season: u16,
    pub total_plays: usize,
    pub league_conversion_rates: Vec<LeagueRate>,
    pub team_conversion_rates: Vec<TeamRate>,
    pub field_position_impact: Vec<FieldPositionRate>,
    pub player_success_rates: Vec<PlayerRate>,
    pub metadata: Metadata,
}

impl OutputDocument {
    pub fn assemble(
        season: u16,
        table: &PlayTable,
        rates: RateSets,
        generated_at: impl Into<String>,
    ) -> Self {
        Self {
            generated_at: generated_at.into(),
            season,
            total_plays: table.len(),
            league_conversion_rates: rates.league,
            team_conversion_rates: rates.team,
            field_position_impact: rates.field_position,
            player_success_rates: rates.players,
            metadata: Metadata::default(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serialize probability document")
    }
}

pub fn generated_now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Writes through a sibling temp file and renames it into place, so readers
/// see either the previous document or the complete new one.
pub fn write_document(path: &Path, doc: &OutputDocument) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let json = doc.to_json()?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(err).with_context(|| format!("move into place {}", path.display()));
    }
    Ok(())
}

pub fn read_document(path: &Path) -> Result<OutputDocument> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buckets::DistanceBucket;
    use crate::play::{PlayType, SourceColumns};

    fn sample_doc() -> OutputDocument {
        let table = PlayTable {
            plays: Vec::new(),
            columns: SourceColumns::all(),
        };
        let rates = RateSets {
            league: vec![LeagueRate {
                down: 3,
                distance: DistanceBucket::Short,
                play_type: PlayType::Pass,
                success_rate: 0.75,
                sample_size: 20,
            }],
            ..RateSets::default()
        };
        OutputDocument::assemble(2024, &table, rates, "2024-12-01T00:00:00+00:00")
    }

    #[test]
    fn top_level_keys_match_artifact_layout() {
        let value: serde_json::Value =
            serde_json::from_str(&sample_doc().to_json().unwrap()).unwrap();
        let obj = value.as_object().unwrap();
        for key in [
            "generated_at",
            "season",
            "total_plays",
            "league_conversion_rates",
            "team_conversion_rates",
            "field_position_impact",
            "player_success_rates",
            "metadata",
        ] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(value["season"], 2024);
        assert_eq!(value["league_conversion_rates"][0]["distance"], "short");
        assert_eq!(value["league_conversion_rates"][0]["play_type"], "pass");
        assert_eq!(value["metadata"]["note"], NOTE);
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = std::env::temp_dir().join(format!("nfl_probability_out_{}", std::process::id()));
        let path = dir.join("nested").join("probability-data.json");
        let doc = sample_doc();
        write_document(&path, &doc).unwrap();
        assert!(!path.with_extension("json.tmp").exists());
        let back = read_document(&path).unwrap();
        assert_eq!(back, doc);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn every_small_ratio_parses_back_exactly() {
        let mut doc = sample_doc();
        let template = doc.league_conversion_rates[0].clone();
        doc.league_conversion_rates = (1..=400usize)
            .flat_map(|n| (0..=n).map(move |k| (k, n)))
            .map(|(k, n)| LeagueRate {
                success_rate: k as f64 / n as f64,
                sample_size: n,
                ..template.clone()
            })
            .collect();
        let back: OutputDocument = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn failed_rename_leaves_no_temp_file() {
        let dir =
            std::env::temp_dir().join(format!("nfl_probability_blocked_{}", std::process::id()));
        let path = dir.join("probability-data.json");
        fs::create_dir_all(path.join("occupied")).unwrap();

        assert!(write_document(&path, &sample_doc()).is_err());
        assert!(!path.with_extension("json.tmp").exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn json_is_indented() {
        let raw = sample_doc().to_json().unwrap();
        assert!(raw.contains("\n  \"season\": 2024"));
    }
}
