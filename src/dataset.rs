use std::fmt;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use crate::config::Config;
use crate::http_cache::fetch_text_cached;
use crate::http_client::http_client;
use crate::state::{Metadata, PlayerRecord, ScoutStore};

/// Where a JSON resource lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl DataSource {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            DataSource::Url(raw.to_string())
        } else {
            DataSource::File(PathBuf::from(raw))
        }
    }

    pub fn read_text(&self, timeout_secs: u64) -> Result<String> {
        match self {
            DataSource::File(path) => fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display())),
            DataSource::Url(url) => fetch_text_cached(http_client(timeout_secs)?, url),
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::File(path) => write!(f, "{}", path.display()),
            DataSource::Url(url) => f.write_str(url),
        }
    }
}

/// Parse the player dataset: a JSON array of flat records. `null` parses as
/// empty. Rows without a usable name are skipped with a warning; a row that is
/// not an object fails the whole dataset.
pub fn parse_players_json(raw: &str) -> Result<Vec<PlayerRecord>> {
    let root: Value = serde_json::from_str(raw).context("parsing player dataset")?;
    let rows = match root {
        Value::Null => return Ok(Vec::new()),
        Value::Array(rows) => rows,
        _ => return Err(anyhow!("player dataset must be a JSON array")),
    };
    let mut players = Vec::with_capacity(rows.len());
    for (idx, row) in rows.into_iter().enumerate() {
        let Value::Object(map) = row else {
            return Err(anyhow!("row {idx} is not a JSON object"));
        };
        match PlayerRecord::from_json_map(map) {
            Ok(player) => players.push(player),
            Err(err) => log::warn!("Skipping player row {idx}: {err}"),
        }
    }
    Ok(players)
}

pub fn parse_metadata_json(raw: &str) -> Result<Metadata> {
    let root: Value = serde_json::from_str(raw).context("parsing metadata")?;
    if root.is_null() {
        return Ok(Metadata::default());
    }
    serde_json::from_value(root).context("metadata has an unexpected shape")
}

pub fn load_players(source: &DataSource, timeout_secs: u64) -> Result<Vec<PlayerRecord>> {
    let raw = source.read_text(timeout_secs)?;
    let players = parse_players_json(&raw).with_context(|| format!("loading {source}"))?;
    log::info!("Loaded {} players from {source}", players.len());
    Ok(players)
}

pub fn load_metadata(source: &DataSource, timeout_secs: u64) -> Result<Metadata> {
    let raw = source.read_text(timeout_secs)?;
    parse_metadata_json(&raw).with_context(|| format!("loading {source}"))
}

/// Build the session store. A dataset failure is returned to the caller; a
/// metadata failure is logged and the option lists are derived instead.
pub fn load_store(config: &Config) -> Result<ScoutStore> {
    let players = load_players(&config.players, config.http_timeout_secs)?;
    let metadata = match &config.metadata {
        Some(source) => match load_metadata(source, config.http_timeout_secs) {
            Ok(meta) => {
                log::info!("Metadata loaded ({} leagues)", meta.leagues.len());
                Some(meta)
            }
            Err(err) => {
                log::warn!("Error loading metadata, deriving filters from players: {err:#}");
                None
            }
        },
        None => None,
    };
    Ok(ScoutStore::new(players, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_detects_urls() {
        assert_eq!(
            DataSource::parse(" https://x.org/p.json "),
            DataSource::Url("https://x.org/p.json".to_string())
        );
        assert_eq!(
            DataSource::parse("data/p.json"),
            DataSource::File(PathBuf::from("data/p.json"))
        );
    }

    #[test]
    fn null_dataset_is_empty() {
        assert!(parse_players_json("null").unwrap().is_empty());
        assert_eq!(parse_metadata_json("null").unwrap(), Metadata::default());
    }

    #[test]
    fn non_array_dataset_is_rejected() {
        assert!(parse_players_json(r#"{"name":"A"}"#).is_err());
        let err = parse_players_json(r#"[{"name":"A"}, 3]"#).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn nameless_rows_are_skipped() {
        let raw = r#"[
            {"Player_Clean": "A", "Squad": "X", "Gls_per90": 0.4},
            {"Player_Clean": "", "Squad": "X", "Gls_per90": 0.9},
            {"Player": null, "Squad": "Y"},
            {"Squad": "Z"},
            {"name": "B"}
        ]"#;
        let players = parse_players_json(raw).unwrap();
        let names: Vec<&str> = players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(players[0].metric("Gls_per90"), Some(0.4));
    }

    #[test]
    fn partial_metadata_parses() {
        let meta = parse_metadata_json(r#"{"total_players": 12, "leagues": ["Serie A"]}"#).unwrap();
        assert_eq!(meta.total_players, 12);
        assert_eq!(meta.leagues, vec!["Serie A"]);
        assert!(meta.teams.is_empty());
    }
}
