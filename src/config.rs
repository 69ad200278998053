use std::path::PathBuf;

use crate::dataset::DataSource;

const DEFAULT_PLAYERS: &str = "static/data/players_sample.json";
const DEFAULT_METADATA: &str = "static/data/metadata.json";
const DEFAULT_CHART_WIDTH: u32 = 700;
const DEFAULT_CHART_HEIGHT: u32 = 500;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub players: DataSource,
    pub metadata: Option<DataSource>,
    pub seed: Option<u64>,
    pub chart_width: u32,
    pub chart_height: u32,
    pub http_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            players: DataSource::File(PathBuf::from(DEFAULT_PLAYERS)),
            metadata: Some(DataSource::File(PathBuf::from(DEFAULT_METADATA))),
            seed: None,
            chart_width: DEFAULT_CHART_WIDTH,
            chart_height: DEFAULT_CHART_HEIGHT,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Reads `.env.local` and `.env` (if present) and then the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let players = get("SCOUT_PLAYERS")
            .map(|raw| DataSource::parse(&raw))
            .unwrap_or(defaults.players);
        // An explicit "none" disables the metadata fetch; options are then derived.
        let metadata = match get("SCOUT_METADATA") {
            Some(raw) if raw.eq_ignore_ascii_case("none") => None,
            Some(raw) => Some(DataSource::parse(&raw)),
            None => defaults.metadata,
        };
        let seed = get("SCOUT_SEED").and_then(|v| v.parse::<u64>().ok());
        let chart_width = get("SCOUT_CHART_WIDTH")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_CHART_WIDTH)
            .clamp(200, 2000);
        let chart_height = get("SCOUT_CHART_HEIGHT")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_CHART_HEIGHT)
            .clamp(150, 2000);
        let http_timeout_secs = get("SCOUT_HTTP_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS)
            .max(1);

        Self {
            players,
            metadata,
            seed,
            chart_width,
            chart_height,
            http_timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(Config::from_lookup(|_| None), Config::default());
    }

    #[test]
    fn reads_sources_seed_and_clamps_sizes() {
        let cfg = Config::from_lookup(lookup(&[
            ("SCOUT_PLAYERS", "https://example.org/players.json"),
            ("SCOUT_METADATA", "none"),
            ("SCOUT_SEED", "42"),
            ("SCOUT_CHART_WIDTH", "50"),
            ("SCOUT_CHART_HEIGHT", "abc"),
            ("SCOUT_HTTP_TIMEOUT_SECS", "0"),
        ]));
        assert_eq!(
            cfg.players,
            DataSource::Url("https://example.org/players.json".to_string())
        );
        assert_eq!(cfg.metadata, None);
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.chart_width, 200);
        assert_eq!(cfg.chart_height, DEFAULT_CHART_HEIGHT);
        assert_eq!(cfg.http_timeout_secs, 1);
    }
}
