use std::collections::{BTreeMap, BTreeSet};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::ScoutError;

// Canonical keys used when a record is emitted into chart data.
pub const FIELD_NAME: &str = "Player";
pub const FIELD_TEAM: &str = "Squad";
pub const FIELD_LEAGUE: &str = "Comp";
pub const FIELD_POSITION: &str = "Position";
pub const FIELD_AGE: &str = "Age";
pub const FIELD_SIMILARITY: &str = "Similarity";

const NAME_KEYS: &[&str] = &["name", "Player_Clean", "Player"];
const TEAM_KEYS: &[&str] = &["team", "Squad"];
const LEAGUE_KEYS: &[&str] = &["league", "Comp", "League"];
const POSITION_KEYS: &[&str] = &["position", "Position"];
const AGE_KEYS: &[&str] = &["age", "Age"];

pub const UNKNOWN_POSITION: &str = "Unknown";

/// One row of the player dataset.
///
/// Identity fields are typed; every other numeric field lands in `metrics`
/// keyed by its source name. `None` in `metrics` means the field was present
/// but null, which callers treat exactly like an absent key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerRecord {
    pub name: String,
    pub team: Option<String>,
    pub league: Option<String>,
    pub position: Option<String>,
    pub age: Option<f64>,
    pub metrics: BTreeMap<String, Option<f64>>,
    pub attributes: BTreeMap<String, String>,
}

impl PlayerRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    pub fn with_league(mut self, league: impl Into<String>) -> Self {
        self.league = Some(league.into());
        self
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }

    pub fn with_age(mut self, age: f64) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_metric(mut self, key: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(key.into(), Some(value));
        self
    }

    /// Value of a numeric field. `Age` resolves to the identity age so it can
    /// be used as an axis like any metric.
    pub fn metric(&self, key: &str) -> Option<f64> {
        if AGE_KEYS.contains(&key) {
            return self.age;
        }
        self.metrics.get(key).copied().flatten()
    }

    pub fn metric_or_zero(&self, key: &str) -> f64 {
        self.metric(key).unwrap_or(0.0)
    }

    pub fn position_or_unknown(&self) -> &str {
        self.position.as_deref().unwrap_or(UNKNOWN_POSITION)
    }

    /// Flat JSON row with canonical identity keys, metrics, then text attributes.
    pub fn to_row(&self) -> Map<String, Value> {
        let mut row = Map::new();
        row.insert(FIELD_NAME.to_string(), Value::String(self.name.clone()));
        row.insert(FIELD_TEAM.to_string(), opt_string(&self.team));
        row.insert(FIELD_LEAGUE.to_string(), opt_string(&self.league));
        row.insert(FIELD_POSITION.to_string(), opt_string(&self.position));
        row.insert(FIELD_AGE.to_string(), opt_number(self.age));
        for (key, value) in &self.metrics {
            row.insert(key.clone(), opt_number(*value));
        }
        for (key, value) in &self.attributes {
            row.entry(key.clone())
                .or_insert_with(|| Value::String(value.clone()));
        }
        row
    }

    pub fn from_json_map(map: Map<String, Value>) -> Result<Self, String> {
        let mut record = PlayerRecord::default();
        let mut name = None;
        for (key, value) in map {
            let key_str = key.as_str();
            if NAME_KEYS.contains(&key_str) {
                // Player_Clean wins over the raw Player column when both exist.
                if let Some(text) = value_text(&value) {
                    if name.is_none() || key_str != "Player" {
                        name = Some(text.trim().to_string());
                    }
                }
            } else if TEAM_KEYS.contains(&key_str) {
                record.team = value_text(&value);
            } else if LEAGUE_KEYS.contains(&key_str) {
                if record.league.is_none() || key_str != "League" {
                    record.league = value_text(&value);
                }
            } else if POSITION_KEYS.contains(&key_str) {
                record.position = value_text(&value);
            } else if AGE_KEYS.contains(&key_str) {
                record.age = value_age(&value);
            } else {
                match value {
                    Value::Number(n) => {
                        record.metrics.insert(key, n.as_f64());
                    }
                    Value::Null => {
                        record.metrics.insert(key, None);
                    }
                    Value::String(s) => {
                        record.attributes.insert(key, s);
                    }
                    Value::Bool(b) => {
                        record.attributes.insert(key, b.to_string());
                    }
                    Value::Array(_) | Value::Object(_) => {}
                }
            }
        }
        record.name = name.ok_or_else(|| "player record has no name".to_string())?;
        Ok(record)
    }
}

impl Serialize for PlayerRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_row().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PlayerRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        PlayerRecord::from_json_map(map).map_err(D::Error::custom)
    }
}

fn opt_string(value: &Option<String>) -> Value {
    value
        .as_ref()
        .map(|s| Value::String(s.clone()))
        .unwrap_or(Value::Null)
}

fn opt_number(value: Option<f64>) -> Value {
    value
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_age(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_age(s),
        _ => None,
    }
}

/// Parses `"24"`, `"24.0"` or the years-days form `"24-123"`.
pub fn parse_age(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let years = s.split('-').next().unwrap_or(s).trim();
    years.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Filter-option lists shipped next to the dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub total_players: usize,
    #[serde(default)]
    pub leagues: Vec<String>,
    #[serde(default)]
    pub positions: Vec<String>,
    #[serde(default)]
    pub teams: Vec<String>,
    #[serde(default)]
    pub players: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}

impl Metadata {
    pub fn from_players(players: &[PlayerRecord]) -> Self {
        let mut leagues = BTreeSet::new();
        let mut positions = BTreeSet::new();
        let mut teams = BTreeSet::new();
        let mut names = BTreeSet::new();
        for p in players {
            if let Some(league) = &p.league {
                leagues.insert(league.clone());
            }
            if let Some(pos) = &p.position {
                if pos != UNKNOWN_POSITION {
                    positions.insert(pos.clone());
                }
            }
            if let Some(team) = &p.team {
                teams.insert(team.clone());
            }
            names.insert(p.name.clone());
        }
        Self {
            total_players: players.len(),
            leagues: leagues.into_iter().collect(),
            positions: positions.into_iter().collect(),
            teams: teams.into_iter().collect(),
            players: names.into_iter().collect(),
            generated_at: None,
        }
    }
}

/// Everything one dashboard session works against. Built once by the loader
/// and passed by reference into every action.
#[derive(Debug, Clone, Default)]
pub struct ScoutStore {
    pub players: Vec<PlayerRecord>,
    pub metadata: Metadata,
}

impl ScoutStore {
    /// Falls back to metadata derived from `players` when none was loaded.
    pub fn new(players: Vec<PlayerRecord>, metadata: Option<Metadata>) -> Self {
        let metadata = metadata.unwrap_or_else(|| Metadata::from_players(&players));
        Self { players, metadata }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Exact-name lookup for an action handler. `what` names the selection in
    /// the error shown to the user.
    pub fn find_player(&self, name: &str, what: &'static str) -> Result<&PlayerRecord, ScoutError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ScoutError::MissingSelection(what));
        }
        self.players
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ScoutError::PlayerNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fbref_style_row() {
        let raw = r#"{"Player_Clean":"Bukayo Saka","Player":"Bukayo Saka ","Squad":"Arsenal",
            "Comp":"Premier League","Position":"FW","Age":"23-045","Gls_per90":0.41,
            "Cmp%":null,"Age_Group":"21-23"}"#;
        let p: PlayerRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(p.name, "Bukayo Saka");
        assert_eq!(p.team.as_deref(), Some("Arsenal"));
        assert_eq!(p.age, Some(23.0));
        assert_eq!(p.metric("Gls_per90"), Some(0.41));
        assert_eq!(p.metric("Cmp%"), None);
        assert!(p.metrics.contains_key("Cmp%"));
        assert_eq!(p.attributes.get("Age_Group").map(String::as_str), Some("21-23"));
    }

    #[test]
    fn record_without_name_is_rejected() {
        let res = serde_json::from_str::<PlayerRecord>(r#"{"Squad":"Arsenal"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn age_is_addressable_as_metric() {
        let p = PlayerRecord::new("A").with_age(27.0);
        assert_eq!(p.metric("Age"), Some(27.0));
        assert_eq!(PlayerRecord::new("B").metric_or_zero("Age"), 0.0);
    }

    #[test]
    fn row_uses_canonical_keys() {
        let p = PlayerRecord::new("A")
            .with_team("T")
            .with_league("L")
            .with_position("MF")
            .with_metric("xG_per90", 0.3);
        let row = p.to_row();
        assert_eq!(row.get(FIELD_NAME), Some(&Value::from("A")));
        assert_eq!(row.get(FIELD_TEAM), Some(&Value::from("T")));
        assert_eq!(row.get(FIELD_AGE), Some(&Value::Null));
        assert_eq!(row.get("xG_per90"), Some(&Value::from(0.3)));
    }

    #[test]
    fn metadata_skips_unknown_positions() {
        let players = vec![
            PlayerRecord::new("B").with_position("FW").with_league("Serie A"),
            PlayerRecord::new("A").with_position(UNKNOWN_POSITION).with_league("La Liga"),
        ];
        let meta = Metadata::from_players(&players);
        assert_eq!(meta.total_players, 2);
        assert_eq!(meta.positions, vec!["FW"]);
        assert_eq!(meta.leagues, vec!["La Liga", "Serie A"]);
        assert_eq!(meta.players, vec!["A", "B"]);
    }

    #[test]
    fn find_player_reports_missing_and_unknown() {
        let store = ScoutStore::new(vec![PlayerRecord::new("A")], None);
        assert_eq!(
            store.find_player("  ", "a player"),
            Err(ScoutError::MissingSelection("a player"))
        );
        assert_eq!(
            store.find_player("Z", "a player"),
            Err(ScoutError::PlayerNotFound("Z".to_string()))
        );
        assert_eq!(store.find_player("A", "a player").map(|p| p.name.as_str()), Ok("A"));
    }
}
