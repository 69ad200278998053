use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::state::{Metadata, PlayerRecord, UNKNOWN_POSITION, parse_age};

pub const DEFAULT_MIN_MINUTES: f64 = 450.0;

const PER90_SOURCES: &[(&str, &str)] = &[
    ("Gls", "Gls_per90"),
    ("Ast", "Ast_per90"),
    ("xG", "xG_per90"),
    ("xAG", "xAG_per90"),
    ("G+A", "G+A_per90"),
    ("PrgC", "PrgC_per90"),
    ("Tkl", "Tkl_per90"),
    ("Int", "Int_per90"),
    ("Blocks", "Blocks_per90"),
    ("Sh", "Sh_per90"),
    ("SoT", "SoT_per90"),
    ("Touches", "Touches_per90"),
    ("PrgP", "PrgP_per90"),
    ("CrsPA", "CrsPA_per90"),
    ("Carries", "Carries_per90"),
];

#[derive(Debug, Clone, Default)]
pub struct PrepOutput {
    pub players: Vec<PlayerRecord>,
    pub rows_read: usize,
    pub dropped_low_minutes: usize,
    pub errors: Vec<String>,
}

/// Collapse an FBref position string (`"FW,MF"`) to one group. Goalkeeper
/// wins, then forward, midfielder, defender.
pub fn simplify_position(raw: &str) -> &'static str {
    let upper = raw.to_uppercase();
    if upper.contains("GK") {
        "GK"
    } else if upper.contains("FW") {
        "FW"
    } else if upper.contains("MF") {
        "MF"
    } else if upper.contains("DF") {
        "DF"
    } else {
        UNKNOWN_POSITION
    }
}

pub fn age_group(age: f64) -> Option<&'static str> {
    match age {
        a if a <= 0.0 => None,
        a if a <= 21.0 => Some("U21"),
        a if a <= 23.0 => Some("21-23"),
        a if a <= 27.0 => Some("24-27"),
        a if a <= 32.0 => Some("28-32"),
        a if a <= 50.0 => Some("33+"),
        _ => None,
    }
}

/// `"eng Premier League"` → `"Premier League"`.
pub fn clean_league(raw: &str) -> String {
    let raw = raw.trim();
    if let Some((prefix, rest)) = raw.split_once(' ') {
        let is_code =
            (2..=3).contains(&prefix.len()) && prefix.chars().all(|c| c.is_ascii_lowercase());
        if is_code && !rest.trim().is_empty() {
            return rest.trim().to_string();
        }
    }
    raw.to_string()
}

fn parse_number(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Turn a raw per-season stats CSV into dataset records.
pub fn prepare_csv<R: Read>(reader: R, min_minutes: f64) -> Result<PrepOutput> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    // First occurrence wins for repeated FBref column names.
    let mut index: HashMap<&str, usize> = HashMap::new();
    for (idx, h) in headers.iter().enumerate() {
        index.entry(h.as_str()).or_insert(idx);
    }
    let player_idx = *index.get("Player").context("CSV missing 'Player' column")?;

    let mut out = PrepOutput::default();
    for (row_no, result) in reader.records().enumerate() {
        out.rows_read += 1;
        let record = match result {
            Ok(r) => r,
            Err(err) => {
                out.errors.push(format!("row {row_no}: {err}"));
                continue;
            }
        };
        let get = |col: &str| index.get(col).and_then(|&i| record.get(i));

        let name = record.get(player_idx).unwrap_or("").trim();
        // FBref repeats the header row inside long tables.
        if name.is_empty() || name == "Player" {
            continue;
        }
        let minutes = get("Min").and_then(parse_number);
        if minutes.is_none_or(|m| m < min_minutes) {
            out.dropped_low_minutes += 1;
            continue;
        }

        let mut player = PlayerRecord::new(name);
        player.team = get("Squad").map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        player.league = get("Comp").map(clean_league).filter(|s| !s.is_empty());
        player.position = Some(simplify_position(get("Pos").unwrap_or("")).to_string());
        player.age = get("Age").and_then(parse_age);

        for (idx, header) in headers.iter().enumerate() {
            if idx == player_idx || index.get(header.as_str()) != Some(&idx) {
                continue;
            }
            if matches!(header.as_str(), "Squad" | "Comp" | "Age" | "Rk" | "Matches") {
                continue;
            }
            let raw = record.get(idx).unwrap_or("");
            match parse_number(raw) {
                Some(v) => {
                    player.metrics.insert(header.clone(), Some(v));
                }
                None if !raw.trim().is_empty() => {
                    player.attributes.insert(header.clone(), raw.trim().to_string());
                }
                None => {}
            }
        }

        derive_metrics(&mut player);
        out.players.push(player);
    }
    Ok(out)
}

fn derive_metrics(player: &mut PlayerRecord) {
    let nineties = player.metric("90s").filter(|n| *n > 0.0);
    if let Some(n) = nineties {
        for (source, per90) in PER90_SOURCES {
            if let Some(total) = player.metric(source) {
                player.metrics.insert(per90.to_string(), Some(total / n));
            }
        }
        if let (Some(xg), Some(xag)) = (player.metric("xG"), player.metric("xAG")) {
            player.metrics.insert("xGxAG_per90".to_string(), Some((xg + xag) / n));
        }
    }
    if let (Some(gls), Some(xg)) = (player.metric("Gls"), player.metric("xG")) {
        player.metrics.insert("Goals_minus_xG".to_string(), Some(gls - xg));
    }
    if let (Some(ast), Some(xag)) = (player.metric("Ast"), player.metric("xAG")) {
        player.metrics.insert("Ast_minus_xAG".to_string(), Some(ast - xag));
    }
    if let Some(group) = player.age.and_then(age_group) {
        player.attributes.insert("Age_Group".to_string(), group.to_string());
    }
}

pub fn prepare_csv_path(path: &Path, min_minutes: f64) -> Result<PrepOutput> {
    let file = fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    prepare_csv(file, min_minutes)
}

/// Write `players.json` and `metadata.json` into `dir`.
pub fn write_dataset(dir: &Path, players: &[PlayerRecord]) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let players_path = dir.join("players.json");
    let metadata_path = dir.join("metadata.json");

    let mut metadata = Metadata::from_players(players);
    metadata.generated_at = Some(chrono::Utc::now().to_rfc3339());

    let players_json = serde_json::to_string(players).context("serialize players")?;
    fs::write(&players_path, players_json)
        .with_context(|| format!("writing {}", players_path.display()))?;
    let metadata_json = serde_json::to_string_pretty(&metadata).context("serialize metadata")?;
    fs::write(&metadata_path, metadata_json)
        .with_context(|| format!("writing {}", metadata_path.display()))?;
    Ok((players_path, metadata_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "\
Rk,Player,Nation,Pos,Squad,Comp,Age,Min,90s,Gls,Ast,xG,xAG,PrgC
1,Bukayo Saka ,eng ENG,\"FW,MF\",Arsenal,eng Premier League,23-045,\"2,100\",23.3,10,8,9.5,7.0,120
2,Bench Guy,es ESP,DF,Getafe,es La Liga,30,120,1.3,0,0,0.1,0.0,2
Rk,Player,Nation,Pos,Squad,Comp,Age,Min,90s,Gls,Ast,xG,xAG,PrgC
3,Young Keeper,fr FRA,GK,Lens,fr Ligue 1,19,900,10.0,0,0,,,1
";

    #[test]
    fn prepares_fbref_rows() {
        let out = prepare_csv(RAW.as_bytes(), DEFAULT_MIN_MINUTES).unwrap();
        assert_eq!(out.rows_read, 4);
        assert_eq!(out.dropped_low_minutes, 1);
        assert_eq!(out.players.len(), 2);

        let saka = &out.players[0];
        assert_eq!(saka.name, "Bukayo Saka");
        assert_eq!(saka.position.as_deref(), Some("FW"));
        assert_eq!(saka.league.as_deref(), Some("Premier League"));
        assert_eq!(saka.age, Some(23.0));
        assert_eq!(saka.metric("Min"), Some(2100.0));
        assert!((saka.metric("Gls_per90").unwrap() - 10.0 / 23.3).abs() < 1e-12);
        assert!((saka.metric("xGxAG_per90").unwrap() - 16.5 / 23.3).abs() < 1e-12);
        assert_eq!(saka.metric("Goals_minus_xG"), Some(0.5));
        assert_eq!(saka.attributes.get("Age_Group").map(String::as_str), Some("21-23"));
        assert_eq!(saka.attributes.get("Nation").map(String::as_str), Some("eng ENG"));

        let keeper = &out.players[1];
        assert_eq!(keeper.position.as_deref(), Some("GK"));
        assert_eq!(keeper.metric("xG_per90"), None);
        assert_eq!(keeper.attributes.get("Age_Group").map(String::as_str), Some("U21"));
    }

    #[test]
    fn position_priority() {
        assert_eq!(simplify_position("DF,GK"), "GK");
        assert_eq!(simplify_position("MF,FW"), "FW");
        assert_eq!(simplify_position("df,mf"), "MF");
        assert_eq!(simplify_position(""), UNKNOWN_POSITION);
    }

    #[test]
    fn league_prefix_is_stripped_only_for_codes() {
        assert_eq!(clean_league("it Serie A"), "Serie A");
        assert_eq!(clean_league("Serie A"), "Serie A");
        assert_eq!(clean_league("La Liga"), "La Liga");
    }

    #[test]
    fn writes_dataset_that_loads_back() {
        let out = prepare_csv(RAW.as_bytes(), DEFAULT_MIN_MINUTES).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let (players_path, metadata_path) = write_dataset(dir.path(), &out.players).unwrap();
        let raw = fs::read_to_string(players_path).unwrap();
        let players = crate::dataset::parse_players_json(&raw).unwrap();
        assert_eq!(players[0].name, "Bukayo Saka");
        let raw = fs::read_to_string(metadata_path).unwrap();
        let meta = crate::dataset::parse_metadata_json(&raw).unwrap();
        assert_eq!(meta.total_players, 2);
        assert!(meta.generated_at.is_some());
    }
}
