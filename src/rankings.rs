use std::cmp::Ordering;

use crate::error::ScoutError;
use crate::state::PlayerRecord;

/// Top `n` players by `metric`, highest first. Missing values rank as 0 and
/// equal values keep their input order.
pub fn top_n<'a>(
    players: &[&'a PlayerRecord],
    metric: &str,
    n: usize,
) -> Result<Vec<&'a PlayerRecord>, ScoutError> {
    if n == 0 {
        return Err(ScoutError::InvalidCount(n));
    }
    let mut ranked: Vec<&PlayerRecord> = players.to_vec();
    ranked.sort_by(|a, b| cmp_desc(a.metric_or_zero(metric), b.metric_or_zero(metric)));
    ranked.truncate(n);
    Ok(ranked)
}

pub(crate) fn cmp_desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Metrics that describe a position group best.
pub fn position_metrics(position: &str) -> &'static [&'static str] {
    match position {
        "GK" => &["Saves", "Save%", "CS%", "PSxG", "Cmp%"],
        "DF" => &["Tkl_per90", "Int_per90", "Blocks_per90", "PrgP_per90", "Cmp%", "Clr"],
        "MF" => &["xGxAG_per90", "PrgC_per90", "PrgP_per90", "Cmp%", "Touches_per90", "Tkl_per90"],
        "FW" => &["Gls_per90", "xG_per90", "Sh_per90", "SoT_per90", "G-xG", "Touches_per90"],
        _ => &[],
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Percentile {
    pub metric: String,
    pub percentile: f64,
}

/// For each metric: share (0–100) of same-position players with a strictly
/// lower value. A player without the metric gets 0; other players without it
/// never count as lower.
pub fn percentile_ranks(
    players: &[PlayerRecord],
    player: &PlayerRecord,
    metrics: &[&str],
) -> Vec<Percentile> {
    let peers: Vec<&PlayerRecord> = players
        .iter()
        .filter(|p| p.position == player.position)
        .collect();

    metrics
        .iter()
        .map(|metric| {
            let percentile = match player.metric(metric) {
                Some(value) if !peers.is_empty() => {
                    let lower = peers
                        .iter()
                        .filter(|p| p.metric(metric).is_some_and(|v| v < value))
                        .count();
                    lower as f64 / peers.len() as f64 * 100.0
                }
                _ => 0.0,
            };
            Percentile {
                metric: metric.to_string(),
                percentile,
            }
        })
        .collect()
}
