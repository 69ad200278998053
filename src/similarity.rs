use rayon::prelude::*;

use crate::error::ScoutError;
use crate::rankings::cmp_desc;
use crate::state::{PlayerRecord, ScoutStore};

/// Profile used by the "find similar players" action.
pub const SIMILARITY_METRICS: &[&str] = &[
    "Gls_per90",
    "Ast_per90",
    "xG_per90",
    "xAG_per90",
    "PrgC_per90",
    "Tkl_per90",
    "Touches_per90",
    "Cmp%",
];

pub const SIMILAR_LIMIT: usize = 10;

/// A candidate annotated with its score against the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarPlayer<'a> {
    pub player: &'a PlayerRecord,
    pub similarity: f64,
}

/// Closeness of two values: `1 - |t - c| / max(t, c, 1)`, kept inside [0, 1]
/// for negative-valued metrics.
pub fn metric_closeness(target: f64, candidate: f64) -> f64 {
    let denom = target.max(candidate).max(1.0);
    (1.0 - (target - candidate).abs() / denom).clamp(0.0, 1.0)
}

/// Mean closeness over the metrics both players have; 0 when none are shared.
pub fn similarity_score(target: &PlayerRecord, candidate: &PlayerRecord, metrics: &[&str]) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for metric in metrics {
        let (Some(t), Some(c)) = (target.metric(metric), candidate.metric(metric)) else {
            continue;
        };
        sum += metric_closeness(t, c);
        n += 1;
    }
    if n == 0 { 0.0 } else { sum / n as f64 }
}

/// Score every other player against `target` and keep the best
/// [`SIMILAR_LIMIT`]. Equal scores keep dataset order.
pub fn rank_similar<'a>(
    players: &'a [PlayerRecord],
    target: &PlayerRecord,
    metrics: &[&str],
    same_position: bool,
) -> Vec<SimilarPlayer<'a>> {
    let mut scored: Vec<SimilarPlayer<'a>> = players
        .par_iter()
        .filter(|p| p.name != target.name)
        .filter(|p| !same_position || p.position == target.position)
        .map(|player| SimilarPlayer {
            player,
            similarity: similarity_score(target, player, metrics),
        })
        .collect();
    scored.sort_by(|a, b| cmp_desc(a.similarity, b.similarity));
    scored.truncate(SIMILAR_LIMIT);
    scored
}

/// The "find similar" action: resolve the target by name, then rank.
pub fn find_similar<'a>(
    store: &'a ScoutStore,
    target_name: &str,
    metrics: &[&str],
    same_position: bool,
) -> Result<(&'a PlayerRecord, Vec<SimilarPlayer<'a>>), ScoutError> {
    let target = store.find_player(target_name, "a player")?;
    log::debug!(
        "Scoring {} candidates against {} (same position: {same_position})",
        store.len().saturating_sub(1),
        target.name
    );
    let similar = rank_similar(&store.players, target, metrics, same_position);
    Ok((target, similar))
}
