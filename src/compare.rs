use crate::charts::{ChartSize, ChartSpec, comparison_spec, percentile_spec};
use crate::error::ScoutError;
use crate::rankings::{Percentile, percentile_ranks, position_metrics};
use crate::state::{PlayerRecord, ScoutStore};

/// Metrics on the side-by-side bar chart.
pub const COMPARISON_METRICS: &[&str] = &[
    "Gls_per90",
    "Ast_per90",
    "xG_per90",
    "xAG_per90",
    "PrgC_per90",
    "Tkl_per90",
];

pub struct Comparison<'a> {
    pub first: &'a PlayerRecord,
    pub second: &'a PlayerRecord,
    pub first_percentiles: Vec<Percentile>,
    pub second_percentiles: Vec<Percentile>,
}

impl Comparison<'_> {
    pub fn chart(&self, size: ChartSize) -> ChartSpec {
        comparison_spec(self.first, self.second, COMPARISON_METRICS, size)
    }

    pub fn percentile_chart(&self, size: ChartSize) -> ChartSpec {
        percentile_spec(
            (self.first.name.as_str(), self.first_percentiles.as_slice()),
            (self.second.name.as_str(), self.second_percentiles.as_slice()),
            size,
        )
    }
}

/// Metrics for the percentile profile: the first player's position set, or
/// the bar-chart metrics when the position has none.
pub fn profile_metrics(player: &PlayerRecord) -> &'static [&'static str] {
    let metrics = position_metrics(player.position_or_unknown());
    if metrics.is_empty() {
        COMPARISON_METRICS
    } else {
        metrics
    }
}

/// The compare action. Both names are required and must exist.
pub fn compare_players<'a>(
    store: &'a ScoutStore,
    first: &str,
    second: &str,
) -> Result<Comparison<'a>, ScoutError> {
    if first.trim().is_empty() || second.trim().is_empty() {
        return Err(ScoutError::MissingSelection("both players"));
    }
    let first = store.find_player(first, "both players")?;
    let second = store.find_player(second, "both players")?;

    let metrics = profile_metrics(first);
    Ok(Comparison {
        first,
        second,
        first_percentiles: percentile_ranks(&store.players, first, metrics),
        second_percentiles: percentile_ranks(&store.players, second, metrics),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ScoutStore {
        ScoutStore::new(
            vec![
                PlayerRecord::new("A").with_position("FW").with_metric("Gls_per90", 0.8),
                PlayerRecord::new("B").with_position("FW").with_metric("Gls_per90", 0.2),
                PlayerRecord::new("C").with_position("DF").with_metric("Tkl_per90", 3.0),
            ],
            None,
        )
    }

    #[test]
    fn requires_both_selections() {
        let s = store();
        assert_eq!(
            compare_players(&s, "A", "").err(),
            Some(ScoutError::MissingSelection("both players"))
        );
    }

    #[test]
    fn unknown_player_is_reported() {
        let s = store();
        assert_eq!(
            compare_players(&s, "A", "Nobody").err(),
            Some(ScoutError::PlayerNotFound("Nobody".to_string()))
        );
    }

    #[test]
    fn percentiles_follow_first_players_position() {
        let s = store();
        let cmp = compare_players(&s, "A", "B").unwrap();
        assert_eq!(cmp.first_percentiles[0].metric, "Gls_per90");
        assert_eq!(cmp.first_percentiles[0].percentile, 50.0);
        assert_eq!(cmp.second_percentiles[0].percentile, 0.0);
        assert_eq!(cmp.chart(ChartSize::default()).data.values.len(), 2);
        assert_eq!(
            cmp.percentile_chart(ChartSize::default()).data.values.len(),
            2 * position_metrics("FW").len()
        );
    }
}
