use crate::state::PlayerRecord;

/// League selection value meaning "every league".
pub const ALL_LEAGUES: &str = "all";
pub const DEFAULT_MAX_AGE: f64 = 99.0;

/// Predicates behind the analysis page controls.
///
/// Empty `positions` / `leagues` mean no constraint. The threshold applies to
/// `threshold_metric`; a player missing that metric counts as 0.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParams {
    pub positions: Vec<String>,
    pub leagues: Vec<String>,
    pub max_age: f64,
    pub threshold_metric: String,
    pub min_value: f64,
}

impl FilterParams {
    pub fn new(threshold_metric: impl Into<String>) -> Self {
        Self {
            positions: Vec::new(),
            leagues: Vec::new(),
            max_age: DEFAULT_MAX_AGE,
            threshold_metric: threshold_metric.into(),
            min_value: 0.0,
        }
    }

    pub fn matches(&self, player: &PlayerRecord) -> bool {
        self.position_matches(player)
            && self.league_matches(player)
            && self.age_matches(player)
            && player.metric_or_zero(&self.threshold_metric) >= self.min_value
    }

    fn position_matches(&self, player: &PlayerRecord) -> bool {
        if self.positions.is_empty() {
            return true;
        }
        player
            .position
            .as_ref()
            .is_some_and(|pos| self.positions.contains(pos))
    }

    fn league_matches(&self, player: &PlayerRecord) -> bool {
        if self.leagues.is_empty()
            || self
                .leagues
                .iter()
                .any(|l| l.eq_ignore_ascii_case(ALL_LEAGUES))
        {
            return true;
        }
        player
            .league
            .as_ref()
            .is_some_and(|league| self.leagues.contains(league))
    }

    fn age_matches(&self, player: &PlayerRecord) -> bool {
        player.age.is_none_or(|age| age <= self.max_age)
    }
}

/// Players passing every predicate, in input order.
pub fn filter_players<'a>(
    players: &'a [PlayerRecord],
    params: &FilterParams,
) -> Vec<&'a PlayerRecord> {
    players.iter().filter(|p| params.matches(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(rows: &[&PlayerRecord]) -> Vec<String> {
        rows.iter().map(|p| p.name.clone()).collect()
    }

    fn sample() -> Vec<PlayerRecord> {
        vec![
            PlayerRecord::new("A")
                .with_position("FW")
                .with_league("Premier League")
                .with_age(31.0)
                .with_metric("Gls_per90", 0.7),
            PlayerRecord::new("B")
                .with_position("MF")
                .with_league("La Liga")
                .with_age(22.0)
                .with_metric("Gls_per90", 0.1),
            PlayerRecord::new("C").with_position("FW").with_league("La Liga"),
            PlayerRecord::new("D")
                .with_position("DF")
                .with_league("Serie A")
                .with_age(19.0)
                .with_metric("Gls_per90", 0.05),
        ]
    }

    #[test]
    fn empty_selections_only_apply_age_and_threshold() {
        let players = sample();
        let mut params = FilterParams::new("Gls_per90");
        params.max_age = 30.0;
        params.min_value = 0.05;
        let expected: Vec<&PlayerRecord> = players
            .iter()
            .filter(|p| p.age.is_none_or(|a| a <= 30.0) && p.metric_or_zero("Gls_per90") >= 0.05)
            .collect();
        assert_eq!(filter_players(&players, &params), expected);
        assert_eq!(names(&expected), vec!["B", "D"]);
    }

    #[test]
    fn missing_age_never_fails_age_predicate() {
        let players = sample();
        let mut params = FilterParams::new("Gls_per90");
        params.max_age = 18.0;
        assert_eq!(names(&filter_players(&players, &params)), vec!["C"]);
    }

    #[test]
    fn age_bound_is_inclusive() {
        let players = sample();
        let mut params = FilterParams::new("Gls_per90");
        params.max_age = 22.0;
        assert_eq!(names(&filter_players(&players, &params)), vec!["B", "C", "D"]);
    }

    #[test]
    fn missing_threshold_metric_counts_as_zero() {
        let players = sample();
        let mut params = FilterParams::new("Gls_per90");
        params.min_value = 0.0;
        assert!(names(&filter_players(&players, &params)).contains(&"C".to_string()));
        params.min_value = 0.01;
        assert!(!names(&filter_players(&players, &params)).contains(&"C".to_string()));
    }

    #[test]
    fn position_and_league_selections_combine() {
        let players = sample();
        let mut params = FilterParams::new("Gls_per90");
        params.positions = vec!["FW".to_string(), "MF".to_string()];
        params.leagues = vec!["La Liga".to_string()];
        assert_eq!(names(&filter_players(&players, &params)), vec!["B", "C"]);

        params.leagues.push("All".to_string());
        assert_eq!(names(&filter_players(&players, &params)), vec!["A", "B", "C"]);
    }
}
