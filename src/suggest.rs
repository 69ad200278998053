use rand::Rng;
use rand::seq::SliceRandom;

use crate::state::PlayerRecord;

pub const MIN_QUERY_CHARS: usize = 2;
pub const SUGGESTION_LIMIT: usize = 10;

/// What the autocomplete dropdown shows.
#[derive(Debug, Clone, PartialEq)]
pub enum Suggestions<'a> {
    /// Name matches for a query of at least [`MIN_QUERY_CHARS`].
    Matches(Vec<&'a PlayerRecord>),
    /// Random notable players for an empty or short query.
    Notable(Vec<&'a PlayerRecord>),
}

impl<'a> Suggestions<'a> {
    pub fn players(&self) -> &[&'a PlayerRecord] {
        match self {
            Suggestions::Matches(p) | Suggestions::Notable(p) => p,
        }
    }
}

fn normalize(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Case-insensitive substring search, first [`SUGGESTION_LIMIT`] hits in
/// dataset order. Short queries return `None` (dropdown hidden).
pub fn search_players<'a>(
    players: &'a [PlayerRecord],
    query: &str,
) -> Option<Vec<&'a PlayerRecord>> {
    let query = normalize(query);
    if query.chars().count() < MIN_QUERY_CHARS {
        return None;
    }
    Some(
        players
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&query))
            .take(SUGGESTION_LIMIT)
            .collect(),
    )
}

/// A player productive enough to be offered before the user types.
pub fn is_notable(player: &PlayerRecord) -> bool {
    player.metric("Gls_per90").is_some_and(|v| v > 0.2)
        || player.metric("Ast_per90").is_some_and(|v| v > 0.15)
        || player.metric("PrgC_per90").is_some_and(|v| v > 3.0)
}

pub fn notable_players<'a, R: Rng + ?Sized>(
    players: &'a [PlayerRecord],
    rng: &mut R,
) -> Vec<&'a PlayerRecord> {
    let mut notable: Vec<&PlayerRecord> = players.iter().filter(|p| is_notable(p)).collect();
    notable.shuffle(rng);
    notable.truncate(SUGGESTION_LIMIT);
    notable
}

/// Autocomplete for the similar-players search box.
pub fn suggest_players<'a, R: Rng + ?Sized>(
    players: &'a [PlayerRecord],
    query: &str,
    rng: &mut R,
) -> Suggestions<'a> {
    match search_players(players, query) {
        Some(matches) => Suggestions::Matches(matches),
        None => Suggestions::Notable(notable_players(players, rng)),
    }
}
