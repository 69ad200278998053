use std::fmt::Write as _;

use crate::similarity::SimilarPlayer;
use crate::state::PlayerRecord;
use crate::suggest::Suggestions;

/// How many of the similar players get a detail card.
pub const SIMILAR_CARD_LIMIT: usize = 6;

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn fmt_stat(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "N/A".to_string())
}

fn fmt_age(age: Option<f64>) -> String {
    match age {
        Some(a) if a.fract() == 0.0 => format!("{a:.0}"),
        Some(a) => format!("{a}"),
        None => "N/A".to_string(),
    }
}

fn text_or_na(value: Option<&str>) -> String {
    escape_html(value.unwrap_or("N/A"))
}

fn stat_html(out: &mut String, value: &str, label: &str) {
    let _ = write!(
        out,
        "<div class=\"stat\"><div class=\"stat-value\">{value}</div><div class=\"stat-label\">{label}</div></div>"
    );
}

fn card_header(out: &mut String, player: &PlayerRecord) {
    let _ = write!(
        out,
        "<h3>{}</h3><div class=\"team\">{} | {}</div>",
        escape_html(&player.name),
        text_or_na(player.team.as_deref()),
        text_or_na(player.league.as_deref()),
    );
}

/// Summary card for the comparison page.
pub fn player_card_html(player: &PlayerRecord) -> String {
    let mut out = String::new();
    card_header(&mut out, player);
    out.push_str("<div class=\"stats\">");
    stat_html(&mut out, &text_or_na(player.position.as_deref()), "Position");
    stat_html(&mut out, &fmt_age(player.age), "Age");
    stat_html(&mut out, &fmt_stat(player.metric("Gls_per90")), "Goals/90");
    stat_html(&mut out, &fmt_stat(player.metric("Ast_per90")), "Assists/90");
    stat_html(&mut out, &fmt_stat(player.metric("xG_per90")), "xG/90");
    stat_html(&mut out, &fmt_stat(player.metric("PrgC_per90")), "Prog. Carries/90");
    out.push_str("</div>");
    out
}

pub fn similar_card_html(similar: &SimilarPlayer<'_>) -> String {
    let player = similar.player;
    let mut out = String::from("<div class=\"player-card\">");
    card_header(&mut out, player);
    out.push_str("<div class=\"stats\">");
    stat_html(&mut out, &text_or_na(player.position.as_deref()), "Position");
    stat_html(&mut out, &fmt_age(player.age), "Age");
    stat_html(&mut out, &format!("{:.1}%", similar.similarity * 100.0), "Similarity");
    stat_html(&mut out, &fmt_stat(player.metric("Gls_per90")), "Goals/90");
    out.push_str("</div></div>");
    out
}

pub fn similar_cards_html(similar: &[SimilarPlayer<'_>]) -> String {
    let mut out = String::from("<h2>Player Details</h2><div class=\"player-grid\">");
    for s in similar.iter().take(SIMILAR_CARD_LIMIT) {
        out.push_str(&similar_card_html(s));
    }
    out.push_str("</div>");
    out
}

pub fn similarity_description(target: &PlayerRecord, shown: usize) -> String {
    format!(
        "Showing top {shown} players most similar to {} ({}) based on statistical profile",
        escape_html(&target.name),
        escape_html(target.position_or_unknown())
    )
}

pub fn results_count(n: usize) -> String {
    format!("Showing {n} players")
}

/// Inline failure message rendered in place of a chart.
pub fn error_html(message: &str) -> String {
    format!("<p style=\"color: red;\">{}</p>", escape_html(message))
}

fn suggestion_item(out: &mut String, player: &PlayerRecord) {
    let name = escape_html(&player.name);
    let _ = write!(
        out,
        "<div class=\"autocomplete-item\" data-player=\"{name}\"><div class=\"player-name\">{name}</div><div class=\"player-info\">{} • {} • {}</div></div>",
        text_or_na(player.team.as_deref()),
        text_or_na(player.league.as_deref()),
        text_or_na(player.position.as_deref()),
    );
}

/// Dropdown body for the autocomplete box. `None` means the dropdown stays hidden.
pub fn suggestion_list_html(suggestions: &Suggestions<'_>) -> Option<String> {
    let mut out = String::new();
    match suggestions {
        Suggestions::Matches(players) if players.is_empty() => {
            out.push_str(
                "<div class=\"autocomplete-item\" style=\"color: #6b7280;\">No players found</div>",
            );
        }
        Suggestions::Matches(players) => {
            for p in players {
                suggestion_item(&mut out, p);
            }
        }
        Suggestions::Notable(players) if players.is_empty() => return None,
        Suggestions::Notable(players) => {
            out.push_str("<div class=\"suggestion-header\">Suggested players (click to select):</div>");
            for p in players {
                suggestion_item(&mut out, p);
            }
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html("<b>\"O'Neil\" & co</b>"),
            "&lt;b&gt;&quot;O&#39;Neil&quot; &amp; co&lt;/b&gt;"
        );
    }

    #[test]
    fn player_card_formats_missing_stats() {
        let p = PlayerRecord::new("A")
            .with_team("Arsenal")
            .with_position("FW")
            .with_age(23.0)
            .with_metric("Gls_per90", 0.456);
        let html = player_card_html(&p);
        assert!(html.contains("<h3>A</h3>"));
        assert!(html.contains("Arsenal | N/A"));
        assert!(html.contains(">23<"));
        assert!(html.contains(">0.46<"));
        assert!(html.contains(">N/A</div><div class=\"stat-label\">Assists/90"));
    }

    #[test]
    fn similar_cards_cap_at_six() {
        let players: Vec<PlayerRecord> =
            (0..8).map(|i| PlayerRecord::new(format!("P{i}"))).collect();
        let similar: Vec<SimilarPlayer<'_>> = players
            .iter()
            .map(|player| SimilarPlayer {
                player,
                similarity: 0.5,
            })
            .collect();
        let html = similar_cards_html(&similar);
        assert_eq!(html.matches("class=\"player-card\"").count(), SIMILAR_CARD_LIMIT);
        assert!(html.contains(">50.0%<"));
    }

    #[test]
    fn empty_match_list_says_so() {
        let html = suggestion_list_html(&Suggestions::Matches(Vec::new())).unwrap();
        assert!(html.contains("No players found"));
        assert_eq!(suggestion_list_html(&Suggestions::Notable(Vec::new())), None);
    }

    #[test]
    fn similarity_description_escapes_target() {
        let target = PlayerRecord::new("<img src=x onerror=alert(1)>").with_position("F<W>");
        let text = similarity_description(&target, 3);
        assert!(!text.contains("<img"));
        assert!(!text.contains("<W>"));
        assert!(text.contains("&lt;img src=x onerror=alert(1)&gt; (F&lt;W&gt;)"));
        assert!(text.starts_with("Showing top 3 players most similar to "));
    }

    #[test]
    fn error_panel_is_red_paragraph() {
        assert_eq!(
            error_html("Error loading data"),
            "<p style=\"color: red;\">Error loading data</p>"
        );
    }
}
