use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;

use scout_dash::cards::{
    player_card_html, results_count, similar_cards_html, similarity_description,
    suggestion_list_html,
};
use scout_dash::charts::{
    ChartSize, ChartSpec, ranking_spec, scatter_spec, similar_players_spec,
};
use scout_dash::compare::{COMPARISON_METRICS, compare_players};
use scout_dash::config::Config;
use scout_dash::dataset::{DataSource, load_store};
use scout_dash::export::export_players_xlsx;
use scout_dash::filters::{DEFAULT_MAX_AGE, FilterParams, filter_players};
use scout_dash::page::{Panel, render_page};
use scout_dash::rankings::top_n;
use scout_dash::similarity::{SIMILARITY_METRICS, find_similar};
use scout_dash::state::{FIELD_POSITION, ScoutStore};
use scout_dash::suggest::{Suggestions, suggest_players};

#[derive(Parser)]
#[command(name = "scout")]
#[command(
    about = "Football scouting dashboard: filter, rank and compare players",
    long_about = None
)]
struct Cli {
    /// Player dataset (path or http(s) URL); overrides SCOUT_PLAYERS
    #[arg(long, global = true)]
    players: Option<String>,

    /// Metadata resource, or "none"; overrides SCOUT_METADATA
    #[arg(long, global = true)]
    metadata: Option<String>,

    /// Seed for the suggestion shuffle; overrides SCOUT_SEED
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Where to write the generated HTML page
    #[arg(long, global = true, default_value = "scout.html")]
    out: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct FilterArgs {
    /// Position to keep (repeatable; none means all)
    #[arg(long = "position")]
    positions: Vec<String>,
    /// League to keep (repeatable; "all" means every league)
    #[arg(long = "league")]
    leagues: Vec<String>,
    /// Maximum age, inclusive
    #[arg(long, default_value_t = DEFAULT_MAX_AGE)]
    max_age: f64,
    /// Minimum value of the threshold metric
    #[arg(long, default_value_t = 0.0)]
    min_value: f64,
}

impl FilterArgs {
    fn params(&self, threshold_metric: &str) -> FilterParams {
        FilterParams {
            positions: self.positions.clone(),
            leagues: self.leagues.clone(),
            max_age: self.max_age,
            threshold_metric: threshold_metric.to_string(),
            min_value: self.min_value,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Scatter explorer of two metrics over the filtered players
    Explore {
        /// X-axis metric (also the threshold metric)
        #[arg(long, default_value = "xG_per90")]
        x: String,
        /// Y-axis metric
        #[arg(long, default_value = "Gls_per90")]
        y: String,
        /// Field used for point colour
        #[arg(long, default_value = FIELD_POSITION)]
        color_by: String,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Top-N ranking by one metric
    Rank {
        #[arg(long, default_value = "Gls_per90")]
        metric: String,
        /// How many players to show
        #[arg(long, default_value_t = 10)]
        top: usize,
        /// Also write the ranked table to this .xlsx file
        #[arg(long)]
        xlsx: Option<PathBuf>,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Compare two players side by side
    Compare { first: String, second: String },
    /// Players with the closest statistical profile
    Similar {
        name: String,
        /// Only consider players in the target's position
        #[arg(long)]
        same_position: bool,
    },
    /// Autocomplete suggestions for a (possibly empty) query
    Suggest {
        #[arg(default_value = "")]
        query: String,
        /// Print the dropdown HTML instead of plain names
        #[arg(long)]
        html: bool,
    },
    /// Export the filtered players to an .xlsx workbook
    Export {
        /// Output workbook
        #[arg(long, default_value = "players.xlsx")]
        xlsx: PathBuf,
        /// Metric columns (repeatable); threshold uses the first one
        #[arg(
            long = "metric",
            default_values_t = COMPARISON_METRICS.iter().map(|m| m.to_string()).collect::<Vec<_>>()
        )]
        metrics: Vec<String>,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Print dataset and metadata summary
    Summary,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let config = resolve_config(&cli);
    let size = ChartSize {
        width: config.chart_width,
        height: config.chart_height,
    };

    let store = load_or_report(&config, &cli.command, &cli.out)?;

    match cli.command {
        Commands::Explore {
            ref x,
            ref y,
            ref color_by,
            ref filters,
        } => {
            let filtered = filter_players(&store.players, &filters.params(x));
            let panels = vec![
                Panel::html("results-count", results_count(filtered.len())),
                Panel::chart("analysis-chart", scatter_spec(&filtered, x, y, color_by, size)),
            ];
            write_page(&cli.out, "Player Analysis", &panels)?;
        }
        Commands::Rank {
            ref metric,
            top,
            ref xlsx,
            ref filters,
        } => {
            let filtered = filter_players(&store.players, &filters.params(metric));
            let ranked = top_n(&filtered, metric, top)?;
            let position = match filters.positions.as_slice() {
                [only] => Some(only.as_str()),
                _ => None,
            };
            let panels = vec![Panel::chart(
                "ranking-chart",
                ranking_spec(&ranked, metric, position, size),
            )];
            write_page(&cli.out, "Top Players", &panels)?;
            if let Some(path) = xlsx {
                export_players_xlsx(
                    path,
                    &ranked,
                    &[metric.as_str()],
                    &summary_rows(&store, metric),
                )?;
            }
        }
        Commands::Compare {
            ref first,
            ref second,
        } => {
            let comparison = compare_players(&store, first, second)?;
            let cards = format!(
                "<div class=\"player-grid\">{}{}</div>",
                player_card_html(comparison.first),
                player_card_html(comparison.second)
            );
            let panels = vec![
                Panel::html("player-cards", cards),
                Panel::chart("comparison-chart", comparison.chart(size)),
                Panel::chart("percentile-chart", comparison.percentile_chart(size)),
            ];
            write_page(&cli.out, "Player Comparison", &panels)?;
        }
        Commands::Similar {
            ref name,
            same_position,
        } => {
            let (target, similar) = find_similar(&store, name, SIMILARITY_METRICS, same_position)?;
            let panels = vec![
                Panel::html(
                    "similarity-description",
                    similarity_description(target, similar.len()),
                ),
                Panel::chart("similar-chart", similar_players_spec(&similar, size)),
                Panel::html("similar-cards", similar_cards_html(&similar)),
            ];
            write_page(&cli.out, "Similar Players", &panels)?;
        }
        Commands::Suggest { ref query, html } => {
            let mut rng = match config.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let suggestions = suggest_players(&store.players, query, &mut rng);
            if html {
                if let Some(body) = suggestion_list_html(&suggestions) {
                    println!("{body}");
                }
            } else {
                print_suggestions(&suggestions);
            }
        }
        Commands::Export {
            ref xlsx,
            ref metrics,
            ref filters,
        } => {
            let threshold = metrics.first().map(String::as_str).unwrap_or("Gls_per90");
            let filtered = filter_players(&store.players, &filters.params(threshold));
            let columns: Vec<&str> = metrics.iter().map(String::as_str).collect();
            let summary = summary_rows(&store, threshold);
            let report = export_players_xlsx(xlsx, &filtered, &columns, &summary)?;
            println!(
                "Wrote {} players x {} columns to {}",
                report.players,
                report.columns,
                xlsx.display()
            );
        }
        Commands::Summary => print_summary(&store),
    }
    Ok(())
}

impl Commands {
    fn renders_page(&self) -> bool {
        !matches!(
            self,
            Commands::Suggest { .. } | Commands::Export { .. } | Commands::Summary
        )
    }

    fn panel_id(&self) -> &'static str {
        match self {
            Commands::Explore { .. } => "analysis-chart",
            Commands::Rank { .. } => "ranking-chart",
            Commands::Compare { .. } => "comparison-chart",
            Commands::Similar { .. } => "similar-chart",
            _ => "content",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Commands::Explore { .. } => "Player Analysis",
            Commands::Rank { .. } => "Top Players",
            Commands::Compare { .. } => "Player Comparison",
            Commands::Similar { .. } => "Similar Players",
            _ => "Scout",
        }
    }
}

/// A failed dataset load still produces the command's page, holding only the
/// inline error panel, before the error is returned.
fn load_or_report(config: &Config, command: &Commands, out: &Path) -> Result<ScoutStore> {
    match load_store(config) {
        Ok(store) => Ok(store),
        Err(err) => {
            log::error!("Error loading data: {err:#}");
            if command.renders_page() {
                let panel = Panel::error(command.panel_id(), "Error loading data");
                write_page(out, command.title(), &[panel])?;
            }
            Err(err)
        }
    }
}

fn resolve_config(cli: &Cli) -> Config {
    let mut config = Config::from_env();
    if let Some(raw) = cli.players.as_deref() {
        config.players = DataSource::parse(raw);
    }
    match cli.metadata.as_deref() {
        Some(raw) if raw.eq_ignore_ascii_case("none") => config.metadata = None,
        Some(raw) => config.metadata = Some(DataSource::parse(raw)),
        None => {}
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    config
}

/// `.json` targets get the bare chart specs; anything else the HTML page.
fn write_page(path: &Path, title: &str, panels: &[Panel]) -> Result<()> {
    let body = if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
        let specs: Vec<&ChartSpec> = panels
            .iter()
            .filter_map(|panel| match panel {
                Panel::Chart { spec, .. } => Some(spec.as_ref()),
                _ => None,
            })
            .collect();
        serde_json::to_string_pretty(&specs).context("serialize chart specs")?
    } else {
        render_page(title, panels)?
    };
    fs::write(path, body).with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn summary_rows(store: &ScoutStore, metric: &str) -> Vec<(&'static str, String)> {
    vec![
        ("Metric", metric.to_string()),
        ("Dataset players", store.len().to_string()),
        ("Generated", chrono::Utc::now().to_rfc3339()),
    ]
}

fn print_suggestions(suggestions: &Suggestions<'_>) {
    if let Suggestions::Matches(players) = suggestions
        && players.is_empty()
    {
        println!("No players found");
        return;
    }
    for p in suggestions.players() {
        println!(
            "{}\t{}\t{}\t{}",
            p.name,
            p.team.as_deref().unwrap_or("N/A"),
            p.league.as_deref().unwrap_or("N/A"),
            p.position.as_deref().unwrap_or("N/A"),
        );
    }
}

fn print_summary(store: &ScoutStore) {
    let meta = &store.metadata;
    println!("Players: {} (metadata reports {})", store.len(), meta.total_players);
    println!("Leagues: {}", meta.leagues.join(", "));
    println!("Positions: {}", meta.positions.join(", "));
    println!("Teams: {}", meta.teams.len());
    if let Some(stamp) = meta.generated_at.as_deref() {
        println!("Generated at: {stamp}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_dataset_config(dir: &Path) -> Config {
        let players = dir.join("missing_players.json").display().to_string();
        Config::from_lookup(|key| match key {
            "SCOUT_PLAYERS" => Some(players.clone()),
            "SCOUT_METADATA" => Some("none".to_string()),
            _ => None,
        })
    }

    #[test]
    fn load_failure_writes_error_page_and_fails() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("similar.html");
        let command = Commands::Similar {
            name: "A".to_string(),
            same_position: true,
        };
        let config = missing_dataset_config(dir.path());
        let err = load_or_report(&config, &command, &out).unwrap_err();
        assert!(format!("{err:#}").contains("missing_players.json"));

        let page = fs::read_to_string(&out).unwrap();
        assert!(page.contains(
            "<div id=\"similar-chart\"><p style=\"color: red;\">Error loading data</p></div>"
        ));
        assert!(page.contains("<title>Similar Players</title>"));
        assert!(!page.contains("vegaEmbed("));
    }

    #[test]
    fn load_failure_without_page_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("summary.html");
        let config = missing_dataset_config(dir.path());
        assert!(load_or_report(&config, &Commands::Summary, &out).is_err());
        assert!(!out.exists());
    }

    #[test]
    fn loaded_store_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let players = dir.path().join("players.json");
        fs::write(&players, r#"[{"name": "A", "Position": "FW"}]"#).unwrap();
        let players = players.display().to_string();
        let config = Config::from_lookup(|key| match key {
            "SCOUT_PLAYERS" => Some(players.clone()),
            "SCOUT_METADATA" => Some("none".to_string()),
            _ => None,
        });
        let out = dir.path().join("page.html");
        let store = load_or_report(&config, &Commands::Summary, &out).unwrap();
        assert_eq!(store.len(), 1);
        assert!(!out.exists());
    }
}
