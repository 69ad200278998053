use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use scout_dash::charts::{ChartSize, scatter_spec};
use scout_dash::dataset::parse_players_json;
use scout_dash::filters::{FilterParams, filter_players};
use scout_dash::rankings::top_n;
use scout_dash::similarity::{SIMILARITY_METRICS, rank_similar};
use scout_dash::state::PlayerRecord;

const POSITIONS: &[&str] = &["GK", "DF", "MF", "FW"];
const LEAGUES: &[&str] = &["Premier League", "La Liga", "Serie A", "Bundesliga", "Ligue 1"];

fn synthetic_players(n: usize) -> Vec<PlayerRecord> {
    (0..n)
        .map(|i| {
            let f = i as f64;
            let mut p = PlayerRecord::new(format!("Player {i}"))
                .with_team(format!("Team {}", i % 96))
                .with_league(LEAGUES[i % LEAGUES.len()])
                .with_position(POSITIONS[i % POSITIONS.len()])
                .with_age(17.0 + (i % 20) as f64);
            for (k, metric) in SIMILARITY_METRICS.iter().enumerate() {
                let value = ((f * 0.37 + k as f64 * 1.3).sin().abs()) * (k as f64 + 1.0);
                p = p.with_metric(*metric, value);
            }
            p
        })
        .collect()
}

fn bench_dataset_parse(c: &mut Criterion) {
    c.bench_function("players_json_parse", |b| {
        b.iter(|| {
            let players = parse_players_json(black_box(PLAYERS_JSON)).unwrap();
            black_box(players.len());
        })
    });
}

fn bench_filter_and_rank(c: &mut Criterion) {
    let players = synthetic_players(2_500);
    let mut params = FilterParams::new("Gls_per90");
    params.positions = vec!["FW".to_string(), "MF".to_string()];
    params.leagues = vec!["Premier League".to_string(), "La Liga".to_string()];
    params.max_age = 27.0;
    params.min_value = 0.1;

    c.bench_function("filter_players", |b| {
        b.iter(|| {
            let filtered = filter_players(black_box(&players), black_box(&params));
            black_box(filtered.len());
        })
    });

    let filtered = filter_players(&players, &params);
    c.bench_function("top_n_ranking", |b| {
        b.iter(|| {
            let ranked = top_n(black_box(&filtered), "xG_per90", 20).unwrap();
            black_box(ranked.len());
        })
    });

    c.bench_function("scatter_spec", |b| {
        b.iter(|| {
            let size = ChartSize::default();
            let spec = scatter_spec(&filtered, "xG_per90", "Gls_per90", "Position", size);
            black_box(spec.data.values.len());
        })
    });
}

fn bench_similarity(c: &mut Criterion) {
    let players = synthetic_players(2_500);
    let target = players[7].clone();
    c.bench_function("rank_similar_all_positions", |b| {
        b.iter(|| {
            let similar = rank_similar(black_box(&players), &target, SIMILARITY_METRICS, false);
            black_box(similar.len());
        })
    });
}

criterion_group!(perf, bench_dataset_parse, bench_filter_and_rank, bench_similarity);
criterion_main!(perf);

static PLAYERS_JSON: &str = include_str!("../tests/fixtures/players_sample.json");
