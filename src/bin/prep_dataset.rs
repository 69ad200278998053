use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;

use scout_dash::prep;

#[derive(Parser)]
#[command(name = "prep_dataset")]
#[command(
    about = "Build players.json and metadata.json from a raw FBref stats CSV",
    long_about = None
)]
struct Args {
    /// Raw per-season player stats CSV
    #[arg(long = "in")]
    input: PathBuf,

    /// Directory receiving players.json and metadata.json
    #[arg(long, default_value = "static/data")]
    out_dir: PathBuf,

    /// Players under this many minutes are dropped
    #[arg(long, default_value_t = prep::DEFAULT_MIN_MINUTES)]
    min_minutes: f64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let output = prep::prepare_csv_path(&args.input, args.min_minutes)?;
    if output.players.is_empty() {
        return Err(anyhow!(
            "no players left after filtering {} rows (min minutes {})",
            output.rows_read,
            args.min_minutes
        ));
    }
    let (players_path, metadata_path) = prep::write_dataset(&args.out_dir, &output.players)?;

    println!("Dataset preparation complete");
    println!("Input: {}", args.input.display());
    println!("Rows read: {}", output.rows_read);
    println!(
        "Players kept: {} (dropped {} under {} minutes)",
        output.players.len(),
        output.dropped_low_minutes,
        args.min_minutes
    );
    println!("Players: {}", players_path.display());
    println!("Metadata: {}", metadata_path.display());
    if !output.errors.is_empty() {
        println!("Row errors: {}", output.errors.len());
        for err in output.errors.iter().take(6) {
            println!("   - {err}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_with_defaults() {
        let args = Args::try_parse_from(["prep_dataset", "--in", "raw.csv"]).unwrap();
        assert_eq!(args.input, PathBuf::from("raw.csv"));
        assert_eq!(args.out_dir, PathBuf::from("static/data"));
        assert_eq!(args.min_minutes, prep::DEFAULT_MIN_MINUTES);

        let args = Args::try_parse_from([
            "prep_dataset",
            "--in=raw.csv",
            "--out-dir=out",
            "--min-minutes=900",
        ])
        .unwrap();
        assert_eq!(args.out_dir, PathBuf::from("out"));
        assert_eq!(args.min_minutes, 900.0);
    }

    #[test]
    fn input_is_required() {
        assert!(Args::try_parse_from(["prep_dataset"]).is_err());
    }
}
