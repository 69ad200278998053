use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::charts::format_metric_name;
use crate::state::PlayerRecord;

pub struct ExportReport {
    pub players: usize,
    pub columns: usize,
}

enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

fn text(value: Option<&str>) -> Cell {
    value.map_or(Cell::Empty, |v| Cell::Text(v.to_string()))
}

fn number(value: Option<f64>) -> Cell {
    value.map_or(Cell::Empty, Cell::Number)
}

/// Write the player table (identity columns followed by `metrics`) to an
/// `.xlsx` workbook. Summary lines go to a second sheet.
pub fn export_players_xlsx(
    path: &Path,
    players: &[&PlayerRecord],
    metrics: &[&str],
    summary: &[(&str, String)],
) -> Result<ExportReport> {
    let mut header = vec![
        "Player".to_string(),
        "Team".to_string(),
        "League".to_string(),
        "Position".to_string(),
        "Age".to_string(),
    ];
    header.extend(metrics.iter().map(|m| format_metric_name(m)));

    let mut rows: Vec<Vec<Cell>> = Vec::with_capacity(players.len() + 1);
    rows.push(header.into_iter().map(Cell::Text).collect());
    for p in players {
        let mut row = vec![
            Cell::Text(p.name.clone()),
            text(p.team.as_deref()),
            text(p.league.as_deref()),
            text(p.position.as_deref()),
            number(p.age),
        ];
        row.extend(metrics.iter().map(|m| number(p.metric(m))));
        rows.push(row);
    }

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Players")?;
        write_rows(sheet, &rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;
        let summary_rows: Vec<Vec<Cell>> = summary
            .iter()
            .map(|(k, v)| vec![Cell::Text(k.to_string()), Cell::Text(v.clone())])
            .collect();
        write_rows(sheet, &summary_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    log::info!("Exported {} players to {}", players.len(), path.display());
    Ok(ExportReport {
        players: players.len(),
        columns: 5 + metrics.len(),
    })
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<Cell>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            let (r, c) = (row_idx as u32, col_idx as u16);
            let written = match cell {
                Cell::Text(value) => worksheet.write_string(r, c, value),
                Cell::Number(value) => worksheet.write_number(r, c, *value),
                Cell::Empty => continue,
            };
            written.with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
