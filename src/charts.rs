use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::state::{
    FIELD_AGE, FIELD_LEAGUE, FIELD_NAME, FIELD_POSITION, FIELD_SIMILARITY, FIELD_TEAM,
    PlayerRecord,
};
use crate::rankings::Percentile;
use crate::similarity::SimilarPlayer;

pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

const POSITION_DOMAIN: [&str; 4] = ["GK", "DF", "MF", "FW"];
const POSITION_RANGE: [&str; 4] = ["#FDB913", "#00A650", "#0072CE", "#EF3340"];

// ---------------------------------------------------------------------------
// Vega-Lite spec model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    #[serde(rename = "$schema")]
    pub schema: &'static str,
    pub width: u32,
    pub height: u32,
    pub data: ChartData,
    pub mark: Mark,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Value>,
    pub encoding: Encoding,
    pub title: Title,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub values: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Mark {
    Simple(&'static str),
    Styled {
        #[serde(rename = "type")]
        kind: &'static str,
        size: u32,
        opacity: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Quantitative,
    Nominal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scale {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zero: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldEncoding {
    pub field: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Scale>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis: Option<Value>,
}

impl FieldEncoding {
    fn new(field: impl Into<String>, kind: FieldType) -> Self {
        Self {
            field: field.into(),
            kind,
            title: None,
            scale: None,
            sort: None,
            axis: None,
        }
    }

    fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    fn scale(mut self, scale: Scale) -> Self {
        self.scale = Some(scale);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipField {
    pub field: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<&'static str>,
}

impl TooltipField {
    fn new(field: impl Into<String>, kind: FieldType, title: Option<&str>) -> Self {
        Self {
            field: field.into(),
            kind,
            title: title.map(str::to_string),
            format: None,
        }
    }

    fn format(mut self, format: &'static str) -> Self {
        self.format = Some(format);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Encoding {
    pub x: FieldEncoding,
    pub y: FieldEncoding,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<FieldEncoding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_offset: Option<Value>,
    pub tooltip: Vec<TooltipField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Title {
    pub text: String,
    pub font_size: u32,
}

impl Title {
    fn new(text: impl Into<String>, font_size: u32) -> Self {
        Self {
            text: text.into(),
            font_size,
        }
    }
}

/// Options passed as the third argument to `vegaEmbed`.
pub fn embed_options() -> Value {
    json!({
        "actions": {
            "export": true,
            "source": false,
            "compiled": false,
            "editor": false
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartSize {
    fn default() -> Self {
        Self {
            width: 700,
            height: 500,
        }
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// `xG_per90` → `XG Per 90`: separators become spaces, `per90` becomes
/// `per 90`, and each word gets an uppercase first letter.
pub fn format_metric_name(metric: &str) -> String {
    let spaced = metric.replace('_', " ").replace("per90", "per 90");
    let mut out = String::with_capacity(spaced.len());
    let mut at_word_start = true;
    for ch in spaced.chars() {
        let is_word = ch.is_ascii_alphanumeric() || ch == '_';
        if is_word && at_word_start {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = !is_word;
    }
    out
}

/// Short label used on the comparison chart axis: `Gls_per90` → `Gls /90`.
pub fn comparison_metric_label(metric: &str) -> String {
    metric.replace('_', " ").replacen("per90", "/90", 1)
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

fn player_tooltip() -> Vec<TooltipField> {
    vec![
        TooltipField::new(FIELD_NAME, FieldType::Nominal, Some("Player")),
        TooltipField::new(FIELD_TEAM, FieldType::Nominal, Some("Team")),
        TooltipField::new(FIELD_LEAGUE, FieldType::Nominal, Some("League")),
    ]
}

fn rows<'a>(players: impl IntoIterator<Item = &'a PlayerRecord>) -> Vec<Map<String, Value>> {
    players.into_iter().map(PlayerRecord::to_row).collect()
}

fn color_encoding(color_by: &str) -> FieldEncoding {
    let scale = if color_by == FIELD_POSITION {
        Scale {
            domain: Some(POSITION_DOMAIN.iter().map(|s| Value::from(*s)).collect()),
            range: Some(POSITION_RANGE.iter().map(|s| Value::from(*s)).collect()),
            ..Scale::default()
        }
    } else {
        Scale {
            scheme: Some("tableau10"),
            ..Scale::default()
        }
    };
    FieldEncoding::new(color_by, FieldType::Nominal)
        .title(color_by)
        .scale(scale)
}

/// Scatter explorer: one point per player, hover highlights the point.
pub fn scatter_spec(
    players: &[&PlayerRecord],
    x_metric: &str,
    y_metric: &str,
    color_by: &str,
    size: ChartSize,
) -> ChartSpec {
    let x_title = format_metric_name(x_metric);
    let y_title = format_metric_name(y_metric);
    let no_zero = Scale {
        zero: Some(false),
        ..Scale::default()
    };

    let mut tooltip = player_tooltip();
    tooltip.push(TooltipField::new(FIELD_POSITION, FieldType::Nominal, Some("Position")));
    tooltip.push(TooltipField::new(FIELD_AGE, FieldType::Quantitative, Some("Age")));
    tooltip.push(
        TooltipField::new(x_metric, FieldType::Quantitative, Some(x_title.as_str())).format(".2f"),
    );
    tooltip.push(
        TooltipField::new(y_metric, FieldType::Quantitative, Some(y_title.as_str())).format(".2f"),
    );

    ChartSpec {
        schema: VEGA_LITE_SCHEMA,
        width: size.width,
        height: size.height,
        data: ChartData {
            values: rows(players.iter().copied()),
        },
        mark: Mark::Styled {
            kind: "circle",
            size: 100,
            opacity: 0.7,
        },
        params: vec![json!({
            "name": "hover",
            "select": {"type": "point", "on": "mouseover", "clear": "mouseout"}
        })],
        encoding: Encoding {
            x: FieldEncoding::new(x_metric, FieldType::Quantitative)
                .title(x_title.clone())
                .scale(no_zero.clone()),
            y: FieldEncoding::new(y_metric, FieldType::Quantitative)
                .title(y_title.clone())
                .scale(no_zero),
            color: Some(color_encoding(color_by)),
            opacity: Some(json!({
                "condition": {"param": "hover", "empty": false, "value": 1},
                "value": 0.7
            })),
            x_offset: None,
            tooltip,
        },
        title: Title::new(format!("{y_title} vs {x_title}"), 16),
        config: Some(json!({"view": {"strokeWidth": 0}})),
    }
}

/// Horizontal bar ranking of already-ranked players.
pub fn ranking_spec(
    ranked: &[&PlayerRecord],
    metric: &str,
    position: Option<&str>,
    size: ChartSize,
) -> ChartSpec {
    let label = format_metric_name(metric);
    let text = match position {
        Some(pos) => format!("Top {} {pos}s by {label}", ranked.len()),
        None => format!("Top {} Players by {label}", ranked.len()),
    };
    let mut tooltip = player_tooltip();
    tooltip.push(TooltipField::new(FIELD_POSITION, FieldType::Nominal, Some("Position")));
    tooltip.push(
        TooltipField::new(metric, FieldType::Quantitative, Some(label.as_str())).format(".2f"),
    );

    let mut y = FieldEncoding::new(FIELD_NAME, FieldType::Nominal).title("Player");
    y.sort = Some("-x");

    ChartSpec {
        schema: VEGA_LITE_SCHEMA,
        width: size.width,
        height: size.height,
        data: ChartData {
            values: rows(ranked.iter().copied()),
        },
        mark: Mark::Simple("bar"),
        params: Vec::new(),
        encoding: Encoding {
            x: FieldEncoding::new(metric, FieldType::Quantitative).title(label),
            y,
            color: Some(
                FieldEncoding::new(FIELD_LEAGUE, FieldType::Nominal)
                    .title("League")
                    .scale(Scale {
                        scheme: Some("tableau10"),
                        ..Scale::default()
                    }),
            ),
            opacity: None,
            x_offset: None,
            tooltip,
        },
        title: Title::new(text, 14),
        config: None,
    }
}

/// Grouped bars of the metrics both players carry. A present-but-null value
/// is drawn as 0.
pub fn comparison_spec(
    first: &PlayerRecord,
    second: &PlayerRecord,
    metrics: &[&str],
    size: ChartSize,
) -> ChartSpec {
    let mut values = Vec::new();
    for metric in metrics {
        if !(first.metrics.contains_key(*metric) && second.metrics.contains_key(*metric)) {
            continue;
        }
        let label = comparison_metric_label(metric);
        for player in [first, second] {
            let mut row = Map::new();
            row.insert("Metric".to_string(), Value::from(label.clone()));
            row.insert("Player".to_string(), Value::from(player.name.clone()));
            row.insert("Value".to_string(), Value::from(player.metric_or_zero(metric)));
            values.push(row);
        }
    }

    let mut x = FieldEncoding::new("Metric", FieldType::Nominal);
    x.axis = Some(json!({"labelAngle": -45}));

    ChartSpec {
        schema: VEGA_LITE_SCHEMA,
        width: size.width,
        height: size.height,
        data: ChartData { values },
        mark: Mark::Simple("bar"),
        params: Vec::new(),
        encoding: Encoding {
            x,
            y: FieldEncoding::new("Value", FieldType::Quantitative),
            color: Some(FieldEncoding::new("Player", FieldType::Nominal).scale(Scale {
                scheme: Some("category10"),
                ..Scale::default()
            })),
            opacity: None,
            x_offset: Some(json!({"field": "Player"})),
            tooltip: vec![
                TooltipField::new("Player", FieldType::Nominal, None),
                TooltipField::new("Metric", FieldType::Nominal, None),
                TooltipField::new("Value", FieldType::Quantitative, None).format(".2f"),
            ],
        },
        title: Title::new("Statistical Comparison", 16),
        config: None,
    }
}

/// Percentile profile of two players over the same metrics (0–100 scale).
pub fn percentile_spec(
    first: (&str, &[Percentile]),
    second: (&str, &[Percentile]),
    size: ChartSize,
) -> ChartSpec {
    let mut values = Vec::new();
    for (name, ranks) in [first, second] {
        for rank in ranks {
            let mut row = Map::new();
            row.insert("Metric".to_string(), Value::from(format_metric_name(&rank.metric)));
            row.insert("Player".to_string(), Value::from(name));
            row.insert("Percentile".to_string(), Value::from(rank.percentile));
            values.push(row);
        }
    }

    let mut x = FieldEncoding::new("Metric", FieldType::Nominal);
    x.axis = Some(json!({"labelAngle": -45}));

    ChartSpec {
        schema: VEGA_LITE_SCHEMA,
        width: size.width,
        height: size.height,
        data: ChartData { values },
        mark: Mark::Simple("bar"),
        params: Vec::new(),
        encoding: Encoding {
            x,
            y: FieldEncoding::new("Percentile", FieldType::Quantitative)
                .title("Percentile vs position")
                .scale(Scale {
                    domain: Some(vec![Value::from(0), Value::from(100)]),
                    ..Scale::default()
                }),
            color: Some(FieldEncoding::new("Player", FieldType::Nominal).scale(Scale {
                scheme: Some("category10"),
                ..Scale::default()
            })),
            opacity: None,
            x_offset: Some(json!({"field": "Player"})),
            tooltip: vec![
                TooltipField::new("Player", FieldType::Nominal, None),
                TooltipField::new("Metric", FieldType::Nominal, None),
                TooltipField::new("Percentile", FieldType::Quantitative, None).format(".0f"),
            ],
        },
        title: Title::new("Percentile Profile", 16),
        config: None,
    }
}

/// Bar chart of the similarity ranking; rows carry the `Similarity` field.
pub fn similar_players_spec(similar: &[SimilarPlayer<'_>], size: ChartSize) -> ChartSpec {
    let values = similar
        .iter()
        .map(|s| {
            let mut row = s.player.to_row();
            row.insert(FIELD_SIMILARITY.to_string(), Value::from(s.similarity));
            row
        })
        .collect();

    let mut y = FieldEncoding::new(FIELD_NAME, FieldType::Nominal).title("Player");
    y.sort = Some("-x");

    let mut tooltip = player_tooltip();
    tooltip.push(TooltipField::new(FIELD_AGE, FieldType::Quantitative, Some("Age")));
    tooltip.push(
        TooltipField::new(FIELD_SIMILARITY, FieldType::Quantitative, Some("Similarity"))
            .format(".3f"),
    );

    ChartSpec {
        schema: VEGA_LITE_SCHEMA,
        width: size.width,
        height: size.height,
        data: ChartData { values },
        mark: Mark::Simple("bar"),
        params: Vec::new(),
        encoding: Encoding {
            x: FieldEncoding::new(FIELD_SIMILARITY, FieldType::Quantitative)
                .title("Similarity Score")
                .scale(Scale {
                    domain: Some(vec![Value::from(0), Value::from(1)]),
                    ..Scale::default()
                }),
            y,
            color: Some(
                FieldEncoding::new(FIELD_LEAGUE, FieldType::Nominal)
                    .title("League")
                    .scale(Scale {
                        scheme: Some("category10"),
                        ..Scale::default()
                    }),
            ),
            opacity: None,
            x_offset: None,
            tooltip,
        },
        title: Title::new("Most Similar Players", 16),
        config: None,
    }
}
