use std::fmt::Write as _;

use anyhow::{Context, Result};

use crate::cards::{error_html, escape_html};
use crate::charts::{ChartSpec, embed_options};

const VEGA_SCRIPTS: &[&str] = &[
    "https://cdn.jsdelivr.net/npm/vega@5",
    "https://cdn.jsdelivr.net/npm/vega-lite@5",
    "https://cdn.jsdelivr.net/npm/vega-embed@6",
];

/// One display region of the page.
#[derive(Debug, Clone)]
pub enum Panel {
    Chart { id: String, spec: Box<ChartSpec> },
    Html { id: String, html: String },
    Error { id: String, message: String },
}

impl Panel {
    pub fn chart(id: impl Into<String>, spec: ChartSpec) -> Self {
        Panel::Chart {
            id: id.into(),
            spec: Box::new(spec),
        }
    }

    pub fn html(id: impl Into<String>, html: impl Into<String>) -> Self {
        Panel::Html {
            id: id.into(),
            html: html.into(),
        }
    }

    pub fn error(id: impl Into<String>, message: impl Into<String>) -> Self {
        Panel::Error {
            id: id.into(),
            message: message.into(),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Panel::Chart { id, .. } | Panel::Html { id, .. } | Panel::Error { id, .. } => id,
        }
    }
}

// JSON inside <script> must not be able to close the tag.
fn script_json(value: &impl serde::Serialize) -> Result<String> {
    let raw = serde_json::to_string(value).context("serialize chart spec")?;
    Ok(raw.replace("</", "<\\/"))
}

/// Standalone HTML page. Chart panels are embedded with `vegaEmbed`; an
/// embedding failure only reaches the browser console.
pub fn render_page(title: &str, panels: &[Panel]) -> Result<String> {
    let mut out = String::new();
    let title = escape_html(title);
    let _ = writeln!(out, "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">");
    let _ = writeln!(out, "<title>{title}</title>");
    for src in VEGA_SCRIPTS {
        let _ = writeln!(out, "<script src=\"{src}\"></script>");
    }
    let _ = writeln!(out, "</head>\n<body>\n<h1>{title}</h1>");

    for panel in panels {
        let id = escape_html(panel.id());
        match panel {
            Panel::Chart { .. } => {
                let _ = writeln!(out, "<div id=\"{id}\"></div>");
            }
            Panel::Html { html, .. } => {
                let _ = writeln!(out, "<div id=\"{id}\">{html}</div>");
            }
            Panel::Error { message, .. } => {
                let _ = writeln!(out, "<div id=\"{id}\">{}</div>", error_html(message));
            }
        }
    }

    let options = script_json(&embed_options())?;
    out.push_str("<script>\n");
    for panel in panels {
        if let Panel::Chart { id, spec } = panel {
            let spec = script_json(spec.as_ref())?;
            let selector = serde_json::to_string(&format!("#{id}")).context("serialize selector")?;
            let _ = writeln!(out, "vegaEmbed({selector}, {spec}, {options}).catch(console.error);");
        }
    }
    out.push_str("</script>\n");
    let _ = writeln!(
        out,
        "<footer>Generated {}</footer>\n</body>\n</html>",
        chrono::Utc::now().format("%Y-%m-%d %H:%M UTC")
    );
    Ok(out)
}
