use std::fmt::Write;

use super::{ChartDataset, Localization, SensorCard};
use crate::readings::display::render;
use crate::readings::ReadingKind;

const CHART_WIDTH: f64 = 300.0;
const CHART_HEIGHT: f64 = 100.0;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the card as an HTML fragment: title with status dot, subtitle,
/// the current readings, and an inline SVG line chart per non-empty dataset.
#[must_use]
pub fn render_card(card: &SensorCard, localization: &dyn Localization) -> String {
    let name = escape(card.name());
    let status_class = if card.is_online() {
        "sensor-status-online"
    } else {
        "sensor-status-offline"
    };

    let mut html = String::new();
    let _ = write!(
        html,
        r#"<div class="card" data-revision="{}">
    <div class="card-title">{name}<span class="{status_class}"></span></div>
    <div class="card-subtitle">Air Sensor</div>
    <div class="card-content">
        <ul class="sensor-content-readings">
"#,
        card.revision()
    );

    for kind in card.kinds() {
        let Some(reading) = card.reading(*kind) else {
            continue;
        };
        let _ = writeln!(
            html,
            r#"            <li class="sensor-reading"><span class="sensor-reading-kind">{}</span><span class="sensor-reading-value">{}</span></li>"#,
            escape(localization.label(*kind)),
            escape(&render(reading))
        );
    }

    let _ = writeln!(html, "        </ul>\n    </div>");

    for kind in card.kinds() {
        if let Some(dataset) = card.chart(*kind) {
            html.push_str(&render_chart(*kind, localization.label(*kind), dataset));
        }
    }

    html.push_str("</div>\n");
    html
}

/// Polyline scaled into a fixed viewBox: x spans first to last point, y spans
/// the dataset's bounds. Empty datasets render nothing.
fn render_chart(kind: ReadingKind, label: &str, dataset: &ChartDataset) -> String {
    if dataset.points.is_empty() {
        return String::new();
    }

    let (x_min, x_max) = dataset
        .points
        .iter()
        .map(|p| p.x.timestamp_millis())
        .fold((i64::MAX, i64::MIN), |(min, max), x| (min.min(x), max.max(x)));
    let x_span = (x_max - x_min).max(1) as f64;
    let y_span = (dataset.y_max - dataset.y_min).max(f64::EPSILON);

    let points: Vec<String> = dataset
        .points
        .iter()
        .map(|p| {
            let x = (p.x.timestamp_millis() - x_min) as f64 / x_span * CHART_WIDTH;
            let y = CHART_HEIGHT - (p.y - dataset.y_min) / y_span * CHART_HEIGHT;
            format!("{x:.1},{y:.1}")
        })
        .collect();

    format!(
        r#"    <svg class="sensor-chart" data-kind="{kind}" viewBox="0 0 {CHART_WIDTH} {CHART_HEIGHT}" preserveAspectRatio="none"><title>{}</title><polyline points="{}" fill="none" stroke="currentColor" stroke-width="1.5"/></svg>
"#,
        escape(label),
        points.join(" ")
    )
}

/// A complete page around [`render_card`]; it reloads itself every `refresh_secs`.
#[must_use]
pub fn render_page(card: &SensorCard, localization: &dyn Localization, refresh_secs: u64) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta http-equiv="refresh" content="{refresh_secs}">
<title>{}</title>
</head>
<body>
<div id="sensors-container">
{}</div>
</body>
</html>
"#,
        escape(card.name()),
        render_card(card, localization)
    )
}
