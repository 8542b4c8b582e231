//! Self-contained HTML rendering.
//!
//! The page has inline CSS and no scripts or external resources, so it can
//! be opened offline or attached to an e-mail as is. Every piece of text
//! that comes from data is escaped.

use queimadas_alert_models::Severity;
use queimadas_analytics_models::PeriodicAggregate;
use queimadas_hotspot_models::RegionGrouping;
use queimadas_report_models::{
    AlertLine, CleaningSummary, PeakPeriod, RegionSection, ReportData, Trend,
};

/// Renders `data` as a complete HTML document.
#[must_use]
pub fn render_html(data: &ReportData) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Monitoramento de Queimadas</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        {header}
        {summary}
        {alerts}
        <div class="tables">
            {states}
            {biomes}
        </div>
        {series}
        {cleaning}
        {footer}
    </div>
</body>
</html>"#,
        css = inline_css(),
        header = render_header(data),
        summary = render_summary(data),
        alerts = render_alerts(&data.alerts),
        states = render_region_section(&data.states),
        biomes = render_region_section(&data.biomes),
        series = render_series(&data.series, &data.peaks),
        cleaning = data.cleaning.map(render_cleaning).unwrap_or_default(),
        footer = render_footer(data),
    )
}

fn inline_css() -> &'static str {
    r"
* { box-sizing: border-box; margin: 0; padding: 0; }
body {
    font-family: system-ui, -apple-system, 'Segoe UI', sans-serif;
    line-height: 1.5;
    color: #1f2937;
    background: #f9fafb;
}
.container { max-width: 1100px; margin: 0 auto; padding: 2rem 1rem; }
header { border-bottom: 3px solid #d9480f; padding-bottom: 1rem; margin-bottom: 1.5rem; }
header h1 { font-size: 1.8rem; color: #d9480f; }
header .meta { color: #6b7280; font-size: 0.9rem; }
h2 { font-size: 1.2rem; margin: 1.5rem 0 0.75rem; }
.metrics { display: grid; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr)); gap: 1rem; }
.metric { background: #fff; border: 1px solid #e5e7eb; border-radius: 8px; padding: 1rem; }
.metric h3 { font-size: 0.8rem; text-transform: uppercase; color: #6b7280; }
.metric p { font-size: 1.6rem; font-weight: 600; }
.trend { display: inline-block; margin-top: 1rem; padding: 0.25rem 0.75rem; border-radius: 999px; font-weight: 600; }
.trend-increasing { background: #fee2e2; color: #b91c1c; }
.trend-decreasing { background: #dcfce7; color: #15803d; }
.trend-stable { background: #e5e7eb; color: #374151; }
.alerts { list-style: none; }
.alerts li { padding: 0.5rem 0.75rem; margin-bottom: 0.4rem; border-left: 4px solid #f59e0b; background: #fffbeb; }
.alerts li.high { border-left-color: #dc2626; background: #fef2f2; }
.none { color: #6b7280; font-style: italic; }
.tables { display: grid; grid-template-columns: repeat(auto-fit, minmax(320px, 1fr)); gap: 1.5rem; }
table { width: 100%; border-collapse: collapse; background: #fff; }
th, td { padding: 0.4rem 0.6rem; border-bottom: 1px solid #e5e7eb; text-align: left; }
th { background: #f3f4f6; font-size: 0.85rem; }
td.num, th.num { text-align: right; font-variant-numeric: tabular-nums; }
tr.peak td { background: #fff7ed; font-weight: 600; }
.note { color: #6b7280; font-size: 0.85rem; margin-top: 0.4rem; }
footer { margin-top: 2rem; color: #9ca3af; font-size: 0.8rem; text-align: center; }
"
}

fn render_header(data: &ReportData) -> String {
    let period = data.period.map_or_else(
        || "No dated observations".to_string(),
        |p| {
            format!(
                "{} to {} ({} days)",
                p.start.format("%d/%m/%Y"),
                p.end.format("%d/%m/%Y"),
                p.days
            )
        },
    );

    format!(
        r#"<header>
    <h1>Monitoramento de Queimadas</h1>
    <div class="meta">{period} &bull; aggregated by {granularity}</div>
</header>"#,
        period = escape(&period),
        granularity = data.granularity,
    )
}

fn render_summary(data: &ReportData) -> String {
    let summary = &data.summary;
    let trend = data.trend.map(render_trend).unwrap_or_default();

    format!(
        r#"<section>
    <div class="metrics">
        {total}
        {mean}
        {states}
        {biomes}
        {peak}
    </div>
    {trend}
</section>"#,
        total = metric("Total hotspots", &format_count(summary.total_observations)),
        mean = metric("Daily mean", &format!("{:.1}", summary.daily_mean)),
        states = metric("States affected", &summary.states_affected.to_string()),
        biomes = metric("Biomes affected", &summary.biomes_affected.to_string()),
        peak = metric("Peak count", &format_count(data.stats.max)),
    )
}

fn metric(label: &str, value: &str) -> String {
    format!(
        r#"<div class="metric"><h3>{}</h3><p>{}</p></div>"#,
        escape(label),
        escape(value)
    )
}

fn render_trend(trend: Trend) -> String {
    format!(
        r#"<div class="trend trend-{class}">{arrow} {label} over the last periods</div>"#,
        class = trend,
        arrow = trend.arrow(),
        label = trend.label(),
    )
}

fn render_alerts(alerts: &[AlertLine]) -> String {
    if alerts.is_empty() {
        return r#"<section><h2>Alerts</h2><p class="none">No alerts raised.</p></section>"#
            .to_string();
    }

    let mut items = String::new();
    for alert in alerts {
        let class = match alert.severity {
            Severity::High => "high",
            Severity::Medium => "medium",
        };
        items.push_str(&format!(r#"<li class="{class}">{}</li>"#, escape(&alert.message)));
        items.push('\n');
    }
    format!(
        r#"<section><h2>Alerts ({count})</h2><ul class="alerts">
{items}</ul></section>"#,
        count = alerts.len(),
    )
}

fn render_region_section(section: &RegionSection) -> String {
    let (title, column) = match section.grouping {
        RegionGrouping::State => ("Hotspots by state", "UF"),
        RegionGrouping::Biome => ("Hotspots by biome", "Biome"),
    };

    if section.rows.is_empty() {
        return format!(r#"<section><h2>{title}</h2><p class="none">No data.</p></section>"#);
    }

    let mut rows = String::new();
    for row in &section.rows {
        rows.push_str(&format!(
            r#"<tr><td>{name}</td><td class="num">{count}</td><td class="num">{pct:.1}%</td></tr>"#,
            name = escape(&row.name),
            count = format_count(row.count),
            pct = row.percentage,
        ));
        rows.push('\n');
    }

    let mut notes = Vec::new();
    if section.region_count > section.rows.len() {
        notes.push(format!(
            "Top {} of {} regions shown.",
            section.rows.len(),
            section.region_count
        ));
    }
    if section.excluded > 0 {
        notes.push(format!("{} hotspots had no {}.", section.excluded, section.grouping));
    }
    let notes = if notes.is_empty() {
        String::new()
    } else {
        format!(r#"<p class="note">{}</p>"#, escape(&notes.join(" ")))
    };

    format!(
        r#"<section>
    <h2>{title}</h2>
    <table>
        <tr><th>{column}</th><th class="num">Hotspots</th><th class="num">Share</th></tr>
{rows}    </table>
    {notes}
</section>"#
    )
}

fn render_series(points: &[PeriodicAggregate], peaks: &[PeakPeriod]) -> String {
    if points.is_empty() {
        return String::new();
    }

    let mut rows = String::new();
    for point in points {
        let class = if point.is_peak { r#" class="peak""# } else { "" };
        rows.push_str(&format!(
            r#"<tr{class}><td>{date}</td><td class="num">{count}</td><td class="num">{mean:.1}</td><td class="num">{pct:.1}%</td></tr>"#,
            date = point.period_start.format("%d/%m/%Y"),
            count = format_count(point.count),
            mean = point.rolling_mean,
            pct = point.percent_of_max,
        ));
        rows.push('\n');
    }

    let peak_note = if peaks.is_empty() {
        String::new()
    } else {
        let dates: Vec<String> = peaks
            .iter()
            .map(|p| p.period_start.format("%d/%m/%Y").to_string())
            .collect();
        format!(
            r#"<p class="note">Peak periods: {}</p>"#,
            escape(&dates.join(", "))
        )
    };

    format!(
        r#"<section>
    <h2>Hotspots per period</h2>
    <table>
        <tr><th>Period</th><th class="num">Hotspots</th><th class="num">Rolling mean</th><th class="num">% of max</th></tr>
{rows}    </table>
    {peak_note}
</section>"#
    )
}

fn render_cleaning(cleaning: CleaningSummary) -> String {
    format!(
        r#"<section>
    <h2>Data quality</h2>
    <p class="note">{read} rows read, {kept} kept, {rejected} rejected, {dupes} duplicates removed, {missing} without a timestamp.</p>
</section>"#,
        read = format_count(cleaning.rows_read as u64),
        kept = format_count(cleaning.rows_kept as u64),
        rejected = format_count(cleaning.rows_rejected as u64),
        dupes = format_count(cleaning.duplicates_removed as u64),
        missing = format_count(cleaning.missing_timestamps as u64),
    )
}

fn render_footer(data: &ReportData) -> String {
    format!(
        "<footer>Generated {} UTC</footer>",
        data.generated_at.format("%d/%m/%Y %H:%M:%S")
    )
}

/// Formats a count with comma thousands separators.
#[must_use]
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Escapes text for use in HTML element content and attribute values.
#[must_use]
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
