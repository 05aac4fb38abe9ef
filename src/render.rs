//! HTML page with one panel per server and a Chart.js pie per panel.

use std::fmt::Write;

use serde::Serialize;

use crate::collector::{ServerStatus, SlotCount};
use crate::info::{format_uptime, hit_ratio, keys, InfoMap};

const CHART_JS_URL: &str = "//cdnjs.cloudflare.com/ajax/libs/Chart.js/1.0.1/Chart.min.js";

const PALETTE: [&str; 5] = ["#F7464A", "#46BFBD", "#FDB45C", "#949FB1", "#4D5360"];

/// How server panels are arranged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Layout {
    /// Panels one below the other.
    #[default]
    Stacked,
    /// One tab per server.
    Tabs,
}

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Seconds between automatic reloads. Zero or negative disables them.
    pub refresh: Option<i64>,
    pub layout: Layout,
}

impl RenderOptions {
    fn refresh_seconds(&self) -> Option<i64> {
        self.refresh.filter(|s| *s > 0)
    }
}

/// Chart color for the `i`-th database of a panel.
pub fn chart_color(i: usize) -> &'static str {
    PALETTE[i % PALETTE.len()]
}

/// One pie slice, in the shape Chart.js 1.x expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub value: u64,
    pub label: String,
    pub color: &'static str,
    pub highlight: &'static str,
}

pub fn chart_dataset(slots: &[SlotCount]) -> Vec<ChartPoint> {
    slots
        .iter()
        .enumerate()
        .map(|(i, slot)| ChartPoint {
            value: slot.key_count,
            label: format!("Database {}", slot.slot_index),
            color: chart_color(i),
            highlight: chart_color(i),
        })
        .collect()
}

/// Label and value rows of a panel's metrics table.
pub fn metric_rows(info: &InfoMap) -> Vec<(&'static str, String)> {
    let value = |name: &str| info.get(name).unwrap_or("-").to_string();
    let mut rows = vec![("Version", value(keys::VERSION))];

    if let Some(path) = info.get(keys::CONFIG_FILE).filter(|p| !p.is_empty()) {
        rows.push(("Config File", path.to_string()));
    }

    let uptime = match info.get(keys::UPTIME_SECONDS) {
        Some(raw) => format_uptime(raw).unwrap_or_else(|| raw.to_string()),
        None => "-".to_string(),
    };
    rows.push(("Uptime", uptime));
    rows.push(("Connected Clients", value(keys::CONNECTED_CLIENTS)));

    if let Some(slaves) = info
        .get(keys::CONNECTED_SLAVES)
        .filter(|s| !s.is_empty() && *s != "0")
    {
        rows.push(("Connected Slaves", slaves.to_string()));
    }

    rows.extend([
        ("Used Memory", value(keys::USED_MEMORY_HUMAN)),
        ("Peak Used Memory", value(keys::USED_MEMORY_PEAK_HUMAN)),
        ("Expired Keys", value(keys::EXPIRED_KEYS)),
        ("Evicted Keys", value(keys::EVICTED_KEYS)),
        ("Keyspace Hits", value(keys::KEYSPACE_HITS)),
        ("Keyspace Misses", value(keys::KEYSPACE_MISSES)),
    ]);

    if let Some(ratio) = hit_ratio(info) {
        rows.push(("Hit Ratio", ratio));
    }
    rows
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

/// Serialize for embedding inside `<script>`.
fn script_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "[]".to_string())
        .replace("</", "<\\/")
}

pub fn render_page(statuses: &[ServerStatus], options: &RenderOptions) -> String {
    let mut html = String::new();
    // Writing into a String cannot fail.
    let _ = write_page(&mut html, statuses, options);
    html
}

fn write_page(
    out: &mut String,
    statuses: &[ServerStatus],
    options: &RenderOptions,
) -> std::fmt::Result {
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html>")?;
    writeln!(out, "<head>")?;
    writeln!(out, "    <meta charset=\"utf-8\">")?;
    if let Some(seconds) = options.refresh_seconds() {
        writeln!(out, "    <meta http-equiv=\"refresh\" content=\"{seconds}\">")?;
    }
    writeln!(out, "    <title>Redis Status</title>")?;
    writeln!(out, "    <style type=\"text/css\">{STYLE}</style>")?;
    writeln!(out, "    <script>var charts = [];</script>")?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, "<div id=\"main\">")?;
    writeln!(out, "    <h1>Redis Status</h1>")?;

    if options.layout == Layout::Tabs {
        writeln!(out, "    <div class=\"tabs\">")?;
        for (n, status) in statuses.iter().enumerate() {
            writeln!(
                out,
                "        <button class=\"tab{}\" onclick=\"showServer({n})\">{}</button>",
                if n == 0 { " active" } else { "" },
                escape_html(&status.label)
            )?;
        }
        writeln!(out, "    </div>")?;
    }

    writeln!(out, "    <div class=\"servers\">")?;
    let mut chart_id = 0;
    for (n, status) in statuses.iter().enumerate() {
        let hidden = options.layout == Layout::Tabs && n > 0;
        write_panel(out, n, status, hidden, &mut chart_id)?;
    }
    writeln!(out, "    </div>")?;
    writeln!(out, "</div>")?;

    writeln!(out, "<script src=\"{CHART_JS_URL}\"></script>")?;
    writeln!(out, "<script>{CHART_INIT}</script>")?;
    if options.layout == Layout::Tabs {
        writeln!(out, "<script>{TABS_SCRIPT}</script>")?;
    }
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")
}

fn write_panel(
    out: &mut String,
    n: usize,
    status: &ServerStatus,
    hidden: bool,
    chart_id: &mut usize,
) -> std::fmt::Result {
    let style = if hidden { " style=\"display: none\"" } else { "" };
    writeln!(out, "    <div class=\"server\" id=\"server-{n}\"{style}>")?;
    writeln!(out, "        <h2>{}</h2>", escape_html(&status.label))?;

    let info = match &status.info {
        Ok(info) => info,
        Err(message) => {
            writeln!(out, "        <p class=\"error\">{}</p>", escape_html(message))?;
            return writeln!(out, "    </div>");
        }
    };

    // Only panels with data get a chart, so numbering skips failed servers.
    *chart_id += 1;
    let id = *chart_id;
    writeln!(out, "        <div class=\"chart\">")?;
    writeln!(out, "            <h4>Keys</h4>")?;
    writeln!(
        out,
        "            <canvas id=\"chart-{id}\" width=\"400\" height=\"400\"></canvas>"
    )?;
    writeln!(out, "        </div>")?;
    writeln!(
        out,
        "        <script>charts[{id}] = {};</script>",
        script_json(&chart_dataset(&status.slots))
    )?;

    writeln!(out, "        <table>")?;
    for (label, value) in metric_rows(info) {
        writeln!(
            out,
            "            <tr><th>{label}</th><td>{}</td></tr>",
            escape_html(&value)
        )?;
    }
    writeln!(out, "        </table>")?;
    writeln!(out, "        <div class=\"clear\"></div>")?;
    writeln!(out, "    </div>")
}

const STYLE: &str = r#"
        body { font-family: "Helvetica Neue", Helvetica, Arial, sans-serif; margin: 0; padding: 0 0 20px 0; }
        #main { margin: 0 auto; width: 960px; }
        .clear { clear: both; }
        .server { padding: 0 20px 20px; border: 1px solid #ddd; margin-top: 20px; }
        .chart { float: right; }
        .chart h4 { text-align: center; margin-top: 0; }
        .error { color: #F7464A; }
        .tabs button { border: 1px solid #ddd; background: #eee; padding: 5px 10px; cursor: pointer; }
        .tabs button.active { background: #fff; }
        table { border-collapse: collapse; }
        table tr th, table tr td { text-align: left; background: #eee; border: 1px solid #ddd; padding: 5px; }
        table tr th { text-align: right; }
    "#;

const CHART_INIT: &str = r#"
    for (var i = 1; i < charts.length; i++) {
        new Chart(document.getElementById('chart-' + i).getContext('2d'))
            .Pie(charts[i], { animateRotate: false });
    }
"#;

const TABS_SCRIPT: &str = r#"
    function showServer(n) {
        var panels = document.querySelectorAll('.server');
        var tabs = document.querySelectorAll('.tabs button');
        for (var i = 0; i < panels.length; i++) {
            panels[i].style.display = i === n ? '' : 'none';
            tabs[i].className = i === n ? 'tab active' : 'tab';
        }
    }
"#;
