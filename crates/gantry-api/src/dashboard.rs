//! Server-rendered HTML dashboard.
//!
//! A single self-contained page (inline CSS, no scripts) built from a
//! point-in-time copy of the statistics store.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use gantry_core::{format_duration, ActionStats, ExecutionRecord};

/// Log lines shown at the bottom of the page.
pub const LOG_LINES: usize = 50;
/// Executions shown in the recent activity table.
pub const RECENT_EXECUTIONS: usize = 20;

pub struct DashboardData {
    pub version: &'static str,
    pub uptime_secs: u64,
    /// Actions the provider can see, including ones that never ran.
    pub available: Vec<String>,
    pub stats: BTreeMap<String, ActionStats>,
    pub history: BTreeMap<String, Vec<ExecutionRecord>>,
    pub logs: Vec<String>,
}

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:2rem;background:#f6f7f9;color:#1d2330}\
h1{margin-bottom:.2rem}.muted{color:#6b7280}\
.cards{display:flex;gap:1rem;margin:1.5rem 0}\
.card{background:#fff;border-radius:8px;padding:1rem 1.5rem;box-shadow:0 1px 2px rgba(0,0,0,.08)}\
.card b{display:block;font-size:1.6rem}\
table{border-collapse:collapse;width:100%;background:#fff;margin-bottom:2rem}\
th,td{text-align:left;padding:.5rem .75rem;border-bottom:1px solid #e5e7eb}\
.success{color:#15803d}.failure{color:#b91c1c}\
pre{background:#111827;color:#e5e7eb;padding:1rem;border-radius:8px;overflow-x:auto}";

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
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

pub fn render(data: &DashboardData) -> String {
    let mut html = String::new();
    // Writing into a String cannot fail.
    let _ = write_page(&mut html, data);
    html
}

fn write_page(out: &mut String, data: &DashboardData) -> std::fmt::Result {
    let total_calls: u64 = data.stats.values().map(|s| s.total_calls).sum();
    let successful: u64 = data.stats.values().map(|s| s.successful_calls).sum();
    let overall_rate = if total_calls == 0 {
        "-".to_string()
    } else {
        format!("{:.1}%", successful as f64 / total_calls as f64 * 100.0)
    };

    writeln!(
        out,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>Gantry Dashboard</title><style>{STYLE}</style></head><body>"
    )?;
    writeln!(
        out,
        "<h1>Gantry</h1><div class=\"muted\">v{} &middot; up {}s</div>",
        escape_html(data.version),
        data.uptime_secs
    )?;
    writeln!(
        out,
        "<div class=\"cards\"><div class=\"card\"><b>{}</b>actions</div><div class=\"card\"><b>{}</b>executions</div><div class=\"card\"><b>{}</b>success rate</div></div>",
        data.available.len(),
        total_calls,
        overall_rate
    )?;

    write_actions_table(out, data)?;
    write_recent_table(out, data)?;

    writeln!(out, "<h2>Recent logs</h2><pre>")?;
    for line in &data.logs {
        writeln!(out, "{}", escape_html(line))?;
    }
    writeln!(out, "</pre></body></html>")
}

fn write_actions_table(out: &mut String, data: &DashboardData) -> std::fmt::Result {
    let names: BTreeSet<&String> = data.available.iter().chain(data.stats.keys()).collect();

    writeln!(out, "<h2>Actions</h2><table><tr><th>Name</th><th>Calls</th><th>Success rate</th><th>Avg duration</th><th>Last executed</th></tr>")?;
    if names.is_empty() {
        writeln!(out, "<tr><td colspan=\"5\" class=\"muted\">No actions yet</td></tr>")?;
    }
    for name in names {
        let stats = data.stats.get(name);
        let calls = stats.map(|s| s.total_calls).unwrap_or(0);
        let rate = stats
            .and_then(|s| s.success_rate())
            .map(|r| format!("{:.1}%", r))
            .unwrap_or_else(|| "-".to_string());
        let avg = stats
            .and_then(|s| s.average_duration())
            .map(format_duration)
            .unwrap_or_else(|| "-".to_string());
        let last = stats
            .and_then(|s| s.last_executed)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "never".to_string());
        writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(name),
            calls,
            rate,
            escape_html(&avg),
            last
        )?;
    }
    writeln!(out, "</table>")
}

fn write_recent_table(out: &mut String, data: &DashboardData) -> std::fmt::Result {
    let mut recent: Vec<(&String, &ExecutionRecord)> = data
        .history
        .iter()
        .flat_map(|(name, records)| records.iter().map(move |r| (name, r)))
        .collect();
    recent.sort_by(|a, b| b.1.timestamp.cmp(&a.1.timestamp));
    recent.truncate(RECENT_EXECUTIONS);

    writeln!(out, "<h2>Recent executions</h2><table><tr><th>Time</th><th>Action</th><th>Status</th><th>Duration</th><th>Result</th></tr>")?;
    if recent.is_empty() {
        writeln!(out, "<tr><td colspan=\"5\" class=\"muted\">Nothing executed yet</td></tr>")?;
    }
    for (name, record) in recent {
        writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td class=\"{}\">{}</td><td>{}</td><td>{}</td></tr>",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            escape_html(name),
            record.status,
            record.status,
            escape_html(&format_duration(record.duration)),
            escape_html(&record.result)
        )?;
    }
    writeln!(out, "</table>")
}
