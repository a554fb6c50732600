//! Plain-text rendering for CLI output.

use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::{DateTime, Local, Utc};

use gantry_core::{format_duration, ActionStats, ExecutionRecord, GantryConfig};

use crate::system::SystemInfo;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn local_time(t: DateTime<Utc>) -> String {
    t.with_timezone(&Local).format(TIME_FORMAT).to_string()
}

/// Detailed block for one action.
pub fn action_stats(name: &str, stats: &ActionStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}:", name);
    let _ = writeln!(out, "  Total calls:      {}", stats.total_calls);
    let _ = writeln!(out, "  Successful calls: {}", stats.successful_calls);
    let _ = writeln!(out, "  Failed calls:     {}", stats.failed_calls());
    let _ = writeln!(
        out,
        "  Success rate:     {:.2}%",
        stats.success_rate().unwrap_or(0.0)
    );
    let _ = writeln!(
        out,
        "  Average duration: {}",
        stats
            .average_duration()
            .map(format_duration)
            .unwrap_or_else(|| "N/A".to_string())
    );
    match stats.last_executed {
        Some(t) => {
            let _ = writeln!(out, "  Last executed:    {}", local_time(t));
        }
        None => {
            let _ = writeln!(out, "  Last executed:    Never");
        }
    }
    out
}

pub fn all_stats(stats: &BTreeMap<String, ActionStats>) -> String {
    if stats.is_empty() {
        return "No statistics available.\n".to_string();
    }
    let mut out = String::from("Action statistics:\n");
    for (name, s) in stats {
        out.push('\n');
        out.push_str(&action_stats(name, s));
    }
    out
}

/// One line per record, in the order given.
pub fn history(name: &str, records: &[ExecutionRecord]) -> String {
    if records.is_empty() {
        return format!("No executions recorded for '{}'.\n", name);
    }
    let mut out = format!("Recent executions of '{}':\n", name);
    for record in records {
        let _ = writeln!(
            out,
            "  {}  {:<7}  {:>10}  {}",
            local_time(record.timestamp),
            record.status,
            format_duration(record.duration),
            record.result.replace('\n', " ")
        );
    }
    out
}

/// Row data for the dashboard action table.
pub struct ActionRow<'a> {
    pub name: &'a str,
    pub last_modified: Option<DateTime<Utc>>,
    pub stats: Option<&'a ActionStats>,
}

pub fn config(config: &GantryConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "API token:         {}", config.server.api_token);
    let _ = writeln!(out, "Actions directory: {}", config.actions_dir().display());
    let _ = writeln!(out, "Server:            {}:{}", config.server.bind, config.server.port);
    let _ = writeln!(out, "Log file:          {}", config.log_file().display());
    let _ = writeln!(out, "Log level:         {}", config.general.log_level);
    let _ = writeln!(out, "Stats file:        {}", config.stats_file().display());
    let timeout = match config.action_timeout() {
        Some(t) => format!("{}s", t.as_secs()),
        None => "none".to_string(),
    };
    let _ = writeln!(out, "Action timeout:    {}", timeout);
    out
}

pub fn system_info(info: &SystemInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "OS:                {}", info.os);
    let _ = writeln!(out, "Architecture:      {}", info.arch);
    let _ = writeln!(out, "CPUs:              {}", info.cpus);
    match info.memory_usage {
        Some(mem) => {
            let _ = writeln!(out, "Memory usage:      {:.2}%", mem);
        }
        None => {
            let _ = writeln!(out, "Memory usage:      N/A");
        }
    }
    let _ = writeln!(out, "CPU usage:         {:.2}%", info.cpu_usage);
    out
}

pub fn action_table(rows: &[ActionRow<'_>]) -> String {
    if rows.is_empty() {
        return "  No actions found.\n".to_string();
    }
    let mut out = format!(
        "  {:<16} {:<20} {:>11} {:>12} {:>14} {:<20}\n",
        "Name", "Last Modified", "Total Calls", "Success Rate", "Avg Duration", "Last Executed"
    );
    for row in rows {
        let modified = row
            .last_modified
            .map(local_time)
            .unwrap_or_else(|| "-".to_string());
        let calls = row.stats.map(|s| s.total_calls).unwrap_or(0);
        let rate = row
            .stats
            .and_then(|s| s.success_rate())
            .map(|r| format!("{:.2}%", r))
            .unwrap_or_else(|| "N/A".to_string());
        let avg = row
            .stats
            .and_then(|s| s.average_duration())
            .map(format_duration)
            .unwrap_or_else(|| "N/A".to_string());
        let last = row
            .stats
            .and_then(|s| s.last_executed)
            .map(local_time)
            .unwrap_or_else(|| "Never".to_string());
        let _ = writeln!(
            out,
            "  {:<16} {:<20} {:>11} {:>12} {:>14} {:<20}",
            row.name, modified, calls, rate, avg, last
        );
    }
    out
}
