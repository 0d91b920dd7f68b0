//! `mnemo events` — query the local hook event log.
//!
//! Reads `<context>/state/events.jsonl` and prints events in a
//! human-readable table or as raw JSONL for piping to jq. All filter
//! flags use intersection (AND) logic.

use crate::core::config::Config;
use crate::core::events::{self, QueryOpts};
use crate::core::notify::Payload;
use chrono::{DateTime, Local};
use comfy_table::Table;

pub struct EventsArgs {
    pub hook: Option<String>,
    pub session: Option<String>,
    pub event: Option<String>,
    pub last: usize,
    pub json: bool,
    pub all: bool,
}

pub fn run(cfg: &Config, args: &EventsArgs) -> Result<(), String> {
    let opts = QueryOpts {
        hook: args.hook.clone(),
        session: args.session.clone(),
        event: args.event.clone(),
        last: args.last,
        include_rotated: args.all,
    };

    let records = events::query(cfg, &opts).map_err(|e| format!("reading event log: {e}"))?;

    if records.is_empty() {
        println!("No events logged.");
        return Ok(());
    }

    if args.json {
        for record in &records {
            if let Ok(line) = serde_json::to_string(record) {
                println!("{line}");
            }
        }
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Time", "Event", "Hook", "Message"]);
    for record in &records {
        table.add_row(vec![
            format_event_timestamp(&record.timestamp),
            record.event.clone(),
            hook_name(record),
            truncate(&record.message, 60),
        ]);
    }
    println!("{table}");

    Ok(())
}

/// RFC3339 timestamp rendered in local time, or passed through when
/// unparseable.
fn format_event_timestamp(ts: &str) -> String {
    match DateTime::parse_from_rfc3339(ts) {
        Ok(parsed) => parsed
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        Err(_) => ts.to_string(),
    }
}

/// Hook name from the record detail, falling back to the message prefix
/// (e.g. "qa-reminder: ...").
fn hook_name(record: &Payload) -> String {
    if let Some(detail) = &record.detail {
        if !detail.hook.is_empty() {
            return detail.hook.clone();
        }
    }
    match record.message.split_once(':') {
        Some((prefix, _)) if !prefix.is_empty() => prefix.to_string(),
        _ => "-".to_string(),
    }
}

fn truncate(msg: &str, max_len: usize) -> String {
    if msg.chars().count() <= max_len {
        return msg.to_string();
    }
    let cut: String = msg.chars().take(max_len.saturating_sub(3)).collect();
    format!("{cut}...")
}
