// Output formatting utilities

use serde::Serialize;
use serde_json::Value;
use std::io::IsTerminal;

use crate::client::{CallbackResponse, ClientError, ResponseBody};
use crate::models::StatusUpdate;

// ANSI escape codes for terminal formatting
const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";
const ANSI_FG_RED: &str = "\x1b[31m";
const ANSI_FG_GREEN: &str = "\x1b[32m";

const RULE_MAX_WIDTH: usize = 60;

/// Number of segments echoed by the verify report
pub const SEGMENT_PREVIEW_COUNT: usize = 3;
/// Characters of source text echoed per segment
pub const SEGMENT_TEXT_PREVIEW: usize = 50;

/// Whether to emit ANSI colors (TTY stdout and `NO_COLOR` unset)
pub fn use_color() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Get terminal width, falling back to COLUMNS and then the rule width
pub fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return w as usize;
        }
    }

    if let Ok(cols) = std::env::var("COLUMNS") {
        if let Ok(width) = cols.parse::<usize>() {
            if width > 0 && width < 10000 {
                return width;
            }
        }
    }

    RULE_MAX_WIDTH
}

/// Horizontal `=` rule, never wider than 60 columns
pub fn rule(width: usize) -> String {
    "=".repeat(width.min(RULE_MAX_WIDTH))
}

fn paint(text: &str, color: &str, enabled: bool) -> String {
    if enabled {
        format!("{}{}{}", color, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

/// Pretty JSON with non-ASCII text kept as-is
pub fn pretty_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unserializable: {}>", e))
}

/// Header printed once before a run
pub fn format_run_header(title: &str, fields: &[(&str, &str)], width: usize, color: bool) -> String {
    let rule = rule(width);
    let mut out = String::new();
    out.push_str(&rule);
    out.push('\n');
    out.push_str(&paint(title, ANSI_BOLD, color));
    out.push('\n');
    for (label, value) in fields {
        out.push_str(&format!("{}: {}\n", label, value));
    }
    out.push_str(&rule);
    out
}

/// Banner describing the callback about to be sent
pub fn format_callback_banner(update: &StatusUpdate, width: usize, color: bool) -> String {
    let rule = rule(width);
    let stage = paint(update.stage().as_str(), ANSI_BOLD, color);
    format!(
        "{rule}\n> Stage: {stage}\n  Status: {status}\n  Payload: {payload}\n{rule}",
        rule = rule,
        stage = stage,
        status = update.status.as_str(),
        payload = pretty_json(update),
    )
}

/// Report for a callback the API accepted
pub fn format_callback_success(response: &CallbackResponse, color: bool) -> String {
    let body = match &response.body {
        ResponseBody::Json(value) => pretty_json(value),
        ResponseBody::Text(text) => text.clone(),
    };
    format!(
        "{}\nResponse: {}",
        paint(&format!("Success: {}", response.status), ANSI_FG_GREEN, color),
        body
    )
}

/// Report for a failed request
pub fn format_request_failure(err: &ClientError, color: bool) -> String {
    let mut out = paint(&format!("Failed: {}", err), ANSI_FG_RED, color);
    if let Some(body) = err.body() {
        out.push_str(&format!("\nResponse: {}", body));
    }
    out
}

fn field(value: &Value, key: &str) -> String {
    match value.get(key) {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Job status section of the verify report
pub fn format_job_summary(job: &Value) -> String {
    format!(
        "Job:\n   Status: {}\n   Result Key: {}",
        field(job, "status"),
        field(job, "result_key")
    )
}

/// Project targets section of the verify report
pub fn format_targets(targets: &[Value]) -> String {
    let mut out = String::from("Project Targets:");
    for target in targets {
        out.push_str(&format!(
            "\n   - {}: {} ({}%)",
            field(target, "language_code"),
            field(target, "status"),
            field(target, "progress")
        ));
    }
    out
}

/// Segments section of the verify report: count plus a short preview
pub fn format_segments(segments: &[Value]) -> String {
    let mut out = format!("Segments: {}", segments.len());
    for segment in segments.iter().take(SEGMENT_PREVIEW_COUNT) {
        let text = segment
            .get("source_text")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let preview: String = text.chars().take(SEGMENT_TEXT_PREVIEW).collect();
        out.push_str(&format!(
            "\n   - [{}] {}: {}...",
            field(segment, "segment_index"),
            field(segment, "speaker_tag"),
            preview
        ));
    }
    out
}

/// Assets section of the verify report
pub fn format_assets(assets: &[Value]) -> String {
    let mut out = format!("Assets: {}", assets.len());
    for asset in assets {
        out.push_str(&format!(
            "\n   - {} ({}): {}",
            field(asset, "language_code"),
            field(asset, "asset_type"),
            field(asset, "file_path")
        ));
    }
    out
}
