//! Terminal output for CLI handlers.
//!
//! Every handler prints through here so `--json` and `--quiet` behave the
//! same across commands. JSON mode emits one object per line on stdout;
//! errors always go to stderr.

use std::fmt::Display;
use std::sync::{OnceLock, RwLock};

use owo_colors::OwoColorize;
use serde_json::json;

/// Output flags shared by all handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Emit machine-readable JSON instead of text.
    pub json: bool,
    /// Suppress everything but results and errors.
    pub quiet: bool,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }
}

static OUTPUT_CONFIG: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn config_cell() -> &'static RwLock<OutputConfig> {
    OUTPUT_CONFIG.get_or_init(|| RwLock::new(OutputConfig::default()))
}

fn read_config() -> OutputConfig {
    match config_cell().read() {
        Ok(config) => *config,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

/// Apply the global CLI flags. Call once, before any handler runs.
pub fn configure(config: OutputConfig) {
    match config_cell().write() {
        Ok(mut current) => *current = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

#[must_use]
pub fn is_json() -> bool {
    read_config().json
}

/// Text output is suppressed in quiet mode; JSON never is.
fn text_suppressed(config: OutputConfig) -> bool {
    !config.json && config.quiet
}

fn emit_json_line(kind: &str, payload: serde_json::Value) {
    println!("{}", json!({ "type": kind, "payload": payload }));
}

/// Print the command banner.
pub fn header(command: &str) {
    let config = read_config();
    if config.json || text_suppressed(config) {
        return;
    }
    println!(
        "{} {} {}",
        "vantedge".bold(),
        env!("CARGO_PKG_VERSION").dimmed(),
        command.cyan()
    );
}

/// Print a section title.
pub fn section(title: &str) {
    let config = read_config();
    if config.json {
        emit_json_line("section", json!({ "title": title }));
        return;
    }
    if text_suppressed(config) {
        return;
    }
    println!();
    println!("{}", title.bold());
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    let config = read_config();
    let value = value.to_string();
    if config.json {
        emit_json_line("field", json!({ "label": label, "value": value }));
        return;
    }
    if text_suppressed(config) {
        return;
    }
    println!("  {:<22} {}", label.dimmed(), value);
}

pub fn success(message: &str) {
    let config = read_config();
    if config.json {
        emit_json_line("success", json!({ "message": message }));
        return;
    }
    if text_suppressed(config) {
        return;
    }
    println!("  {} {}", "✓".green(), message);
}

/// Warnings print even in quiet mode.
pub fn warning(message: &str) {
    if is_json() {
        emit_json_line("warning", json!({ "message": message }));
        return;
    }
    println!("  {} {}", "⚠".yellow(), message);
}

pub fn error(message: &str) {
    if is_json() {
        eprintln!("{}", json!({ "type": "error", "payload": { "message": message } }));
        return;
    }
    eprintln!("  {} {}", "×".red(), message);
}

pub fn note(message: &str) {
    let config = read_config();
    if config.json {
        emit_json_line("note", json!({ "message": message }));
        return;
    }
    if text_suppressed(config) {
        return;
    }
    println!("  {}", message.dimmed());
}

/// Print a pre-rendered block (tables) indented.
///
/// Results are not chatter, so quiet mode still prints them.
pub fn block(content: &str) {
    for line in content.lines() {
        println!("  {line}");
    }
}

/// Print a command result object as a single JSON line.
pub fn json_output(value: serde_json::Value) {
    println!("{value}");
}

pub fn highlight(value: impl Display) -> String {
    let value = value.to_string();
    if is_json() {
        return value;
    }
    format!("{}", value.cyan())
}
