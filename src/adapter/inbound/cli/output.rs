//! CLI output formatting.
//!
//! Human-readable lines on stdout by default, or one JSON document per
//! command in `--json` mode. Errors always go to stderr.

use std::fmt::Display;
use std::sync::{OnceLock, RwLock};

use serde_json::json;

/// Runtime output configuration shared by CLI handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Emit machine-readable JSON output instead of human-readable text.
    pub json: bool,
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

/// Apply output settings from global CLI flags.
pub fn configure(config: OutputConfig) {
    match config_cell().write() {
        Ok(mut current) => *current = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

/// Return whether machine-readable JSON output is enabled.
#[must_use]
pub fn is_json() -> bool {
    read_config().json
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    println!("  {label:<12} {value}");
}

/// Print a success line.
pub fn success(message: &str) {
    println!("  ✓ {message}");
}

/// Print a section header.
pub fn section(title: &str) {
    println!();
    println!("{title}");
}

/// Print an error line.
pub fn error(message: &str) {
    if is_json() {
        eprintln!("{}", json!({ "type": "error", "message": message }));
        return;
    }
    eprintln!("  × {message}");
}

/// Print pre-formatted multi-line content (tables).
pub fn lines(content: &str) {
    for line in content.lines() {
        println!("  {line}");
    }
}

/// Print a JSON document.
pub fn json_output(value: serde_json::Value) {
    println!("{value}");
}
