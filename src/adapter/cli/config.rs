//! Handler for the `config` command group.

use serde_json::json;

use super::output;
use crate::app::Config;
use crate::error::Result;

/// Execute `config validate`. Loading already validated the file.
pub fn execute_validate(config: &Config) -> Result<()> {
    if output::is_json() {
        output::json_output(json!({
            "command": "config.validate",
            "valid": true,
            "database": config.database.url,
        }));
        return Ok(());
    }
    output::success("Configuration is valid");
    output::field("Database", &config.database.url);
    Ok(())
}

/// Execute `config show`.
pub fn execute_show(config: &Config) -> Result<()> {
    if output::is_json() {
        output::json_output(json!({
            "command": "config.show",
            "config": config,
        }));
        return Ok(());
    }

    let detection = &config.detection;
    output::section("Detection");
    output::field("Min edge %", detection.min_edge_threshold);
    output::field("Kelly multiplier", detection.kelly_multiplier);
    output::field("Kelly cap", detection.kelly_cap_fraction);
    output::field(
        "Odds move tolerance",
        detection
            .odds_move_tolerance
            .map_or_else(|| "(refresh in place)".to_string(), |t| t.to_string()),
    );

    output::section("Database");
    output::field("URL", &config.database.url);
    output::field(
        "Snapshot retention",
        format!("{}h", config.database.snapshot_retention_hours),
    );

    output::section("Logging");
    output::field("Level", &config.logging.level);
    output::field("Format", &config.logging.format);
    Ok(())
}
