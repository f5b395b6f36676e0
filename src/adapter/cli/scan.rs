//! Handler for `scan`.

use chrono::Utc;
use serde_json::json;

use super::command::ScanArgs;
use super::{opportunities, output};
use crate::adapter::JsonFileSource;
use crate::app::AppContext;
use crate::error::Result;

/// Execute `scan`: one detection cycle over the input file.
pub async fn execute(context: &AppContext, args: &ScanArgs) -> Result<()> {
    let source = JsonFileSource::new(&args.input);
    let report = context.pipeline().run_source(&source, Utc::now()).await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "scan",
            "input": source.path().display().to_string(),
            "report": report,
        }));
        return Ok(());
    }

    output::header("scan");
    output::section("Batch");
    output::field("Observations", report.observations);
    output::field("Retained", report.retained);
    output::field("Superseded quotes", report.superseded);
    output::field("Malformed", report.malformed);
    output::field("Invalid odds", report.invalid_odds);
    output::field("No sharp reference", report.unreferenced);
    output::field("Evaluated", report.evaluated);

    output::section("Lifecycle");
    output::field("Created", output::highlight(report.created));
    output::field("Refreshed", report.refreshed);
    output::field("Superseded", report.superseded_opportunities);
    output::field("Odds moved", report.odds_moved);
    output::field("Expired", report.expired);
    output::field("Snapshots pruned", report.snapshots_pruned);
    output::field("Duration", format!("{} ms", report.duration_ms));
    if report.failed > 0 {
        output::warning(&format!("{} tuple updates failed, see logs", report.failed));
    }

    if report.opportunities.is_empty() {
        output::note("No value opportunities in this batch.");
    } else {
        output::section("Value opportunities");
        output::block(&opportunities::table(&report.opportunities));
    }
    Ok(())
}
