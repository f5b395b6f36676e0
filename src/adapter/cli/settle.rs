//! Handler for `settle`.

use chrono::Utc;
use serde_json::json;

use super::command::SettleArgs;
use super::output;
use crate::app::AppContext;
use crate::domain::{MatchKey, OpportunityKey};
use crate::error::Result;

/// Execute `settle`.
pub async fn execute(context: &AppContext, args: &SettleArgs) -> Result<()> {
    let key = OpportunityKey::new(
        MatchKey::from_raw(args.match_key.trim()),
        args.market.clone(),
        args.selection.clone(),
        args.bookmaker.clone(),
    );
    let settled = context
        .lifecycle()
        .settle(&key, args.outcome, Utc::now())
        .await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "settle",
            "opportunity": settled,
        }));
        return Ok(());
    }

    output::header("settle");
    output::success(&format!("{key} settled as {}", settled.status));
    output::field("Opportunity", settled.id);
    output::field("Edge %", settled.edge_percent.round_dp(2));
    Ok(())
}
