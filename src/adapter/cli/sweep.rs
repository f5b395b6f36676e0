//! Handler for `sweep`.

use chrono::Utc;
use serde_json::json;

use super::output;
use crate::app::AppContext;
use crate::error::Result;

/// Execute `sweep`.
pub async fn execute(context: &AppContext) -> Result<()> {
    let sweep = context.lifecycle().sweep_expired(Utc::now()).await?;
    let expired = &sweep.expired;

    if output::is_json() {
        output::json_output(json!({
            "command": "sweep",
            "expired": expired.len(),
            "failed": sweep.failed,
            "opportunities": expired,
        }));
        return Ok(());
    }

    output::header("sweep");
    if expired.is_empty() {
        output::note("Nothing to expire.");
    } else {
        output::success(&format!("Expired {} opportunities", expired.len()));
        for opportunity in expired {
            output::note(&opportunity.key().to_string());
        }
    }
    if sweep.failed > 0 {
        output::warning(&format!("{} expiries failed, see logs", sweep.failed));
    }
    Ok(())
}
