//! Handler for `opportunities`.

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use tabled::{Table, Tabled};

use super::command::OpportunitiesArgs;
use super::output;
use crate::app::AppContext;
use crate::domain::ValueOpportunity;
use crate::error::Result;
use crate::port::{OpportunityQuery, OpportunityStore};

#[derive(Tabled)]
struct OpportunityRow {
    #[tabled(rename = "Match")]
    match_name: String,
    #[tabled(rename = "Kickoff (UTC)")]
    kickoff: String,
    #[tabled(rename = "Market")]
    market: String,
    #[tabled(rename = "Pick")]
    selection: String,
    #[tabled(rename = "Bookmaker")]
    bookmaker: String,
    #[tabled(rename = "Odds")]
    odds: String,
    #[tabled(rename = "Sharp")]
    sharp: String,
    #[tabled(rename = "Edge %")]
    edge: String,
    #[tabled(rename = "Stake")]
    stake: String,
}

impl From<&ValueOpportunity> for OpportunityRow {
    fn from(opportunity: &ValueOpportunity) -> Self {
        Self {
            match_name: opportunity.match_name.clone(),
            kickoff: opportunity.kickoff_time.format("%Y-%m-%d %H:%M").to_string(),
            market: opportunity.market.clone(),
            selection: opportunity.selection.clone(),
            bookmaker: opportunity.soft_bookmaker.clone(),
            odds: opportunity.soft_odds.to_string(),
            sharp: match (&opportunity.sharp_bookmaker, opportunity.sharp_odds) {
                (Some(book), Some(odds)) => format!("{odds} ({book})"),
                _ => "-".to_string(),
            },
            edge: opportunity.edge_percent.round_dp(2).to_string(),
            stake: format!("{}%", (opportunity.kelly_fraction * Decimal::ONE_HUNDRED).round_dp(2)),
        }
    }
}

/// Render opportunities as a table.
pub(super) fn table(opportunities: &[ValueOpportunity]) -> String {
    Table::new(opportunities.iter().map(OpportunityRow::from)).to_string()
}

/// Execute `opportunities`.
pub async fn execute(context: &AppContext, args: &OpportunitiesArgs) -> Result<()> {
    let query = OpportunityQuery {
        min_edge: args.min_edge,
        sport: args.sport.clone(),
        soft_bookmaker: args.bookmaker.clone(),
        kickoff_after: Some(Utc::now()),
        limit: args.limit,
    };
    let opportunities = context.store().query_active(&query).await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "opportunities",
            "count": opportunities.len(),
            "opportunities": opportunities,
        }));
        return Ok(());
    }

    output::header("opportunities");
    if opportunities.is_empty() {
        output::note("No active opportunities match the filters.");
        return Ok(());
    }
    output::section(&format!("Active opportunities ({})", opportunities.len()));
    output::block(&table(&opportunities));
    Ok(())
}
