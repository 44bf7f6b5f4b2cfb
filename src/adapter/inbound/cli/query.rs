//! Handlers for the read-only `spread` and `outcomes` commands.

use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::{OutcomesArgs, SpreadArgs};
use crate::adapter::inbound::cli::output;
use crate::domain::{CloseWindow, Outcome, OutcomeFilter, OutcomeId};
use crate::error::Result;
use crate::infrastructure::bootstrap::Ledger;
use crate::infrastructure::config::settings::Config;

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "ID")]
    id: i32,
    #[tabled(rename = "Event")]
    event: i32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Closes")]
    closes: String,
    #[tabled(rename = "Open")]
    open: bool,
    #[tabled(rename = "Riding")]
    riding: String,
    #[tabled(rename = "Result")]
    result: String,
}

impl From<&Outcome> for OutcomeRow {
    fn from(outcome: &Outcome) -> Self {
        Self {
            id: outcome.id.value(),
            event: outcome.event_id.value(),
            name: outcome.name.clone(),
            closes: outcome.close_date.format("%Y-%m-%d %H:%M").to_string(),
            open: outcome.is_open,
            riding: outcome.total_riding.to_string(),
            result: outcome
                .result
                .map_or_else(|| "-".to_string(), |r| r.to_string()),
        }
    }
}

/// Build the listing filter from command flags.
pub(crate) fn filter(args: &OutcomesArgs) -> OutcomeFilter {
    let window = match (args.on, args.after, args.before) {
        (Some(day), _, _) => CloseWindow::On(day),
        (None, Some(start), Some(end)) => CloseWindow::Range { start, end },
        (None, Some(start), None) => CloseWindow::After(start),
        (None, None, Some(end)) => CloseWindow::Before(end),
        (None, None, None) => CloseWindow::Any,
    };
    OutcomeFilter {
        window,
        is_open: args.open,
    }
}

/// Execute `spread --outcome N`. Always prints JSON.
pub fn execute_spread(config: &Config, args: &SpreadArgs) -> Result<()> {
    let ledger = Ledger::open(config)?;
    let spread = ledger.query().spread(OutcomeId::new(args.outcome))?;
    output::json_output(serde_json::to_value(&spread)?);
    Ok(())
}

/// Execute `outcomes`.
pub fn execute_outcomes(config: &Config, args: &OutcomesArgs) -> Result<()> {
    let ledger = Ledger::open(config)?;
    let outcomes = ledger.query().outcomes(&filter(args))?;

    if output::is_json() {
        output::json_output(json!({
            "command": "outcomes",
            "outcomes": outcomes,
        }));
        return Ok(());
    }

    output::section(&format!("{} outcome(s)", outcomes.len()));
    if outcomes.is_empty() {
        return Ok(());
    }
    let rows: Vec<OutcomeRow> = outcomes.iter().map(OutcomeRow::from).collect();
    output::lines(&Table::new(rows).to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn flags_map_to_close_windows() {
        let t0 = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2026, 5, 2, 0, 0, 0).unwrap();

        assert_eq!(filter(&OutcomesArgs::default()).window, CloseWindow::Any);
        assert_eq!(
            filter(&OutcomesArgs {
                after: Some(t0),
                ..OutcomesArgs::default()
            })
            .window,
            CloseWindow::After(t0)
        );
        assert_eq!(
            filter(&OutcomesArgs {
                after: Some(t0),
                before: Some(t1),
                open: Some(true),
                ..OutcomesArgs::default()
            })
            .window,
            CloseWindow::Range { start: t0, end: t1 }
        );
        let day = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let f = filter(&OutcomesArgs {
            on: Some(day),
            open: Some(false),
            ..OutcomesArgs::default()
        });
        assert_eq!(f.window, CloseWindow::On(day));
        assert_eq!(f.is_open, Some(false));
    }
}
