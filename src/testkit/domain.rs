//! Builders for domain primitives used across tests.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use crate::domain::money::MINOR_UNITS_PER_MAJOR;
use crate::domain::{Amount, EventId, NewEvent, NewOutcome, Odds, OutcomeType};

/// Game data in the shape the baseball verifiers read.
#[must_use]
pub fn game_data(home_runs: u32, away_runs: u32) -> Value {
    json!({
        "home": { "name": "Mets" },
        "away": { "name": "Cubs" },
        "game": {
            "home": { "runs": home_runs },
            "away": { "runs": away_runs }
        }
    })
}

/// Game data with team names but no score yet.
#[must_use]
pub fn scheduled_game() -> Value {
    json!({
        "home": { "name": "Mets" },
        "away": { "name": "Cubs" }
    })
}

/// Event starting at `start` with a guid derived from `n`.
#[must_use]
pub fn event(n: u32, start: DateTime<Utc>) -> NewEvent {
    NewEvent {
        guid: format!("game-{n}"),
        name: format!("Cubs @ Mets #{n}"),
        start_date: start,
    }
}

/// Outcome open for a day from an hour ago.
#[must_use]
pub fn open_outcome(event_id: EventId, kind: OutcomeType) -> NewOutcome {
    let now = Utc::now();
    NewOutcome {
        event_id,
        type_id: kind.type_id(),
        name: format!("{kind:?}"),
        open_date: now - Duration::hours(1),
        close_date: now + Duration::days(1),
    }
}

/// Amount of `n` whole units.
#[must_use]
pub fn units(n: i64) -> Amount {
    Amount::from_minor(n * MINOR_UNITS_PER_MAJOR)
}

/// Odds from a decimal literal.
///
/// # Panics
/// Panics on odds outside the accepted range.
#[must_use]
pub fn odds(value: Decimal) -> Odds {
    Odds::try_new(value).expect("valid test odds")
}
