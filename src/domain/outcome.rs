//! Events and the binary outcomes wagered on them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::id::{EventId, OutcomeId};
use super::money::Amount;
use crate::error::LedgerError;

/// Bet type of an outcome, keyed by its stored `type_id`.
///
/// Selects the verifier that resolves the outcome from game data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeType {
    /// The home side scores no runs.
    NoRunsHome,
    /// The away side scores no runs.
    NoRunsAway,
    /// The home side wins the game.
    GameWinHome,
    /// The away side wins the game.
    GameWinAway,
}

impl OutcomeType {
    /// Every supported type, in key order.
    pub const ALL: [Self; 4] = [
        Self::NoRunsHome,
        Self::NoRunsAway,
        Self::GameWinHome,
        Self::GameWinAway,
    ];

    /// Stored `type_id` key.
    #[must_use]
    pub const fn type_id(self) -> i32 {
        match self {
            Self::NoRunsHome => 0,
            Self::NoRunsAway => 1,
            Self::GameWinHome => 2,
            Self::GameWinAway => 3,
        }
    }
}

impl TryFrom<i32> for OutcomeType {
    type Error = LedgerError;

    fn try_from(type_id: i32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|t| t.type_id() == type_id)
            .ok_or_else(|| LedgerError::validation("type_id", format!("unknown outcome type {type_id}")))
    }
}

/// A scheduled game that owns one or more outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    /// Identifier assigned by the schedule feed.
    pub guid: String,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub is_open: bool,
}

/// Fields needed to record a new event.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub guid: String,
    pub name: String,
    pub start_date: DateTime<Utc>,
}

/// A yes/no proposition resolved by the verifier selected by `type_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub id: OutcomeId,
    pub event_id: EventId,
    pub type_id: i32,
    pub name: String,
    pub open_date: DateTime<Utc>,
    pub close_date: DateTime<Utc>,
    /// Flips from true to false once, at expiry or resolution.
    pub is_open: bool,
    /// Sum of confirmed bid values. Never decreases.
    pub total_riding: Amount,
    /// `None` until resolved; otherwise whether the proposition held.
    pub result: Option<bool>,
}

impl Outcome {
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.result.is_some()
    }

    /// Whether the close date has passed at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.close_date
    }
}

/// Fields needed to record a new outcome.
#[derive(Debug, Clone)]
pub struct NewOutcome {
    pub event_id: EventId,
    pub type_id: i32,
    pub name: String,
    pub open_date: DateTime<Utc>,
    pub close_date: DateTime<Utc>,
}

/// Time window applied to an outcome's close date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloseWindow {
    /// No constraint.
    #[default]
    Any,
    /// `start <= close_date <= end`.
    Range {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// Closes on the given calendar day (UTC).
    On(NaiveDate),
    /// `close_date < t`.
    Before(DateTime<Utc>),
    /// `close_date >= t`.
    After(DateTime<Utc>),
}

/// Filter for the outcome listing query.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutcomeFilter {
    pub window: CloseWindow,
    pub is_open: Option<bool>,
}

impl OutcomeFilter {
    /// Whether an outcome passes this filter.
    #[must_use]
    pub fn matches(&self, outcome: &Outcome) -> bool {
        let in_window = match self.window {
            CloseWindow::Any => true,
            CloseWindow::Range { start, end } => {
                outcome.close_date >= start && outcome.close_date <= end
            }
            CloseWindow::On(day) => outcome.close_date.date_naive() == day,
            CloseWindow::Before(t) => outcome.close_date < t,
            CloseWindow::After(t) => outcome.close_date >= t,
        };
        in_window && self.is_open.map_or(true, |open| outcome.is_open == open)
    }
}
