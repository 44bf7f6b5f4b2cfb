//! Baseball propositions.
//!
//! Game data is a JSON object shaped like the schedule feed:
//!
//! ```json
//! {
//!   "home": { "name": "Mets" },
//!   "away": { "name": "Cubs" },
//!   "game": { "home": { "runs": "3" }, "away": { "runs": 0 } }
//! }
//! ```
//!
//! Names come from the top-level team objects; results come from `game`.
//! Run counts may arrive as numbers or numeric strings.

use serde_json::Value;

use crate::domain::OutcomeType;
use crate::error::LedgerError;
use crate::port::outbound::verifier::OutcomeVerifier;

/// Which team a proposition is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    const fn key(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Away => "away",
        }
    }

    const fn other(self) -> Self {
        match self {
            Self::Home => Self::Away,
            Self::Away => Self::Home,
        }
    }

    fn team_name(self, data: &Value) -> Result<&str, LedgerError> {
        data.get(self.key())
            .and_then(|team| team.get("name"))
            .and_then(Value::as_str)
            .ok_or(LedgerError::IncompleteData {
                field: match self {
                    Self::Home => "home.name",
                    Self::Away => "away.name",
                },
            })
    }

    fn runs(self, data: &Value) -> Result<u32, LedgerError> {
        let missing = LedgerError::IncompleteData {
            field: match self {
                Self::Home => "game.home.runs",
                Self::Away => "game.away.runs",
            },
        };
        let runs = data
            .get("game")
            .and_then(|game| game.get(self.key()))
            .and_then(|team| team.get("runs"))
            .ok_or_else(|| missing.clone())?;
        match runs {
            Value::Number(n) => n.as_u64().and_then(|r| u32::try_from(r).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
        .ok_or(missing)
    }
}

/// "No Runs Scored": the side finishes without scoring.
#[derive(Debug, Clone, Copy)]
pub struct NoRunsVerifier {
    side: Side,
}

impl NoRunsVerifier {
    #[must_use]
    pub const fn new(side: Side) -> Self {
        Self { side }
    }
}

impl OutcomeVerifier for NoRunsVerifier {
    fn outcome_type(&self) -> OutcomeType {
        match self.side {
            Side::Home => OutcomeType::NoRunsHome,
            Side::Away => OutcomeType::NoRunsAway,
        }
    }

    fn name(&self, data: &Value) -> Result<String, LedgerError> {
        Ok(format!("No Runs Scored - {}", self.side.team_name(data)?))
    }

    fn verify(&self, data: &Value) -> Result<bool, LedgerError> {
        Ok(self.side.runs(data)? == 0)
    }
}

/// "Game Winner": the side outscores the other. Ties are a loss.
#[derive(Debug, Clone, Copy)]
pub struct GameWinVerifier {
    side: Side,
}

impl GameWinVerifier {
    #[must_use]
    pub const fn new(side: Side) -> Self {
        Self { side }
    }
}

impl OutcomeVerifier for GameWinVerifier {
    fn outcome_type(&self) -> OutcomeType {
        match self.side {
            Side::Home => OutcomeType::GameWinHome,
            Side::Away => OutcomeType::GameWinAway,
        }
    }

    fn name(&self, data: &Value) -> Result<String, LedgerError> {
        Ok(format!("Game Winner - {}", self.side.team_name(data)?))
    }

    fn verify(&self, data: &Value) -> Result<bool, LedgerError> {
        Ok(self.side.runs(data)? > self.side.other().runs(data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn final_score(home: Value, away: Value) -> Value {
        json!({
            "home": { "name": "Mets" },
            "away": { "name": "Cubs" },
            "game": { "home": { "runs": home }, "away": { "runs": away } }
        })
    }

    #[test]
    fn names_use_the_team() {
        let data = final_score(json!(0), json!(0));
        assert_eq!(
            NoRunsVerifier::new(Side::Home).name(&data).unwrap(),
            "No Runs Scored - Mets"
        );
        assert_eq!(
            GameWinVerifier::new(Side::Away).name(&data).unwrap(),
            "Game Winner - Cubs"
        );
    }

    #[test]
    fn no_runs_checks_one_side() {
        let data = final_score(json!("0"), json!(4));
        assert!(NoRunsVerifier::new(Side::Home).verify(&data).unwrap());
        assert!(!NoRunsVerifier::new(Side::Away).verify(&data).unwrap());
    }

    #[test]
    fn game_winner_needs_more_runs() {
        let data = final_score(json!(5), json!("3"));
        assert!(GameWinVerifier::new(Side::Home).verify(&data).unwrap());
        assert!(!GameWinVerifier::new(Side::Away).verify(&data).unwrap());

        let tie = final_score(json!(2), json!(2));
        assert!(!GameWinVerifier::new(Side::Home).verify(&tie).unwrap());
        assert!(!GameWinVerifier::new(Side::Away).verify(&tie).unwrap());
    }

    #[test]
    fn missing_fields_are_incomplete() {
        let data = json!({ "home": { "name": "Mets" } });
        assert_eq!(
            NoRunsVerifier::new(Side::Home).verify(&data).unwrap_err(),
            LedgerError::IncompleteData {
                field: "game.home.runs"
            }
        );
        assert_eq!(
            NoRunsVerifier::new(Side::Away).name(&data).unwrap_err(),
            LedgerError::IncompleteData { field: "away.name" }
        );

        let garbled = final_score(json!("lots"), json!(1));
        assert!(GameWinVerifier::new(Side::Home).verify(&garbled).is_err());
    }
}
