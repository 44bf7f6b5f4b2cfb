//! Outcome verifiers fed by game data.

mod baseball;

pub use baseball::{GameWinVerifier, NoRunsVerifier, Side};
