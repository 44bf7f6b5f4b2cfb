//! Infrastructure configuration modules.

pub mod logging;
pub mod retention;
pub mod settings;
pub mod settlement;
pub mod wallet;
