//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without containing
//! business logic: configuration loading and the composition root that wires
//! the SQLite store, wallet gateway, and notifiers into the services.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for runtime wiring
//! - [`config`] - Configuration loading and validation

pub mod bootstrap;
pub mod config;
