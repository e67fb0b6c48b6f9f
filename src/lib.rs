//! Companion - live Composer manifest cache
//!
//! Tracks `composer.json` across workspace roots, reloads each root when
//! its manifest or settings change, and serves a memoized catalog of the
//! scripts every root can run.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod manifest;
pub mod ui;
pub mod workspace;

pub use error::{CompanionError, CompanionResult};
