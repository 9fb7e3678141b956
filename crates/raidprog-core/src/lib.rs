//! Data model and reference tables for raid progression analysis.
//!
//! The analysis engine consumes already-downloaded log documents
//! ([`document`]), resolves names and reference durations through immutable
//! tables ([`catalog`]) built from [`config::EngineConfig`], and reports
//! problems using the taxonomy in [`error`].

pub use self::{catalog::*, config::*, error::*, ids::*};

pub mod catalog;
pub mod config;
pub mod document;
pub mod error;
pub mod ids;
pub mod time;
