//! Raid progression analysis engine.
//!
//! Turns downloaded raid-log documents into per-session summaries and
//! cross-session throughput statistics. The engine performs no I/O and keeps
//! no state between calls; every step is a function of already-deserialized
//! input.
//!
//! # Overview
//!
//! ## Session Workflow
//!
//! 1. **Filter and Deduplicate** ([`dedup`]): Drop trash pulls and re-logged
//!    copies of the same attempt
//! 2. **Reconstruct Phases** ([`reconstruct`]): Turn raw phase markers into
//!    named, bounded intervals
//! 3. **Load** ([`session::Session::from_document`]): Run the steps above,
//!    assign pull weights and collect diagnostics
//! 4. **Summarize** ([`summary::SessionSummary`]): Weighted averages and
//!    catalog-ordered phase distributions
//!
//! ## Throughput Workflow
//!
//! 1. **Materialize** ([`player_index::materialize_observations`]): Resolve
//!    damage tables into immutable per-phase observations
//! 2. **Index** ([`player_index::PlayerIndex`]): Fold observations into
//!    per-player maps
//! 3. **Aggregate** ([`cross_session::CrossSessionStatistics`]): Pool
//!    observations across sessions into confidence bounds
//!
//! Sessions sharing a progression tag are grouped by [`progression`], which
//! derives the series consumed by report rendering.
//!
//! # Error Handling
//!
//! Problems local to one pull, table or bucket never abort the surrounding
//! computation. They are returned as [`raidprog_core::Diagnostic`]s next to
//! the best-effort result and logged through `tracing`.
//!
//! # Examples
//!
//! ```no_run
//! use raidprog_analysis::{player_index::PlayerIndex, session::Session};
//! use raidprog_core::{EngineConfig, document::SessionDocument};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let json = "";
//!
//! let config = EngineConfig::default();
//! let doc: SessionDocument = serde_json::from_str(json)?;
//! let loaded = Session::from_document(&doc, &config)?;
//! for diagnostic in &loaded.diagnostics {
//!     eprintln!("{diagnostic}");
//! }
//!
//! let summary = loaded.session.summarize()?;
//! println!("weighted average: {:.2}s", summary.weighted_average_secs);
//!
//! let (index, _observations) = PlayerIndex::build(&loaded.session, &[]);
//! println!("{} players indexed", index.players().count());
//! # Ok(())
//! # }
//! ```

pub mod cross_session;
pub mod dedup;
pub mod player_index;
pub mod progression;
pub mod reconstruct;
pub mod session;
pub mod summary;

#[cfg(test)]
mod test_util;
