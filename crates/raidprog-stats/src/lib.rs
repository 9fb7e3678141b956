//! Statistical helpers for raid progression analysis.
//!
//! This crate provides the small numeric toolkit the analysis engine is built on:
//!
//! - **Descriptive statistics**: Count, min, max, mean, median, sample variance and standard deviation
//! - **Confidence bounds**: Mean with a `z * s / sqrt(n)` half-width and the resulting interval
//! - **Rounding**: Decimal rounding with an explicit midpoint strategy
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing samples
//! - [`confidence`]: Confidence bounds around a sample mean
//! - [`rounding`]: Fixed-decimal rounding with selectable midpoint behavior
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use raidprog_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! assert_eq!(stats.variance, 2.5);
//! ```
//!
//! ## Computing a confidence bound
//!
//! ```
//! use raidprog_stats::confidence::ConfidenceBound;
//!
//! let values = [10.0, 10.0, 10.0, 10.0];
//! let bound = ConfidenceBound::new(values, 1.96).unwrap();
//! assert_eq!(bound.mean, 10.0);
//! assert_eq!(bound.interval_width, 0.0);
//! ```
//!
//! ## Rounding to two decimals
//!
//! ```
//! use raidprog_stats::rounding::{MidpointRounding, round_to};
//!
//! assert_eq!(round_to(12.375, 2, MidpointRounding::ToPositiveInfinity), 12.38);
//! assert_eq!(round_to(-2.5, 0, MidpointRounding::AwayFromZero), -3.0);
//! ```

pub mod confidence;
pub mod descriptive;
pub mod rounding;
