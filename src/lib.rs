//! Benchmark results dashboard: fetches result records, pivots them per
//! (dataset type, run metric) bucket and renders rank-colored tables.

pub mod colorize;
pub mod config;
pub mod error;
pub mod fetch;
pub mod grouper;
pub mod logging;
pub mod pivot;
pub mod record;
pub mod render;
pub mod shell;
pub mod targets;
pub mod units;
