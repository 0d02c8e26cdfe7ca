//! Core store abstraction.
//!
//! - [`AnalyticsStore`] - executes assembled statements and returns rows
//! - [`Row`] - a result row as a JSON object
//!
//! Backends live under [`crate::backends`].

pub mod storage;

pub use storage::{AnalyticsStore, Row, column_values};
