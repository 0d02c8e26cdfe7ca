//! Core types for the persistence layer.
//!
//! - [`JobPosting`], [`ApplyOption`] - the data the dashboard aggregates over

mod job_posting;

pub use job_posting::{ApplyOption, JobPosting};
