//! Intake, scoring, and demographic statistics for the purity test survey.
//!
//! The `survey` module owns submission records and the HTTP surface; the `stats`
//! module turns a [`survey::SubmissionStore`] into distributions and display tables.

pub mod config;
pub mod error;
pub mod stats;
pub mod survey;
pub mod telemetry;
