//! tablescope - tabular data summarization service.
//!
//! Accepts CSV or spreadsheet uploads over HTTP, computes per-column
//! descriptive statistics, renders a Pearson-correlation heatmap of the
//! numeric columns, and serves the rendered chart back by identifier.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
