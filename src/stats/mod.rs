//! Stats module - Aggregations and company summaries

mod calculator;

pub use calculator::{CompanySummary, StatsCalculator};
