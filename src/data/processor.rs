//! Data Processor Module
//! Reshapes yearly aggregates into long format (melt) tagged by series source.

use super::dataset::YearlyFinancials;
use serde::Serialize;

/// Financial metric carried by a long-format row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Revenue,
    Expenses,
    Profit,
}

impl Metric {
    /// Melt order: matches the column order of the aggregate tables.
    pub const ALL: [Metric; 3] = [Metric::Revenue, Metric::Expenses, Metric::Profit];

    /// Facet order on the line chart.
    pub const DISPLAY_ORDER: [Metric; 3] = [Metric::Revenue, Metric::Profit, Metric::Expenses];

    /// Source column name.
    pub fn code(self) -> &'static str {
        match self {
            Metric::Revenue => "revenue_usd",
            Metric::Expenses => "expenses_usd",
            Metric::Profit => "profit_usd",
        }
    }

    /// Facet header label.
    pub fn label(self) -> &'static str {
        match self {
            Metric::Revenue => "Revenue",
            Metric::Expenses => "Expenses",
            Metric::Profit => "Profit",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.code() == code)
    }

    fn value(self, row: &YearlyFinancials) -> f64 {
        match self {
            Metric::Revenue => row.revenue_usd,
            Metric::Expenses => row.expenses_usd,
            Metric::Profit => row.profit_usd,
        }
    }
}

/// Provenance tag of a line-chart series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SeriesSource {
    #[serde(rename = "Overall Average")]
    OverallAverage,
    #[serde(rename = "Industry Average")]
    IndustryAverage,
    #[serde(rename = "Company")]
    Company,
}

impl SeriesSource {
    pub const ALL: [SeriesSource; 3] = [
        SeriesSource::OverallAverage,
        SeriesSource::IndustryAverage,
        SeriesSource::Company,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SeriesSource::OverallAverage => "Overall Average",
            SeriesSource::IndustryAverage => "Industry Average",
            SeriesSource::Company => "Company",
        }
    }
}

/// One (year, metric, value) triple with its provenance.
///
/// Serialized field names are the ones the chart encodings refer to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongRow {
    pub year: i64,
    #[serde(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Value")]
    pub value: f64,
    #[serde(rename = "Source")]
    pub source: SeriesSource,
    pub industry: String,
    pub company: String,
}

/// Handles reshaping operations for chart data.
pub struct DataProcessor;

impl DataProcessor {
    /// Melt a yearly table into long format.
    ///
    /// Output is grouped by metric (all years of revenue, then expenses, then profit)
    /// and carries the raw metric code in `metric`.
    pub fn melt_yearly(
        rows: &[YearlyFinancials],
        source: SeriesSource,
        industry: &str,
        company: &str,
    ) -> Vec<LongRow> {
        let mut long = Vec::with_capacity(rows.len() * Metric::ALL.len());

        for metric in Metric::ALL {
            for row in rows {
                long.push(LongRow {
                    year: row.year,
                    metric: metric.code().to_string(),
                    value: metric.value(row),
                    source,
                    industry: industry.to_string(),
                    company: company.to_string(),
                });
            }
        }

        long
    }

    /// Replace metric codes with their display labels. Unknown values are left as-is.
    pub fn apply_metric_labels(rows: &mut [LongRow]) {
        for row in rows.iter_mut() {
            if let Some(metric) = Metric::from_code(&row.metric) {
                row.metric = metric.label().to_string();
            }
        }
    }

    /// Unique metric labels present in a long table, in first-seen order.
    pub fn get_metrics(rows: &[LongRow]) -> Vec<String> {
        let mut metrics: Vec<String> = Vec::new();
        for row in rows {
            if !metrics.contains(&row.metric) {
                metrics.push(row.metric.clone());
            }
        }
        metrics
    }
}
