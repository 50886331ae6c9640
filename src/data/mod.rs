//! Data module - CSV loading, aggregation queries and reshaping

mod dataset;
mod loader;
mod processor;

pub use dataset::{
    CompanyYear, FinancialDataset, QueryError, YearlyCostStructure, YearlyFinancials,
};
pub use loader::{DataLoader, LoaderError, DEFAULT_DATA_PATH};
pub use processor::{DataProcessor, LongRow, Metric, SeriesSource};

#[cfg(test)]
pub(crate) use dataset::tests::sample_dataset;
