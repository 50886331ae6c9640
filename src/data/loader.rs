//! CSV Data Loader Module
//! Reads the startup financials CSV with Polars, normalizes headers and drops incomplete rows.

use super::dataset::{CompanyYear, FinancialDataset};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Default dataset file name, resolved against the working directory.
pub const DEFAULT_DATA_PATH: &str = "saas_financial_market_dataset.csv";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Missing required column '{0}'")]
    MissingColumn(String),
}

/// Loads the financials CSV into a [`FinancialDataset`].
pub struct DataLoader;

impl DataLoader {
    /// Load and clean a CSV file.
    pub fn load_csv(path: impl AsRef<Path>) -> Result<FinancialDataset, LoaderError> {
        let path = path.as_ref();

        // Polars reports a missing file as a generic compute error; surface it as I/O instead.
        std::fs::metadata(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let df = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        info!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            "Loaded CSV"
        );

        Self::from_dataframe(&df)
    }

    /// Build a dataset from an already-parsed DataFrame.
    pub fn from_dataframe(df: &DataFrame) -> Result<FinancialDataset, LoaderError> {
        let headers = Self::normalized_headers(df);

        let company = Self::required_column(df, &headers, "company")?.cast(&DataType::String)?;
        let industry = Self::required_column(df, &headers, "industry")?.cast(&DataType::String)?;
        let year = Self::required_column(df, &headers, "year")?.cast(&DataType::Int64)?;
        let revenue = Self::required_column(df, &headers, "revenue_usd")?.cast(&DataType::Float64)?;
        let expenses =
            Self::required_column(df, &headers, "expenses_usd")?.cast(&DataType::Float64)?;
        let profit = Self::required_column(df, &headers, "profit_usd")?.cast(&DataType::Float64)?;

        let company = company.str()?;
        let industry = industry.str()?;
        let year = year.i64()?;
        let revenue = revenue.f64()?;
        let expenses = expenses.f64()?;
        let profit = profit.f64()?;

        let complete = Self::complete_rows(df)?;
        let mut records = Vec::with_capacity(df.height());

        for i in (0..df.height()).filter(|&i| complete[i]) {
            // A value that survives the null check can still fail the numeric cast.
            if let (Some(c), Some(ind), Some(y), Some(r), Some(e), Some(p)) = (
                company.get(i),
                industry.get(i),
                year.get(i),
                revenue.get(i),
                expenses.get(i),
                profit.get(i),
            ) {
                if r.is_nan() || e.is_nan() || p.is_nan() {
                    continue;
                }
                records.push(CompanyYear::new(c, ind, y, r, e, p));
            }
        }

        let dropped = df.height() - records.len();
        if dropped > 0 {
            debug!(dropped, "Dropped incomplete rows");
        }
        info!(rows = records.len(), "Dataset ready");

        Ok(FinancialDataset::from_records(records))
    }

    /// Lowercase snake_case header: trimmed, spaces to underscores.
    pub fn normalize_column_name(name: &str) -> String {
        name.trim().replace(' ', "_").to_lowercase()
    }

    /// Pairs of (normalized, original) column names in frame order.
    fn normalized_headers(df: &DataFrame) -> Vec<(String, String)> {
        df.get_column_names()
            .iter()
            .map(|s| {
                let original = s.to_string();
                (Self::normalize_column_name(&original), original)
            })
            .collect()
    }

    fn required_column<'a>(
        df: &'a DataFrame,
        headers: &[(String, String)],
        name: &str,
    ) -> Result<&'a Column, LoaderError> {
        let original = headers
            .iter()
            .find(|(normalized, _)| normalized == name)
            .map(|(_, original)| original.as_str())
            .ok_or_else(|| LoaderError::MissingColumn(name.to_string()))?;

        Ok(df.column(original)?)
    }

    /// Row mask that is false wherever any column holds a null or NaN.
    fn complete_rows(df: &DataFrame) -> Result<Vec<bool>, LoaderError> {
        let mut complete = vec![true; df.height()];

        for column in df.get_columns() {
            if column.null_count() == 0 && !column.dtype().is_float() {
                continue;
            }

            for (i, keep) in complete.iter_mut().enumerate() {
                if *keep {
                    *keep = !Self::is_missing(&column.get(i)?);
                }
            }
        }

        Ok(complete)
    }

    fn is_missing(value: &AnyValue) -> bool {
        match value {
            AnyValue::Null => true,
            AnyValue::Float32(v) => v.is_nan(),
            AnyValue::Float64(v) => v.is_nan(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_fixture(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "startup_trends_{}_{}.csv",
            name,
            std::process::id()
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn normalizes_header_names() {
        assert_eq!(DataLoader::normalize_column_name(" Revenue USD "), "revenue_usd");
        assert_eq!(DataLoader::normalize_column_name("Company"), "company");
        assert_eq!(DataLoader::normalize_column_name("profit_usd"), "profit_usd");
    }

    #[test]
    fn loads_and_drops_incomplete_rows() {
        let path = write_fixture(
            "incomplete",
            "Company, Industry ,Year,Revenue USD,Expenses USD,Profit USD,Country\n\
             Acme,SaaS,2020,100,80,20,US\n\
             Acme,SaaS,2021,,90,30,US\n\
             Bolt,Fintech,2020,200,150,50,\n\
             Bolt,Fintech,2021,190,170,20,DE\n",
        );

        let dataset = DataLoader::load_csv(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(dataset.len(), 2);
        let records = dataset.records();
        assert_eq!(records[0].company, "Acme");
        assert_eq!(records[0].year, 2020);
        assert_eq!(records[1].company, "Bolt");
        assert_eq!(records[1].year, 2021);
        assert!(records
            .iter()
            .all(|r| !r.company.is_empty() && !r.revenue_usd.is_nan()));
    }

    #[test]
    fn derives_margin_and_costs_on_load() {
        let path = write_fixture(
            "derived",
            "company,industry,year,revenue_usd,expenses_usd,profit_usd\n\
             Acme,SaaS,2020,1000,800,200\n\
             Ghost,SaaS,2020,0,50,-50\n",
        );

        let dataset = DataLoader::load_csv(&path).unwrap();
        fs::remove_file(&path).ok();

        let records = dataset.records();
        assert_eq!(records[0].profit_margin, 0.2);
        assert_eq!(records[1].profit_margin, 0.0);
        for record in records {
            assert!((record.fixed_cost + record.variable_cost - record.expenses_usd).abs() < 1e-9);
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = DataLoader::load_csv("/definitely/not/here/startups.csv");
        assert!(matches!(result, Err(LoaderError::Io { .. })));
    }

    #[test]
    fn missing_column_is_reported() {
        let path = write_fixture(
            "no_profit",
            "company,industry,year,revenue_usd,expenses_usd\n\
             Acme,SaaS,2020,100,80\n",
        );

        let result = DataLoader::load_csv(&path);
        fs::remove_file(&path).ok();

        match result {
            Err(LoaderError::MissingColumn(name)) => assert_eq!(name, "profit_usd"),
            other => panic!("expected missing column, got {:?}", other.map(|d| d.len())),
        }
    }
}
