//! Financial Dataset Module
//! Immutable in-memory table of company/year records and its aggregation queries.

use crate::stats::StatsCalculator;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Share of expenses treated as fixed cost; the remainder is variable.
pub const FIXED_COST_SHARE: f64 = 0.4;
pub const VARIABLE_COST_SHARE: f64 = 0.6;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Industry '{0}' not found in dataset.")]
    IndustryNotFound(String),
    #[error("Company '{0}' not found in dataset.")]
    CompanyNotFound(String),
}

/// One cleaned CSV row plus its derived metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyYear {
    pub company: String,
    pub industry: String,
    pub year: i64,
    pub revenue_usd: f64,
    pub expenses_usd: f64,
    pub profit_usd: f64,
    pub profit_margin: f64,
    pub fixed_cost: f64,
    pub variable_cost: f64,
}

impl CompanyYear {
    /// Build a record and compute profit margin and the fixed/variable cost split.
    pub fn new(
        company: impl Into<String>,
        industry: impl Into<String>,
        year: i64,
        revenue_usd: f64,
        expenses_usd: f64,
        profit_usd: f64,
    ) -> Self {
        Self {
            company: company.into(),
            industry: industry.into(),
            year,
            revenue_usd,
            expenses_usd,
            profit_usd,
            profit_margin: StatsCalculator::safe_ratio(profit_usd, revenue_usd),
            fixed_cost: expenses_usd * FIXED_COST_SHARE,
            variable_cost: expenses_usd * VARIABLE_COST_SHARE,
        }
    }
}

/// Revenue, expenses and profit for one year.
///
/// Holds per-year means for aggregate views and raw values for a company trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyFinancials {
    pub year: i64,
    pub revenue_usd: f64,
    pub expenses_usd: f64,
    pub profit_usd: f64,
}

/// Mean fixed and variable cost for one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyCostStructure {
    pub year: i64,
    pub fixed_cost: f64,
    pub variable_cost: f64,
}

/// Number of rows on file for an industry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndustryCount {
    pub industry: String,
    pub count: usize,
}

/// Cleaned startup financials. Read-only after construction.
#[derive(Debug, Clone, Default)]
pub struct FinancialDataset {
    records: Vec<CompanyYear>,
}

impl FinancialDataset {
    pub fn from_records(records: Vec<CompanyYear>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[CompanyYear] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Average revenue, expenses, and profit across all companies by year.
    pub fn overall_average(&self) -> Vec<YearlyFinancials> {
        StatsCalculator::yearly_means(&self.records)
    }

    /// Average revenue, expenses, and profit within one industry by year.
    /// The industry name is matched case-insensitively.
    pub fn industry_average(&self, industry: &str) -> Result<Vec<YearlyFinancials>, QueryError> {
        let needle = industry.to_lowercase();
        let subset: Vec<&CompanyYear> = self
            .records
            .iter()
            .filter(|r| r.industry.to_lowercase() == needle)
            .collect();

        if subset.is_empty() {
            return Err(QueryError::IndustryNotFound(industry.to_string()));
        }

        Ok(StatsCalculator::yearly_means(subset))
    }

    /// Raw yearly rows for a single company, in file order.
    /// The company name is matched case-insensitively.
    pub fn company_trend(&self, company: &str) -> Result<Vec<YearlyFinancials>, QueryError> {
        let needle = company.to_lowercase();
        let trend: Vec<YearlyFinancials> = self
            .records
            .iter()
            .filter(|r| r.company.to_lowercase() == needle)
            .map(|r| YearlyFinancials {
                year: r.year,
                revenue_usd: r.revenue_usd,
                expenses_usd: r.expenses_usd,
                profit_usd: r.profit_usd,
            })
            .collect();

        if trend.is_empty() {
            return Err(QueryError::CompanyNotFound(company.to_string()));
        }

        Ok(trend)
    }

    /// Average fixed vs variable cost by year.
    pub fn cost_structure(&self) -> Vec<YearlyCostStructure> {
        StatsCalculator::yearly_cost_means(&self.records)
    }

    /// Distinct industry names, sorted.
    pub fn industries(&self) -> Vec<String> {
        Self::sorted_unique(self.records.iter().map(|r| r.industry.as_str()))
    }

    /// Distinct company names, sorted.
    pub fn companies(&self) -> Vec<String> {
        Self::sorted_unique(self.records.iter().map(|r| r.company.as_str()))
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> Vec<i64> {
        self.records
            .iter()
            .map(|r| r.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Rows per industry, largest first (ties broken by name).
    pub fn industry_counts(&self) -> Vec<IndustryCount> {
        let mut rows: BTreeMap<&str, usize> = BTreeMap::new();
        for record in &self.records {
            *rows.entry(record.industry.as_str()).or_default() += 1;
        }

        let mut counts: Vec<IndustryCount> = rows
            .into_iter()
            .map(|(industry, count)| IndustryCount {
                industry: industry.to_string(),
                count,
            })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.industry.cmp(&b.industry)));
        counts
    }

    fn sorted_unique<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
        names
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_dataset() -> FinancialDataset {
        FinancialDataset::from_records(vec![
            CompanyYear::new("Acme", "SaaS", 2020, 100.0, 80.0, 20.0),
            CompanyYear::new("Acme", "SaaS", 2021, 120.0, 90.0, 30.0),
            CompanyYear::new("Acme", "SaaS", 2022, 150.0, 100.0, 50.0),
            CompanyYear::new("Bolt", "Fintech", 2020, 200.0, 150.0, 50.0),
            CompanyYear::new("Bolt", "Fintech", 2021, 190.0, 170.0, 20.0),
            CompanyYear::new("Bolt", "Fintech", 2022, 180.0, 200.0, -20.0),
            CompanyYear::new("Cove", "SaaS", 2020, 300.0, 200.0, 100.0),
            CompanyYear::new("Cove", "SaaS", 2021, 330.0, 210.0, 120.0),
            CompanyYear::new("Cove", "SaaS", 2022, 360.0, 220.0, 140.0),
        ])
    }

    #[test]
    fn derived_metrics_follow_fixed_split() {
        let record = CompanyYear::new("Acme", "SaaS", 2020, 1000.0, 800.0, 200.0);
        assert_eq!(record.profit_margin, 0.2);
        assert_eq!(record.fixed_cost, 320.0);
        assert_eq!(record.variable_cost, 480.0);
        assert_eq!(record.fixed_cost + record.variable_cost, record.expenses_usd);
    }

    #[test]
    fn zero_revenue_margin_falls_back_to_zero() {
        let record = CompanyYear::new("Ghost", "SaaS", 2020, 0.0, 50.0, -50.0);
        assert_eq!(record.profit_margin, 0.0);

        let empty = CompanyYear::new("Ghost", "SaaS", 2021, 0.0, 0.0, 0.0);
        assert_eq!(empty.profit_margin, 0.0);
    }

    #[test]
    fn overall_average_covers_every_year() {
        let dataset = sample_dataset();
        let overall = dataset.overall_average();

        let years: Vec<i64> = overall.iter().map(|y| y.year).collect();
        assert_eq!(years, dataset.years());
        assert_eq!(overall[0].revenue_usd, 200.0);
        assert!((overall[0].expenses_usd - 430.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn industry_average_is_case_insensitive() {
        let dataset = sample_dataset();
        let upper = dataset.industry_average("SAAS").unwrap();
        let lower = dataset.industry_average("saas").unwrap();

        assert_eq!(upper, lower);
        assert_eq!(upper.len(), 3);
        assert_eq!(upper[0].revenue_usd, 200.0);
        assert_eq!(upper[2].profit_usd, 95.0);
    }

    #[test]
    fn unknown_industry_is_not_found() {
        let dataset = sample_dataset();
        assert_eq!(
            dataset.industry_average("nonexistent"),
            Err(QueryError::IndustryNotFound("nonexistent".to_string()))
        );
    }

    #[test]
    fn company_trend_returns_raw_rows() {
        let dataset = sample_dataset();
        let trend = dataset.company_trend("bolt").unwrap();

        assert_eq!(trend.len(), 3);
        assert_eq!(trend[2].year, 2022);
        assert_eq!(trend[2].profit_usd, -20.0);
        assert!(matches!(
            dataset.company_trend("Nobody"),
            Err(QueryError::CompanyNotFound(_))
        ));
    }

    #[test]
    fn cost_structure_averages_split() {
        let dataset = sample_dataset();
        let costs = dataset.cost_structure();

        assert_eq!(costs.len(), 3);
        let expected_expenses = (80.0 + 150.0 + 200.0) / 3.0;
        assert!((costs[0].fixed_cost - expected_expenses * 0.4).abs() < 1e-9);
        assert!((costs[0].variable_cost - expected_expenses * 0.6).abs() < 1e-9);
    }

    #[test]
    fn industry_counts_largest_first() {
        let dataset = sample_dataset();
        let counts = dataset.industry_counts();

        assert_eq!(counts[0].industry, "SaaS");
        assert_eq!(counts[0].count, 6);
        assert_eq!(counts[1].industry, "Fintech");
        assert_eq!(counts[1].count, 3);
        assert_eq!(counts.iter().map(|c| c.count).sum::<usize>(), dataset.len());
    }

    #[test]
    fn names_are_sorted_and_distinct() {
        let dataset = sample_dataset();
        assert_eq!(dataset.industries(), vec!["Fintech", "SaaS"]);
        assert_eq!(dataset.companies(), vec!["Acme", "Bolt", "Cove"]);
    }
}
