//! Statistics Calculator Module
//! Per-year mean aggregation and per-company growth summaries.

use crate::data::{CompanyYear, YearlyCostStructure, YearlyFinancials};
use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// One company's performance over the years on record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanySummary {
    pub company: String,
    pub industry: String,
    pub revenue_start: f64,
    pub revenue_end: f64,
    pub avg_profit_margin: f64,
    pub revenue_growth_rate: f64,
}

/// Handles aggregate computations over dataset records.
pub struct StatsCalculator;

impl StatsCalculator {
    /// `numerator / denominator`, or 0 when the denominator is zero or the result is not finite.
    pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
        if denominator == 0.0 {
            return 0.0;
        }
        let ratio = numerator / denominator;
        if ratio.is_finite() {
            ratio
        } else {
            0.0
        }
    }

    /// Relative change from `start` to `end`. Not finite when `start` is zero.
    pub fn growth_rate(start: f64, end: f64) -> f64 {
        (end - start) / start
    }

    /// Group records by year and average revenue, expenses and profit.
    /// Years come out ascending.
    pub fn yearly_means<'a, I>(records: I) -> Vec<YearlyFinancials>
    where
        I: IntoIterator<Item = &'a CompanyYear>,
    {
        Self::group_by_year(records)
            .into_iter()
            .map(|(year, rows)| YearlyFinancials {
                year,
                revenue_usd: rows.iter().map(|r| r.revenue_usd).mean(),
                expenses_usd: rows.iter().map(|r| r.expenses_usd).mean(),
                profit_usd: rows.iter().map(|r| r.profit_usd).mean(),
            })
            .collect()
    }

    /// Group records by year and average the fixed/variable cost split.
    pub fn yearly_cost_means<'a, I>(records: I) -> Vec<YearlyCostStructure>
    where
        I: IntoIterator<Item = &'a CompanyYear>,
    {
        Self::group_by_year(records)
            .into_iter()
            .map(|(year, rows)| YearlyCostStructure {
                year,
                fixed_cost: rows.iter().map(|r| r.fixed_cost).mean(),
                variable_cost: rows.iter().map(|r| r.variable_cost).mean(),
            })
            .collect()
    }

    /// One summary per (company, industry) pair, ordered by company then industry.
    ///
    /// Start and end revenue are taken from the earliest and latest year on record.
    /// The growth rate is left unguarded: a zero starting revenue yields a non-finite value.
    pub fn company_summaries(records: &[CompanyYear]) -> Vec<CompanySummary> {
        let mut groups: BTreeMap<(&str, &str), Vec<&CompanyYear>> = BTreeMap::new();
        for record in records {
            groups
                .entry((record.company.as_str(), record.industry.as_str()))
                .or_default()
                .push(record);
        }

        groups
            .into_iter()
            .filter_map(|((company, industry), mut rows)| {
                rows.sort_by_key(|r| r.year);
                let revenue_start = rows.first()?.revenue_usd;
                let revenue_end = rows.last()?.revenue_usd;

                Some(CompanySummary {
                    company: company.to_string(),
                    industry: industry.to_string(),
                    revenue_start,
                    revenue_end,
                    avg_profit_margin: rows.iter().map(|r| r.profit_margin).mean(),
                    revenue_growth_rate: Self::growth_rate(revenue_start, revenue_end),
                })
            })
            .collect()
    }

    fn group_by_year<'a, I>(records: I) -> BTreeMap<i64, Vec<&'a CompanyYear>>
    where
        I: IntoIterator<Item = &'a CompanyYear>,
    {
        let mut by_year: BTreeMap<i64, Vec<&CompanyYear>> = BTreeMap::new();
        for record in records {
            by_year.entry(record.year).or_default().push(record);
        }
        by_year
    }
}
