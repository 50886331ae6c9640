//! Summary Report Module
//! Console tables for the aggregation queries.

use crate::data::{FinancialDataset, QueryError, YearlyCostStructure, YearlyFinancials};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{CellAlignment, Table};

pub struct SummaryReport;

impl SummaryReport {
    /// Overall averages and cost structure, plus the requested industry/company views.
    pub fn render(
        dataset: &FinancialDataset,
        industry: Option<&str>,
        company: Option<&str>,
    ) -> Result<String, QueryError> {
        let mut sections = vec![
            format!(
                "Dataset: {} rows, {} companies, {} industries",
                dataset.len(),
                dataset.companies().len(),
                dataset.industries().len()
            ),
            format!(
                "Overall average by year\n{}",
                Self::yearly_table(&dataset.overall_average())
            ),
            format!(
                "Average cost structure by year\n{}",
                Self::cost_table(&dataset.cost_structure())
            ),
        ];

        if let Some(name) = industry {
            let rows = dataset.industry_average(name)?;
            sections.push(format!(
                "Industry average: {name}\n{}",
                Self::yearly_table(&rows)
            ));
        }

        if let Some(name) = company {
            let rows = dataset.company_trend(name)?;
            sections.push(format!("Company trend: {name}\n{}", Self::yearly_table(&rows)));
        }

        Ok(sections.join("\n\n"))
    }

    pub fn yearly_table(rows: &[YearlyFinancials]) -> Table {
        let mut table = Self::table(&["Year", "Revenue (USD)", "Expenses (USD)", "Profit (USD)"]);
        for row in rows {
            table.add_row(vec![
                row.year.to_string(),
                format_usd(row.revenue_usd),
                format_usd(row.expenses_usd),
                format_usd(row.profit_usd),
            ]);
        }
        Self::align_numbers(&mut table);
        table
    }

    pub fn cost_table(rows: &[YearlyCostStructure]) -> Table {
        let mut table = Self::table(&["Year", "Fixed Cost (USD)", "Variable Cost (USD)"]);
        for row in rows {
            table.add_row(vec![
                row.year.to_string(),
                format_usd(row.fixed_cost),
                format_usd(row.variable_cost),
            ]);
        }
        Self::align_numbers(&mut table);
        table
    }

    fn table(header: &[&str]) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL).set_header(header.to_vec());
        table
    }

    fn align_numbers(table: &mut Table) {
        for column in table.column_iter_mut().skip(1) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
}

/// Two decimals with thousands separators, e.g. `-1,234,567.89`.
pub fn format_usd(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }

    let formatted = format!("{:.2}", value.abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let rounds_to_zero = !formatted.bytes().any(|b| matches!(b, b'1'..=b'9'));
    let sign = if value < 0.0 && !rounds_to_zero { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample_dataset;

    #[test]
    fn formats_usd_amounts() {
        assert_eq!(format_usd(0.0), "0.00");
        assert_eq!(format_usd(999.5), "999.50");
        assert_eq!(format_usd(1234567.891), "1,234,567.89");
        assert_eq!(format_usd(-20000.0), "-20,000.00");
        assert_eq!(format_usd(-0.004), "0.00");
        assert_eq!(format_usd(-0.005001), "-0.01");
        assert_eq!(format_usd(f64::NAN), "-");
    }

    #[test]
    fn report_includes_requested_views() {
        let report = SummaryReport::render(&sample_dataset(), Some("saas"), Some("BOLT")).unwrap();

        assert!(report.contains("Dataset: 9 rows, 3 companies, 2 industries"));
        assert!(report.contains("Industry average: saas"));
        assert!(report.contains("Company trend: BOLT"));
        assert!(report.contains("-20.00"));
    }

    #[test]
    fn report_surfaces_unknown_names() {
        let result = SummaryReport::render(&sample_dataset(), Some("Biotech"), None);
        assert_eq!(result, Err(QueryError::IndustryNotFound("Biotech".to_string())));
    }
}
