//! Chart Builder Module
//! Builds Vega-Lite chart specifications from the dataset, styled by a [`ChartStyle`].

use super::style::ChartStyle;
use crate::data::{DataProcessor, FinancialDataset, LongRow, Metric, SeriesSource};
use crate::stats::{CompanySummary, StatsCalculator};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.20.1.json";

pub const INDUSTRY_PARAM: &str = "industry_param";
pub const COMPANY_PARAM: &str = "company_param";
pub const BRUSH_PARAM: &str = "company_brush";
pub const INDUSTRY_PICK_PARAM: &str = "industry_pick";
pub const SORT_ORDER_PARAM: &str = "sort_order";

/// Bar ordering key: negated count while the toggle reads descending.
pub const SORT_KEY_EXPR: &str =
    "sort_order == 'ascending' ? datum.count : -datum.count";

/// Row-level visibility rule for the line chart dropdowns.
pub const LINE_FILTER_EXPR: &str = "(datum.Source == 'Overall Average') || \
    (datum.Source == 'Industry Average' && datum.industry == industry_param) || \
    (datum.Source == 'Company' && datum.company == company_param)";

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Dataset has no industries or companies to chart")]
    EmptyDataset,
    #[error("Failed to serialize chart data: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Which chart a specification describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Scatter,
    IndustryDistribution,
    CostStructure,
}

impl ChartKind {
    pub fn file_name(self) -> &'static str {
        match self {
            ChartKind::Line => "line_chart.html",
            ChartKind::Scatter => "scatter_plot.html",
            ChartKind::IndustryDistribution => "industry_distribution.html",
            ChartKind::CostStructure => "cost_structure.html",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::Line => "Startup Financial Trends: Overall vs Industry vs Company",
            ChartKind::Scatter => "Profit Margin vs Revenue Growth by Company",
            ChartKind::IndustryDistribution => "Industry Distribution of Startups",
            ChartKind::CostStructure => "Average Cost Structure by Year",
        }
    }
}

/// A complete Vega-Lite specification ready to embed.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub spec: Value,
}

/// Long-format input of the line chart plus its dropdown options.
#[derive(Debug, Clone)]
pub struct LineChartTable {
    pub rows: Vec<LongRow>,
    pub industries: Vec<String>,
    pub companies: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
struct CostRow {
    year: i64,
    #[serde(rename = "Component")]
    component: &'static str,
    #[serde(rename = "Cost")]
    cost: f64,
}

/// Builds every chart from one style configuration.
#[derive(Debug, Clone, Default)]
pub struct ChartBuilder {
    style: ChartStyle,
}

impl ChartBuilder {
    pub fn new(style: ChartStyle) -> Self {
        Self { style }
    }

    /// Overall, per-industry and per-company yearly averages as one long table.
    ///
    /// Company series average rows whose company equals the name exactly and carry
    /// the industry of that company's first row.
    pub fn line_chart_table(dataset: &FinancialDataset) -> Result<LineChartTable, ChartError> {
        if dataset.is_empty() {
            return Err(ChartError::EmptyDataset);
        }
        let industries = dataset.industries();
        let companies = dataset.companies();

        let mut rows = DataProcessor::melt_yearly(
            &dataset.overall_average(),
            SeriesSource::OverallAverage,
            "",
            "",
        );

        for industry in &industries {
            // Every name comes from the dataset itself, so the lookup cannot miss.
            if let Ok(average) = dataset.industry_average(industry) {
                rows.extend(DataProcessor::melt_yearly(
                    &average,
                    SeriesSource::IndustryAverage,
                    industry,
                    "",
                ));
            }
        }

        for company in &companies {
            let records: Vec<_> = dataset
                .records()
                .iter()
                .filter(|r| &r.company == company)
                .collect();
            let industry = records.first().map(|r| r.industry.as_str()).unwrap_or("");
            let average = StatsCalculator::yearly_means(records.iter().copied());
            rows.extend(DataProcessor::melt_yearly(
                &average,
                SeriesSource::Company,
                industry,
                company,
            ));
        }

        DataProcessor::apply_metric_labels(&mut rows);
        debug!(
            rows = rows.len(),
            industries = industries.len(),
            companies = companies.len(),
            "Built line chart table"
        );

        Ok(LineChartTable {
            rows,
            industries,
            companies,
        })
    }

    /// Faceted line chart: one row per metric, dropdowns for industry and company.
    pub fn build_line_chart(&self, dataset: &FinancialDataset) -> Result<ChartSpec, ChartError> {
        let table = Self::line_chart_table(dataset)?;

        let industry_param = Self::select_param(INDUSTRY_PARAM, "Industry: ", &table.industries);
        let company_param = Self::select_param(COMPANY_PARAM, "Company: ", &table.companies);
        let facet_order = Self::facet_order(&table.rows);
        let sources: Vec<&str> = SeriesSource::ALL.iter().map(|s| s.label()).collect();

        let spec = json!({
            "$schema": VEGA_LITE_SCHEMA,
            "title": ChartKind::Line.title(),
            "data": { "values": serde_json::to_value(&table.rows)? },
            "params": [industry_param, company_param],
            "facet": {
                "row": {
                    "field": "Metric",
                    "type": "nominal",
                    "title": null,
                    "sort": facet_order
                }
            },
            "spec": {
                "width": self.style.line.width,
                "height": self.style.line.height,
                "transform": [{ "filter": LINE_FILTER_EXPR }],
                "mark": { "type": "line", "point": true, "strokeWidth": 3 },
                "encoding": {
                    "x": {
                        "field": "year",
                        "type": "ordinal",
                        "title": "Year",
                        "axis": { "labelAngle": 0 }
                    },
                    "y": {
                        "field": "Value",
                        "type": "quantitative",
                        "title": "Amount (USD)",
                        "scale": { "zero": false },
                        "axis": { "format": "~s" }
                    },
                    "color": {
                        "field": "Source",
                        "type": "nominal",
                        "title": "Series",
                        "scale": { "domain": sources, "range": self.style.colors.series }
                    },
                    "tooltip": [
                        { "field": "year", "type": "ordinal" },
                        { "field": "Source", "type": "nominal" },
                        { "field": "Metric", "type": "nominal" },
                        { "field": "Value", "type": "quantitative" }
                    ]
                }
            },
            "resolve": { "scale": { "y": "independent" } }
        });

        Ok(self.finish(ChartKind::Line, spec))
    }

    /// Company summaries with non-finite growth rates and margins replaced by 0.
    pub fn scatter_points(dataset: &FinancialDataset) -> Vec<CompanySummary> {
        let mut summaries = StatsCalculator::company_summaries(dataset.records());

        for summary in &mut summaries {
            if !summary.revenue_growth_rate.is_finite() {
                warn!(
                    company = %summary.company,
                    revenue_start = summary.revenue_start,
                    "Non-finite revenue growth rate, plotting as 0"
                );
                summary.revenue_growth_rate = 0.0;
            }
            if !summary.avg_profit_margin.is_finite() {
                warn!(company = %summary.company, "Non-finite profit margin, plotting as 0");
                summary.avg_profit_margin = 0.0;
            }
        }

        summaries
    }

    /// Growth vs margin per company, colored by industry, with a brush that grays out the rest.
    pub fn build_scatter_plot(&self, dataset: &FinancialDataset) -> Result<ChartSpec, ChartError> {
        let points = Self::scatter_points(dataset);
        debug!(points = points.len(), "Built scatter points");

        let mut mark = json!({
            "type": "circle",
            "size": self.style.marker.size,
            "opacity": self.style.marker.opacity
        });
        if let Some(stroke) = &self.style.marker.stroke {
            mark["stroke"] = json!(stroke);
        }
        if let Some(width) = self.style.marker.stroke_width {
            mark["strokeWidth"] = json!(width);
        }

        let mut selected_color = json!({
            "param": BRUSH_PARAM,
            "field": "industry",
            "type": "nominal",
            "legend": { "title": "Industry" }
        });
        if let Some(scheme) = &self.style.colors.industry_scheme {
            selected_color["scale"] = json!({ "scheme": scheme });
        }

        let spec = json!({
            "$schema": VEGA_LITE_SCHEMA,
            "title": ChartKind::Scatter.title(),
            "width": self.style.scatter.width,
            "height": self.style.scatter.height,
            "data": { "values": serde_json::to_value(&points)? },
            "params": [{ "name": BRUSH_PARAM, "select": { "type": "interval" } }],
            "mark": mark,
            "encoding": {
                "x": {
                    "field": "revenue_growth_rate",
                    "type": "quantitative",
                    "title": "Revenue Growth Rate",
                    "axis": { "format": "%" }
                },
                "y": {
                    "field": "avg_profit_margin",
                    "type": "quantitative",
                    "title": "Average Profit Margin",
                    "axis": { "format": "%" }
                },
                "color": {
                    "condition": selected_color,
                    "value": self.style.colors.unselected
                },
                "tooltip": [
                    { "field": "company", "type": "nominal" },
                    { "field": "industry", "type": "nominal" },
                    {
                        "field": "revenue_growth_rate",
                        "type": "quantitative",
                        "title": "Revenue Growth",
                        "format": ".1%"
                    },
                    {
                        "field": "avg_profit_margin",
                        "type": "quantitative",
                        "title": "Avg Profit Margin",
                        "format": ".1%"
                    }
                ]
            }
        });

        Ok(self.finish(ChartKind::Scatter, spec))
    }

    /// Startups (rows) per industry with a high/low sort toggle; clicking a bar highlights it.
    pub fn build_industry_distribution(
        &self,
        dataset: &FinancialDataset,
    ) -> Result<ChartSpec, ChartError> {
        if dataset.is_empty() {
            return Err(ChartError::EmptyDataset);
        }
        let counts = dataset.industry_counts();

        let mut color = json!({ "field": "industry", "type": "nominal", "legend": null });
        if let Some(scheme) = &self.style.colors.industry_scheme {
            color["scale"] = json!({ "scheme": scheme });
        }

        let spec = json!({
            "$schema": VEGA_LITE_SCHEMA,
            "title": ChartKind::IndustryDistribution.title(),
            "width": self.style.bar.width,
            "height": self.style.bar.height,
            "data": { "values": serde_json::to_value(&counts)? },
            "params": [
                {
                    "name": INDUSTRY_PICK_PARAM,
                    "select": { "type": "point", "fields": ["industry"], "toggle": true }
                },
                {
                    "name": SORT_ORDER_PARAM,
                    "value": "descending",
                    "bind": {
                        "input": "radio",
                        "options": ["descending", "ascending"],
                        "labels": ["High → Low", "Low → High"],
                        "name": "Sort: "
                    }
                }
            ],
            "transform": [{ "calculate": SORT_KEY_EXPR, "as": "sort_key" }],
            "mark": { "type": "bar", "cornerRadiusTopLeft": 4, "cornerRadiusTopRight": 4 },
            "encoding": {
                "x": {
                    "field": "industry",
                    "type": "nominal",
                    "title": null,
                    "sort": { "field": "sort_key", "op": "min", "order": "ascending" },
                    "axis": { "labelAngle": -45 }
                },
                "y": { "field": "count", "type": "quantitative", "title": "Number of Startups" },
                "color": color,
                "opacity": {
                    "condition": { "param": INDUSTRY_PICK_PARAM, "empty": true, "value": 1.0 },
                    "value": 0.35
                },
                "tooltip": [
                    { "field": "industry", "type": "nominal", "title": "Industry" },
                    { "field": "count", "type": "quantitative", "title": "Startups", "format": "," }
                ]
            }
        });

        Ok(self.finish(ChartKind::IndustryDistribution, spec))
    }

    /// Mean fixed vs variable cost per year as stacked bars.
    pub fn build_cost_structure(&self, dataset: &FinancialDataset) -> Result<ChartSpec, ChartError> {
        let rows: Vec<CostRow> = dataset
            .cost_structure()
            .into_iter()
            .flat_map(|c| {
                [
                    CostRow {
                        year: c.year,
                        component: "Fixed Cost",
                        cost: c.fixed_cost,
                    },
                    CostRow {
                        year: c.year,
                        component: "Variable Cost",
                        cost: c.variable_cost,
                    },
                ]
            })
            .collect();
        if rows.is_empty() {
            return Err(ChartError::EmptyDataset);
        }

        let spec = json!({
            "$schema": VEGA_LITE_SCHEMA,
            "title": ChartKind::CostStructure.title(),
            "width": self.style.bar.width,
            "height": self.style.bar.height,
            "data": { "values": serde_json::to_value(&rows)? },
            "mark": { "type": "bar" },
            "encoding": {
                "x": { "field": "year", "type": "ordinal", "title": "Year", "axis": { "labelAngle": 0 } },
                "y": {
                    "field": "Cost",
                    "type": "quantitative",
                    "stack": "zero",
                    "title": "Average Cost (USD)",
                    "axis": { "format": "~s" }
                },
                "color": {
                    "field": "Component",
                    "type": "nominal",
                    "title": "Cost Type",
                    "scale": {
                        "domain": ["Fixed Cost", "Variable Cost"],
                        "range": self.style.colors.series[..2]
                    }
                },
                "tooltip": [
                    { "field": "year", "type": "ordinal" },
                    { "field": "Component", "type": "nominal" },
                    { "field": "Cost", "type": "quantitative", "format": ",.0f" }
                ]
            }
        });

        Ok(self.finish(ChartKind::CostStructure, spec))
    }

    /// Metric facets present in the table, in display order.
    fn facet_order(rows: &[LongRow]) -> Vec<String> {
        let present = DataProcessor::get_metrics(rows);
        Metric::DISPLAY_ORDER
            .iter()
            .map(|m| m.label().to_string())
            .filter(|label| present.contains(label))
            .collect()
    }

    /// Dropdown-bound parameter defaulting to the first option.
    fn select_param(name: &str, label: &str, options: &[String]) -> Value {
        json!({
            "name": name,
            "value": options.first(),
            "bind": { "input": "select", "options": options, "name": label }
        })
    }

    fn finish(&self, kind: ChartKind, mut spec: Value) -> ChartSpec {
        if let (Some(config), Some(obj)) = (self.style.vega_config(), spec.as_object_mut()) {
            obj.insert("config".to_string(), config);
        }
        ChartSpec { kind, spec }
    }
}
