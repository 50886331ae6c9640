//! Chart Export Module
//! Loads the dataset once, builds every chart and writes each as a standalone HTML file.

use crate::charts::{ChartBuilder, ChartError, ChartSpec, ChartStyle, HtmlRenderer, RenderError};
use crate::data::{DataLoader, FinancialDataset, LoaderError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Chart(#[from] ChartError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

pub struct ChartExporter {
    builder: ChartBuilder,
}

impl ChartExporter {
    pub fn new(style: ChartStyle) -> Self {
        Self {
            builder: ChartBuilder::new(style),
        }
    }

    /// Load `data_path` and write all charts into `out_dir`. Returns the files written.
    pub fn export_charts(&self, data_path: &Path, out_dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
        let dataset = DataLoader::load_csv(data_path)?;
        self.export_dataset(&dataset, out_dir)
    }

    /// Write all charts for an already-loaded dataset.
    pub fn export_dataset(
        &self,
        dataset: &FinancialDataset,
        out_dir: &Path,
    ) -> Result<Vec<PathBuf>, ExportError> {
        let charts = self.build_all(dataset)?;

        let mut written = Vec::with_capacity(charts.len());
        for chart in &charts {
            let path = out_dir.join(chart.kind.file_name());
            HtmlRenderer::write(chart, &path)?;
            info!(chart = ?chart.kind, path = %path.display(), "Saved chart");
            written.push(path);
        }

        Ok(written)
    }

    /// Line chart and scatter plot first, then the supplementary charts.
    pub fn build_all(&self, dataset: &FinancialDataset) -> Result<Vec<ChartSpec>, ChartError> {
        Ok(vec![
            self.builder.build_line_chart(dataset)?,
            self.builder.build_scatter_plot(dataset)?,
            self.builder.build_industry_distribution(dataset)?,
            self.builder.build_cost_structure(dataset)?,
        ])
    }
}

/// Console confirmation listing every file name written.
pub fn confirmation_message(written: &[PathBuf]) -> String {
    let names: Vec<String> = written
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .collect();

    match names.split_last() {
        None => "No charts saved".to_string(),
        Some((only, [])) => format!("Saved {}", only),
        Some((last, rest)) => format!("Saved {} and {}", rest.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartKind;
    use crate::data::sample_dataset;
    use std::fs;

    #[test]
    fn writes_every_chart() {
        let out_dir = std::env::temp_dir().join(format!("startup_trends_export_{}", std::process::id()));
        fs::create_dir_all(&out_dir).unwrap();

        let exporter = ChartExporter::new(ChartStyle::light());
        let written = exporter.export_dataset(&sample_dataset(), &out_dir).unwrap();

        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                ChartKind::Line.file_name(),
                ChartKind::Scatter.file_name(),
                ChartKind::IndustryDistribution.file_name(),
                ChartKind::CostStructure.file_name(),
            ]
        );

        let line = fs::read_to_string(&written[0]).unwrap();
        assert!(line.contains("industry_param"));
        fs::remove_dir_all(&out_dir).ok();
    }

    #[test]
    fn missing_input_aborts_export() {
        let exporter = ChartExporter::new(ChartStyle::light());
        let result = exporter.export_charts(Path::new("/no/such/data.csv"), &std::env::temp_dir());
        assert!(matches!(result, Err(ExportError::Loader(LoaderError::Io { .. }))));
    }

    #[test]
    fn confirmation_lists_files() {
        let written = vec![
            PathBuf::from("out/line_chart.html"),
            PathBuf::from("out/scatter_plot.html"),
        ];
        assert_eq!(
            confirmation_message(&written),
            "Saved line_chart.html and scatter_plot.html"
        );
        assert_eq!(confirmation_message(&written[..1]), "Saved line_chart.html");
        assert_eq!(confirmation_message(&[]), "No charts saved");
    }
}
