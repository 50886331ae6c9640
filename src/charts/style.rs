//! Chart Style Module
//! One styling object for every chart builder, with light/dark presets and TOML overrides.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StyleError {
    #[error("Failed to load style configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Style validation error: {0}")]
    Validation(String),
}

/// Built-in style presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    #[default]
    Light,
    Dark,
}

/// Width and height of a single chart view, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    /// Range for Overall Average, Industry Average and Company, in that order.
    pub series: Vec<String>,
    /// Fill for points and bars outside the active selection.
    pub unselected: String,
    /// Named Vega color scheme for industries; Vega's default when absent.
    pub industry_scheme: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub size: f64,
    pub opacity: f64,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
}

/// Colors for the Vega-Lite `config` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub background: String,
    pub title_color: String,
    pub label_color: String,
    pub grid_color: String,
    pub domain_color: String,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            background: "#121212".to_string(),
            title_color: "#ffffff".to_string(),
            label_color: "#b8b8b8".to_string(),
            grid_color: "rgba(192, 192, 192, 0.1)".to_string(),
            domain_color: "rgba(192, 192, 192, 0.2)".to_string(),
        }
    }

    /// Render as a Vega-Lite top-level `config` object.
    pub fn to_vega_config(&self) -> Value {
        json!({
            "background": self.background,
            "title": {
                "color": self.title_color,
                "fontSize": 18,
                "fontWeight": 600,
                "anchor": "start"
            },
            "axis": {
                "domainColor": self.domain_color,
                "gridColor": self.grid_color,
                "labelColor": self.label_color,
                "tickColor": self.domain_color,
                "titleColor": self.title_color,
                "titleFontWeight": 500
            },
            "legend": {
                "labelColor": self.label_color,
                "titleColor": self.title_color,
                "titleFontWeight": 500
            },
            "view": {
                "stroke": self.domain_color
            }
        })
    }
}

/// Styling shared by every chart: colors, view sizes, marker look and theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartStyle {
    pub colors: Palette,
    pub line: Dimensions,
    pub scatter: Dimensions,
    pub bar: Dimensions,
    pub marker: MarkerStyle,
    pub theme: Option<Theme>,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self::light()
    }
}

impl ChartStyle {
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Light => Self::light(),
            Preset::Dark => Self::dark(),
        }
    }

    /// Plain style for embedding in a light page.
    pub fn light() -> Self {
        Self {
            colors: Palette {
                series: vec![
                    "#1f77b4".to_string(),
                    "mediumseagreen".to_string(),
                    "#FF8C00".to_string(),
                ],
                unselected: "lightgray".to_string(),
                industry_scheme: None,
            },
            line: Dimensions::new(550, 150),
            scatter: Dimensions::new(600, 400),
            bar: Dimensions::new(820, 440),
            marker: MarkerStyle {
                size: 90.0,
                opacity: 0.85,
                stroke: None,
                stroke_width: None,
            },
            theme: None,
        }
    }

    /// Bright series on a dark background with silver accents.
    pub fn dark() -> Self {
        Self {
            colors: Palette {
                series: vec![
                    "#4FC3F7".to_string(),
                    "#66BB6A".to_string(),
                    "#FFA726".to_string(),
                ],
                unselected: "#505050".to_string(),
                industry_scheme: Some("category20".to_string()),
            },
            line: Dimensions::new(1500, 400),
            scatter: Dimensions::new(1000, 400),
            bar: Dimensions::new(820, 440),
            marker: MarkerStyle {
                size: 60.0,
                opacity: 0.7,
                stroke: Some("#ffffff".to_string()),
                stroke_width: Some(0.5),
            },
            theme: Some(Theme::dark()),
        }
    }

    /// Layer a TOML file over a preset. Keys missing from the file keep the preset value.
    pub fn from_file(preset: Preset, path: &Path) -> Result<Self, StyleError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Self::preset(preset))?)
            .add_source(config::File::from(path).format(config::FileFormat::Toml))
            .build()?;

        let style = settings.try_deserialize::<ChartStyle>()?;
        style.validate()?;
        Ok(style)
    }

    pub fn validate(&self) -> Result<(), StyleError> {
        if self.colors.series.len() != 3 {
            return Err(StyleError::Validation(format!(
                "colors.series needs exactly 3 entries, got {}",
                self.colors.series.len()
            )));
        }

        for (name, dims) in [("line", self.line), ("scatter", self.scatter), ("bar", self.bar)] {
            if dims.width == 0 || dims.height == 0 {
                return Err(StyleError::Validation(format!(
                    "{name} dimensions must be positive"
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.marker.opacity) {
            return Err(StyleError::Validation(format!(
                "marker.opacity must be within [0, 1], got {}",
                self.marker.opacity
            )));
        }

        Ok(())
    }

    /// Vega-Lite `config` block, if a theme is set.
    pub fn vega_config(&self) -> Option<Value> {
        self.theme.as_ref().map(Theme::to_vega_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn presets_are_valid() {
        assert!(ChartStyle::light().validate().is_ok());
        assert!(ChartStyle::dark().validate().is_ok());
        assert!(ChartStyle::light().vega_config().is_none());
        assert_eq!(
            ChartStyle::dark().vega_config().unwrap()["background"],
            "#121212"
        );
    }

    #[test]
    fn validation_rejects_bad_palette() {
        let mut style = ChartStyle::light();
        style.colors.series.pop();
        assert!(matches!(style.validate(), Err(StyleError::Validation(_))));

        let mut style = ChartStyle::light();
        style.scatter.height = 0;
        assert!(matches!(style.validate(), Err(StyleError::Validation(_))));
    }

    #[test]
    fn file_overrides_preset() {
        let path = std::env::temp_dir().join(format!(
            "startup_trends_style_{}.toml",
            std::process::id()
        ));
        fs::write(
            &path,
            "[line]\nwidth = 900\nheight = 200\n\n[colors]\nunselected = \"#333333\"\n",
        )
        .unwrap();

        let style = ChartStyle::from_file(Preset::Dark, &path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(style.line, Dimensions::new(900, 200));
        assert_eq!(style.colors.unselected, "#333333");
        assert_eq!(style.colors.series, ChartStyle::dark().colors.series);
        assert_eq!(style.scatter, ChartStyle::dark().scatter);
    }
}
