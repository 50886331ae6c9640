//! Charts module - Vega-Lite chart building and HTML rendering

mod builder;
mod renderer;
mod style;

pub use builder::{ChartBuilder, ChartError, ChartKind, ChartSpec};
pub use renderer::{HtmlRenderer, RenderError};
pub use style::{ChartStyle, Preset};
