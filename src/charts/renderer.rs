//! Chart Document Renderer
//! Wraps a Vega-Lite specification into a standalone HTML page.
//!
//! Layout:
//! 1. `<head>` loads vega, vega-lite and vega-embed from the jsDelivr CDN
//! 2. `<body>` holds a single `#vis` container
//! 3. An inline script embeds the JSON spec and hands it to `vegaEmbed`

use super::builder::ChartSpec;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const VEGA_URL: &str = "https://cdn.jsdelivr.net/npm/vega@5";
const VEGA_LITE_URL: &str = "https://cdn.jsdelivr.net/npm/vega-lite@5.20.1";
const VEGA_EMBED_URL: &str = "https://cdn.jsdelivr.net/npm/vega-embed@6";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to serialize chart spec: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub struct HtmlRenderer;

impl HtmlRenderer {
    /// Render a self-contained HTML document for one chart.
    pub fn render_document(chart: &ChartSpec) -> Result<String, RenderError> {
        let spec_json = Self::script_safe(&serde_json::to_string(&chart.spec)?);
        let title = Self::escape_html(chart.kind.title());

        Ok(format!(
            r##"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <style>
    #vis.vega-embed {{
      width: 100%;
      display: flex;
    }}

    #vis.vega-embed details,
    #vis.vega-embed details summary {{
      position: relative;
    }}
  </style>
  <script type="text/javascript" src="{VEGA_URL}"></script>
  <script type="text/javascript" src="{VEGA_LITE_URL}"></script>
  <script type="text/javascript" src="{VEGA_EMBED_URL}"></script>
</head>
<body>
  <div id="vis"></div>
  <script>
    (function(vegaEmbed) {{
      var spec = {spec_json};
      var embedOpt = {{"mode": "vega-lite"}};

      function showError(el, error){{
          el.innerHTML = ('<div style="color:red;">'
                          + '<p>JavaScript Error: ' + error.message + '</p>'
                          + "<p>This usually means there's a typo in your chart specification. "
                          + "See the javascript console for the full traceback.</p>"
                          + '</div>');
          throw error;
      }}
      const el = document.getElementById('vis');
      vegaEmbed("#vis", spec, embedOpt)
        .catch(error => showError(el, error));
    }})(vegaEmbed);
  </script>
</body>
</html>
"##
        ))
    }

    /// Render a chart and write it to `path`, replacing any existing file.
    pub fn write(chart: &ChartSpec, path: &Path) -> Result<(), RenderError> {
        let html = Self::render_document(chart)?;
        fs::write(path, &html).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = html.len(), "Wrote chart document");
        Ok(())
    }

    /// Keep embedded JSON from closing the surrounding script element.
    fn script_safe(json: &str) -> String {
        json.replace("</", "<\\/")
    }

    fn escape_html(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartKind;
    use serde_json::json;

    fn chart_with(value: &str) -> ChartSpec {
        ChartSpec {
            kind: ChartKind::Scatter,
            spec: json!({ "data": { "values": [{ "company": value }] } }),
        }
    }

    #[test]
    fn document_embeds_spec() {
        let html = HtmlRenderer::render_document(&chart_with("Acme")).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"var spec = {"data":{"values":[{"company":"Acme"}]}};"#));
        assert!(html.contains(VEGA_EMBED_URL));
        assert!(html.contains("<title>Profit Margin vs Revenue Growth by Company</title>"));
    }

    #[test]
    fn data_cannot_close_script_tag() {
        let html = HtmlRenderer::render_document(&chart_with("</script><b>x</b>")).unwrap();

        assert!(!html.contains("</script><b>"));
        assert!(html.contains(r#"<\/script><b>x<\/b>"#));
    }

    #[test]
    fn write_reports_bad_path() {
        let path = Path::new("/definitely/not/here/chart.html");
        let result = HtmlRenderer::write(&chart_with("Acme"), path);
        assert!(matches!(result, Err(RenderError::Io { .. })));
    }
}
