//! HTML output
//!
//! Each processed report becomes a single self-contained HTML page: the
//! graph data is serialized to JSON and substituted into a template that
//! carries the renderer.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rust_embed::RustEmbed;
use thiserror::Error;
use tracing::debug;

use crate::processor::{FileGraph, GraphData};

/// Placeholder replaced by the graph data
pub const DATA_PLACEHOLDER: &str = "{{{JARVIZ_DATA}}}";

/// Name of the built-in template
pub const DEFAULT_TEMPLATE: &str = "jarviz-graph.html";

/// Embedded static assets
#[derive(RustEmbed)]
#[folder = "web-assets/"]
pub(crate) struct Assets;

/// Errors that can occur while rendering or writing a graph page
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize graph data: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Template not found: {0}")]
    MissingTemplate(String),

    #[error("Template {0} has no JARVIZ_DATA placeholder")]
    MissingPlaceholder(String),
}

/// Load the HTML template: `custom` when given, the built-in one otherwise.
pub fn load_template(custom: Option<&Path>) -> Result<String, WriteError> {
    let (name, template) = match custom {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|source| WriteError::Io {
                path: path.display().to_string(),
                source,
            })?;
            (path.display().to_string(), content)
        }
        None => {
            let asset = Assets::get(DEFAULT_TEMPLATE)
                .ok_or_else(|| WriteError::MissingTemplate(DEFAULT_TEMPLATE.to_string()))?;
            let content = String::from_utf8_lossy(&asset.data).into_owned();
            (DEFAULT_TEMPLATE.to_string(), content)
        }
    };

    if !template.contains(DATA_PLACEHOLDER) {
        return Err(WriteError::MissingPlaceholder(name));
    }
    Ok(template)
}

/// Serialize `data` for embedding inside a `<script>` element.
///
/// `</` is written as `<\/`, which is the same JSON string but cannot close
/// the surrounding script.
pub fn data_to_script_json(data: &GraphData) -> Result<String, WriteError> {
    let json = serde_json::to_string(data)?;
    Ok(json.replace("</", "<\\/"))
}

/// Substitute the graph data into `template`.
pub fn render_html(template: &str, data: &GraphData) -> Result<String, WriteError> {
    let json = data_to_script_json(data)?;
    Ok(template.replacen(DATA_PLACEHOLDER, &json, 1))
}

/// Write `<output_dir>/<data_name>.html` and return its path.
pub fn write_graph(
    output_dir: &Path,
    graph: &FileGraph,
    template: &str,
) -> Result<PathBuf, WriteError> {
    let io_err = |path: &Path| {
        let path = path.display().to_string();
        move |source: io::Error| WriteError::Io { path, source }
    };

    fs::create_dir_all(output_dir).map_err(io_err(output_dir))?;

    let output_path = output_dir.join(format!("{}.html", graph.data_name));
    debug!("Writing {}", output_path.display());

    let html = render_html(template, &graph.data)?;
    fs::write(&output_path, html).map_err(io_err(&output_path))?;
    Ok(output_path)
}
