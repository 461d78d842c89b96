//! Configuration file support for jarviz-graph
//!
//! This module handles parsing `.jarviz.toml` configuration files that
//! select which reports are processed and how their graphs are built.
//!
//! ## Configuration File Format
//!
//! ```toml
//! # .jarviz.toml
//!
//! [input]
//! # Reports to pick up from the input directory
//! pattern = "*.jsonl"
//!
//! # Reports to skip (matched against the full path and the file name)
//! exclude = ["*-draft.jsonl"]
//!
//! [graph]
//! # Collapse repeated links between the same pair of nodes
//! dedupe_links = false
//!
//! [output]
//! # HTML template to use instead of the built-in one
//! template = "graph-template.html"
//! ```

use glob::Pattern;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::graph::GraphOptions;
use crate::processor::REPORT_EXTENSION;

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid glob pattern: {0}")]
    PatternError(String),
}

/// Input selection section
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Glob pattern, relative to the input directory
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// Reports to skip
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_pattern() -> String {
    format!("*.{}", REPORT_EXTENSION)
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            pattern: default_pattern(),
            exclude: Vec::new(),
        }
    }
}

/// Graph construction section
#[derive(Debug, Clone, Deserialize, Default)]
pub struct GraphConfig {
    #[serde(default)]
    pub dedupe_links: bool,
}

/// Output section
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OutputConfig {
    /// Custom HTML template, resolved relative to the config file
    #[serde(default)]
    pub template: Option<PathBuf>,
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct JarvizConfig {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub graph: GraphConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Compiled configuration with glob patterns
#[derive(Debug, Clone)]
pub struct CompiledConfig {
    /// Glob pattern for report discovery
    pub input_pattern: String,
    /// Patterns for reports to skip
    exclude_patterns: Vec<Pattern>,
    /// Whether duplicate links are collapsed
    pub dedupe_links: bool,
    /// Custom HTML template
    template: Option<PathBuf>,
}

impl CompiledConfig {
    /// Create a compiled config from raw config
    pub fn from_config(config: JarvizConfig) -> Result<Self, ConfigError> {
        Pattern::new(&config.input.pattern)
            .map_err(|e| ConfigError::PatternError(format!("{}: {}", config.input.pattern, e)))?;

        let exclude_patterns = config
            .input
            .exclude
            .iter()
            .map(|p| Pattern::new(p).map_err(|e| ConfigError::PatternError(format!("{}: {}", p, e))))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            input_pattern: config.input.pattern,
            exclude_patterns,
            dedupe_links: config.graph.dedupe_links,
            template: config.output.template,
        })
    }

    /// Create a config with all defaults
    pub fn empty() -> Self {
        Self {
            input_pattern: default_pattern(),
            exclude_patterns: Vec::new(),
            dedupe_links: false,
            template: None,
        }
    }

    /// Set dedupe_links (used by CLI --dedupe-links option)
    pub fn set_dedupe_links(&mut self, dedupe: bool) {
        self.dedupe_links = dedupe;
    }

    /// Check if a report should be skipped
    pub fn should_exclude(&self, path: &Path) -> bool {
        let full = path.to_string_lossy();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        self.exclude_patterns
            .iter()
            .any(|p| p.matches(&full) || p.matches(&file_name))
    }

    pub fn graph_options(&self) -> GraphOptions {
        GraphOptions {
            dedupe_links: self.dedupe_links,
        }
    }

    pub fn template_path(&self) -> Option<&Path> {
        self.template.as_deref()
    }
}

/// Load configuration, searching upward from `start_path` for a config file
pub fn load_config(start_path: &Path) -> Result<JarvizConfig, ConfigError> {
    match find_config_file(start_path) {
        Some(path) => load_config_file(&path),
        None => Ok(JarvizConfig::default()),
    }
}

/// Load one specific configuration file.
///
/// A relative template path is resolved against the file's directory.
pub fn load_config_file(path: &Path) -> Result<JarvizConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: JarvizConfig = toml::from_str(&content)?;

    let base = path.parent().unwrap_or(Path::new("."));
    config.output.template = config.output.template.take().map(|template| {
        if template.is_relative() {
            base.join(template)
        } else {
            template
        }
    });
    Ok(config)
}

/// Find the config file by searching up the directory tree
fn find_config_file(start_path: &Path) -> Option<PathBuf> {
    let config_names = [".jarviz.toml", "jarviz.toml"];

    let mut current = if start_path.is_file() {
        start_path.parent()?.to_path_buf()
    } else {
        start_path.to_path_buf()
    };

    loop {
        for name in &config_names {
            let config_path = current.join(name);
            if config_path.exists() {
                return Some(config_path);
            }
        }

        // Move to parent directory
        if let Some(parent) = current.parent() {
            current = parent.to_path_buf();
        } else {
            break;
        }
    }

    None
}

/// Load and compile configuration.
///
/// An explicit file wins; otherwise the search starts at `search_from`.
pub fn load_compiled_config(
    explicit: Option<&Path>,
    search_from: &Path,
) -> Result<CompiledConfig, ConfigError> {
    let config = match explicit {
        Some(path) => load_config_file(path)?,
        None => load_config(search_from)?,
    };
    CompiledConfig::from_config(config)
}
