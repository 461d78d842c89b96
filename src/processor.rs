//! Per-file processing
//!
//! Reads a Jarviz `.jsonl` report line by line and feeds every decoded record
//! into one [`GraphAccumulator`] per grouping mode. Files are independent of
//! each other, so a directory of reports is processed in parallel with Rayon.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::CompiledConfig;
use crate::graph::{GraphAccumulator, GraphError, GraphOptions, Projection};
use crate::naming::GroupBy;
use crate::record::{RecordError, parse_record};
use crate::writer::{WriteError, load_template, write_graph};

/// File extension of Jarviz coupling reports
pub const REPORT_EXTENSION: &str = "jsonl";

/// Errors that can occur while processing report files
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Could not find any files matching {pattern}")]
    NoInputFiles { pattern: String },

    #[error("Invalid input pattern {pattern}: {message}")]
    Pattern { pattern: String, message: String },

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Both projections of one report, keyed by grouping mode in the JSON output
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphData {
    #[serde(rename = "sourceClass")]
    pub source_class: Projection,
    #[serde(rename = "sourceClass-targetClass")]
    pub source_and_target_class: Projection,
}

impl GraphData {
    pub fn get(&self, group_by: GroupBy) -> &Projection {
        match group_by {
            GroupBy::SourceClass => &self.source_class,
            GroupBy::SourceAndTargetClass => &self.source_and_target_class,
        }
    }
}

/// A line that could not be decoded and was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseFailure {
    /// 1-based line number within the file
    pub line_number: usize,
    pub line: String,
    pub message: String,
}

/// Result of processing one report
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileGraph {
    pub data: GraphData,
    pub data_name: String,
    pub lines_processed: usize,
    #[serde(skip)]
    pub failures: Vec<ParseFailure>,
}

/// Summary of one written report, as returned by [`process_all`]
#[derive(Debug, Clone)]
pub struct FileReport {
    pub data_name: String,
    pub output_path: PathBuf,
    pub lines_processed: usize,
    pub failures: usize,
}

/// Drives the two grouping-mode accumulators over one stream of records.
#[derive(Debug)]
pub struct GraphBuilder {
    by_source_class: GraphAccumulator,
    by_source_and_target_class: GraphAccumulator,
    lines_processed: usize,
    lines_seen: usize,
    failures: Vec<ParseFailure>,
}

impl GraphBuilder {
    pub fn new(options: GraphOptions) -> Self {
        Self {
            by_source_class: GraphAccumulator::with_options(GroupBy::SourceClass, options),
            by_source_and_target_class: GraphAccumulator::with_options(
                GroupBy::SourceAndTargetClass,
                options,
            ),
            lines_processed: 0,
            lines_seen: 0,
            failures: Vec::new(),
        }
    }

    /// Parse and ingest one raw line. Malformed lines are recorded and skipped.
    pub fn push_line(&mut self, line: &str) -> Result<(), GraphError> {
        self.lines_seen += 1;

        let record = match parse_record(line) {
            Ok(record) => record,
            Err(RecordError::MalformedRecord { line, source }) => {
                warn!(
                    line_number = self.lines_seen,
                    "Failed to parse JSON line: \"{}\". Continuing...", line
                );
                self.failures.push(ParseFailure {
                    line_number: self.lines_seen,
                    line,
                    message: source.to_string(),
                });
                return Ok(());
            }
        };

        self.by_source_class.ingest(&record)?;
        self.by_source_and_target_class.ingest(&record)?;
        self.lines_processed += 1;
        Ok(())
    }

    pub fn lines_processed(&self) -> usize {
        self.lines_processed
    }

    pub fn failures(&self) -> &[ParseFailure] {
        &self.failures
    }

    /// Finalize both projections.
    pub fn finish(mut self, data_name: impl Into<String>) -> Result<FileGraph, GraphError> {
        let data = GraphData {
            source_class: self.by_source_class.finalize()?,
            source_and_target_class: self.by_source_and_target_class.finalize()?,
        };
        Ok(FileGraph {
            data,
            data_name: data_name.into(),
            lines_processed: self.lines_processed,
            failures: self.failures,
        })
    }
}

/// Build both projections from any line source.
///
/// Lines are decoded lossily: invalid UTF-8 becomes U+FFFD, so such a line
/// fails to parse on its own instead of ending the read.
pub fn process_reader<R: BufRead>(
    data_name: &str,
    mut reader: R,
    options: GraphOptions,
) -> Result<FileGraph, ProcessError> {
    let mut builder = GraphBuilder::new(options);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| ProcessError::Io {
                path: data_name.to_string(),
                source,
            })?;
        if read == 0 {
            break;
        }
        builder.push_line(&String::from_utf8_lossy(trim_line_ending(&buf)))?;
    }
    Ok(builder.finish(data_name)?)
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Build both projections from a report file on disk.
pub fn process_file(path: &Path, options: GraphOptions) -> Result<FileGraph, ProcessError> {
    info!("Processing {}...", path.display());

    let file = File::open(path).map_err(|source| ProcessError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let name = data_name(path);
    let graph = process_reader(&name, BufReader::new(file), options).map_err(|e| match e {
        ProcessError::Io { source, .. } => ProcessError::Io {
            path: path.display().to_string(),
            source,
        },
        other => other,
    })?;

    if graph.lines_processed == 0 {
        warn!("No coupling records found in {}", path.display());
    }
    Ok(graph)
}

/// Name used for the generated artifact: the file name without `.jsonl`.
pub fn data_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match path.extension().and_then(|e| e.to_str()) {
        Some(REPORT_EXTENSION) => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or(file_name),
        _ => file_name,
    }
}

/// Report files directly under `input_dir`, sorted, minus excluded ones.
pub fn discover_files(
    input_dir: &Path,
    config: &CompiledConfig,
) -> Result<Vec<PathBuf>, ProcessError> {
    let pattern = input_dir.join(&config.input_pattern);
    let pattern = pattern.to_string_lossy().into_owned();

    let entries = glob::glob(&pattern).map_err(|e| ProcessError::Pattern {
        pattern: pattern.clone(),
        message: e.to_string(),
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Skipping unreadable path: {}", e);
                None
            }
        })
        .filter(|path| path.is_file())
        .filter(|path| {
            let excluded = config.should_exclude(path);
            if excluded {
                debug!("Excluding {}", path.display());
            }
            !excluded
        })
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(ProcessError::NoInputFiles { pattern });
    }
    debug!("Discovered {} report file(s) in {}", files.len(), input_dir.display());
    Ok(files)
}

/// Process every report under `input_dir` and write one HTML graph per file
/// into `output_dir`.
///
/// Files are processed in parallel. A failing file is logged and reported
/// without affecting the others.
pub fn process_all(
    input_dir: &Path,
    output_dir: &Path,
    config: &CompiledConfig,
) -> Result<Vec<Result<FileReport, ProcessError>>, ProcessError> {
    let files = discover_files(input_dir, config)?;
    info!(
        "Processing {} file(s) -> {}",
        files.len(),
        output_dir.display()
    );

    let template = load_template(config.template_path())?;

    let mut results: Vec<(String, Result<FileReport, ProcessError>)> = files
        .par_iter()
        .map(|path| {
            let name = data_name(path);
            let result = process_file(path, config.graph_options()).and_then(|graph| {
                let output_path = write_graph(output_dir, &graph, &template)?;
                info!(
                    "Processed {} rows and wrote to disk \"{}\"",
                    graph.lines_processed,
                    output_path.display()
                );
                Ok(FileReport {
                    data_name: graph.data_name,
                    output_path,
                    lines_processed: graph.lines_processed,
                    failures: graph.failures.len(),
                })
            });
            if let Err(e) = &result {
                error!("Failed to process {}: {}", path.display(), e);
            }
            (name, result)
        })
        .collect();

    results.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(results.into_iter().map(|(_, r)| r).collect())
}

/// Process every report under `input_dir` in memory, without writing anything.
///
/// A file that fails is logged and left out of the result.
pub fn load_all(input_dir: &Path, config: &CompiledConfig) -> Result<Vec<FileGraph>, ProcessError> {
    let files = discover_files(input_dir, config)?;
    Ok(load_files(&files, config.graph_options()))
}

fn load_files(files: &[PathBuf], options: GraphOptions) -> Vec<FileGraph> {
    let mut graphs: Vec<FileGraph> = files
        .par_iter()
        .filter_map(|path| match process_file(path, options) {
            Ok(graph) => Some(graph),
            Err(e) => {
                error!("Failed to process {}: {}", path.display(), e);
                None
            }
        })
        .collect();
    graphs.sort_by(|a, b| a.data_name.cmp(&b.data_name));
    graphs
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{"applicationName":"cart","artifactGroup":"com.example","artifactId":"cart-lib","sourceClass":"com.example.Cart","sourceMethod":"checkout","targetClass":"com.example.pay.Client","targetMethod":"charge"}"#;

    #[test]
    fn test_truncated_line_is_skipped() {
        let input = format!("{}\n{{\"applicationName\":\"ca", VALID);
        let graph = process_reader("report", input.as_bytes(), GraphOptions::default()).unwrap();

        assert_eq!(graph.lines_processed, 1);
        assert_eq!(graph.failures.len(), 1);
        assert_eq!(graph.failures[0].line_number, 2);
        assert_eq!(graph.failures[0].line, "{\"applicationName\":\"ca");

        let by_source = &graph.data.source_class;
        assert_eq!(by_source.nodes.len(), 2);
        assert_eq!(by_source.links.len(), 1);
        assert_eq!(graph.data.source_and_target_class.nodes.len(), 2);
    }

    #[test]
    fn test_empty_input_gives_empty_graphs() {
        let graph = process_reader("empty", "".as_bytes(), GraphOptions::default()).unwrap();
        assert_eq!(graph.lines_processed, 0);
        assert!(graph.failures.is_empty());
        assert!(graph.data.source_class.is_empty());
        assert!(graph.data.source_and_target_class.is_empty());
    }

    #[test]
    fn test_blank_line_is_a_failure() {
        let input = format!("{}\n\n{}\n", VALID, VALID);
        let graph = process_reader("blank", input.as_bytes(), GraphOptions::default()).unwrap();
        assert_eq!(graph.lines_processed, 2);
        assert_eq!(graph.failures.len(), 1);
        assert_eq!(graph.failures[0].line_number, 2);
    }

    #[test]
    fn test_grouping_modes_do_not_share_nodes() {
        let graph = process_reader("modes", VALID.as_bytes(), GraphOptions::default()).unwrap();
        let by_source = graph.data.get(GroupBy::SourceClass);
        let by_pair = graph.data.get(GroupBy::SourceAndTargetClass);
        for node in &by_source.nodes {
            assert!(by_pair.node(&node.id).is_none(), "shared id {}", node.id);
        }
        assert_eq!(by_source.color_map, by_pair.color_map);
    }

    #[test]
    fn test_serialized_keys() {
        let graph = process_reader("keys", VALID.as_bytes(), GraphOptions::default()).unwrap();
        let json = serde_json::to_value(&graph).unwrap();
        assert_eq!(json["dataName"], "keys");
        assert_eq!(json["linesProcessed"], 1);
        assert!(json["data"]["sourceClass"]["nodes"].is_array());
        assert!(json["data"]["sourceClass-targetClass"]["links"].is_array());
        assert!(json.get("failures").is_none());
    }

    #[test]
    fn test_builder_finish_after_partial_input() {
        let mut builder = GraphBuilder::new(GraphOptions::default());
        builder.push_line(VALID).unwrap();
        builder.push_line("not json").unwrap();
        assert_eq!(builder.lines_processed(), 1);
        assert_eq!(builder.failures().len(), 1);
        let graph = builder.finish("partial").unwrap();
        assert_eq!(graph.data_name, "partial");
    }

    #[test]
    fn test_invalid_utf8_line_is_skipped() {
        let mut input = Vec::new();
        input.extend_from_slice(VALID.as_bytes());
        input.extend_from_slice(b"\n\xff\xfe garbage\r\n");
        input.extend_from_slice(VALID.as_bytes());
        input.push(b'\n');

        let graph = process_reader("bytes", input.as_slice(), GraphOptions::default()).unwrap();
        assert_eq!(graph.lines_processed, 2);
        assert_eq!(graph.failures.len(), 1);
        assert_eq!(graph.failures[0].line_number, 2);
        assert_eq!(graph.failures[0].line, "\u{FFFD}\u{FFFD} garbage");
    }

    #[test]
    fn test_null_field_still_ingested() {
        let line = VALID.replacen('{', r#"{"artifactVersion":null,"#, 1);
        let graph = process_reader("nulls", line.as_bytes(), GraphOptions::default()).unwrap();
        assert_eq!(graph.lines_processed, 1);
        assert!(graph.failures.is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        let input = format!("{}\r\n{}\r\n", VALID, VALID);
        let graph = process_reader("crlf", input.as_bytes(), GraphOptions::default()).unwrap();
        assert_eq!(graph.lines_processed, 2);
        assert!(graph.failures.is_empty());
    }

    #[test]
    fn test_unreadable_file_is_left_out() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.jsonl");
        std::fs::write(&good, VALID).unwrap();
        let missing = dir.path().join("gone.jsonl");

        let graphs = load_files(&[missing, good], GraphOptions::default());
        assert_eq!(graphs.len(), 1);
        assert_eq!(graphs[0].data_name, "good");
        assert_eq!(graphs[0].lines_processed, 1);
    }

    #[test]
    fn test_data_name() {
        assert_eq!(data_name(Path::new("/tmp/reports/shop.jsonl")), "shop");
        assert_eq!(data_name(Path::new("shop.v2.jsonl")), "shop.v2");
        assert_eq!(data_name(Path::new("shop.json")), "shop.json");
    }
}
