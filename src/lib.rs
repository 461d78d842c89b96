//! # jarviz-graph - Coupling Graph Builder
//!
//! Turns the method-coupling reports produced by the Jarviz analyser into
//! interactive force-directed dependency graphs.
//!
//! ## Overview
//!
//! Every line of a `.jsonl` report is one coupling record: a method in a
//! source class of some artifact calling a method on a target class. Each
//! report is folded into two graph projections:
//!
//! 1. **sourceClass** - one node per artifact, one per application/target method
//! 2. **sourceClass-targetClass** - artifacts split per target class they call
//!
//! ## Usage
//!
//! ```bash
//! # Write one HTML graph per report in ./reports to ./graphs
//! jarviz-graph -i reports -o graphs
//!
//! # Browse the graphs instead of writing them
//! jarviz-graph -i reports --web
//! ```
//!
//! ## Library use
//!
//! ```
//! use jarviz_graph::{GraphOptions, process_reader};
//!
//! let line = r#"{"applicationName":"cart","artifactGroup":"com.example","artifactId":"cart","sourceClass":"Cart","sourceMethod":"pay","targetClass":"com.example.Client","targetMethod":"charge"}"#;
//! let graph = process_reader("cart", line.as_bytes(), GraphOptions::default()).unwrap();
//! assert_eq!(graph.lines_processed, 1);
//! assert_eq!(graph.data.source_class.nodes.len(), 2);
//! ```

pub mod config;
pub mod graph;
pub mod logging;
pub mod naming;
pub mod palette;
pub mod processor;
pub mod record;
pub mod usage;
pub mod web;
pub mod writer;

pub use config::{
    CompiledConfig, ConfigError, GraphConfig, InputConfig, JarvizConfig, OutputConfig,
    load_compiled_config, load_config,
};
pub use graph::{
    GraphAccumulator, GraphError, GraphOptions, IngestOutcome, Link, Node, NodeKind, Projection,
    Upsert,
};
pub use naming::{DisplayNames, GroupBy, escape_html, simple_class_name};
pub use palette::{ColorScale, PALETTE, TARGET_NODE_COLOR, palette_color};
pub use processor::{
    FileGraph, FileReport, GraphBuilder, GraphData, ParseFailure, ProcessError, data_name,
    discover_files, load_all, process_all, process_file, process_reader,
};
pub use record::{CouplingRecord, RecordError, parse_record};
pub use usage::convert_to_usage_count;
pub use writer::{WriteError, load_template, render_html, write_graph};
