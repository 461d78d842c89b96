//! Web viewer for jarviz-graph
//!
//! Serves the graphs built from a directory of coupling reports over HTTP,
//! so they can be browsed without writing HTML files to disk:
//! - `/` lists the available graphs
//! - `/graphs/{name}` renders one graph
//! - `/data/{name}` returns the raw graph data as JSON

pub mod routes;
pub mod server;

pub use server::{ServerConfig, start_server};
