//! jarviz-graph CLI - Coupling Graph Builder
//!
//! Reads every Jarviz coupling report (`*.jsonl`) in a directory and writes
//! one interactive HTML graph per report, or serves them over HTTP.
//!
//! Usage:
//!   jarviz-graph [OPTIONS]

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::Parser;
use tracing::{info, warn};

use jarviz_graph::{
    CompiledConfig, load_all, load_compiled_config, load_template, logging, process_all,
    web::{ServerConfig, start_server},
};

/// jarviz-graph - Visualize Jarviz method coupling reports
#[derive(Parser, Debug)]
#[command(name = "jarviz-graph")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input path to directory containing Jarviz JSONL reports
    #[arg(short, long, default_value = ".")]
    input: PathBuf,

    /// Output path to directory for HTML graphs
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Config file path (default: search for .jarviz.toml from the input directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep only one link per pair of nodes
    #[arg(long)]
    dedupe_links: bool,

    /// Number of threads for parallel processing (default: all CPU cores)
    #[arg(long, short = 'j', value_name = "N")]
    jobs: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    // === Web viewer options ===
    /// Serve the graphs over HTTP instead of writing HTML files
    #[arg(long)]
    web: bool,

    /// Port for web server (default: 3000)
    #[arg(long, default_value = "3000")]
    port: u16,

    /// Don't open browser automatically when starting web server
    #[arg(long)]
    no_open: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init_logging(args.verbose);

    if let Some(jobs) = args.jobs {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
        {
            warn!("Could not set thread count: {}", e);
        }
    }

    let total_start = Instant::now();

    let mut config = match load_compiled_config(args.config.as_deref(), &args.input) {
        Ok(config) => config,
        // An explicitly requested config must load
        Err(e) if args.config.is_some() => return Err(e.into()),
        Err(e) => {
            warn!("No config file loaded: {}", e);
            CompiledConfig::empty()
        }
    };
    if args.dedupe_links {
        config.set_dedupe_links(true);
    }

    info!(
        "Processing {} -> {}",
        args.input.display(),
        args.output.display()
    );

    if args.web {
        let graphs = load_all(&args.input, &config)?;
        let template = load_template(config.template_path())?;
        let server_config = ServerConfig {
            port: args.port,
            open_browser: !args.no_open,
        };

        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(start_server(graphs, template, server_config))
            .map_err(|e| -> Box<dyn std::error::Error> { e })?;

        return Ok(());
    }

    let results = process_all(&args.input, &args.output, &config)?;

    let mut failed = 0;
    for result in &results {
        match result {
            Ok(report) => {
                let skipped = if report.failures > 0 {
                    format!(", {} malformed line(s) skipped", report.failures)
                } else {
                    String::new()
                };
                println!(
                    "{}: {} rows -> {}{}",
                    report.data_name,
                    report.lines_processed,
                    report.output_path.display(),
                    skipped
                );
            }
            Err(_) => failed += 1,
        }
    }

    info!(
        "Done: {} file(s) in {:.2?}",
        results.len(),
        total_start.elapsed()
    );

    if failed > 0 {
        return Err(format!("{} of {} file(s) failed", failed, results.len()).into());
    }
    Ok(())
}
