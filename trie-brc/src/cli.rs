use std::path::PathBuf;

use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::pipeline::{PipelineConfig, DEFAULT_IN_FLIGHT, DEFAULT_PAGE_SIZE};

/// Min/mean/max per station of a `name;value` measurements file
#[derive(Parser, Debug)]
#[command(name = "trie-brc")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Measurements file, one `name;value` record per line
    #[arg(env = "BRC_INPUT", default_value = "./measurements.txt")]
    pub input: PathBuf,

    /// Bytes requested by each read
    #[arg(long, env = "BRC_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    /// Number of reads kept in flight (at least 2)
    #[arg(long, env = "BRC_IN_FLIGHT", default_value_t = DEFAULT_IN_FLIGHT)]
    pub in_flight: usize,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl Cli {
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            page_size: self.page_size,
            in_flight: self.in_flight,
        }
    }

    /// Logs go to stderr; stdout carries only the report.
    pub fn init_tracing(&self) {
        let default = if self.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::WARN
        };
        let filter = EnvFilter::builder()
            .with_default_directive(default.into())
            .from_env_lossy();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .compact()
            .try_init();
    }
}
