//! Per-station min/mean/max over a `name;value` measurements file.
//!
//! The file is read in pages with several reads in flight ([`pipeline`]), fed
//! through a boundary-agnostic parser ([`parser`]) that walks a byte-keyed
//! prefix tree ([`index`]), and finally rendered in byte order of the station
//! names ([`report`]).

pub mod aggregator;
pub mod cli;
pub mod error;
pub mod index;
pub mod parser;
pub mod pipeline;
pub mod report;

pub use aggregator::Aggregator;
pub use error::{Error, Result};
pub use index::{NameIndex, NodeId};
pub use parser::Parser;
pub use pipeline::{aggregate_file, read_chunks, PipelineConfig, PipelineStats};
pub use report::{render_report, write_report};
