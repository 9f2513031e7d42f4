//! Memory access trace analysis (`doctorant`)
//!
//! Analyzes the textual output of `drcachesim`'s `view` tool: collects
//! statistics, ranks the hottest cachelines and writes a compact,
//! normalized event log.

// Modules
pub mod buckets;
pub mod config;
pub mod error;
pub mod hot_addresses;
pub mod normalizer;
pub mod parser;
pub mod pipeline;
pub mod reader;
pub mod report;
pub mod source;
pub mod statistics;

// Exports
pub use self::{
	config::Config,
	error::AnalysisError,
	pipeline::{Analysis, AnalysisPipeline, PipelineState},
	reader::TraceReader,
	source::TraceSource,
	statistics::TraceStatistics,
};
