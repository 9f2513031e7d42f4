//! Arguments

// Imports
use std::{
	num::{NonZeroU64, NonZeroUsize},
	path::PathBuf,
};

/// Arguments
#[derive(Debug)]
#[derive(clap::Parser)]
pub struct Args {
	/// Log file
	///
	/// Specifies a file to perform verbose logging to.
	/// You can use `RUST_LOG_FILE` to set filtering options
	#[clap(long = "log-file")]
	pub log_file: Option<PathBuf>,

	/// Whether to append to the log file
	#[clap(long = "log-file-append")]
	pub log_file_append: bool,

	/// Trace file, as output by `drcachesim`'s `view` tool
	pub trace_file: PathBuf,

	/// Config file
	#[clap(long = "config")]
	pub config_file: Option<PathBuf>,

	/// Report output file
	#[clap(long = "report")]
	pub report_file: PathBuf,

	/// Normalized events output file
	#[clap(long = "events")]
	pub events_file: PathBuf,

	/// Hot addresses output file
	#[clap(long = "hot-addresses")]
	pub hot_addresses_file: Option<PathBuf>,

	/// Cacheline size, in bytes.
	///
	/// Overrides the config file.
	#[clap(long = "cacheline-size")]
	pub cacheline_size: Option<NonZeroU64>,

	/// Number of hot addresses to report.
	///
	/// Overrides the config file.
	#[clap(long = "hot-addresses-count")]
	pub hot_addresses_count: Option<NonZeroUsize>,

	/// Ignore instruction fetches
	#[clap(long = "ignore-inst")]
	pub ignore_instruction_fetch: bool,
}
