//! Memory access trace analysis (`doctorant`)

// Modules
mod args;
mod output;

// Imports
use {
	self::{args::Args, output::OutputFile},
	anyhow::Context,
	clap::Parser,
	doctorant::{AnalysisPipeline, Config, TraceSource},
	doctorant_util::logger,
	std::{
		fs,
		io::{self, BufReader},
		path::PathBuf,
	},
};

fn main() -> Result<(), anyhow::Error> {
	// Get arguments
	let args = Args::parse();
	logger::pre_init::debug(format!("Args: {args:?}"));

	// Initialize logging
	logger::init(args.log_file.as_deref(), args.log_file_append);

	// Read the config file, then apply any overrides
	let mut config = match &args.config_file {
		Some(config_path) => {
			let config_file = fs::File::open(config_path).context("Unable to open config file")?;
			serde_json::from_reader::<_, Config>(BufReader::new(config_file)).context("Unable to parse config file")?
		},
		None => Config::default(),
	};
	if let Some(cacheline_size) = args.cacheline_size {
		config.cacheline_size = cacheline_size;
	}
	if let Some(hot_addresses_count) = args.hot_addresses_count {
		config.hot_addresses_count = hot_addresses_count;
	}
	if args.ignore_instruction_fetch {
		config.ignore_instruction_fetch = true;
	}
	tracing::debug!(?config, "Using config");

	// Note: We open the trace once here to fail early, since the
	//       passes each open it again.
	let trace_file = TraceFile {
		path: args.trace_file.clone(),
	};
	trace_file.open().context("Unable to open trace file")?;

	// Run the analysis
	let mut report_file = OutputFile::create(&args.report_file).context("Unable to create report file")?;
	let mut events_file = OutputFile::create(&args.events_file).context("Unable to create events file")?;
	let mut pipeline = AnalysisPipeline::new(config);
	let analysis = pipeline
		.run(&trace_file, report_file.writer(), events_file.writer())
		.context("Unable to analyze trace")?;

	if let Some(hot_addresses_path) = &args.hot_addresses_file {
		let mut hot_addresses_file =
			OutputFile::create(hot_addresses_path).context("Unable to create hot addresses file")?;
		analysis
			.write_hot_addresses(hot_addresses_file.writer())
			.context("Unable to write hot addresses file")?;
		hot_addresses_file.persist()?;
	}
	report_file.persist()?;
	events_file.persist()?;

	tracing::info!(
		events_written = analysis.events_written,
		hot_addresses = analysis.ranking.len(),
		"Finished analysis"
	);

	Ok(())
}

/// Trace file
#[derive(Debug)]
struct TraceFile {
	/// Path
	path: PathBuf,
}

impl TraceSource for TraceFile {
	type Reader = BufReader<fs::File>;

	fn open(&self) -> Result<Self::Reader, io::Error> {
		fs::File::open(&self.path).map(BufReader::new)
	}
}
