//! Analysis pipeline

// Imports
use {
	crate::{
		config::Config,
		error::AnalysisError,
		hot_addresses::{HotAddressEntry, HotAddressRanker},
		normalizer::TraceNormalizer,
		reader::{TraceEvent, TraceReader},
		report::Report,
		source::TraceSource,
		statistics::{StatisticsCollector, TraceStatistics},
	},
	std::{
		io,
		num::NonZeroU64,
		panic,
		thread,
		time::{Duration, Instant},
	},
};

/// Pipeline state
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum PipelineState {
	/// Not yet run
	Uninitialized,

	/// Collecting statistics (and bucketing addresses)
	Pass1Collecting,

	/// Statistics collected, waiting on address bucketing
	Pass1bBucketing,

	/// Writing normalized events
	Pass2Normalizing,

	/// Finished successfully
	Complete,

	/// Failed
	Failed,
}

impl PipelineState {
	/// Returns the state following this one, if the current pass succeeds
	#[must_use]
	pub fn next(self) -> Option<Self> {
		match self {
			Self::Uninitialized => Some(Self::Pass1Collecting),
			Self::Pass1Collecting => Some(Self::Pass1bBucketing),
			Self::Pass1bBucketing => Some(Self::Pass2Normalizing),
			Self::Pass2Normalizing => Some(Self::Complete),
			Self::Complete | Self::Failed => None,
		}
	}

	/// Returns whether this state is final
	#[must_use]
	pub fn is_terminal(self) -> bool {
		matches!(self, Self::Complete | Self::Failed)
	}
}

/// Analysis pipeline
#[derive(Debug)]
pub struct AnalysisPipeline {
	/// Config
	config: Config,

	/// State
	state: PipelineState,
}

impl AnalysisPipeline {
	/// Creates a new pipeline
	#[must_use]
	pub fn new(config: Config) -> Self {
		Self {
			config,
			state: PipelineState::Uninitialized,
		}
	}

	/// Returns the current state
	#[must_use]
	pub fn state(&self) -> PipelineState {
		self.state
	}

	/// Analyzes the trace in `source`.
	///
	/// Writes normalized events to `events` and, once those are done, the report to `report`.
	///
	/// # Errors
	/// Returns an error if the trace is malformed or empty, or if unable to read / write.
	/// The pipeline is then left in [`PipelineState::Failed`].
	///
	/// A pipeline only runs once, later calls return [`AnalysisError::AlreadyRan`].
	pub fn run<S, R, E>(&mut self, source: &S, report: R, events: E) -> Result<Analysis, AnalysisError>
	where
		S: TraceSource,
		R: io::Write,
		E: io::Write,
	{
		if self.state.is_terminal() {
			return Err(AnalysisError::AlreadyRan { state: self.state });
		}

		let res = self.run_passes(source, report, events);
		if let Err(err) = &res {
			tracing::debug!(?err, "Analysis failed");
			self.transition(PipelineState::Failed);
		}

		res
	}

	/// Runs all passes
	fn run_passes<S, R, E>(&mut self, source: &S, mut report: R, events: E) -> Result<Analysis, AnalysisError>
	where
		S: TraceSource,
		R: io::Write,
		E: io::Write,
	{
		// Collect statistics and hot addresses at the same time
		self.transition(PipelineState::Pass1Collecting);
		let bucket_size = self.config.cacheline_size;
		let ignore_instruction_fetch = self.config.ignore_instruction_fetch;
		let (stats, ranker) = thread::scope(|scope| {
			let ranker_handle =
				scope.spawn(move || Self::rank_hot_addresses(source, bucket_size, ignore_instruction_fetch));

			let stats = Self::collect_statistics(source);
			if stats.is_ok() {
				self.transition(PipelineState::Pass1bBucketing);
			}

			let ranker = ranker_handle.join().unwrap_or_else(|err| panic::resume_unwind(err));
			(stats, ranker)
		});
		let stats = stats?;
		let ranker = ranker?;
		tracing::debug!(?stats, buckets = ranker.buckets_len(), "Finished first pass");

		// Then normalize with the now-known extrema
		self.transition(PipelineState::Pass2Normalizing);
		let events_written = self.normalize(source, &stats, events)?;
		tracing::debug!(events_written, "Finished normalizing");

		let ranking = ranker.ranking();
		write!(report, "{}", Report {
			config:  &self.config,
			stats:   &stats,
			ranking: &ranking,
		})
		.and_then(|()| report.flush())
		.map_err(AnalysisError::io)?;

		self.transition(PipelineState::Complete);
		Ok(Analysis {
			stats,
			ranking,
			events_written,
		})
	}

	/// Collects statistics from a new reader of `source`
	fn collect_statistics<S: TraceSource>(source: &S) -> Result<TraceStatistics, AnalysisError> {
		let mut reader = TraceReader::from_reader(source.open().map_err(AnalysisError::io)?)?;

		let mut collector = StatisticsCollector::new();
		collector.register_all(&mut reader)?;
		collector.finish()
	}

	/// Ranks hot addresses from a new reader of `source`
	fn rank_hot_addresses<S: TraceSource>(
		source: &S,
		bucket_size: NonZeroU64,
		ignore_instruction_fetch: bool,
	) -> Result<HotAddressRanker, AnalysisError> {
		let mut reader = TraceReader::from_reader(source.open().map_err(AnalysisError::io)?)?;

		let mut ranker = HotAddressRanker::new(bucket_size, ignore_instruction_fetch);
		ranker.register_all(&mut reader)?;
		Ok(ranker)
	}

	/// Writes all normalized events from a new reader of `source` to `writer`.
	///
	/// Returns the number of events written.
	fn normalize<S: TraceSource, W: io::Write>(
		&self,
		source: &S,
		stats: &TraceStatistics,
		writer: W,
	) -> Result<u64, AnalysisError> {
		let mut reader = TraceReader::from_reader(source.open().map_err(AnalysisError::io)?)?;
		let mut normalizer = TraceNormalizer::new(stats, self.config.ignore_instruction_fetch, writer);

		let progress_period = self.config.progress_period();
		let total_records = stats.total_records();
		let mut records_normalized = 0;
		let mut last_progress_time = None;
		while let Some(line) = reader.read_next()? {
			let TraceEvent::Record(record) = line.event else {
				continue;
			};
			normalizer.write(line.idx, line.text, &record)?;
			records_normalized += 1;

			// Note: We output right away at the start
			let cur_time = Instant::now();
			if self::progress_due(last_progress_time, cur_time, progress_period) {
				let records_normalized_percentage = 100.0 * (records_normalized as f64 / total_records as f64);
				tracing::info!(
					"[{records_normalized_percentage:.2}%] Normalized {records_normalized}/{total_records} records \
					 ({} events written, line {})",
					normalizer.events_written(),
					line.idx
				);
				last_progress_time = Some(cur_time);
			}
		}

		let events_written = normalizer.events_written();
		normalizer.finish()?;

		Ok(events_written)
	}

	/// Transitions to `state`
	fn transition(&mut self, state: PipelineState) {
		debug_assert!(
			state == PipelineState::Failed || self.state.next() == Some(state),
			"Invalid pipeline transition from {:?} to {state:?}",
			self.state
		);
		tracing::trace!(prev = ?self.state, next = ?state, "Changing pipeline state");
		self.state = state;
	}
}

/// Returns whether progress should be output at `cur_time`
fn progress_due(last_progress_time: Option<Instant>, cur_time: Instant, progress_period: Duration) -> bool {
	match last_progress_time {
		Some(last_progress_time) => cur_time.duration_since(last_progress_time) >= progress_period,
		None => true,
	}
}

/// Analysis output
#[derive(Clone, Debug)]
pub struct Analysis {
	/// Statistics
	pub stats: TraceStatistics,

	/// Full hot address ranking
	pub ranking: Vec<HotAddressEntry>,

	/// Number of normalized events written
	pub events_written: u64,
}

impl Analysis {
	/// Writes the full ranking as the hot addresses output.
	///
	/// # Errors
	/// Returns an error if unable to write to `writer`.
	pub fn write_hot_addresses<W: io::Write>(&self, writer: W) -> Result<(), io::Error> {
		crate::hot_addresses::write_ranking(writer, &self.ranking, self.stats.max_address().unwrap_or(0))
	}
}
