//! Statistics

// Imports
use {
	crate::{
		error::AnalysisError,
		parser::{AccessKind, MarkerEvent},
		reader::{TraceEvent, TraceReader},
	},
	average::Estimate,
	doctorant_util::MilliDuration,
	std::io,
};

/// Minimum and maximum of a set of values
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Extrema {
	pub min: u64,
	pub max: u64,
}

impl Extrema {
	/// Updates these extrema to include `min..=max`
	fn include(extrema: &mut Option<Self>, min: u64, max: u64) {
		match extrema {
			Some(extrema) => {
				extrema.min = extrema.min.min(min);
				extrema.max = extrema.max.max(max);
			},
			None => *extrema = Some(Self { min, max }),
		}
	}

	/// Returns `max - min`
	#[must_use]
	pub fn span(&self) -> u64 {
		self.max - self.min
	}
}

/// Trace statistics
#[derive(Clone, Debug)]
pub struct TraceStatistics {
	/// Timestamp extrema, if any timestamp markers were found
	pub timestamps: Option<Extrema>,

	/// Address extrema, over all bytes touched by any access
	pub addresses: Option<Extrema>,

	/// Bytes read by `read` accesses
	pub bytes_read: u64,

	/// Bytes written by `write` accesses
	pub bytes_write: u64,

	pub count_reads:        u64,
	pub count_writes:       u64,
	pub count_instructions: u64,

	/// Access sizes, over all accesses
	pub access_sizes: average::Variance,
}

impl TraceStatistics {
	/// Returns the minimum timestamp
	#[must_use]
	pub fn min_timestamp(&self) -> Option<u64> {
		self.timestamps.map(|timestamps| timestamps.min)
	}

	/// Returns the maximum timestamp
	#[must_use]
	pub fn max_timestamp(&self) -> Option<u64> {
		self.timestamps.map(|timestamps| timestamps.max)
	}

	/// Returns the minimum address
	#[must_use]
	pub fn min_address(&self) -> Option<u64> {
		self.addresses.map(|addresses| addresses.min)
	}

	/// Returns the maximum address
	#[must_use]
	pub fn max_address(&self) -> Option<u64> {
		self.addresses.map(|addresses| addresses.max)
	}

	/// Returns the time between the first and last timestamps
	#[must_use]
	pub fn time_span(&self) -> Option<MilliDuration> {
		self.timestamps
			.map(|timestamps| MilliDuration::from_micros(timestamps.span()))
	}

	/// Returns the total number of records
	#[must_use]
	pub fn total_records(&self) -> u64 {
		self.count_reads + self.count_writes + self.count_instructions
	}
}

/// Statistics collector
#[derive(Clone, Debug)]
pub struct StatisticsCollector {
	/// Statistics so far
	stats: TraceStatistics,
}

impl StatisticsCollector {
	/// Creates a new, empty, collector
	#[must_use]
	pub fn new() -> Self {
		Self {
			stats: TraceStatistics {
				timestamps:         None,
				addresses:          None,
				bytes_read:         0,
				bytes_write:        0,
				count_reads:        0,
				count_writes:       0,
				count_instructions: 0,
				access_sizes:       average::Variance::new(),
			},
		}
	}

	/// Registers an event
	pub fn register_event(&mut self, event: &TraceEvent<'_>) {
		match *event {
			TraceEvent::Record(record) => {
				Extrema::include(&mut self.stats.addresses, record.address, record.last_address());
				self.stats.access_sizes.add(record.size as f64);

				match record.kind {
					AccessKind::InstructionFetch => self.stats.count_instructions += 1,
					AccessKind::Read => {
						self.stats.count_reads += 1;
						self.stats.bytes_read += record.size;
					},
					AccessKind::Write => {
						self.stats.count_writes += 1;
						self.stats.bytes_write += record.size;
					},
				}
			},
			TraceEvent::Marker(MarkerEvent::Timestamp(timestamp)) =>
				Extrema::include(&mut self.stats.timestamps, timestamp, timestamp),
			TraceEvent::Marker(MarkerEvent::Other { .. }) => (),
		}
	}

	/// Registers all remaining events of `reader`.
	///
	/// # Errors
	/// Returns an error if unable to read the next event.
	pub fn register_all<R: io::BufRead>(&mut self, reader: &mut TraceReader<R>) -> Result<(), AnalysisError> {
		while let Some(line) = reader.read_next()? {
			self.register_event(&line.event);
		}

		Ok(())
	}

	/// Finishes collecting
	///
	/// # Errors
	/// Returns [`AnalysisError::EmptyTrace`] if no records were registered.
	pub fn finish(self) -> Result<TraceStatistics, AnalysisError> {
		if self.stats.total_records() == 0 {
			return Err(AnalysisError::EmptyTrace);
		}

		Ok(self.stats)
	}
}

impl Default for StatisticsCollector {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use {
		super::*,
		crate::parser::TraceRecord,
	};

	fn record(kind: AccessKind, address: u64, size: u64) -> TraceEvent<'static> {
		TraceEvent::Record(TraceRecord {
			timestamp: Some(0),
			thread_id: "1",
			kind,
			address,
			size,
		})
	}

	#[test]
	fn bytes_follow_access_kind() {
		let mut collector = StatisticsCollector::new();
		collector.register_event(&record(AccessKind::Read, 0x100, 8));
		collector.register_event(&record(AccessKind::Read, 0x108, 8));
		collector.register_event(&record(AccessKind::Write, 0x200, 4));
		collector.register_event(&record(AccessKind::InstructionFetch, 0x10, 3));
		let stats = collector.finish().unwrap();

		assert_eq!(stats.bytes_read, 16);
		assert_eq!(stats.bytes_write, 4);
		assert_eq!(stats.count_reads, 2);
		assert_eq!(stats.count_writes, 1);
		assert_eq!(stats.count_instructions, 1);
		assert_eq!(stats.total_records(), 4);
	}

	#[test]
	fn access_sizes_mean() {
		let mut collector = StatisticsCollector::new();
		for size in [2, 4, 6] {
			collector.register_event(&record(AccessKind::Read, 0x100, size));
		}
		let stats = collector.finish().unwrap();

		assert_eq!(stats.access_sizes.len(), 3);
		assert_eq!(stats.access_sizes.mean(), 4.0);
	}

	#[test]
	fn address_extrema_include_access_end() {
		let mut collector = StatisticsCollector::new();
		collector.register_event(&record(AccessKind::Read, 0x100, 8));
		collector.register_event(&record(AccessKind::Write, 0x104, 16));
		let stats = collector.finish().unwrap();

		assert_eq!(stats.addresses, Some(Extrema { min: 0x100, max: 0x113 }));
	}

	#[test]
	fn timestamp_extrema() {
		let mut collector = StatisticsCollector::new();
		for timestamp in [5000, 1000, 3000] {
			collector.register_event(&TraceEvent::Marker(MarkerEvent::Timestamp(timestamp)));
		}
		collector.register_event(&TraceEvent::Marker(MarkerEvent::Other { kind: "tid" }));
		collector.register_event(&record(AccessKind::Read, 0, 1));
		let stats = collector.finish().unwrap();

		assert_eq!(stats.min_timestamp(), Some(1000));
		assert_eq!(stats.max_timestamp(), Some(5000));
		assert_eq!(stats.time_span().map(|span| span.to_string()), Some("4.0".to_owned()));
	}

	#[test]
	fn no_timestamps_is_undefined() {
		let mut collector = StatisticsCollector::new();
		collector.register_event(&record(AccessKind::Write, 0, 1));
		let stats = collector.finish().unwrap();

		assert_eq!(stats.timestamps, None);
		assert_eq!(stats.time_span(), None);
	}

	#[test]
	fn empty_is_error() {
		let mut collector = StatisticsCollector::new();
		collector.register_event(&TraceEvent::Marker(MarkerEvent::Timestamp(1)));
		assert!(matches!(collector.finish(), Err(AnalysisError::EmptyTrace)));
	}
}
