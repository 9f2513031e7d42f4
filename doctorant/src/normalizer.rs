//! Trace normalization

// Imports
use {
	crate::{
		error::AnalysisError,
		parser::{AccessKind, TraceRecord},
		statistics::TraceStatistics,
	},
	doctorant_util::MilliDuration,
	std::{fmt, io},
};

/// Normalized event
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct NormalizedEvent<'a> {
	/// Time since the first timestamp
	pub relative_timestamp: MilliDuration,

	/// Thread id
	pub thread_id: &'a str,

	/// Offset from the lowest address
	pub relative_address: u64,

	/// Access size, in bytes
	pub size: u64,

	/// Access kind
	pub kind: AccessKind,
}

impl fmt::Display for NormalizedEvent<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{},{},{},{},{}",
			self.relative_timestamp, self.thread_id, self.relative_address, self.size, self.kind
		)
	}
}

/// Trace normalizer.
///
/// Writes each record as a [`NormalizedEvent`] line.
#[derive(Debug)]
pub struct TraceNormalizer<W> {
	/// Minimum timestamp
	min_timestamp: Option<u64>,

	/// Minimum address
	min_address: u64,

	/// Whether to skip instruction fetches
	ignore_instruction_fetch: bool,

	/// Events written
	events_written: u64,

	/// Writer
	writer: W,
}

impl<W: io::Write> TraceNormalizer<W> {
	/// Creates a new normalizer from the statistics of the same trace
	pub fn new(stats: &TraceStatistics, ignore_instruction_fetch: bool, writer: W) -> Self {
		Self {
			min_timestamp: stats.min_timestamp(),
			// Note: Without any records, `min_address` would never be used.
			min_address: stats.min_address().unwrap_or(0),
			ignore_instruction_fetch,
			events_written: 0,
			writer,
		}
	}

	/// Normalizes a record.
	///
	/// Returns the event, if the record wasn't skipped.
	///
	/// # Errors
	/// Returns an error if the record has no timestamp.
	pub fn normalize<'a>(&self, record: &TraceRecord<'a>) -> Result<Option<NormalizedEvent<'a>>, MissingTimestamp> {
		if self.ignore_instruction_fetch && record.kind == AccessKind::InstructionFetch {
			return Ok(None);
		}

		let (timestamp, min_timestamp) = record.timestamp.zip(self.min_timestamp).ok_or(MissingTimestamp)?;
		Ok(Some(NormalizedEvent {
			relative_timestamp: MilliDuration::from_micros(timestamp - min_timestamp),
			thread_id:          record.thread_id,
			relative_address:   record.address - self.min_address,
			size:               record.size,
			kind:               record.kind,
		}))
	}

	/// Normalizes and writes a record from line `line_idx`.
	///
	/// # Errors
	/// Returns an error if the record has no timestamp, or if unable to write it.
	pub fn write(&mut self, line_idx: usize, line: &str, record: &TraceRecord<'_>) -> Result<(), AnalysisError> {
		let event = match self.normalize(record) {
			Ok(Some(event)) => event,
			Ok(None) => return Ok(()),
			Err(MissingTimestamp) =>
				return Err(AnalysisError::MissingTimestampContext {
					line_idx,
					line: line.to_owned(),
				}),
		};

		writeln!(self.writer, "{event}").map_err(|source| AnalysisError::Io { line_idx, source })?;
		self.events_written += 1;

		Ok(())
	}

	/// Returns the number of events written
	pub fn events_written(&self) -> u64 {
		self.events_written
	}

	/// Finishes writing, flushing the writer
	///
	/// # Errors
	/// Returns an error if unable to flush the writer.
	pub fn finish(mut self) -> Result<W, AnalysisError> {
		self.writer.flush().map_err(AnalysisError::io)?;
		Ok(self.writer)
	}
}

/// Record had no timestamp before it
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct MissingTimestamp;

#[cfg(test)]
mod tests {
	use {super::*, crate::statistics::StatisticsCollector, crate::reader::TraceEvent};

	fn record(timestamp: Option<u64>, kind: AccessKind, address: u64) -> TraceRecord<'static> {
		TraceRecord {
			timestamp,
			thread_id: "7",
			kind,
			address,
			size: 4,
		}
	}

	fn stats(records: &[TraceRecord<'static>], timestamps: &[u64]) -> TraceStatistics {
		let mut collector = StatisticsCollector::new();
		for &timestamp in timestamps {
			collector.register_event(&TraceEvent::Marker(crate::parser::MarkerEvent::Timestamp(timestamp)));
		}
		for record in records {
			collector.register_event(&TraceEvent::Record(*record));
		}
		collector.finish().unwrap()
	}

	#[test]
	fn normalizes_relative_to_minimums() {
		let records = [
			record(Some(1000), AccessKind::Read, 0x104),
			record(Some(3500), AccessKind::Write, 0x200),
		];
		let stats = stats(&records, &[1000, 3500]);

		let mut normalizer = TraceNormalizer::new(&stats, false, vec![]);
		for record in &records {
			normalizer.write(0, "", record).unwrap();
		}
		assert_eq!(normalizer.events_written(), 2);

		let output = normalizer.finish().unwrap();
		assert_eq!(String::from_utf8(output).unwrap(), "0.0,7,0,4,R\n2.5,7,252,4,W\n");
	}

	#[test]
	fn skips_instruction_fetches() {
		let records = [record(None, AccessKind::InstructionFetch, 0x100)];
		let stats = stats(&records, &[]);
		let normalizer = TraceNormalizer::new(&stats, true, io::sink());

		assert_eq!(normalizer.normalize(&records[0]), Ok(None));
	}

	#[test]
	fn missing_timestamp() {
		let records = [record(None, AccessKind::InstructionFetch, 0x100)];
		let stats = stats(&records, &[]);
		let mut normalizer = TraceNormalizer::new(&stats, false, io::sink());

		assert_eq!(normalizer.normalize(&records[0]), Err(MissingTimestamp));
		assert!(matches!(
			normalizer.write(4, "4 0: 7 ifetch 4 byte(s) @ 0x100", &records[0]),
			Err(AnalysisError::MissingTimestampContext { line_idx: 4, .. })
		));
	}
}
