//! Trace reading

// Imports
use {
	crate::{
		error::AnalysisError,
		parser::{self, AccessKind, MarkerEvent, ParseEvent, TraceRecord},
	},
	doctorant_util::ReadTrimmedLine,
	std::{io, ops::Range},
};

/// Number of header lines at the start of every trace
pub const HEADER_LINES: usize = 3;

/// Trace reader.
///
/// Reads records and markers from a `view` tool trace, until the footer.
#[derive(Debug)]
pub struct TraceReader<R> {
	/// Reader
	reader: R,

	/// Current line
	line: String,

	/// Current line number (1-based)
	line_idx: usize,

	/// Most recent timestamp
	cur_timestamp: Option<u64>,

	/// Whether we've reached the end of the trace
	finished: bool,
}

impl<R: io::BufRead> TraceReader<R> {
	/// Creates a trace reader, skipping the header.
	///
	/// # Errors
	/// Returns an error if unable to read the header.
	pub fn from_reader(reader: R) -> Result<Self, AnalysisError> {
		let mut trace_reader = Self {
			reader,
			line: String::new(),
			line_idx: 0,
			cur_timestamp: None,
			finished: false,
		};

		for _ in 0..HEADER_LINES {
			if !trace_reader.read_line()? {
				tracing::warn!("Trace ended within its header");
				trace_reader.finished = true;
				break;
			}
		}

		Ok(trace_reader)
	}

	/// Reads the next record or marker, along with its line.
	///
	/// Unrecognized lines are skipped.
	/// Returns `None` once the footer, or the end of the reader, is reached.
	///
	/// # Errors
	/// Returns an error if unable to read a line, or if a line is malformed.
	pub fn read_next(&mut self) -> Result<Option<TraceLine<'_>>, AnalysisError> {
		if self.finished {
			return Ok(None);
		}

		let event = loop {
			if !self.read_line()? {
				tracing::warn!(line_idx = self.line_idx, "Trace ended without a footer");
				self.finished = true;
				return Ok(None);
			}

			// Note: The parsed event can't be returned from within the loop while it
			//       borrows the line, so we only keep the byte ranges it borrows.
			match parser::parse_line(&self.line) {
				Ok(ParseEvent::EndOfTrace) => {
					tracing::trace!(line_idx = self.line_idx, "Reached end of trace");
					self.finished = true;
					return Ok(None);
				},
				Ok(ParseEvent::Unrecognized) => {
					tracing::trace!(line_idx = self.line_idx, line = ?self.line, "Skipping unrecognized line");
					continue;
				},
				Ok(ParseEvent::Marker(MarkerEvent::Timestamp(timestamp))) => {
					self.cur_timestamp = Some(timestamp);
					break LineEvent::Timestamp(timestamp);
				},
				Ok(ParseEvent::Marker(MarkerEvent::Other { kind })) => break LineEvent::OtherMarker {
					kind: self::span_of(&self.line, kind),
				},
				Ok(ParseEvent::Record(record)) => break LineEvent::Record {
					thread_id: self::span_of(&self.line, record.thread_id),
					kind:      record.kind,
					address:   record.address,
					size:      record.size,
				},
				Err(reason) => {
					self.finished = true;
					return Err(AnalysisError::MalformedRecord {
						line_idx: self.line_idx,
						line: self.line.clone(),
						reason,
					});
				},
			}
		};

		let event = match event {
			LineEvent::Record {
				thread_id,
				kind,
				address,
				size,
			} => TraceEvent::Record(TraceRecord {
				timestamp: self.cur_timestamp,
				thread_id: &self.line[thread_id],
				kind,
				address,
				size,
			}),
			LineEvent::Timestamp(timestamp) => TraceEvent::Marker(MarkerEvent::Timestamp(timestamp)),
			LineEvent::OtherMarker { kind } => TraceEvent::Marker(MarkerEvent::Other {
				kind: &self.line[kind],
			}),
		};

		Ok(Some(TraceLine {
			idx:  self.line_idx,
			text: &self.line,
			event,
		}))
	}

	/// Reads the next line into `self.line`
	fn read_line(&mut self) -> Result<bool, AnalysisError> {
		let read = self
			.reader
			.read_trimmed_line(&mut self.line)
			.map_err(|source| AnalysisError::Io {
				line_idx: self.line_idx,
				source,
			})?;
		if read {
			self.line_idx += 1;
		}

		Ok(read)
	}
}

/// Event of the current line, with borrowed parts as byte ranges of the line
#[derive(Clone, Debug)]
enum LineEvent {
	Record {
		thread_id: Range<usize>,
		kind:      AccessKind,
		address:   u64,
		size:      u64,
	},
	Timestamp(u64),
	OtherMarker {
		kind: Range<usize>,
	},
}

/// Returns the byte range of `part` within `line`.
///
/// `part` must be a sub-slice of `line`.
fn span_of(line: &str, part: &str) -> Range<usize> {
	let start = part.as_ptr() as usize - line.as_ptr() as usize;
	start..start + part.len()
}

/// Line with a record or marker
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct TraceLine<'a> {
	/// Line number (1-based)
	pub idx: usize,

	/// Line contents
	pub text: &'a str,

	/// Event
	pub event: TraceEvent<'a>,
}

/// Trace event
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum TraceEvent<'a> {
	/// Memory access, with the most recent timestamp
	Record(TraceRecord<'a>),

	/// Marker
	Marker(MarkerEvent<'a>),
}
