//! Errors

// Imports
use {crate::pipeline::PipelineState, std::io};

/// Analysis error
#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
	/// A line had a known shape, but didn't follow it
	#[error("Malformed record on line {line_idx} ({reason}): {line:?}")]
	MalformedRecord {
		line_idx: usize,
		line:     String,
		reason:   MalformedRecord,
	},

	/// A record appeared before any timestamp marker
	#[error("Record on line {line_idx} appears before any timestamp marker: {line:?}")]
	MissingTimestampContext { line_idx: usize, line: String },

	/// Trace had no records
	#[error("Trace contains no memory access records")]
	EmptyTrace,

	/// Pipeline was already run
	#[error("Pipeline already ran, and is {state:?}")]
	AlreadyRan { state: PipelineState },

	/// Unable to read from the trace or write to an output
	#[error("I/O error after line {line_idx}")]
	Io {
		line_idx: usize,
		#[source]
		source:   io::Error,
	},
}

impl AnalysisError {
	/// Creates an I/O error that occurred outside of any line
	pub(crate) fn io(source: io::Error) -> Self {
		Self::Io { line_idx: 0, source }
	}
}

/// Reason a line is malformed
#[derive(PartialEq, Eq, Clone, Debug, thiserror::Error)]
pub enum MalformedRecord {
	#[error("missing token #{idx} ({name})")]
	MissingToken { idx: usize, name: &'static str },

	#[error("expected {expected:?}, found {found:?}")]
	UnexpectedLiteral { expected: &'static str, found: String },

	#[error("invalid {name} {token:?}")]
	InvalidNumber { name: &'static str, token: String },

	#[error("access size must be non-zero")]
	ZeroSize,

	#[error("access at {address:#x} of {size} bytes overflows the address space")]
	AddressOverflow { address: u64, size: u64 },
}
