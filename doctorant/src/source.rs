//! Trace sources

// Imports
use std::io;

/// Trace source.
///
/// A trace that can be read from the start multiple times, possibly at once.
pub trait TraceSource: Sync {
	/// Reader
	type Reader: io::BufRead;

	/// Opens a new reader at the start of the trace
	fn open(&self) -> Result<Self::Reader, io::Error>;
}

impl<'a> TraceSource for &'a [u8] {
	type Reader = &'a [u8];

	fn open(&self) -> Result<Self::Reader, io::Error> {
		Ok(*self)
	}
}

impl<'a> TraceSource for &'a str {
	type Reader = &'a [u8];

	fn open(&self) -> Result<Self::Reader, io::Error> {
		Ok((*self).as_bytes())
	}
}
