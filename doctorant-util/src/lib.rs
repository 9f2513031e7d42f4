//! Utilities

// Modules
pub mod duration;
pub mod logger;

// Exports
pub use duration::MilliDuration;

// Imports
use std::io;

/// Extension trait for `R: io::BufRead` types to read lines without their terminator
#[extend::ext(name = ReadTrimmedLine)]
pub impl<R: io::BufRead> R {
	/// Reads the next line into `line`, replacing its contents.
	///
	/// The trailing `\n` (or `\r\n`) is removed.
	/// Returns `false` once the reader is exhausted.
	fn read_trimmed_line(&mut self, line: &mut String) -> Result<bool, io::Error> {
		line.clear();
		if self.read_line(line)? == 0 {
			return Ok(false);
		}

		if line.ends_with('\n') {
			line.pop();
			if line.ends_with('\r') {
				line.pop();
			}
		}

		Ok(true)
	}
}
