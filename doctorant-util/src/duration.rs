//! Duration

// Imports
use std::fmt;

/// Duration with micro-second precision, displayed in milliseconds.
///
/// Formatting is exact: `1500µs` displays as `1.5` and `0µs` as `0.0`.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default, Debug)]
pub struct MilliDuration {
	/// Micro seconds
	micros: u64,
}

impl MilliDuration {
	/// Number of micro-seconds per milli-second
	pub const MICROS_PER_MILLI: u64 = 1000;

	/// Creates a new duration from micro-seconds
	#[must_use]
	pub const fn from_micros(micros: u64) -> Self {
		Self { micros }
	}
}

impl fmt::Display for MilliDuration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let millis = self.micros / Self::MICROS_PER_MILLI;
		let micros = self.micros % Self::MICROS_PER_MILLI;

		match micros {
			0 => write!(f, "{millis}.0"),
			_ => {
				let fraction = format!("{micros:03}");
				write!(f, "{millis}.{}", fraction.trim_end_matches('0'))
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::MilliDuration;

	#[test]
	fn display() {
		let cases = [
			(0, "0.0"),
			(1, "0.001"),
			(10, "0.01"),
			(1000, "1.0"),
			(1500, "1.5"),
			(2001, "2.001"),
			(123_456_789, "123456.789"),
		];

		for (micros, expected) in cases {
			assert_eq!(MilliDuration::from_micros(micros).to_string(), expected, "{micros}µs");
		}
	}
}
