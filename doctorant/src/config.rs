//! Configuration

// Imports
use std::{
	num::{NonZeroU64, NonZeroUsize},
	time::Duration,
};

/// Configuration
#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
	/// Cacheline size, in bytes.
	///
	/// Used as the bucket size for hot addresses.
	pub cacheline_size: NonZeroU64,

	/// Number of hot addresses to report
	pub hot_addresses_count: NonZeroUsize,

	/// Whether to ignore instruction fetches.
	///
	/// Instruction fetches are then excluded from hot addresses, the
	/// normalized events and the request percentages.
	pub ignore_instruction_fetch: bool,

	/// Progress output period (in seconds)
	pub progress_period_secs: f64,
}

impl Config {
	/// Default cacheline size
	pub const DEFAULT_CACHELINE_SIZE: NonZeroU64 = match NonZeroU64::new(64) {
		Some(size) => size,
		None => unreachable!(),
	};

	/// Cacheline size used by older versions
	pub const LEGACY_CACHELINE_SIZE: NonZeroU64 = match NonZeroU64::new(16) {
		Some(size) => size,
		None => unreachable!(),
	};

	/// Default number of hot addresses
	pub const DEFAULT_HOT_ADDRESSES_COUNT: NonZeroUsize = match NonZeroUsize::new(10) {
		Some(count) => count,
		None => unreachable!(),
	};

	/// Returns the progress output period
	#[must_use]
	pub fn progress_period(&self) -> Duration {
		Duration::try_from_secs_f64(self.progress_period_secs).unwrap_or(Duration::MAX)
	}
}

impl Default for Config {
	fn default() -> Self {
		Self {
			cacheline_size:           Self::DEFAULT_CACHELINE_SIZE,
			hot_addresses_count:      Self::DEFAULT_HOT_ADDRESSES_COUNT,
			ignore_instruction_fetch: false,
			progress_period_secs:     1.0,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_missing_fields() {
		let config = serde_json::from_str::<Config>(r#"{ "cacheline_size": 16 }"#).unwrap();

		assert_eq!(config.cacheline_size, Config::LEGACY_CACHELINE_SIZE);
		assert_eq!(config.hot_addresses_count.get(), 10);
		assert!(!config.ignore_instruction_fetch);
		assert_eq!(config.progress_period(), Duration::from_secs(1));
	}

	#[test]
	fn rejects_zero_cacheline_size() {
		assert!(serde_json::from_str::<Config>(r#"{ "cacheline_size": 0 }"#).is_err());
	}

	#[test]
	fn negative_period_never_outputs() {
		let config = Config {
			progress_period_secs: -1.0,
			..Config::default()
		};
		assert_eq!(config.progress_period(), Duration::MAX);
	}
}
