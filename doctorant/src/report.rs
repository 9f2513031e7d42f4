//! Report

// Imports
use {
	crate::{
		config::Config,
		hot_addresses::{self, HotAddressEntry},
		statistics::TraceStatistics,
	},
	std::fmt,
};

/// Statistics report.
///
/// Displays as `#`-prefixed lines.
#[derive(Clone, Copy, Debug)]
pub struct Report<'a> {
	pub config:  &'a Config,
	pub stats:   &'a TraceStatistics,
	pub ranking: &'a [HotAddressEntry],
}

impl Report<'_> {
	/// Returns the total number of requests used for percentages
	fn total_requests(&self) -> u64 {
		let instructions = match self.config.ignore_instruction_fetch {
			true => 0,
			false => self.stats.count_instructions,
		};

		self.stats.count_reads + self.stats.count_writes + instructions
	}

	/// Returns `count` as a percentage of all requests
	fn requests_percentage(&self, count: u64) -> Percentage {
		match self.total_requests() {
			0 => Percentage(None),
			total => Percentage(Some(100.0 * count as f64 / total as f64)),
		}
	}
}

impl fmt::Display for Report<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let Self { config, stats, ranking } = *self;

		writeln!(f, "# cacheline size: {}", config.cacheline_size)?;
		writeln!(f, "# hot addresses count: {}", config.hot_addresses_count)?;
		writeln!(f, "# hot addresses (accesses | address):")?;
		let width = hot_addresses::decimal_width(stats.max_address().unwrap_or(0));
		for entry in ranking.iter().take(config.hot_addresses_count.get()) {
			writeln!(f, "# {}", hot_addresses::fmt_entry(entry, width))?;
		}

		match stats.addresses {
			Some(addresses) => writeln!(f, "# max address: {}", addresses.span())?,
			None => writeln!(f, "# max address: undefined")?,
		}
		match stats.time_span() {
			Some(time_span) => writeln!(f, "# max timestamp: {time_span}")?,
			None => writeln!(f, "# max timestamp: undefined")?,
		}
		writeln!(f, "# bytes read: {}", stats.bytes_read)?;
		writeln!(f, "# bytes write: {}", stats.bytes_write)?;
		writeln!(f, "# read requests: {}", self.requests_percentage(stats.count_reads))?;
		writeln!(f, "# write requests: {}", self.requests_percentage(stats.count_writes))?;
		if !config.ignore_instruction_fetch {
			writeln!(
				f,
				"# instruction fetch requests: {}",
				self.requests_percentage(stats.count_instructions)
			)?;
		}

		match stats.access_sizes.is_empty() {
			true => writeln!(f, "# mean access size: undefined")?,
			false => writeln!(
				f,
				"# mean access size: {:.2} ± {:.2}",
				stats.access_sizes.mean(),
				stats.access_sizes.error()
			)?,
		}

		Ok(())
	}
}

/// Percentage, if defined.
///
/// Rounded to two decimals, without trailing zeros, but always with at least one decimal.
struct Percentage(Option<f64>);

impl fmt::Display for Percentage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let Some(percentage) = self.0 else {
			return write!(f, "n/a");
		};

		let rounded = format!("{percentage:.2}");
		match rounded.trim_end_matches('0').strip_suffix('.') {
			Some(integer) => write!(f, "{integer}.0%"),
			None => write!(f, "{}%", rounded.trim_end_matches('0')),
		}
	}
}

#[cfg(test)]
mod tests {
	use {
		super::*,
		crate::{
			parser::{AccessKind, MarkerEvent, TraceRecord},
			reader::TraceEvent,
			statistics::StatisticsCollector,
		},
		pretty_assertions::assert_eq,
		std::num::NonZeroUsize,
	};

	fn stats(records: &[(AccessKind, u64, u64)]) -> TraceStatistics {
		let mut collector = StatisticsCollector::new();
		collector.register_event(&TraceEvent::Marker(MarkerEvent::Timestamp(1000)));
		collector.register_event(&TraceEvent::Marker(MarkerEvent::Timestamp(4500)));
		for &(kind, address, size) in records {
			collector.register_event(&TraceEvent::Record(TraceRecord {
				timestamp: Some(1000),
				thread_id: "1",
				kind,
				address,
				size,
			}));
		}
		collector.finish().unwrap()
	}

	#[test]
	fn full_report() {
		let config = Config {
			hot_addresses_count: NonZeroUsize::new(2).unwrap(),
			..Config::default()
		};
		let stats = stats(&[
			(AccessKind::InstructionFetch, 0x100, 4),
			(AccessKind::Read, 0x104, 4),
			(AccessKind::Read, 0x108, 2),
			(AccessKind::Write, 0x200, 4),
		]);
		let ranking = [
			HotAddressEntry {
				bucket_address: 256,
				access_count:   3,
			},
			HotAddressEntry {
				bucket_address: 512,
				access_count:   1,
			},
			HotAddressEntry {
				bucket_address: 1024,
				access_count:   1,
			},
		];
		let report = Report {
			config:  &config,
			stats:   &stats,
			ranking: &ranking,
		};

		assert_eq!(
			report.to_string(),
			"\
# cacheline size: 64
# hot addresses count: 2
# hot addresses (accesses | address):
# 3 256
# 1 512
# max address: 259
# max timestamp: 3.5
# bytes read: 6
# bytes write: 4
# read requests: 50.0%
# write requests: 25.0%
# instruction fetch requests: 25.0%
# mean access size: 3.50 ± 0.50
"
		);
	}

	#[test]
	fn percentages_trim_trailing_zeros() {
		let cases = [
			(0.0, "0.0%"),
			(12.5, "12.5%"),
			(100.0 / 3.0, "33.33%"),
			(200.0 / 3.0, "66.67%"),
			(100.0, "100.0%"),
			(0.004, "0.0%"),
		];

		for (percentage, expected) in cases {
			assert_eq!(Percentage(Some(percentage)).to_string(), expected, "{percentage}");
		}
		assert_eq!(Percentage(None).to_string(), "n/a");
	}

	#[test]
	fn ignored_instruction_fetches_leave_no_requests() {
		let config = Config {
			ignore_instruction_fetch: true,
			..Config::default()
		};
		let stats = stats(&[(AccessKind::InstructionFetch, 0x100, 4)]);
		let report = Report {
			config:  &config,
			stats:   &stats,
			ranking: &[],
		}
		.to_string();

		assert!(report.contains("# read requests: n/a\n"), "{report}");
		assert!(report.contains("# write requests: n/a\n"), "{report}");
		assert!(!report.contains("instruction fetch requests"), "{report}");
	}
}
