//! Hot addresses

// Imports
use {
	crate::{
		buckets,
		error::AnalysisError,
		parser::{AccessKind, TraceRecord},
		reader::{TraceEvent, TraceReader},
	},
	itertools::Itertools,
	std::{collections::HashMap, io, num::NonZeroU64},
};

/// Hot address entry
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct HotAddressEntry {
	/// Bucket address
	pub bucket_address: u64,

	/// Number of accesses to the bucket
	pub access_count: u64,
}

/// Hot address ranker
#[derive(Clone, Debug)]
pub struct HotAddressRanker {
	/// Bucket size
	bucket_size: NonZeroU64,

	/// Whether to ignore instruction fetches
	ignore_instruction_fetch: bool,

	/// Accesses per bucket
	bucket_counts: HashMap<u64, u64>,
}

impl HotAddressRanker {
	/// Creates a new ranker
	#[must_use]
	pub fn new(bucket_size: NonZeroU64, ignore_instruction_fetch: bool) -> Self {
		Self {
			bucket_size,
			ignore_instruction_fetch,
			bucket_counts: HashMap::new(),
		}
	}

	/// Registers a record
	pub fn register_record(&mut self, record: &TraceRecord<'_>) {
		if self.ignore_instruction_fetch && record.kind == AccessKind::InstructionFetch {
			return;
		}

		for bucket_address in buckets::bucketize(record.address, record.size, self.bucket_size) {
			*self.bucket_counts.entry(bucket_address).or_default() += 1;
		}
	}

	/// Registers all remaining records of `reader`.
	///
	/// # Errors
	/// Returns an error if unable to read the next event.
	pub fn register_all<R: io::BufRead>(&mut self, reader: &mut TraceReader<R>) -> Result<(), AnalysisError> {
		while let Some(line) = reader.read_next()? {
			if let TraceEvent::Record(record) = line.event {
				self.register_record(&record);
			}
		}

		Ok(())
	}

	/// Returns the number of distinct buckets accessed
	#[must_use]
	pub fn buckets_len(&self) -> usize {
		self.bucket_counts.len()
	}

	/// Returns the full ranking.
	///
	/// Sorted by access count, descending, then bucket address, ascending.
	#[must_use]
	pub fn ranking(&self) -> Vec<HotAddressEntry> {
		self.bucket_counts
			.iter()
			.map(|(&bucket_address, &access_count)| HotAddressEntry {
				bucket_address,
				access_count,
			})
			.sorted_by(|lhs, rhs| {
				rhs.access_count
					.cmp(&lhs.access_count)
					.then(lhs.bucket_address.cmp(&rhs.bucket_address))
			})
			.collect()
	}

	/// Returns the `count` hottest buckets
	#[must_use]
	pub fn top(&self, count: usize) -> Vec<HotAddressEntry> {
		let mut ranking = self.ranking();
		ranking.truncate(count);
		ranking
	}
}

/// Writes a ranking as `count address` lines.
///
/// Addresses are zero-padded to the number of decimal digits in `max_address`.
///
/// # Errors
/// Returns an error if unable to write to `writer`.
pub fn write_ranking<W: io::Write>(
	mut writer: W,
	ranking: &[HotAddressEntry],
	max_address: u64,
) -> Result<(), io::Error> {
	let width = self::decimal_width(max_address);
	for entry in ranking {
		writeln!(writer, "{}", self::fmt_entry(entry, width))?;
	}

	Ok(())
}

/// Formats an entry as `count address`
pub(crate) fn fmt_entry(entry: &HotAddressEntry, width: usize) -> String {
	format!("{} {:0width$}", entry.access_count, entry.bucket_address)
}

/// Returns the number of decimal digits in `value`
pub(crate) fn decimal_width(value: u64) -> usize {
	value.checked_ilog10().map_or(1, |digits| digits as usize + 1)
}
