//! Address buckets

// Imports
use std::num::NonZeroU64;

/// Returns all buckets touched by an access of `size` bytes at `address`.
///
/// Buckets are `bucket_size`-aligned addresses, from the bucket of `address`
/// up to, and including, the bucket of `address + size`.
///
/// # Panics
/// Panics if `address + size` overflows. Parsed records never do.
pub fn bucketize(address: u64, size: u64, bucket_size: NonZeroU64) -> impl Iterator<Item = u64> {
	let bucket_size = bucket_size.get();
	let end = address.checked_add(size).expect("Access overflowed the address space");

	let first = address / bucket_size * bucket_size;
	let last = end / bucket_size * bucket_size;
	let buckets = (last - first) / bucket_size + 1;

	(0..buckets).map(move |bucket_idx| first + bucket_idx * bucket_size)
}
