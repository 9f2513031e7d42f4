//! Trace line parsing
//!
//! Parses single lines of `drcachesim`'s `view` tool output, which look like
//!
//! ```text
//!        6           0:     1234567 <marker: timestamp 13331862029895113>
//!        8           1:     1234567 ifetch       3 byte(s) @ 0x00007f6a5d2b7090 mov    %rsp, %rdi
//!        9           1:     1234567 read         8 byte(s) @ 0x00007ffc5cf4e0d8 by PC 0x00007f6a5d2b7093
//! View tool results:
//! ```

// Imports
use {crate::error::MalformedRecord, std::fmt};

/// Maximum number of tokens we look at
const MAX_TOKENS: usize = 8;

/// Token index of the thread id
const TOKEN_THREAD_ID: usize = 2;

/// Token index of the record kind
const TOKEN_KIND: usize = 3;

/// Token index of the access size / marker kind
const TOKEN_SIZE: usize = 4;

/// Token index of the access size unit / marker value
const TOKEN_UNIT: usize = 5;

/// Token index of the address
const TOKEN_ADDRESS: usize = 7;

/// Access kind
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum AccessKind {
	/// Instruction fetch
	InstructionFetch,

	/// Read
	Read,

	/// Write
	Write,
}

impl AccessKind {
	/// Parses an access kind from its trace keyword
	#[must_use]
	pub fn from_keyword(keyword: &str) -> Option<Self> {
		match keyword {
			"ifetch" => Some(Self::InstructionFetch),
			"read" => Some(Self::Read),
			"write" => Some(Self::Write),
			_ => None,
		}
	}

	/// Returns the op code used in the normalized event log
	#[must_use]
	pub fn op_code(self) -> char {
		match self {
			Self::InstructionFetch => 'I',
			Self::Read => 'R',
			Self::Write => 'W',
		}
	}
}

impl fmt::Display for AccessKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.op_code())
	}
}

/// Memory access record
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct TraceRecord<'a> {
	/// Most recent timestamp, in micro-seconds.
	///
	/// Filled by the reader, [`parse_line`] always leaves it as `None`.
	pub timestamp: Option<u64>,

	/// Thread id
	pub thread_id: &'a str,

	/// Access kind
	pub kind: AccessKind,

	/// Address
	pub address: u64,

	/// Access size, in bytes.
	///
	/// Always non-zero, and `address + size` never overflows.
	pub size: u64,
}

impl TraceRecord<'_> {
	/// Returns the address one past the end of this access
	#[must_use]
	pub fn end_address(&self) -> u64 {
		self.address + self.size
	}

	/// Returns the last address touched by this access
	#[must_use]
	pub fn last_address(&self) -> u64 {
		self.end_address() - 1
	}
}

/// Marker
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum MarkerEvent<'a> {
	/// Timestamp, in micro-seconds
	Timestamp(u64),

	/// Any other marker
	Other { kind: &'a str },
}

/// Parsed line
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum ParseEvent<'a> {
	/// Memory access
	Record(TraceRecord<'a>),

	/// Marker
	Marker(MarkerEvent<'a>),

	/// Footer, nothing after this is trace data
	EndOfTrace,

	/// Unknown line
	Unrecognized,
}

/// Parses a single trace line.
///
/// # Errors
/// Returns an error if the line looks like a record or a timestamp marker, but is malformed.
pub fn parse_line(line: &str) -> Result<ParseEvent<'_>, MalformedRecord> {
	let tokens = Tokens::new(line);

	match tokens.get(0) {
		None => return Ok(ParseEvent::Unrecognized),
		Some("View") => return Ok(ParseEvent::EndOfTrace),
		Some(_) => (),
	}

	match tokens.get(TOKEN_KIND) {
		Some("<marker:") => self::parse_marker(&tokens).map(ParseEvent::Marker),
		Some(keyword) => match AccessKind::from_keyword(keyword) {
			Some(kind) => self::parse_record(&tokens, kind).map(ParseEvent::Record),
			None => Ok(ParseEvent::Unrecognized),
		},
		None => Ok(ParseEvent::Unrecognized),
	}
}

/// Parses a marker line
fn parse_marker<'a>(tokens: &Tokens<'a>) -> Result<MarkerEvent<'a>, MalformedRecord> {
	let kind = tokens.expect(TOKEN_SIZE, "marker kind")?;
	if kind != "timestamp" {
		return Ok(MarkerEvent::Other { kind });
	}

	// Note: The value is followed by the closing `>` of the marker
	let value = tokens.expect(TOKEN_UNIT, "timestamp")?;
	let value = match value.char_indices().next_back() {
		Some((last_idx, _)) => &value[..last_idx],
		None => value,
	};
	let timestamp = value.parse::<u64>().map_err(|_| MalformedRecord::InvalidNumber {
		name:  "timestamp",
		token: value.to_owned(),
	})?;

	Ok(MarkerEvent::Timestamp(timestamp))
}

/// Parses a memory access line
fn parse_record<'a>(tokens: &Tokens<'a>, kind: AccessKind) -> Result<TraceRecord<'a>, MalformedRecord> {
	let thread_id = tokens.expect(TOKEN_THREAD_ID, "thread id")?;

	let size = tokens.expect(TOKEN_SIZE, "size")?;
	let size = size.parse::<u64>().map_err(|_| MalformedRecord::InvalidNumber {
		name:  "size",
		token: size.to_owned(),
	})?;

	let unit = tokens.expect(TOKEN_UNIT, "size unit")?;
	if unit != "byte(s)" {
		return Err(MalformedRecord::UnexpectedLiteral {
			expected: "byte(s)",
			found:    unit.to_owned(),
		});
	}

	let address = tokens.expect(TOKEN_ADDRESS, "address")?;
	let address = self::parse_int_literal(address).ok_or_else(|| MalformedRecord::InvalidNumber {
		name:  "address",
		token: address.to_owned(),
	})?;

	if size == 0 {
		return Err(MalformedRecord::ZeroSize);
	}
	if address.checked_add(size).is_none() {
		return Err(MalformedRecord::AddressOverflow { address, size });
	}

	Ok(TraceRecord {
		timestamp: None,
		thread_id,
		kind,
		address,
		size,
	})
}

/// Parses an integer literal with an optional base prefix.
///
/// Accepts `0x` (hexadecimal), `0o` (octal), `0b` (binary) or no prefix (decimal).
#[must_use]
pub fn parse_int_literal(literal: &str) -> Option<u64> {
	let (digits, radix) = match literal.get(..2) {
		Some("0x" | "0X") => (&literal[2..], 16),
		Some("0o" | "0O") => (&literal[2..], 8),
		Some("0b" | "0B") => (&literal[2..], 2),
		_ => (literal, 10),
	};

	// Note: `from_str_radix` accepts a leading `+`, but addresses are never signed
	if digits.starts_with('+') {
		return None;
	}

	u64::from_str_radix(digits, radix).ok()
}

/// First tokens of a line
struct Tokens<'a> {
	tokens: [Option<&'a str>; MAX_TOKENS],
}

impl<'a> Tokens<'a> {
	fn new(line: &'a str) -> Self {
		let mut tokens = [None; MAX_TOKENS];
		for (slot, token) in tokens.iter_mut().zip(line.split_whitespace()) {
			*slot = Some(token);
		}

		Self { tokens }
	}

	fn get(&self, idx: usize) -> Option<&'a str> {
		self.tokens[idx]
	}

	fn expect(&self, idx: usize, name: &'static str) -> Result<&'a str, MalformedRecord> {
		self.get(idx).ok_or(MalformedRecord::MissingToken { idx, name })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parse_ifetch() {
		let line = "       8           1:     1234567 ifetch       3 byte(s) @ 0x00007f6a5d2b7090 mov    %rsp, %rdi";
		assert_eq!(
			parse_line(line),
			Ok(ParseEvent::Record(TraceRecord {
				timestamp: None,
				thread_id: "1234567",
				kind:      AccessKind::InstructionFetch,
				address:   0x7f6a_5d2b_7090,
				size:      3,
			}))
		);
	}

	#[test]
	fn parse_read_write() {
		let read = parse_line("9 1: 42 read 8 byte(s) @ 0x10 by PC 0x20").unwrap();
		let write = parse_line("10 1: 42 write 4 byte(s) @ 256 by PC 0x20").unwrap();

		assert!(matches!(read, ParseEvent::Record(TraceRecord { kind: AccessKind::Read, address: 0x10, size: 8, .. })));
		assert!(matches!(write, ParseEvent::Record(TraceRecord { kind: AccessKind::Write, address: 256, size: 4, .. })));
	}

	#[test]
	fn parse_markers() {
		assert_eq!(
			parse_line("6 0: 42 <marker: timestamp 13331862029895113>"),
			Ok(ParseEvent::Marker(MarkerEvent::Timestamp(13_331_862_029_895_113)))
		);
		assert_eq!(
			parse_line("7 0: 42 <marker: tid 42 on core 3>"),
			Ok(ParseEvent::Marker(MarkerEvent::Other { kind: "tid" }))
		);
		assert_eq!(
			parse_line("5 0: 42 <marker: page size 4096>"),
			Ok(ParseEvent::Marker(MarkerEvent::Other { kind: "page" }))
		);
	}

	#[test]
	fn parse_footer_and_unknown() {
		assert_eq!(parse_line("View tool results:"), Ok(ParseEvent::EndOfTrace));
		assert_eq!(parse_line(""), Ok(ParseEvent::Unrecognized));
		assert_eq!(parse_line("   "), Ok(ParseEvent::Unrecognized));
		assert_eq!(
			parse_line("------------------------------------------------------------"),
			Ok(ParseEvent::Unrecognized)
		);
		assert_eq!(parse_line("11 2: 42 <thread 42 exited>"), Ok(ParseEvent::Unrecognized));
	}

	#[test]
	fn missing_unit_is_malformed() {
		assert_eq!(
			parse_line("9 1: 42 read 8 bytes @ 0x10"),
			Err(MalformedRecord::UnexpectedLiteral {
				expected: "byte(s)",
				found:    "bytes".to_owned(),
			})
		);
	}

	#[test]
	fn bad_numbers_are_malformed() {
		assert!(matches!(
			parse_line("9 1: 42 read eight byte(s) @ 0x10"),
			Err(MalformedRecord::InvalidNumber { name: "size", .. })
		));
		assert!(matches!(
			parse_line("9 1: 42 read 8 byte(s) @ 0xzz"),
			Err(MalformedRecord::InvalidNumber { name: "address", .. })
		));
		assert!(matches!(
			parse_line("9 1: 42 read 8 byte(s)"),
			Err(MalformedRecord::MissingToken { idx: 7, .. })
		));
		assert!(matches!(
			parse_line("6 0: 42 <marker: timestamp abc>"),
			Err(MalformedRecord::InvalidNumber { name: "timestamp", .. })
		));
	}

	#[test]
	fn record_invariants() {
		assert_eq!(parse_line("9 1: 42 read 0 byte(s) @ 0x10"), Err(MalformedRecord::ZeroSize));
		assert_eq!(
			parse_line("9 1: 42 read 2 byte(s) @ 0xffffffffffffffff"),
			Err(MalformedRecord::AddressOverflow {
				address: u64::MAX,
				size:    2,
			})
		);
	}

	#[test]
	fn int_literals() {
		assert_eq!(parse_int_literal("0x100"), Some(256));
		assert_eq!(parse_int_literal("0XfF"), Some(255));
		assert_eq!(parse_int_literal("0o17"), Some(15));
		assert_eq!(parse_int_literal("0b101"), Some(5));
		assert_eq!(parse_int_literal("1234"), Some(1234));
		assert_eq!(parse_int_literal("0"), Some(0));
		assert_eq!(parse_int_literal("0x"), None);
		assert_eq!(parse_int_literal("0x+1"), None);
		assert_eq!(parse_int_literal("-1"), None);
		assert_eq!(parse_int_literal(""), None);
	}
}
