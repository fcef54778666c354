use std::fmt;

use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, RouteError>;

/// Which model collection an out-of-range index addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
	/// World index into the route table.
	World,
	/// Node index into a world's node set.
	Node,
	/// Path index into a world's path list.
	Path,
}

impl IndexKind {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::World => "world",
			Self::Node => "node",
			Self::Path => "path",
		}
	}
}

impl fmt::Display for IndexKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Errors produced while decoding, editing, and encoding route archives.
#[derive(Debug, Error)]
pub enum RouteError {
	/// Filesystem IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Leading signature is not the U8 archive magic.
	#[error("not a U8 archive (magic={magic:02x?})")]
	BadMagic {
		/// First up-to-4 bytes of the buffer.
		magic: [u8; 4],
	},
	/// A cursor read or write would pass the end of its buffer.
	#[error("out of bounds at offset {at}, need {need} bytes, remaining {rem}")]
	OutOfBounds {
		/// Byte offset where the access was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// The archive file table is structurally damaged.
	#[error("invalid file table entry {index}: {reason}")]
	InvalidFileTable {
		/// File-table entry index.
		index: usize,
		/// What was wrong with it.
		reason: &'static str,
	},
	/// An entry name is unterminated or not ASCII.
	#[error("invalid entry name at string table offset {offset}")]
	InvalidName {
		/// Offset into the string table.
		offset: u32,
	},
	/// An entry name cannot be stored in the string table.
	#[error("invalid entry name {name:?} (expected non-empty ASCII without '/' or NUL)")]
	InvalidEntryName {
		/// Rejected name.
		name: String,
	},
	/// A file entry's byte range exceeds the archive buffer.
	#[error("entry {name} at offset {offset} with length {len} exceeds buffer of {available} bytes")]
	TruncatedEntry {
		/// Entry name.
		name: String,
		/// Declared data offset.
		offset: u32,
		/// Declared data length.
		len: u32,
		/// Archive buffer length.
		available: usize,
	},
	/// Two file entries claim overlapping byte ranges.
	#[error("entries {first} and {second} overlap")]
	OverlappingEntries {
		/// Entry that starts first.
		first: String,
		/// Entry starting inside the first one.
		second: String,
	},
	/// An archive path already names an entry.
	#[error("entry already exists: {path}")]
	EntryExists {
		/// Conflicting archive path.
		path: String,
	},
	/// An archive path does not name an entry.
	#[error("entry not found: {path}")]
	EntryNotFound {
		/// Requested archive path.
		path: String,
	},
	/// An archive path walks through a file as if it were a directory.
	#[error("not a directory: {path}")]
	NotADirectory {
		/// Offending path prefix.
		path: String,
	},
	/// The archive has no route payload with the requested name.
	#[error("route payload not found: {name}")]
	PayloadNotFound {
		/// Requested payload file name or path.
		name: String,
	},
	/// A `point*`/`route*` file cannot be paired into a world.
	#[error("invalid world file {path}: {reason}")]
	InvalidWorldFile {
		/// Archive path of the offending file.
		path: String,
		/// What was wrong with it.
		reason: &'static str,
	},
	/// A world header runs past the end of the payload.
	#[error("world {world} truncated at offset {at}, need {need} bytes, remaining {rem}")]
	TruncatedWorld {
		/// World index.
		world: usize,
		/// Offset of the world header in its payload or point/route file.
		at: usize,
		/// Required bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// A world's declared path count runs past the end of the payload.
	#[error("path {path} of world {world} truncated at offset {at}, need {need} bytes, remaining {rem}")]
	TruncatedPath {
		/// World index.
		world: usize,
		/// First path index that does not fit.
		path: usize,
		/// Payload offset of the world's path block.
		at: usize,
		/// Bytes the declared path block requires.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// The payload ends before the terminator word.
	#[error("route terminator missing at offset {at} (remaining {rem})")]
	MissingTerminator {
		/// Payload offset where the terminator was expected.
		at: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// The payload's world count differs from the configured expectation.
	#[error("world count mismatch: expected {expected}, found {found}")]
	WorldCountMismatch {
		/// Configured world count.
		expected: usize,
		/// World count read from the payload.
		found: usize,
	},
	/// A model accessor was called with an out-of-range index.
	#[error("invalid {kind} index {index} (count {len})")]
	InvalidIndex {
		/// Addressed collection.
		kind: IndexKind,
		/// Offending index.
		index: usize,
		/// Number of valid entries.
		len: usize,
	},
	/// A value does not fit the on-disk field width.
	#[error("{field} value {value} exceeds field maximum {max}")]
	FieldOverflow {
		/// Field being encoded.
		field: &'static str,
		/// Value that does not fit.
		value: u64,
		/// Largest representable value.
		max: u64,
	},
}

impl RouteError {
	/// Return `true` for failures caused by malformed input bytes.
	pub fn is_format_error(&self) -> bool {
		matches!(
			self,
			Self::BadMagic { .. }
				| Self::OutOfBounds { .. }
				| Self::InvalidFileTable { .. }
				| Self::InvalidName { .. }
				| Self::TruncatedEntry { .. }
				| Self::OverlappingEntries { .. }
				| Self::PayloadNotFound { .. }
				| Self::InvalidWorldFile { .. }
				| Self::TruncatedWorld { .. }
				| Self::TruncatedPath { .. }
				| Self::MissingTerminator { .. }
				| Self::WorldCountMismatch { .. }
		)
	}

	pub(crate) fn invalid_index(kind: IndexKind, index: usize, len: usize) -> Self {
		Self::InvalidIndex { kind, index, len }
	}
}
