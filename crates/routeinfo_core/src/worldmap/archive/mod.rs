//! Nintendo U8 archive container.
//!
//! Layout: a 0x20-byte header, a file table of 12-byte entries, a string
//! table of NUL-terminated names, then file data aligned to [`DATA_ALIGN`].
//! Entry 0 is the unnamed root directory; a directory entry stores the index
//! one past its last descendant, so the table is a pre-order walk of the tree.

use log::debug;

use crate::worldmap::bytes::{Cursor, Writer, align_up};
use crate::worldmap::{Result, RouteError};

/// U8 signature (`U\xAA8-`).
pub const U8_MAGIC: [u8; 4] = [0x55, 0xAA, 0x38, 0x2D];
/// Alignment of the data section and of every file inside it.
pub const DATA_ALIGN: usize = 0x20;

const HEADER_LEN: usize = 0x20;
const ENTRY_LEN: usize = 12;
const MAX_NAME_OFFSET: usize = 0x00FF_FFFF;
const MAX_DEPTH: usize = 64;

/// File stored in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcFile {
	/// Entry name without directory components.
	pub name: String,
	/// Raw file contents.
	pub data: Vec<u8>,
}

/// Directory stored in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcDir {
	/// Entry name without directory components.
	pub name: String,
	/// Child entries in file-table order.
	pub children: Vec<Node>,
}

/// One archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
	/// Directory entry.
	Dir(ArcDir),
	/// File entry.
	File(ArcFile),
}

impl Node {
	/// Entry name without directory components.
	pub fn name(&self) -> &str {
		match self {
			Self::Dir(dir) => &dir.name,
			Self::File(file) => &file.name,
		}
	}
}

/// Byte range a file occupies in an encoded archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpan {
	/// `/`-separated path from the archive root.
	pub path: String,
	/// Absolute data offset.
	pub offset: u32,
	/// Data length in bytes, excluding alignment padding.
	pub len: u32,
}

/// Decoded U8 archive: the children of the root directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Archive {
	nodes: Vec<Node>,
}

impl Archive {
	/// Create an empty archive.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parse an archive from a complete in-memory buffer.
	pub fn decode(bytes: &[u8]) -> Result<Self> {
		let mut cursor = Cursor::new(bytes);
		let magic = cursor.read_code4().map_err(|_| RouteError::BadMagic { magic: first4(bytes) })?;
		if magic != U8_MAGIC {
			return Err(RouteError::BadMagic { magic });
		}

		let table_offset = cursor.read_u32()? as usize;
		let table_end = table_offset.saturating_add(cursor.read_u32()? as usize);
		let data_offset = cursor.read_u32()? as usize;
		if data_offset < table_end {
			return Err(RouteError::InvalidFileTable {
				index: 0,
				reason: "data offset inside the file table",
			});
		}

		cursor.seek(table_offset)?;
		let root = RawEntry::parse(&mut cursor)?;
		if !root.is_dir {
			return Err(RouteError::InvalidFileTable {
				index: 0,
				reason: "root entry is not a directory",
			});
		}

		let count = root.size_or_end as usize;
		if count == 0 {
			return Err(RouteError::InvalidFileTable {
				index: 0,
				reason: "root directory claims zero entries",
			});
		}
		let need = (count - 1).saturating_mul(ENTRY_LEN);
		if need > cursor.remaining() {
			return Err(RouteError::OutOfBounds {
				at: cursor.pos(),
				need,
				rem: cursor.remaining(),
			});
		}

		let mut entries = Vec::with_capacity(count);
		entries.push(root);
		for _ in 1..count {
			entries.push(RawEntry::parse(&mut cursor)?);
		}

		let strings_at = cursor.pos();
		if table_end < strings_at {
			return Err(RouteError::InvalidFileTable {
				index: 0,
				reason: "file table size smaller than its entries",
			});
		}
		let strings = bytes.get(strings_at..table_end).ok_or(RouteError::OutOfBounds {
			at: strings_at,
			need: table_end - strings_at,
			rem: bytes.len() - strings_at,
		})?;

		let mut builder = TreeBuilder {
			bytes,
			entries: &entries,
			strings,
			spans: Vec::new(),
		};
		let nodes = builder.children(1, count, 0)?;
		check_overlaps(builder.spans)?;

		debug!("decoded U8 archive: {count} entries, {} bytes", bytes.len());
		Ok(Self { nodes })
	}

	/// Serialize the archive with a freshly computed layout.
	pub fn encode(&self) -> Result<Vec<u8>> {
		let layout = self.layout()?;
		let mut out = vec![0_u8; layout.total_len];
		let mut writer = Writer::new(&mut out);

		writer.write_bytes(&U8_MAGIC)?;
		writer.write_u32(HEADER_LEN as u32)?;
		writer.write_u32(to_u32("file table size", layout.table_size)?)?;
		writer.write_u32(to_u32("data offset", layout.data_offset)?)?;

		writer.seek(HEADER_LEN)?;
		for entry in &layout.entries {
			entry.write(&mut writer)?;
		}
		writer.write_bytes(&layout.strings)?;

		for (span, data) in &layout.files {
			writer.seek(span.offset as usize)?;
			writer.write_bytes(data)?;
		}

		debug!("encoded U8 archive: {} entries, {} bytes", layout.entries.len(), layout.total_len);
		Ok(out)
	}

	/// Return the byte range every file gets on the next encode.
	pub fn spans(&self) -> Result<Vec<FileSpan>> {
		Ok(self.layout()?.files.into_iter().map(|(span, _)| span).collect())
	}

	/// Root-level entries.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// All files in file-table order, paired with their archive paths.
	pub fn files(&self) -> Vec<(String, &ArcFile)> {
		let mut out = Vec::new();
		collect_files(&self.nodes, "", &mut out);
		out
	}

	/// Return `true` when the archive holds no entries.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Look up a file by its `/`-separated path.
	pub fn file(&self, path: &str) -> Option<&ArcFile> {
		let (parents, leaf) = split_path(path)?;
		let mut current = &self.nodes;
		for segment in parents {
			current = match current.iter().find(|node| node.name() == segment)? {
				Node::Dir(dir) => &dir.children,
				Node::File(_) => return None,
			};
		}
		current.iter().find_map(|node| match node {
			Node::File(file) if file.name == leaf => Some(file),
			_ => None,
		})
	}

	/// Look up a file mutably by its `/`-separated path.
	pub fn file_mut(&mut self, path: &str) -> Option<&mut ArcFile> {
		let (parents, leaf) = split_path(path)?;
		let dir = dir_children_mut(&mut self.nodes, &parents, false).ok()?;
		dir.iter_mut().find_map(|node| match node {
			Node::File(file) if file.name == leaf => Some(file),
			_ => None,
		})
	}

	/// Resolve a file path or bare file name to the path of the first match.
	///
	/// A name containing `/` is treated as a full path.
	pub fn find_file(&self, name: &str) -> Option<String> {
		if name.contains('/') {
			return self.file(name).map(|_| name.trim_matches('/').to_owned());
		}
		self.files().into_iter().find(|(_, file)| file.name == name).map(|(path, _)| path)
	}

	/// Replace the contents of an existing file.
	pub fn replace_file(&mut self, path: &str, data: Vec<u8>) -> Result<()> {
		let file = self.file_mut(path).ok_or_else(|| RouteError::EntryNotFound { path: path.to_owned() })?;
		file.data = data;
		Ok(())
	}

	/// Add a new file, creating missing directories on the way.
	pub fn insert_file(&mut self, path: &str, data: Vec<u8>) -> Result<()> {
		let (parents, leaf) = split_path(path).ok_or_else(|| RouteError::InvalidEntryName { name: path.to_owned() })?;
		for segment in parents.iter().chain(std::iter::once(&leaf)) {
			validate_name(segment)?;
		}

		let dir = dir_children_mut(&mut self.nodes, &parents, true)?;
		if dir.iter().any(|node| node.name() == leaf) {
			return Err(RouteError::EntryExists { path: path.to_owned() });
		}
		dir.push(Node::File(ArcFile { name: leaf.to_owned(), data }));
		Ok(())
	}

	/// Remove a file or directory (with its contents) and return it.
	pub fn remove(&mut self, path: &str) -> Result<Node> {
		let not_found = || RouteError::EntryNotFound { path: path.to_owned() };
		let (parents, leaf) = split_path(path).ok_or_else(not_found)?;
		let dir = dir_children_mut(&mut self.nodes, &parents, false)?;
		let index = dir.iter().position(|node| node.name() == leaf).ok_or_else(not_found)?;
		Ok(dir.remove(index))
	}

	fn layout(&self) -> Result<Layout<'_>> {
		let mut plan = LayoutPlan {
			entries: vec![RawEntry::dir(0, 0)],
			strings: vec![0],
			pending: Vec::new(),
		};
		plan.push_children(&self.nodes, 0, "")?;

		let count = plan.entries.len();
		plan.entries[0].size_or_end = to_u32("entry count", count)?;

		let table_size = count * ENTRY_LEN + plan.strings.len();
		let data_offset = align_up(HEADER_LEN + table_size, DATA_ALIGN);

		let mut next = data_offset;
		let mut files = Vec::with_capacity(plan.pending.len());
		for (index, path, data) in plan.pending {
			let offset = to_u32("file offset", next)?;
			let len = to_u32("file length", data.len())?;
			plan.entries[index].offset_or_parent = offset;
			plan.entries[index].size_or_end = len;
			files.push((FileSpan { path, offset, len }, data));
			next = align_up(next + data.len(), DATA_ALIGN);
		}
		to_u32("archive length", next)?;

		Ok(Layout {
			entries: plan.entries,
			strings: plan.strings,
			files,
			table_size,
			data_offset,
			total_len: next,
		})
	}
}

#[derive(Debug, Clone, Copy)]
struct RawEntry {
	is_dir: bool,
	name_offset: u32,
	/// File: data offset. Directory: parent index.
	offset_or_parent: u32,
	/// File: data length. Directory: index past the last descendant.
	size_or_end: u32,
}

impl RawEntry {
	fn dir(name_offset: u32, parent: u32) -> Self {
		Self {
			is_dir: true,
			name_offset,
			offset_or_parent: parent,
			size_or_end: 0,
		}
	}

	fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
		let word = cursor.read_u32()?;
		Ok(Self {
			is_dir: word >> 24 != 0,
			name_offset: word & MAX_NAME_OFFSET as u32,
			offset_or_parent: cursor.read_u32()?,
			size_or_end: cursor.read_u32()?,
		})
	}

	fn write(&self, writer: &mut Writer<'_>) -> Result<()> {
		let kind = if self.is_dir { 1_u32 } else { 0 };
		writer.write_u32(kind << 24 | self.name_offset)?;
		writer.write_u32(self.offset_or_parent)?;
		writer.write_u32(self.size_or_end)
	}
}

struct TreeBuilder<'a> {
	bytes: &'a [u8],
	entries: &'a [RawEntry],
	/// String table, bounded by the header's file-table size.
	strings: &'a [u8],
	spans: Vec<(u32, u32, String)>,
}

impl TreeBuilder<'_> {
	fn children(&mut self, start: usize, end: usize, depth: usize) -> Result<Vec<Node>> {
		if depth > MAX_DEPTH {
			return Err(RouteError::InvalidFileTable {
				index: start.saturating_sub(1),
				reason: "directory nesting too deep",
			});
		}

		let mut out = Vec::new();
		let mut index = start;
		while index < end {
			let entry = self.entries[index];
			let name = self.name(entry.name_offset)?;

			if entry.is_dir {
				let next = entry.size_or_end as usize;
				if next <= index || next > end {
					return Err(RouteError::InvalidFileTable {
						index,
						reason: "directory end index out of order",
					});
				}
				let children = self.children(index + 1, next, depth + 1)?;
				out.push(Node::Dir(ArcDir { name, children }));
				index = next;
				continue;
			}

			let offset = entry.offset_or_parent;
			let len = entry.size_or_end;
			let data_start = offset as usize;
			let data_end = data_start.saturating_add(len as usize);
			let Some(data) = self.bytes.get(data_start..data_end) else {
				return Err(RouteError::TruncatedEntry {
					name,
					offset,
					len,
					available: self.bytes.len(),
				});
			};

			self.spans.push((offset, len, name.clone()));
			out.push(Node::File(ArcFile { name, data: data.to_vec() }));
			index += 1;
		}

		Ok(out)
	}

	fn name(&self, name_offset: u32) -> Result<String> {
		let invalid = || RouteError::InvalidName { offset: name_offset };
		let mut cursor = Cursor::new(self.strings);
		cursor.seek(name_offset as usize).map_err(|_| invalid())?;
		let raw = cursor.read_cstring_bytes().map_err(|_| invalid())?;
		if !raw.is_ascii() {
			return Err(invalid());
		}
		Ok(raw.iter().map(|byte| char::from(*byte)).collect())
	}
}

struct LayoutPlan<'a> {
	entries: Vec<RawEntry>,
	strings: Vec<u8>,
	pending: Vec<(usize, String, &'a [u8])>,
}

impl<'a> LayoutPlan<'a> {
	fn push_children(&mut self, nodes: &'a [Node], parent: usize, prefix: &str) -> Result<()> {
		for node in nodes {
			let name_offset = self.push_name(node.name())?;
			let index = self.entries.len();
			let path = if prefix.is_empty() {
				node.name().to_owned()
			} else {
				format!("{prefix}/{}", node.name())
			};

			match node {
				Node::Dir(dir) => {
					self.entries.push(RawEntry::dir(name_offset, to_u32("parent index", parent)?));
					self.push_children(&dir.children, index, &path)?;
					self.entries[index].size_or_end = to_u32("entry count", self.entries.len())?;
				}
				Node::File(file) => {
					self.entries.push(RawEntry {
						is_dir: false,
						name_offset,
						offset_or_parent: 0,
						size_or_end: 0,
					});
					self.pending.push((index, path, file.data.as_slice()));
				}
			}
		}
		Ok(())
	}

	fn push_name(&mut self, name: &str) -> Result<u32> {
		validate_name(name)?;
		let offset = self.strings.len();
		if offset > MAX_NAME_OFFSET {
			return Err(RouteError::FieldOverflow {
				field: "name offset",
				value: offset as u64,
				max: MAX_NAME_OFFSET as u64,
			});
		}
		self.strings.extend_from_slice(name.as_bytes());
		self.strings.push(0);
		Ok(offset as u32)
	}
}

struct Layout<'a> {
	entries: Vec<RawEntry>,
	strings: Vec<u8>,
	files: Vec<(FileSpan, &'a [u8])>,
	table_size: usize,
	data_offset: usize,
	total_len: usize,
}

fn check_overlaps(mut spans: Vec<(u32, u32, String)>) -> Result<()> {
	spans.retain(|(_, len, _)| *len > 0);
	spans.sort_by_key(|(offset, _, _)| *offset);
	for pair in spans.windows(2) {
		let (first_offset, first_len, first) = &pair[0];
		let (second_offset, _, second) = &pair[1];
		if u64::from(*second_offset) < u64::from(*first_offset) + u64::from(*first_len) {
			return Err(RouteError::OverlappingEntries {
				first: first.clone(),
				second: second.clone(),
			});
		}
	}
	Ok(())
}

fn collect_files<'a>(nodes: &'a [Node], prefix: &str, out: &mut Vec<(String, &'a ArcFile)>) {
	for node in nodes {
		let path = if prefix.is_empty() {
			node.name().to_owned()
		} else {
			format!("{prefix}/{}", node.name())
		};
		match node {
			Node::Dir(dir) => collect_files(&dir.children, &path, out),
			Node::File(file) => out.push((path, file)),
		}
	}
}

fn dir_children_mut<'a>(mut current: &'a mut Vec<Node>, segments: &[&str], create: bool) -> Result<&'a mut Vec<Node>> {
	for (depth, segment) in segments.iter().enumerate() {
		let index = match current.iter().position(|node| node.name() == *segment) {
			Some(index) => index,
			None if create => {
				current.push(Node::Dir(ArcDir {
					name: (*segment).to_owned(),
					children: Vec::new(),
				}));
				current.len() - 1
			}
			None => {
				return Err(RouteError::EntryNotFound {
					path: segments[..=depth].join("/"),
				});
			}
		};

		current = match &mut current[index] {
			Node::Dir(dir) => &mut dir.children,
			Node::File(_) => {
				return Err(RouteError::NotADirectory {
					path: segments[..=depth].join("/"),
				});
			}
		};
	}
	Ok(current)
}

fn split_path(path: &str) -> Option<(Vec<&str>, &str)> {
	let mut segments: Vec<&str> = path.split('/').filter(|segment| !segment.is_empty()).collect();
	let leaf = segments.pop()?;
	Some((segments, leaf))
}

fn validate_name(name: &str) -> Result<()> {
	if name.is_empty() || !name.is_ascii() || name.contains(['/', '\0']) {
		return Err(RouteError::InvalidEntryName { name: name.to_owned() });
	}
	Ok(())
}

fn to_u32(field: &'static str, value: usize) -> Result<u32> {
	u32::try_from(value).map_err(|_| RouteError::FieldOverflow {
		field,
		value: value as u64,
		max: u64::from(u32::MAX),
	})
}

fn first4(bytes: &[u8]) -> [u8; 4] {
	let mut magic = [0_u8; 4];
	let take = bytes.len().min(4);
	magic[..take].copy_from_slice(&bytes[..take]);
	magic
}
