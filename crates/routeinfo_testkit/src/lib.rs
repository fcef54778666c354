//! Shared test helpers for workspace crates.
//!
//! The builders here lay bytes out by hand so tests can check the codecs
//! against an independent rendition of the format.

use std::path::{Path, PathBuf};

/// Archive path of the route payload inside [`sample_archive`].
pub const SAMPLE_PAYLOAD_PATH: &str = "route/routeinfo.bin";
/// File name of the route payload inside [`sample_archive`].
pub const SAMPLE_PAYLOAD_NAME: &str = "routeinfo.bin";
/// Archive path of the non-route file inside [`sample_archive`].
pub const SAMPLE_OTHER_PATH: &str = "W1/nodesW1.bin";
/// Contents of the non-route file inside [`sample_archive`].
pub const SAMPLE_OTHER_DATA: &[u8] = b"opaque node placement data";

const U8_MAGIC: [u8; 4] = [0x55, 0xAA, 0x38, 0x2D];
const ALIGN: usize = 0x20;

/// One path record of a hand-built route payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathFixture {
	/// Start node index.
	pub start: u8,
	/// End node index.
	pub end: u8,
	/// Sound id.
	pub sound: u16,
	/// Action id.
	pub action: u16,
	/// Opaque trailing field.
	pub extra: u16,
}

/// One world of a hand-built route payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldFixture {
	/// Declared node count.
	pub node_count: u8,
	/// Opaque flags byte.
	pub flags: u8,
	/// Raw unlock mask bytes.
	pub mask: [u8; 8],
	/// Path records.
	pub paths: Vec<PathFixture>,
}

impl WorldFixture {
	/// Point file bytes: node count, flags, unlock mask.
	pub fn point_bytes(&self) -> Vec<u8> {
		let mut out = vec![self.node_count, self.flags];
		out.extend_from_slice(&self.mask);
		out
	}

	/// Route file bytes: path count, then path records.
	pub fn route_bytes(&self) -> Vec<u8> {
		let mut out = (self.paths.len() as u16).to_be_bytes().to_vec();
		for path in &self.paths {
			path.push_to(&mut out);
		}
		out
	}
}

impl PathFixture {
	fn push_to(&self, out: &mut Vec<u8>) {
		out.push(self.start);
		out.push(self.end);
		out.extend_from_slice(&self.sound.to_be_bytes());
		out.extend_from_slice(&self.action.to_be_bytes());
		out.extend_from_slice(&self.extra.to_be_bytes());
	}
}

/// Hand-built route payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadFixture {
	/// Reserved header word.
	pub reserved: u16,
	/// Worlds in order.
	pub worlds: Vec<WorldFixture>,
	/// Terminator word.
	pub terminator: u32,
	/// Trailing padding.
	pub tail: Vec<u8>,
}

impl PayloadFixture {
	/// Lay the payload out byte by byte.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut out = Vec::new();
		out.extend_from_slice(&(self.worlds.len() as u16).to_be_bytes());
		out.extend_from_slice(&self.reserved.to_be_bytes());
		for world in &self.worlds {
			out.push(world.node_count);
			out.push(world.flags);
			out.extend_from_slice(&(world.paths.len() as u16).to_be_bytes());
			out.extend_from_slice(&world.mask);
			for path in &world.paths {
				path.push_to(&mut out);
			}
		}
		out.extend_from_slice(&self.terminator.to_be_bytes());
		out.extend_from_slice(&self.tail);
		out
	}
}

/// Two-world payload: world 0 unlocks nodes 0 and 1 and has one path
/// (0 -> 1, sound 4, action 2); world 1 has three paths.
pub fn sample_payload_fixture() -> PayloadFixture {
	PayloadFixture {
		reserved: 0x0001,
		worlds: vec![
			WorldFixture {
				node_count: 4,
				flags: 0x00,
				mask: [0b0000_0011, 0, 0, 0, 0, 0, 0, 0],
				paths: vec![PathFixture {
					start: 0,
					end: 1,
					sound: 4,
					action: 2,
					extra: 0,
				}],
			},
			WorldFixture {
				node_count: 6,
				flags: 0x01,
				mask: [0b0010_0101, 0, 0, 0, 0, 0, 0, 0],
				paths: vec![
					PathFixture {
						start: 0,
						end: 2,
						sound: 1,
						action: 3,
						extra: 0x8000,
					},
					PathFixture {
						start: 2,
						end: 5,
						sound: 7,
						action: 1,
						extra: 0,
					},
					PathFixture {
						start: 5,
						end: 3,
						sound: 0,
						action: 0,
						extra: 0,
					},
				],
			},
		],
		terminator: 0xFFFF_FFFF,
		tail: vec![0; 4],
	}
}

/// Bytes of [`sample_payload_fixture`].
pub fn sample_payload() -> Vec<u8> {
	sample_payload_fixture().to_bytes()
}

/// Archive holding the sample payload at [`SAMPLE_PAYLOAD_PATH`] next to an
/// unrelated file at [`SAMPLE_OTHER_PATH`].
pub fn sample_archive() -> Vec<u8> {
	archive_with_payload(&sample_payload())
}

/// Sample archive layout with a caller-provided route payload.
pub fn archive_with_payload(payload: &[u8]) -> Vec<u8> {
	U8Builder::new().file("W1", "nodesW1.bin", SAMPLE_OTHER_DATA).file("route", SAMPLE_PAYLOAD_NAME, payload).build()
}

/// The sample worlds as per-world file pairs: `01/point01.bin`,
/// `01/route01.bin`, `02/point02.bin`, `02/route02.bin`.
pub fn split_archive() -> Vec<u8> {
	let mut builder = U8Builder::new();
	for (index, world) in sample_payload_fixture().worlds.iter().enumerate() {
		let folder = format!("{:02}", index + 1);
		builder = builder
			.file(&folder, &format!("point{folder}.bin"), world.point_bytes())
			.file(&folder, &format!("route{folder}.bin"), world.route_bytes());
	}
	builder.build()
}

/// Hand-rolled U8 writer for archives with one directory level.
#[derive(Debug, Clone, Default)]
pub struct U8Builder {
	dirs: Vec<(String, Vec<(String, Vec<u8>)>)>,
}

impl U8Builder {
	/// Start an empty archive.
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a file to `dir`, creating the directory on first use.
	pub fn file(mut self, dir: &str, name: &str, data: impl Into<Vec<u8>>) -> Self {
		let entry = (name.to_owned(), data.into());
		match self.dirs.iter_mut().find(|(existing, _)| existing == dir) {
			Some((_, files)) => files.push(entry),
			None => self.dirs.push((dir.to_owned(), vec![entry])),
		}
		self
	}

	/// Lay the archive out: header, file table, string table, aligned data.
	pub fn build(&self) -> Vec<u8> {
		let mut strings = vec![0_u8];
		let mut table: Vec<[u32; 3]> = vec![[1 << 24, 0, 0]];
		let mut file_rows = Vec::new();

		for (dir, files) in &self.dirs {
			let dir_row = table.len();
			table.push([1 << 24 | push_name(&mut strings, dir), 0, 0]);
			for (name, data) in files {
				file_rows.push((table.len(), data));
				table.push([push_name(&mut strings, name), 0, data.len() as u32]);
			}
			table[dir_row][2] = table.len() as u32;
		}
		table[0][2] = table.len() as u32;

		let table_size = table.len() * 12 + strings.len();
		let data_offset = align(0x20 + table_size);
		let mut next = data_offset;
		for (row, data) in &file_rows {
			table[*row][1] = next as u32;
			next = align(next + data.len());
		}

		let mut out = Vec::with_capacity(next);
		out.extend_from_slice(&U8_MAGIC);
		out.extend_from_slice(&0x20_u32.to_be_bytes());
		out.extend_from_slice(&(table_size as u32).to_be_bytes());
		out.extend_from_slice(&(data_offset as u32).to_be_bytes());
		out.resize(0x20, 0);
		for row in &table {
			for word in row {
				out.extend_from_slice(&word.to_be_bytes());
			}
		}
		out.extend_from_slice(&strings);
		for (_, data) in &file_rows {
			out.resize(align(out.len()), 0);
			out.extend_from_slice(data);
		}
		out.resize(next, 0);
		out
	}
}

fn push_name(strings: &mut Vec<u8>, name: &str) -> u32 {
	let offset = strings.len() as u32;
	strings.extend_from_slice(name.as_bytes());
	strings.push(0);
	offset
}

fn align(value: usize) -> usize {
	value.div_ceil(ALIGN) * ALIGN
}

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve the workspace target directory.
pub fn target_dir() -> PathBuf {
	std::env::var_os("CARGO_TARGET_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|| workspace_root().join("target"))
}

/// Return a fresh scratch file path under `<target>/routeinfo-tests/<test>/`.
pub fn scratch_path(test: &str, file: &str) -> PathBuf {
	let dir = target_dir().join("routeinfo-tests").join(test);
	let _ = std::fs::remove_dir_all(&dir);
	std::fs::create_dir_all(&dir).expect("scratch dir is creatable");
	dir.join(file)
}
