//! Route-info payload codec.
//!
//! The payload is a `u16` world count and a reserved `u16`, then one record
//! per world: node count (`u8`), flags (`u8`), path count (`u16`), an 8-byte
//! unlock mask, and `path count` fixed-size path records. A `u32` terminator
//! and any trailing padding follow the last world. All of it is big-endian
//! and every byte is kept so an unedited table re-encodes identically.

use log::debug;

use crate::worldmap::bytes::{Cursor, Writer};
use crate::worldmap::{Result, RouteError};

/// Number of node slots in an unlock mask.
pub const NODE_SLOTS: usize = 64;
/// Encoded size of a world header.
pub const WORLD_HEADER_LEN: usize = 12;
/// Encoded size of one path record.
pub const PATH_RECORD_LEN: usize = 8;
/// Terminator word written after the last world by the game's tools.
pub const TERMINATOR: u32 = 0xFFFF_FFFF;

const TABLE_HEADER_LEN: usize = 4;
const TERMINATOR_LEN: usize = 4;
pub(crate) const MASK_LEN: usize = NODE_SLOTS / 8;

/// Fixed-width node unlock bitmask. Node `n` is bit `n % 8` of byte `n / 8`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnlockMask([u8; MASK_LEN]);

impl UnlockMask {
	/// Wrap raw mask bytes.
	pub fn from_bytes(bytes: [u8; MASK_LEN]) -> Self {
		Self(bytes)
	}

	/// Raw mask bytes as stored on disk.
	pub fn as_bytes(&self) -> &[u8; MASK_LEN] {
		&self.0
	}

	/// Return whether slot `node` is set. Slots past [`NODE_SLOTS`] read as unset.
	pub fn get(&self, node: usize) -> bool {
		node < NODE_SLOTS && self.0[node / 8] & (1 << (node % 8)) != 0
	}

	/// Set or clear slot `node`. Callers validate `node < NODE_SLOTS`.
	pub(crate) fn set(&mut self, node: usize, unlocked: bool) {
		let bit = 1 << (node % 8);
		if unlocked {
			self.0[node / 8] |= bit;
		} else {
			self.0[node / 8] &= !bit;
		}
	}

	/// Iterate set slots in ascending order.
	pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
		(0..NODE_SLOTS).filter(move |node| self.get(*node))
	}
}

/// Connection between two nodes of a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapPath {
	/// Start node index.
	pub start: u8,
	/// End node index.
	pub end: u8,
	/// Sound cue played while travelling the path.
	pub sound: u16,
	/// Action or animation triggered on the path.
	pub action: u16,
	/// Trailing field with no known meaning, kept verbatim.
	pub extra: u16,
}

impl MapPath {
	fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
		Ok(Self {
			start: cursor.read_u8()?,
			end: cursor.read_u8()?,
			sound: cursor.read_u16()?,
			action: cursor.read_u16()?,
			extra: cursor.read_u16()?,
		})
	}

	pub(crate) fn write(&self, writer: &mut Writer<'_>) -> Result<()> {
		writer.write_u8(self.start)?;
		writer.write_u8(self.end)?;
		writer.write_u16(self.sound)?;
		writer.write_u16(self.action)?;
		writer.write_u16(self.extra)
	}
}

/// Route data of one world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct World {
	/// Number of nodes on the world map.
	pub node_count: u8,
	/// Flags byte with no known meaning, kept verbatim.
	pub flags: u8,
	/// Initially unlocked nodes.
	pub unlocks: UnlockMask,
	/// Paths in file order.
	pub paths: Vec<MapPath>,
}

impl World {
	/// Number of addressable nodes: the node count, capped at [`NODE_SLOTS`].
	pub fn node_slots(&self) -> usize {
		usize::from(self.node_count).min(NODE_SLOTS)
	}

	fn encoded_len(&self) -> usize {
		WORLD_HEADER_LEN + self.paths.len() * PATH_RECORD_LEN
	}
}

/// Decoded route-info payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
	/// Reserved header word, kept verbatim.
	pub reserved: u16,
	/// Worlds in file order.
	pub worlds: Vec<World>,
	/// Terminator word as read; normally [`TERMINATOR`].
	pub terminator: u32,
	/// Bytes after the terminator, kept verbatim.
	pub tail: Vec<u8>,
}

impl RouteTable {
	/// Parse a route payload.
	pub fn decode(bytes: &[u8]) -> Result<Self> {
		let mut cursor = Cursor::new(bytes);
		let world_count = usize::from(cursor.read_u16()?);
		let reserved = cursor.read_u16()?;

		let mut worlds = Vec::with_capacity(world_count.min(bytes.len() / WORLD_HEADER_LEN));
		for world in 0..world_count {
			worlds.push(parse_world(&mut cursor, world)?);
		}

		let at = cursor.pos();
		let terminator = cursor.read_u32().map_err(|_| RouteError::MissingTerminator {
			at,
			rem: bytes.len() - at,
		})?;
		let tail = cursor.read_rest().to_vec();

		debug!("decoded route table: {world_count} worlds, {} bytes, {} trailing", bytes.len(), tail.len());
		Ok(Self {
			reserved,
			worlds,
			terminator,
			tail,
		})
	}

	/// Serialize the table in decode order.
	pub fn encode(&self) -> Result<Vec<u8>> {
		let world_count = fit_u16("world count", self.worlds.len())?;
		let len = TABLE_HEADER_LEN + self.worlds.iter().map(World::encoded_len).sum::<usize>() + TERMINATOR_LEN + self.tail.len();

		let mut out = vec![0_u8; len];
		let mut writer = Writer::new(&mut out);
		writer.write_u16(world_count)?;
		writer.write_u16(self.reserved)?;

		for world in &self.worlds {
			writer.write_u8(world.node_count)?;
			writer.write_u8(world.flags)?;
			writer.write_u16(fit_u16("path count", world.paths.len())?)?;
			writer.write_bytes(world.unlocks.as_bytes())?;
			for path in &world.paths {
				path.write(&mut writer)?;
			}
		}

		writer.write_u32(self.terminator)?;
		writer.write_bytes(&self.tail)?;

		debug!("encoded route table: {} worlds, {len} bytes", self.worlds.len());
		Ok(out)
	}
}

fn parse_world(cursor: &mut Cursor<'_>, world: usize) -> Result<World> {
	let at = cursor.pos();
	if cursor.remaining() < WORLD_HEADER_LEN {
		return Err(RouteError::TruncatedWorld {
			world,
			at,
			need: WORLD_HEADER_LEN,
			rem: cursor.remaining(),
		});
	}

	let node_count = cursor.read_u8()?;
	let flags = cursor.read_u8()?;
	let path_count = usize::from(cursor.read_u16()?);
	let unlocks = UnlockMask::from_bytes(cursor.read_array()?);

	Ok(World {
		node_count,
		flags,
		unlocks,
		paths: parse_paths(cursor, world, path_count)?,
	})
}

/// Read `count` path records of `world`, failing before allocation when the
/// block runs past the end of the buffer.
pub(crate) fn parse_paths(cursor: &mut Cursor<'_>, world: usize, count: usize) -> Result<Vec<MapPath>> {
	let need = count * PATH_RECORD_LEN;
	let rem = cursor.remaining();
	if need > rem {
		return Err(RouteError::TruncatedPath {
			world,
			path: rem / PATH_RECORD_LEN,
			at: cursor.pos(),
			need,
			rem,
		});
	}

	let mut paths = Vec::with_capacity(count);
	for _ in 0..count {
		paths.push(MapPath::parse(cursor)?);
	}
	Ok(paths)
}

pub(crate) fn fit_u16(field: &'static str, value: usize) -> Result<u16> {
	u16::try_from(value).map_err(|_| RouteError::FieldOverflow {
		field,
		value: value as u64,
		max: u64::from(u16::MAX),
	})
}
