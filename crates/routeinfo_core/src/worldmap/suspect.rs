use std::fmt;

use crate::worldmap::{NODE_SLOTS, RouteTable, TERMINATOR};

/// Id counts to check sound and action ids against. The format itself puts
/// no bound on either, so both checks are off unless a count is given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdLimits {
	/// Valid sound ids are `0..sound_ids`.
	pub sound_ids: Option<u16>,
	/// Valid action ids are `0..action_ids`.
	pub action_ids: Option<u16>,
}

/// Decoded value outside its expected range. The value itself is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suspect {
	/// Node count larger than the unlock mask can address.
	NodeCountExceedsSlots {
		/// World index.
		world: usize,
		/// Declared node count.
		node_count: u8,
	},
	/// Unlock bit set for a slot at or past the node count.
	UnlockBeyondNodeCount {
		/// World index.
		world: usize,
		/// Slot index.
		node: usize,
	},
	/// Path endpoint outside the world's node set.
	PathNodeOutOfRange {
		/// World index.
		world: usize,
		/// Path index.
		path: usize,
		/// Offending node index.
		node: u8,
	},
	/// Sound id at or past [`IdLimits::sound_ids`].
	SoundOutOfRange {
		/// World index.
		world: usize,
		/// Path index.
		path: usize,
		/// Stored sound id.
		sound: u16,
		/// Configured sound id count.
		limit: u16,
	},
	/// Action id at or past [`IdLimits::action_ids`].
	ActionOutOfRange {
		/// World index.
		world: usize,
		/// Path index.
		path: usize,
		/// Stored action id.
		action: u16,
		/// Configured action id count.
		limit: u16,
	},
	/// Terminator word other than [`TERMINATOR`].
	UnexpectedTerminator {
		/// Stored terminator word.
		found: u32,
	},
}

impl fmt::Display for Suspect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::NodeCountExceedsSlots { world, node_count } => {
				write!(f, "world {world}: node count {node_count} exceeds {NODE_SLOTS} unlock slots")
			}
			Self::UnlockBeyondNodeCount { world, node } => write!(f, "world {world}: unlock bit {node} set past node count"),
			Self::PathNodeOutOfRange { world, path, node } => write!(f, "world {world} path {path}: node {node} out of range"),
			Self::SoundOutOfRange { world, path, sound, limit } => {
				write!(f, "world {world} path {path}: sound id {sound} not below {limit}")
			}
			Self::ActionOutOfRange { world, path, action, limit } => {
				write!(f, "world {world} path {path}: action id {action} not below {limit}")
			}
			Self::UnexpectedTerminator { found } => write!(f, "terminator 0x{found:08x} (expected 0x{TERMINATOR:08x})"),
		}
	}
}

/// Scan a table for values outside their expected ranges.
pub fn scan_suspects(table: &RouteTable, limits: IdLimits) -> Vec<Suspect> {
	let mut out = Vec::new();

	for (world_idx, world) in table.worlds.iter().enumerate() {
		if usize::from(world.node_count) > NODE_SLOTS {
			out.push(Suspect::NodeCountExceedsSlots {
				world: world_idx,
				node_count: world.node_count,
			});
		}

		let slots = world.node_slots();
		out.extend(
			world
				.unlocks
				.iter()
				.filter(|node| *node >= slots)
				.map(|node| Suspect::UnlockBeyondNodeCount { world: world_idx, node }),
		);

		for (path_idx, path) in world.paths.iter().enumerate() {
			for node in [path.start, path.end] {
				if usize::from(node) >= slots {
					out.push(Suspect::PathNodeOutOfRange {
						world: world_idx,
						path: path_idx,
						node,
					});
				}
			}
			if let Some(limit) = limits.sound_ids
				&& path.sound >= limit
			{
				out.push(Suspect::SoundOutOfRange {
					world: world_idx,
					path: path_idx,
					sound: path.sound,
					limit,
				});
			}
			if let Some(limit) = limits.action_ids
				&& path.action >= limit
			{
				out.push(Suspect::ActionOutOfRange {
					world: world_idx,
					path: path_idx,
					action: path.action,
					limit,
				});
			}
		}
	}

	if table.terminator != TERMINATOR {
		out.push(Suspect::UnexpectedTerminator { found: table.terminator });
	}

	out
}
