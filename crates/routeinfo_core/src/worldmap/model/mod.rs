use std::ffi::OsString;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::worldmap::split::{decode_world_files, encode_world_files};
use crate::worldmap::{
	Archive, IdLimits, IndexKind, MapPath, Result, RouteError, RouteTable, Suspect, TERMINATOR, World, WorldFiles, regroup_archive,
	scan_suspects,
};

/// Payload file name looked up when no other name is configured.
pub const DEFAULT_PAYLOAD_NAME: &str = "routeinfo.bin";

/// Options controlling how an archive is turned into a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
	/// Payload file name, or a full `/`-separated archive path.
	pub payload_name: String,
	/// Reject payloads whose world count differs from this value.
	pub expected_worlds: Option<usize>,
	/// Sound and action id counts reported by [`RouteModel::suspects`].
	pub limits: IdLimits,
}

impl Default for LoadOptions {
	fn default() -> Self {
		Self {
			payload_name: DEFAULT_PAYLOAD_NAME.to_owned(),
			expected_worlds: None,
			limits: IdLimits::default(),
		}
	}
}

/// Where the route data of a model lives inside its archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteLayout {
	/// One payload file holding every world.
	Table {
		/// Archive path of the payload.
		path: String,
	},
	/// One `point*`/`route*` file pair per world, in world order.
	Split(Vec<WorldFiles>),
}

impl RouteLayout {
	fn relocate(&self, archive: &Archive) -> Result<Self> {
		let find = |path: &str| {
			let name = path.rsplit('/').next().unwrap_or(path);
			archive.find_file(name).ok_or_else(|| RouteError::EntryNotFound { path: path.to_owned() })
		};

		Ok(match self {
			Self::Table { path } => Self::Table { path: find(path)? },
			Self::Split(worlds) => {
				let mut moved = worlds.clone();
				for files in &mut moved {
					files.point_path = find(&files.point_path)?;
					files.route_path = find(&files.route_path)?;
				}
				Self::Split(moved)
			}
		})
	}
}

impl fmt::Display for RouteLayout {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Table { path } => f.write_str(path),
			Self::Split(worlds) => write!(f, "{} point/route file pairs", worlds.len()),
		}
	}
}

/// Editable route data of one opened archive.
///
/// Every mutator validates its indices before touching the table, and nothing
/// reaches disk until [`RouteModel::to_bytes`] or [`RouteModel::save`].
#[derive(Debug, Clone)]
pub struct RouteModel {
	archive: Archive,
	layout: RouteLayout,
	table: RouteTable,
	limits: IdLimits,
	modified: bool,
}

impl RouteModel {
	/// Decode an archive buffer with default options.
	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		Self::from_bytes_with(bytes, &LoadOptions::default())
	}

	/// Decode an archive buffer.
	///
	/// The payload named by the options wins; without one, the archive is
	/// read as per-world `point*`/`route*` file pairs.
	pub fn from_bytes_with(bytes: &[u8], options: &LoadOptions) -> Result<Self> {
		let archive = Archive::decode(bytes)?;
		let (layout, table) = load_layout(&archive, &options.payload_name)?;

		if let Some(expected) = options.expected_worlds
			&& expected != table.worlds.len()
		{
			return Err(RouteError::WorldCountMismatch {
				expected,
				found: table.worlds.len(),
			});
		}

		for suspect in scan_suspects(&table, options.limits) {
			warn!("{layout}: {suspect}");
		}
		debug!("loaded {layout}: {} worlds", table.worlds.len());

		Ok(Self {
			archive,
			layout,
			table,
			limits: options.limits,
			modified: false,
		})
	}

	/// Read and decode an archive file with default options.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		Self::open_with(path, &LoadOptions::default())
	}

	/// Read and decode an archive file.
	pub fn open_with(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self> {
		let bytes = fs::read(path)?;
		Self::from_bytes_with(&bytes, options)
	}

	/// Encode the current table into a complete archive buffer.
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		self.current_archive()?.encode()
	}

	/// Encode and write the archive, then mark the model unmodified.
	///
	/// The bytes go to a sibling `.tmp` file that is renamed over `path`, so
	/// the previous file survives any failure.
	pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
		let bytes = self.to_bytes()?;
		write_replacing(path.as_ref(), &bytes)?;
		self.modified = false;
		Ok(())
	}

	/// Rebuild the archive the way the world-map tools write it: `point*` and
	/// `route*` files sorted by name, each under a folder named after its
	/// world. Counts as an edit.
	pub fn regroup(&mut self) -> Result<()> {
		let archive = regroup_archive(&self.current_archive()?)?;
		self.layout = self.layout.relocate(&archive)?;
		self.archive = archive;
		self.modified = true;
		debug!("regrouped archive: {} files", self.archive.files().len());
		Ok(())
	}

	/// Number of worlds.
	pub fn world_count(&self) -> usize {
		self.table.worlds.len()
	}

	/// Number of addressable nodes in `world`.
	pub fn node_count(&self, world: usize) -> Result<usize> {
		Ok(self.world(world)?.node_slots())
	}

	/// Return whether `node` of `world` starts unlocked.
	pub fn is_node_unlocked(&self, world: usize, node: usize) -> Result<bool> {
		let world = self.world(world)?;
		check_node(world, node)?;
		Ok(world.unlocks.get(node))
	}

	/// Set whether `node` of `world` starts unlocked.
	pub fn set_node_unlocked(&mut self, world: usize, node: usize, unlocked: bool) -> Result<()> {
		let world = self.world_mut(world)?;
		check_node(world, node)?;
		world.unlocks.set(node, unlocked);
		self.modified = true;
		Ok(())
	}

	/// Unlocked nodes of `world` in ascending order.
	pub fn unlocked_nodes(&self, world: usize) -> Result<Vec<usize>> {
		let world = self.world(world)?;
		let slots = world.node_slots();
		Ok(world.unlocks.iter().filter(|node| *node < slots).collect())
	}

	/// Paths of `world` in file order.
	pub fn paths(&self, world: usize) -> Result<&[MapPath]> {
		Ok(&self.world(world)?.paths)
	}

	/// One path of `world`.
	pub fn path(&self, world: usize, path: usize) -> Result<&MapPath> {
		let paths = &self.world(world)?.paths;
		paths.get(path).ok_or_else(|| RouteError::invalid_index(IndexKind::Path, path, paths.len()))
	}

	/// Set the sound id of a path. Any `u16` is accepted.
	pub fn set_path_sound(&mut self, world: usize, path: usize, sound: u16) -> Result<()> {
		self.path_mut(world, path)?.sound = sound;
		self.modified = true;
		Ok(())
	}

	/// Set the action id of a path. Any `u16` is accepted.
	pub fn set_path_action(&mut self, world: usize, path: usize, action: u16) -> Result<()> {
		self.path_mut(world, path)?.action = action;
		self.modified = true;
		Ok(())
	}

	/// Reconnect a path. Both endpoints must be nodes of `world`.
	pub fn set_path_nodes(&mut self, world: usize, path: usize, start: u8, end: u8) -> Result<()> {
		let target = self.world(world)?;
		check_node(target, usize::from(start))?;
		check_node(target, usize::from(end))?;

		let record = self.path_mut(world, path)?;
		record.start = start;
		record.end = end;
		self.modified = true;
		Ok(())
	}

	/// Values outside their expected ranges in the current table.
	pub fn suspects(&self) -> Vec<Suspect> {
		scan_suspects(&self.table, self.limits)
	}

	/// Return `true` after any successful mutation since load or save.
	pub fn is_modified(&self) -> bool {
		self.modified
	}

	/// Decoded route table. Split archives get a synthesized header and
	/// terminator that are never written back.
	pub fn table(&self) -> &RouteTable {
		&self.table
	}

	/// Container the table was loaded from. Its payload bytes are stale after edits.
	pub fn archive(&self) -> &Archive {
		&self.archive
	}

	/// Where the route data lives inside the archive.
	pub fn layout(&self) -> &RouteLayout {
		&self.layout
	}

	fn current_archive(&self) -> Result<Archive> {
		let mut archive = self.archive.clone();
		match &self.layout {
			RouteLayout::Table { path } => archive.replace_file(path, self.table.encode()?)?,
			RouteLayout::Split(files) => encode_world_files(&mut archive, &self.table.worlds, files)?,
		}
		Ok(archive)
	}

	fn world(&self, world: usize) -> Result<&World> {
		let len = self.table.worlds.len();
		self.table.worlds.get(world).ok_or_else(|| RouteError::invalid_index(IndexKind::World, world, len))
	}

	fn world_mut(&mut self, world: usize) -> Result<&mut World> {
		let len = self.table.worlds.len();
		self.table.worlds.get_mut(world).ok_or_else(|| RouteError::invalid_index(IndexKind::World, world, len))
	}

	fn path_mut(&mut self, world: usize, path: usize) -> Result<&mut MapPath> {
		let paths = &mut self.world_mut(world)?.paths;
		let len = paths.len();
		paths.get_mut(path).ok_or_else(|| RouteError::invalid_index(IndexKind::Path, path, len))
	}
}

fn load_layout(archive: &Archive, payload_name: &str) -> Result<(RouteLayout, RouteTable)> {
	if let Some(path) = archive.find_file(payload_name) {
		let payload = archive.file(&path).map(|file| file.data.as_slice()).unwrap_or_default();
		let table = RouteTable::decode(payload)?;
		return Ok((RouteLayout::Table { path }, table));
	}

	debug!("no payload named {payload_name}, looking for point/route files");
	match decode_world_files(archive)? {
		Some((worlds, files)) => {
			let table = RouteTable {
				reserved: 0,
				worlds,
				terminator: TERMINATOR,
				tail: Vec::new(),
			};
			Ok((RouteLayout::Split(files), table))
		}
		None => Err(RouteError::PayloadNotFound {
			name: payload_name.to_owned(),
		}),
	}
}

fn write_replacing(path: &Path, bytes: &[u8]) -> io::Result<()> {
	let mut tmp_name = OsString::from(path.as_os_str());
	tmp_name.push(".tmp");
	let tmp_path = PathBuf::from(tmp_name);

	let written = File::create(&tmp_path).and_then(|mut file| {
		file.write_all(bytes)?;
		file.sync_all()
	});
	if let Err(err) = written.and_then(|()| fs::rename(&tmp_path, path)) {
		let _ = fs::remove_file(&tmp_path);
		return Err(err);
	}
	Ok(())
}

fn check_node(world: &World, node: usize) -> Result<()> {
	let slots = world.node_slots();
	if node >= slots {
		return Err(RouteError::invalid_index(IndexKind::Node, node, slots));
	}
	Ok(())
}

/// Open an archive file as a route model.
pub fn open_archive(path: impl AsRef<Path>) -> Result<RouteModel> {
	RouteModel::open(path)
}

/// Save a route model to an archive file.
pub fn save_archive(model: &mut RouteModel, path: impl AsRef<Path>) -> Result<()> {
	model.save(path)
}

#[cfg(test)]
mod tests;
