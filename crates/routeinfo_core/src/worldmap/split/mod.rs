//! Per-world `point*`/`route*` file pairs.
//!
//! Archives saved by the world-map editor keep each world in two
//! files instead of one payload. A point file holds the node count, the flags
//! byte, and the unlock mask. A route file holds a `u16` path count and the
//! path records. Files pair up by the name after their prefix, so
//! `01/point01.bin` goes with `01/route01.bin`, and worlds follow sorted file
//! name order. Bytes after the decoded fields are kept per file.

use log::debug;

use crate::worldmap::bytes::{Cursor, Writer};
use crate::worldmap::table::{MASK_LEN, fit_u16, parse_paths};
use crate::worldmap::{Archive, PATH_RECORD_LEN, Result, RouteError, UnlockMask, World};

/// Name prefix of per-world unlock files.
pub const POINT_PREFIX: &str = "point";
/// Name prefix of per-world path files.
pub const ROUTE_PREFIX: &str = "route";
/// Encoded size of a point file before its trailing bytes.
pub const POINT_HEADER_LEN: usize = 2 + MASK_LEN;
/// Encoded size of a route file header.
pub const ROUTE_HEADER_LEN: usize = 2;

const EXTENSION_LEN: usize = 4;
const FOLDER_LEN: usize = 2;

/// Archive paths and trailing bytes of one world's file pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldFiles {
	/// Archive path of the point file.
	pub point_path: String,
	/// Archive path of the route file.
	pub route_path: String,
	point_tail: Vec<u8>,
	route_tail: Vec<u8>,
}

struct Candidate<'a> {
	key: &'a str,
	path: String,
	data: &'a [u8],
}

/// Decode every point/route pair in `archive`, in sorted name order.
///
/// Returns `Ok(None)` when the archive holds no `point*` file.
pub fn decode_world_files(archive: &Archive) -> Result<Option<(Vec<World>, Vec<WorldFiles>)>> {
	let mut points = Vec::new();
	let mut routes = Vec::new();
	for (path, file) in archive.files() {
		if let Some(key) = file.name.strip_prefix(POINT_PREFIX) {
			points.push(Candidate { key, path, data: &file.data });
		} else if let Some(key) = file.name.strip_prefix(ROUTE_PREFIX) {
			routes.push(Candidate { key, path, data: &file.data });
		}
	}
	if points.is_empty() {
		return Ok(None);
	}

	sort_unique(&mut points)?;
	sort_unique(&mut routes)?;

	let mut worlds = Vec::with_capacity(points.len());
	let mut files = Vec::with_capacity(points.len());
	for index in 0..points.len().max(routes.len()) {
		let (point, route) = match (points.get(index), routes.get(index)) {
			(Some(point), Some(route)) if point.key == route.key => (point, route),
			(Some(point), Some(route)) if point.key > route.key => return Err(unpaired(route, "no matching point file")),
			(Some(point), _) => return Err(unpaired(point, "no matching route file")),
			(None, Some(route)) => return Err(unpaired(route, "no matching point file")),
			(None, None) => break,
		};

		let (world, point_tail, route_tail) = decode_pair(index, point.data, route.data)?;
		worlds.push(world);
		files.push(WorldFiles {
			point_path: point.path.clone(),
			route_path: route.path.clone(),
			point_tail,
			route_tail,
		});
	}

	debug!("decoded {} point/route pairs", worlds.len());
	Ok(Some((worlds, files)))
}

/// Write each world back into its point and route files.
pub fn encode_world_files(archive: &mut Archive, worlds: &[World], files: &[WorldFiles]) -> Result<()> {
	for (world, files) in worlds.iter().zip(files) {
		archive.replace_file(&files.point_path, encode_point(world, &files.point_tail)?)?;
		archive.replace_file(&files.route_path, encode_route(world, &files.route_tail)?)?;
	}
	Ok(())
}

/// Folder a `point*`/`route*` file is grouped under: the name without its
/// prefix and extension, cut to two characters. Short names map to the root.
pub fn world_folder(name: &str) -> &str {
	let stem = name.get(POINT_PREFIX.len()..name.len().saturating_sub(EXTENSION_LEN)).unwrap_or("");
	stem.get(..FOLDER_LEN).unwrap_or(stem)
}

/// Rebuild `archive` with every `point*`/`route*` file sorted by name and
/// placed under its [`world_folder`]. Other files keep their paths and follow
/// in file-table order. Empty directories are dropped.
pub fn regroup_archive(archive: &Archive) -> Result<Archive> {
	let (mut grouped, others): (Vec<_>, Vec<_>) = archive
		.files()
		.into_iter()
		.partition(|(_, file)| file.name.starts_with(POINT_PREFIX) || file.name.starts_with(ROUTE_PREFIX));
	grouped.sort_by(|(left_path, left), (right_path, right)| left.name.cmp(&right.name).then_with(|| left_path.cmp(right_path)));

	let mut out = Archive::new();
	for (_, file) in grouped {
		let folder = world_folder(&file.name);
		let path = if folder.is_empty() {
			file.name.clone()
		} else {
			format!("{folder}/{}", file.name)
		};
		out.insert_file(&path, file.data.clone())?;
	}
	for (path, file) in others {
		out.insert_file(&path, file.data.clone())?;
	}
	Ok(out)
}

fn sort_unique(candidates: &mut [Candidate<'_>]) -> Result<()> {
	candidates.sort_by(|left, right| left.key.cmp(right.key).then_with(|| left.path.cmp(&right.path)));
	match candidates.windows(2).find(|pair| pair[0].key == pair[1].key) {
		Some(pair) => Err(unpaired(&pair[1], "duplicate world file name")),
		None => Ok(()),
	}
}

fn unpaired(candidate: &Candidate<'_>, reason: &'static str) -> RouteError {
	RouteError::InvalidWorldFile {
		path: candidate.path.clone(),
		reason,
	}
}

fn decode_pair(world: usize, point: &[u8], route: &[u8]) -> Result<(World, Vec<u8>, Vec<u8>)> {
	check_header(world, point, POINT_HEADER_LEN)?;
	let mut cursor = Cursor::new(point);
	let node_count = cursor.read_u8()?;
	let flags = cursor.read_u8()?;
	let unlocks = UnlockMask::from_bytes(cursor.read_array()?);
	let point_tail = cursor.read_rest().to_vec();

	check_header(world, route, ROUTE_HEADER_LEN)?;
	let mut cursor = Cursor::new(route);
	let path_count = usize::from(cursor.read_u16()?);
	let paths = parse_paths(&mut cursor, world, path_count)?;
	let route_tail = cursor.read_rest().to_vec();

	let world = World {
		node_count,
		flags,
		unlocks,
		paths,
	};
	Ok((world, point_tail, route_tail))
}

fn check_header(world: usize, bytes: &[u8], need: usize) -> Result<()> {
	if bytes.len() < need {
		return Err(RouteError::TruncatedWorld {
			world,
			at: 0,
			need,
			rem: bytes.len(),
		});
	}
	Ok(())
}

fn encode_point(world: &World, tail: &[u8]) -> Result<Vec<u8>> {
	let mut out = vec![0_u8; POINT_HEADER_LEN + tail.len()];
	let mut writer = Writer::new(&mut out);
	writer.write_u8(world.node_count)?;
	writer.write_u8(world.flags)?;
	writer.write_bytes(world.unlocks.as_bytes())?;
	writer.write_bytes(tail)?;
	Ok(out)
}

fn encode_route(world: &World, tail: &[u8]) -> Result<Vec<u8>> {
	let mut out = vec![0_u8; ROUTE_HEADER_LEN + world.paths.len() * PATH_RECORD_LEN + tail.len()];
	let mut writer = Writer::new(&mut out);
	writer.write_u16(fit_u16("path count", world.paths.len())?)?;
	for path in &world.paths {
		path.write(&mut writer)?;
	}
	writer.write_bytes(tail)?;
	Ok(out)
}

#[cfg(test)]
mod tests;
