use std::path::PathBuf;

use routeinfo::worldmap::{LoadOptions, MapPath, Result, RouteModel};

use crate::cmd::util::{emit_json, load, node_list};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	/// Only print this world.
	#[arg(long)]
	pub world: Option<usize>,
	#[arg(long)]
	pub json: bool,
}

/// Print unlocks and paths for every world, or one.
pub fn run(args: Args, options: &LoadOptions) -> Result<()> {
	let Args { path, world, json } = args;

	let model = load(&path, options)?;
	let indices: Vec<usize> = match world {
		Some(index) => {
			model.paths(index)?;
			vec![index]
		}
		None => (0..model.world_count()).collect(),
	};

	let worlds = indices.into_iter().map(|index| world_json(&model, index)).collect::<Result<Vec<_>>>()?;

	if json {
		emit_json(&WorldsJson {
			path: path.display().to_string(),
			payload: model.layout().to_string(),
			worlds,
			suspects: model.suspects().iter().map(ToString::to_string).collect(),
		});
		return Ok(());
	}

	for world in &worlds {
		println!(
			"world {}: nodes={} flags=0x{:02x} unlocked={}",
			world.index,
			world.node_count,
			world.flags,
			node_list(&world.unlocked)
		);
		for path in &world.paths {
			println!(
				"  path {}: {} -> {} sound={} action={} extra=0x{:04x}",
				path.index, path.start, path.end, path.sound, path.action, path.extra
			);
		}
	}

	Ok(())
}

fn world_json(model: &RouteModel, index: usize) -> Result<WorldJson> {
	let unlocked = model.unlocked_nodes(index)?;
	let world = &model.table().worlds[index];
	Ok(WorldJson {
		index,
		node_count: world.node_count,
		flags: world.flags,
		unlocked,
		paths: model.paths(index)?.iter().enumerate().map(|(index, path)| path_json(index, path)).collect(),
	})
}

pub(crate) fn path_json(index: usize, path: &MapPath) -> PathJson {
	PathJson {
		index,
		start: path.start,
		end: path.end,
		sound: path.sound,
		action: path.action,
		extra: path.extra,
	}
}

#[derive(serde::Serialize)]
pub(crate) struct PathJson {
	index: usize,
	start: u8,
	end: u8,
	sound: u16,
	action: u16,
	extra: u16,
}

#[derive(serde::Serialize)]
struct WorldJson {
	index: usize,
	node_count: u8,
	flags: u8,
	unlocked: Vec<usize>,
	paths: Vec<PathJson>,
}

#[derive(serde::Serialize)]
struct WorldsJson {
	path: String,
	payload: String,
	worlds: Vec<WorldJson>,
	suspects: Vec<String>,
}
