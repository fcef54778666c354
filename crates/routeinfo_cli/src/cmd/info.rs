use std::path::PathBuf;

use routeinfo::worldmap::{LoadOptions, Result, RouteLayout, WorldFiles};

use crate::cmd::util::load;

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
}

/// Print archive, payload, and per-world counts.
pub fn run(args: Args, options: &LoadOptions) -> Result<()> {
	let Args { path } = args;

	let model = load(&path, options)?;

	println!("path: {}", path.display());
	println!("archive_files: {}", model.archive().files().len());
	match model.layout() {
		RouteLayout::Table { path: payload } => {
			let payload_len = model.archive().file(payload).map_or(0, |file| file.data.len());
			println!("payload: {payload}");
			println!("payload_len: {payload_len}");
			println!("reserved: 0x{:04x}", model.table().reserved);
			println!("terminator: 0x{:08x}", model.table().terminator);
		}
		RouteLayout::Split(_) => println!("payload: {}", model.layout()),
	}
	println!("world_count: {}", model.world_count());

	let files: &[WorldFiles] = match model.layout() {
		RouteLayout::Split(files) => files.as_slice(),
		RouteLayout::Table { .. } => &[],
	};
	for (index, world) in model.table().worlds.iter().enumerate() {
		let unlocked = model.unlocked_nodes(index)?.len();
		println!(
			"  world {index}: nodes={} unlocked={unlocked} paths={}",
			world.node_count,
			world.paths.len()
		);
		if let Some(files) = files.get(index) {
			println!("    files: {} {}", files.point_path, files.route_path);
		}
	}

	let suspects = model.suspects();
	println!("suspects: {}", suspects.len());
	for suspect in suspects {
		println!("  {suspect}");
	}

	Ok(())
}
