use std::path::PathBuf;

use routeinfo::worldmap::{LoadOptions, Result};

use crate::cmd::util::{emit_json, load, save};
use crate::cmd::worlds::path_json;

#[derive(clap::Args)]
pub struct Args {
	pub file: PathBuf,
	#[arg(long)]
	pub world: usize,
	#[arg(long)]
	pub path: usize,
	#[arg(long)]
	pub sound: Option<u16>,
	#[arg(long)]
	pub action: Option<u16>,
	#[arg(long, requires = "end")]
	pub start: Option<u8>,
	#[arg(long, requires = "start")]
	pub end: Option<u8>,
	/// Write the edited archive here instead of over the input.
	#[arg(long)]
	pub out: Option<PathBuf>,
	#[arg(long)]
	pub json: bool,
}

/// Print one path, applying and saving any requested edits first.
pub fn run(args: Args, options: &LoadOptions) -> Result<()> {
	let Args {
		file,
		world,
		path,
		sound,
		action,
		start,
		end,
		out,
		json,
	} = args;

	let mut model = load(&file, options)?;
	model.path(world, path)?;

	if let Some(sound) = sound {
		model.set_path_sound(world, path, sound)?;
	}
	if let Some(action) = action {
		model.set_path_action(world, path, action)?;
	}
	if let (Some(start), Some(end)) = (start, end) {
		model.set_path_nodes(world, path, start, end)?;
	}

	let saved = if model.is_modified() { Some(save(&mut model, &file, out)?) } else { None };

	let record = *model.path(world, path)?;
	if json {
		emit_json(&path_json(path, &record));
		return Ok(());
	}

	println!(
		"world {world} path {path}: {} -> {} sound={} action={} extra=0x{:04x}",
		record.start, record.end, record.sound, record.action, record.extra
	);
	if let Some(target) = saved {
		println!("saved: {}", target.display());
	}
	Ok(())
}
