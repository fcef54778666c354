use std::path::PathBuf;

use routeinfo::worldmap::{LoadOptions, Result};

use crate::cmd::util::{load, save};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub world: usize,
	#[arg(long)]
	pub node: usize,
	/// Lock the node instead of unlocking it.
	#[arg(long)]
	pub lock: bool,
	/// Write the edited archive here instead of over the input.
	#[arg(long)]
	pub out: Option<PathBuf>,
}

/// Set one node's initial unlock state and save.
pub fn run(args: Args, options: &LoadOptions) -> Result<()> {
	let Args {
		path,
		world,
		node,
		lock,
		out,
	} = args;

	let mut model = load(&path, options)?;
	let was = model.is_node_unlocked(world, node)?;
	model.set_node_unlocked(world, node, !lock)?;

	println!("world {world} node {node}: {} -> {}", state_label(was), state_label(!lock));
	let target = save(&mut model, &path, out)?;
	println!("saved: {}", target.display());
	Ok(())
}

fn state_label(unlocked: bool) -> &'static str {
	if unlocked { "unlocked" } else { "locked" }
}
