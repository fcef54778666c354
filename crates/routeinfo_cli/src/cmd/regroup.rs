use std::path::PathBuf;

use routeinfo::worldmap::{LoadOptions, Result};

use crate::cmd::util::{load, save};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	/// Write the regrouped archive here instead of over the input.
	#[arg(long)]
	pub out: Option<PathBuf>,
}

/// Rewrite the archive with point/route files sorted into world folders.
pub fn run(args: Args, options: &LoadOptions) -> Result<()> {
	let Args { path, out } = args;

	let mut model = load(&path, options)?;
	model.regroup()?;
	for (file, _) in model.archive().files() {
		println!("{file}");
	}

	let target = save(&mut model, &path, out)?;
	println!("saved: {}", target.display());
	Ok(())
}
