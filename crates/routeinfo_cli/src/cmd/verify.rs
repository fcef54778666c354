use std::fs;
use std::path::PathBuf;

use routeinfo::worldmap::{LoadOptions, Result, verify_with};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
}

/// Re-encode without edits and report the first divergence. Returns `true`
/// when the output matches the file byte for byte.
pub fn run(args: Args, options: &LoadOptions) -> Result<bool> {
	let Args { path } = args;

	let bytes = fs::read(&path)?;
	let report = verify_with(&bytes, options)?;

	println!("path: {}", path.display());
	println!("original_len: {}", report.original_len);
	println!("reencoded_len: {}", report.reencoded_len);
	match report.first_mismatch {
		Some(offset) => println!("first_mismatch: 0x{offset:x}"),
		None => println!("first_mismatch: none"),
	}
	println!("status: {}", if report.is_identical() { "identical" } else { "diverged" });

	Ok(report.is_identical())
}
