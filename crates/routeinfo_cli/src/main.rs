#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use routeinfo::worldmap::{DEFAULT_PAYLOAD_NAME, IdLimits, LoadOptions};

mod cmd;

#[derive(Parser)]
#[command(name = "routeinfo", about = "World-map route info archive editor")]
struct Cli {
	/// Payload file name, or full archive path, of the route table.
	#[arg(long, global = true, default_value = DEFAULT_PAYLOAD_NAME)]
	payload: String,
	/// Refuse archives whose route table has a different world count.
	#[arg(long = "expect-worlds", global = true)]
	expect_worlds: Option<usize>,
	/// Report sound ids at or above this count.
	#[arg(long = "sound-ids", global = true)]
	sound_ids: Option<u16>,
	/// Report action ids at or above this count.
	#[arg(long = "action-ids", global = true)]
	action_ids: Option<u16>,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Summarize the route table.
	Info(cmd::info::Args),
	/// Print node unlocks and paths per world.
	Worlds(cmd::worlds::Args),
	/// Lock or unlock a node.
	Unlock(cmd::unlock::Args),
	/// Show or edit one path.
	Path(cmd::path::Args),
	/// Check that an unedited load/save reproduces the file.
	Verify(cmd::verify::Args),
	/// Sort point/route files into per-world folders.
	Regroup(cmd::regroup::Args),
}

fn main() {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> routeinfo::worldmap::Result<()> {
	let cli = Cli::parse();
	let options = LoadOptions {
		payload_name: cli.payload,
		expected_worlds: cli.expect_worlds,
		limits: IdLimits {
			sound_ids: cli.sound_ids,
			action_ids: cli.action_ids,
		},
	};

	match cli.command {
		Commands::Info(args) => cmd::info::run(args, &options),
		Commands::Worlds(args) => cmd::worlds::run(args, &options),
		Commands::Unlock(args) => cmd::unlock::run(args, &options),
		Commands::Path(args) => cmd::path::run(args, &options),
		Commands::Regroup(args) => cmd::regroup::run(args, &options),
		Commands::Verify(args) => {
			if !cmd::verify::run(args, &options)? {
				std::process::exit(2);
			}
			Ok(())
		}
	}
}
