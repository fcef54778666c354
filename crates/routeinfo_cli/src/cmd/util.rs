use std::path::{Path, PathBuf};

use routeinfo::worldmap::{LoadOptions, Result, RouteModel};

pub fn load(path: &Path, options: &LoadOptions) -> Result<RouteModel> {
	let model = RouteModel::open_with(path, options)?;
	log::debug!("opened {} ({} worlds, {})", path.display(), model.world_count(), model.layout());
	Ok(model)
}

/// Save to `out` when given, otherwise back over the source file.
pub fn save(model: &mut RouteModel, source: &Path, out: Option<PathBuf>) -> Result<PathBuf> {
	let target = out.unwrap_or_else(|| source.to_path_buf());
	model.save(&target)?;
	log::info!("wrote {}", target.display());
	Ok(target)
}

pub fn emit_json<T: serde::Serialize>(value: &T) {
	match serde_json::to_string_pretty(value) {
		Ok(text) => println!("{text}"),
		Err(err) => eprintln!("error: failed to render json: {err}"),
	}
}

pub fn node_list(nodes: &[usize]) -> String {
	let items: Vec<String> = nodes.iter().map(usize::to_string).collect();
	format!("[{}]", items.join(", "))
}
