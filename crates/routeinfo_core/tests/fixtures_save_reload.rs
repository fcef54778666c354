#![allow(missing_docs)]

use std::fs;

use routeinfo::worldmap::{RouteError, RouteModel, open_archive, save_archive, verify};
use routeinfo_testkit::{sample_archive, scratch_path};

#[test]
fn open_edit_save_reload() {
	let path = scratch_path("open_edit_save_reload", "route.arc");
	fs::write(&path, sample_archive()).expect("fixture writes");

	let mut model = open_archive(&path).expect("archive opens");
	model.set_node_unlocked(0, 3, true).expect("unlock");
	model.set_path_sound(0, 0, 9).expect("sound");
	save_archive(&mut model, &path).expect("archive saves");
	assert!(!model.is_modified());

	let reloaded = RouteModel::open(&path).expect("saved archive opens");
	assert!(reloaded.is_node_unlocked(0, 3).expect("node 3"));
	assert_eq!(reloaded.path(0, 0).expect("path").sound, 9);
	assert!(verify(&fs::read(&path).expect("saved bytes")).expect("verifies").is_identical());
}

#[test]
fn missing_file_is_io_error() {
	let path = scratch_path("missing_file_is_io_error", "absent.arc");
	let err = open_archive(&path).expect_err("missing file");
	assert!(matches!(err, RouteError::Io(_)));
	assert!(!err.is_format_error());
}

#[test]
fn failed_save_keeps_edits_pending() {
	let path = scratch_path("failed_save_keeps_edits_pending", "route.arc");
	let mut model = RouteModel::from_bytes(&sample_archive()).expect("sample loads");
	model.set_path_action(1, 0, 4).expect("action");

	let missing_dir = path.with_file_name("no-such-dir").join("route.arc");
	assert!(matches!(model.save(&missing_dir), Err(RouteError::Io(_))));
	assert!(model.is_modified());
	assert!(!missing_dir.exists());
}

#[test]
fn save_replaces_file_without_leaving_temp() {
	let path = scratch_path("save_replaces_file_without_leaving_temp", "route.arc");
	fs::write(&path, b"stale contents").expect("seed file writes");

	let mut model = RouteModel::from_bytes(&sample_archive()).expect("sample loads");
	model.set_node_unlocked(0, 2, true).expect("unlock");
	model.save(&path).expect("save succeeds");

	let reloaded = RouteModel::open(&path).expect("saved file loads");
	assert!(reloaded.is_node_unlocked(0, 2).expect("node 2"));
	assert!(!path.with_file_name("route.arc.tmp").exists());
}

#[test]
fn failed_rename_keeps_target_and_cleans_temp() {
	let path = scratch_path("failed_rename_keeps_target_and_cleans_temp", "route.arc");
	fs::create_dir(&path).expect("blocking directory");
	fs::write(path.join("keep.bin"), b"kept").expect("directory content writes");

	let mut model = RouteModel::from_bytes(&sample_archive()).expect("sample loads");
	model.set_path_sound(0, 0, 1).expect("edit");
	assert!(matches!(model.save(&path), Err(RouteError::Io(_))));

	assert_eq!(fs::read(path.join("keep.bin")).expect("directory survives"), b"kept");
	assert!(!path.with_file_name("route.arc.tmp").exists());
	assert!(model.is_modified());
}
