use routeinfo_testkit::{
	SAMPLE_OTHER_DATA, SAMPLE_OTHER_PATH, SAMPLE_PAYLOAD_PATH, archive_with_payload, sample_archive, sample_payload_fixture, split_archive,
};

use crate::worldmap::{Archive, IdLimits, IndexKind, LoadOptions, RouteError, RouteLayout, RouteModel};

fn with_limits() -> LoadOptions {
	LoadOptions {
		limits: IdLimits {
			sound_ids: Some(32),
			action_ids: Some(32),
		},
		..LoadOptions::default()
	}
}

fn sample_model() -> RouteModel {
	RouteModel::from_bytes(&sample_archive()).expect("sample loads")
}

#[test]
fn loads_sample_worlds() {
	let model = sample_model();
	assert_eq!(model.world_count(), 2);
	assert_eq!(
		model.layout(),
		&RouteLayout::Table {
			path: SAMPLE_PAYLOAD_PATH.to_owned()
		}
	);
	assert_eq!(model.node_count(0).expect("world 0"), 4);
	assert!(model.is_node_unlocked(0, 0).expect("node 0"));
	assert!(model.is_node_unlocked(0, 1).expect("node 1"));
	assert!(!model.is_node_unlocked(0, 2).expect("node 2"));
	assert_eq!(model.unlocked_nodes(1).expect("world 1"), [0_usize, 2, 5]);
	assert!(!model.is_modified());
	assert!(model.suspects().is_empty());
}

#[test]
fn unedited_model_reencodes_identically() {
	let original = sample_archive();
	let model = RouteModel::from_bytes(&original).expect("loads");
	assert_eq!(model.to_bytes().expect("encodes"), original);
}

#[test]
fn resave_is_idempotent() {
	let once = sample_model().to_bytes().expect("encodes");
	let twice = RouteModel::from_bytes(&once).expect("reloads").to_bytes().expect("re-encodes");
	assert_eq!(once, twice);
}

#[test]
fn world_and_node_indices_are_validated() {
	let mut model = sample_model();
	let before = model.to_bytes().expect("encodes");

	assert!(matches!(
		model.is_node_unlocked(2, 0),
		Err(RouteError::InvalidIndex {
			kind: IndexKind::World,
			index: 2,
			len: 2,
		})
	));
	assert!(matches!(
		model.set_node_unlocked(usize::MAX, 0, true),
		Err(RouteError::InvalidIndex { kind: IndexKind::World, .. })
	));
	assert!(matches!(
		model.set_node_unlocked(0, 4, true),
		Err(RouteError::InvalidIndex {
			kind: IndexKind::Node,
			index: 4,
			len: 4,
		})
	));
	assert!(matches!(model.paths(9), Err(RouteError::InvalidIndex { kind: IndexKind::World, .. })));

	assert!(!model.is_modified());
	assert_eq!(model.to_bytes().expect("encodes"), before);
}

#[test]
fn path_indices_are_validated() {
	let mut model = sample_model();
	assert!(matches!(
		model.set_path_sound(0, 1, 3),
		Err(RouteError::InvalidIndex {
			kind: IndexKind::Path,
			index: 1,
			len: 1,
		})
	));
	assert!(matches!(model.set_path_action(5, 0, 3), Err(RouteError::InvalidIndex { kind: IndexKind::World, .. })));
	assert!(matches!(model.path(1, 3), Err(RouteError::InvalidIndex { kind: IndexKind::Path, .. })));
	assert!(matches!(
		model.set_path_nodes(0, 0, 0, 4),
		Err(RouteError::InvalidIndex { kind: IndexKind::Node, index: 4, .. })
	));
	assert_eq!(model.path(0, 0).expect("path").end, 1);
	assert!(!model.is_modified());
}

#[test]
fn unlock_edit_survives_reload_and_touches_nothing_else() {
	let mut model = sample_model();
	let before = model.table().clone();

	model.set_node_unlocked(1, 4, true).expect("unlock");
	assert!(model.is_modified());

	let reloaded = RouteModel::from_bytes(&model.to_bytes().expect("encodes")).expect("reloads");
	assert!(reloaded.is_node_unlocked(1, 4).expect("node 4"));

	let mut expected = before;
	expected.worlds[1].unlocks.set(4, true);
	assert_eq!(reloaded.table(), &expected);
	assert_eq!(reloaded.archive().file(SAMPLE_OTHER_PATH).expect("other file").data, SAMPLE_OTHER_DATA);
}

#[test]
fn relocking_restores_original_bytes() {
	let original = sample_archive();
	let mut model = RouteModel::from_bytes(&original).expect("loads");
	model.set_node_unlocked(0, 1, false).expect("lock");
	assert_ne!(model.to_bytes().expect("encodes"), original);
	model.set_node_unlocked(0, 1, true).expect("unlock");
	assert_eq!(model.to_bytes().expect("encodes"), original);
}

#[test]
fn sound_edit_scenario() {
	let original = sample_archive();
	let mut model = RouteModel::from_bytes(&original).expect("loads");
	model.set_path_sound(0, 0, 9).expect("set sound");

	let saved = model.to_bytes().expect("encodes");
	let reloaded = RouteModel::from_bytes(&saved).expect("reloads");
	let path = reloaded.path(0, 0).expect("path 0");
	assert_eq!(path.sound, 9);
	assert_eq!(path.action, 2);
	assert_eq!((path.start, path.end), (0, 1));

	let before = RouteModel::from_bytes(&original).expect("loads");
	assert_eq!(reloaded.table().worlds[1], before.table().worlds[1]);

	// World 1 starts after the table header and world 0's single path.
	let payload_at = Archive::decode(&saved).expect("decodes").spans().expect("layout")[1].offset as usize;
	let world1 = payload_at + 4 + 12 + 8..payload_at + 4 + 12 + 8 + 12 + 3 * 8;
	assert_eq!(saved[world1.clone()], original[world1]);
}

#[test]
fn path_edits_accept_any_u16() {
	let mut model = sample_model();
	model.set_path_action(1, 2, u16::MAX).expect("set action");
	model.set_path_nodes(1, 2, 4, 1).expect("reconnect");

	let bytes = model.to_bytes().expect("encodes");
	let reloaded = RouteModel::from_bytes(&bytes).expect("reloads");
	let path = reloaded.path(1, 2).expect("path");
	assert_eq!((path.start, path.end, path.action), (4, 1, u16::MAX));
	assert!(reloaded.suspects().is_empty());

	let limited = RouteModel::from_bytes_with(&bytes, &with_limits()).expect("reloads");
	assert_eq!(limited.suspects().len(), 1);
}

#[test]
fn out_of_range_values_load_unchanged() {
	let mut fixture = sample_payload_fixture();
	fixture.worlds[0].paths[0].end = 30;
	fixture.worlds[0].paths[0].sound = 500;
	let bytes = archive_with_payload(&fixture.to_bytes());

	let model = RouteModel::from_bytes_with(&bytes, &with_limits()).expect("suspect values still load");
	assert_eq!(model.path(0, 0).expect("path").sound, 500);
	assert_eq!(model.suspects().len(), 2);
	assert_eq!(RouteModel::from_bytes(&bytes).expect("loads").suspects().len(), 1);
	assert_eq!(model.to_bytes().expect("encodes"), bytes);
}

#[test]
fn payload_lookup_follows_options() {
	let bytes = sample_archive();
	let options = LoadOptions {
		payload_name: "other.bin".to_owned(),
		..LoadOptions::default()
	};
	let err = RouteModel::from_bytes_with(&bytes, &options).expect_err("missing payload");
	assert!(matches!(err, RouteError::PayloadNotFound { name } if name == "other.bin"));

	let options = LoadOptions {
		payload_name: SAMPLE_PAYLOAD_PATH.to_owned(),
		expected_worlds: Some(2),
		limits: IdLimits::default(),
	};
	assert!(RouteModel::from_bytes_with(&bytes, &options).is_ok());

	let options = LoadOptions {
		expected_worlds: Some(9),
		..LoadOptions::default()
	};
	let err = RouteModel::from_bytes_with(&bytes, &options).expect_err("wrong world count");
	assert!(matches!(err, RouteError::WorldCountMismatch { expected: 9, found: 2 }));
}

#[test]
fn failed_load_leaves_existing_model_alone() {
	let mut model = sample_model();
	model.set_path_sound(1, 1, 12).expect("edit");

	let payload = sample_payload_fixture().to_bytes();
	let broken = archive_with_payload(&payload[..50]);
	let err = RouteModel::from_bytes(&broken).expect_err("truncated payload");
	assert!(matches!(err, RouteError::TruncatedPath { world: 1, .. }));
	assert!(err.is_format_error());

	assert_eq!(model.path(1, 1).expect("path").sound, 12);
	assert!(model.is_modified());
}

#[test]
fn point_and_route_files_load_as_worlds() {
	let fixture = sample_payload_fixture();
	let mut archive = Archive::new();
	archive.insert_file("01/point01.bin", fixture.worlds[0].point_bytes()).expect("insert point");
	archive.insert_file("01/route01.bin", fixture.worlds[0].route_bytes()).expect("insert route");
	let bytes = archive.encode().expect("encodes");

	let model = RouteModel::from_bytes(&bytes).expect("split archive loads");
	assert_eq!(model.world_count(), 1);
	assert_eq!(model.unlocked_nodes(0).expect("world 0"), [0_usize, 1]);
	assert_eq!(model.path(0, 0).expect("path").sound, 4);
	assert!(matches!(model.layout(), RouteLayout::Split(files) if files[0].route_path == "01/route01.bin"));
	assert_eq!(model.to_bytes().expect("encodes"), bytes);
}

#[test]
fn split_edit_rewrites_only_its_world_files() {
	let original = split_archive();
	let mut model = RouteModel::from_bytes(&original).expect("loads");
	assert_eq!(model.world_count(), 2);
	model.set_path_sound(1, 0, 9).expect("set sound");
	model.set_node_unlocked(1, 3, true).expect("unlock");

	let saved = model.to_bytes().expect("encodes");
	let before = Archive::decode(&original).expect("decodes");
	let after = Archive::decode(&saved).expect("decodes");
	for path in ["01/point01.bin", "01/route01.bin"] {
		assert_eq!(after.file(path), before.file(path), "{path}");
	}
	assert_ne!(after.file("02/route02.bin"), before.file("02/route02.bin"));

	let reloaded = RouteModel::from_bytes(&saved).expect("reloads");
	assert_eq!(reloaded.path(1, 0).expect("path").sound, 9);
	assert_eq!(reloaded.unlocked_nodes(1).expect("world 1"), [0_usize, 2, 3, 5]);
}

#[test]
fn regroup_moves_world_files_into_folders() {
	let fixture = sample_payload_fixture();
	let mut archive = Archive::new();
	archive.insert_file("route02.bin", fixture.worlds[1].route_bytes()).expect("insert");
	archive.insert_file("misc/point02.bin", fixture.worlds[1].point_bytes()).expect("insert");
	archive.insert_file("misc/route01.bin", fixture.worlds[0].route_bytes()).expect("insert");
	archive.insert_file("point01.bin", fixture.worlds[0].point_bytes()).expect("insert");

	let mut model = RouteModel::from_bytes(&archive.encode().expect("encodes")).expect("loads");
	model.set_path_action(0, 0, 7).expect("edit before regroup");
	model.regroup().expect("regroups");
	assert!(model.is_modified());

	let bytes = model.to_bytes().expect("encodes");
	let mut expected = RouteModel::from_bytes(&split_archive()).expect("loads");
	expected.set_path_action(0, 0, 7).expect("same edit");
	assert_eq!(bytes, expected.to_bytes().expect("encodes"));

	let reloaded = RouteModel::from_bytes(&bytes).expect("reloads");
	assert_eq!(reloaded.path(0, 0).expect("path").action, 7);
}

#[test]
fn regroup_follows_table_payload() {
	let mut model = sample_model();
	model.set_path_sound(0, 0, 3).expect("edit");
	model.regroup().expect("regroups");

	assert_eq!(
		model.layout(),
		&RouteLayout::Table {
			path: "in/routeinfo.bin".to_owned()
		}
	);
	let reloaded = RouteModel::from_bytes(&model.to_bytes().expect("encodes")).expect("reloads");
	assert_eq!(reloaded.path(0, 0).expect("path").sound, 3);
	assert_eq!(reloaded.archive().file(SAMPLE_OTHER_PATH).expect("other file").data, SAMPLE_OTHER_DATA);
}
