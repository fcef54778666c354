use routeinfo_testkit::{U8Builder, sample_payload, sample_payload_fixture, split_archive};

use crate::worldmap::{Archive, RouteError, RouteTable};

use super::{decode_world_files, encode_world_files, regroup_archive, world_folder};

fn shuffled_archive() -> Vec<u8> {
	let worlds = sample_payload_fixture().worlds;
	U8Builder::new()
		.file("zz", "route02.bin", worlds[1].route_bytes())
		.file("zz", "point01.bin", worlds[0].point_bytes())
		.file("aa", "route01.bin", worlds[0].route_bytes())
		.file("aa", "point02.bin", worlds[1].point_bytes())
		.build()
}

#[test]
fn pairs_decode_to_the_sample_worlds() {
	let archive = Archive::decode(&split_archive()).expect("split archive decodes");
	let (worlds, files) = decode_world_files(&archive).expect("pairs decode").expect("pairs present");

	let expected = RouteTable::decode(&sample_payload()).expect("sample decodes").worlds;
	assert_eq!(worlds, expected);
	let paths: Vec<_> = files.iter().map(|files| (files.point_path.as_str(), files.route_path.as_str())).collect();
	assert_eq!(paths, [("01/point01.bin", "01/route01.bin"), ("02/point02.bin", "02/route02.bin")]);
}

#[test]
fn worlds_follow_file_names_not_table_order() {
	let archive = Archive::decode(&shuffled_archive()).expect("decodes");
	let (worlds, files) = decode_world_files(&archive).expect("pairs decode").expect("pairs present");

	assert_eq!(files[0].point_path, "zz/point01.bin");
	assert_eq!(files[0].route_path, "aa/route01.bin");
	assert_eq!(worlds[0].node_count, 4);
	assert_eq!(worlds[1].paths.len(), 3);
}

#[test]
fn archive_without_world_files_is_none() {
	let bytes = U8Builder::new().file("misc", "other.bin", vec![1, 2]).build();
	let archive = Archive::decode(&bytes).expect("decodes");
	assert!(decode_world_files(&archive).expect("scan succeeds").is_none());
}

#[test]
fn unpaired_and_duplicate_files_are_rejected() {
	let world = &sample_payload_fixture().worlds[0];

	let lonely = U8Builder::new()
		.file("01", "point01.bin", world.point_bytes())
		.file("01", "route01.bin", world.route_bytes())
		.file("02", "point02.bin", world.point_bytes())
		.build();
	let err = decode_world_files(&Archive::decode(&lonely).expect("decodes")).expect_err("missing route file");
	assert!(matches!(
		err,
		RouteError::InvalidWorldFile { ref path, reason: "no matching route file" } if path == "02/point02.bin"
	));
	assert!(err.is_format_error());

	let duplicate = U8Builder::new()
		.file("01", "point01.bin", world.point_bytes())
		.file("01", "route01.bin", world.route_bytes())
		.file("xx", "route01.bin", world.route_bytes())
		.build();
	let err = decode_world_files(&Archive::decode(&duplicate).expect("decodes")).expect_err("duplicate route file");
	assert!(matches!(
		err,
		RouteError::InvalidWorldFile { ref path, reason: "duplicate world file name" } if path == "xx/route01.bin"
	));
}

#[test]
fn short_files_report_truncation() {
	let world = &sample_payload_fixture().worlds[1];

	let short_point = U8Builder::new()
		.file("01", "point01.bin", world.point_bytes()[..6].to_vec())
		.file("01", "route01.bin", world.route_bytes())
		.build();
	let err = decode_world_files(&Archive::decode(&short_point).expect("decodes")).expect_err("short point file");
	assert!(matches!(err, RouteError::TruncatedWorld { world: 0, need: 10, rem: 6, .. }), "got {err}");

	let mut route = world.route_bytes();
	route.truncate(route.len() - 3);
	let short_route = U8Builder::new()
		.file("01", "point01.bin", world.point_bytes())
		.file("01", "route01.bin", route)
		.build();
	let err = decode_world_files(&Archive::decode(&short_route).expect("decodes")).expect_err("short route file");
	assert!(matches!(err, RouteError::TruncatedPath { world: 0, path: 2, .. }), "got {err}");
}

#[test]
fn trailing_bytes_survive_reencode() {
	let world = &sample_payload_fixture().worlds[0];
	let mut point = world.point_bytes();
	point.extend_from_slice(b"pad");
	let mut route = world.route_bytes();
	route.extend_from_slice(&[0xEE; 5]);
	let bytes = U8Builder::new()
		.file("01", "point01.bin", point.clone())
		.file("01", "route01.bin", route.clone())
		.build();

	let mut archive = Archive::decode(&bytes).expect("decodes");
	let (worlds, files) = decode_world_files(&archive).expect("pairs decode").expect("pairs present");
	encode_world_files(&mut archive, &worlds, &files).expect("pairs encode");

	assert_eq!(archive.file("01/point01.bin").expect("point file").data, point);
	assert_eq!(archive.file("01/route01.bin").expect("route file").data, route);
}

#[test]
fn folder_is_two_characters_of_the_stem() {
	assert_eq!(world_folder("point01.bin"), "01");
	assert_eq!(world_folder("routeW1.bin"), "W1");
	assert_eq!(world_folder("route0123.bin"), "01");
	assert_eq!(world_folder("pointA.bin"), "A");
	assert_eq!(world_folder("point.bin"), "");
	assert_eq!(world_folder("route"), "");
}

#[test]
fn regroup_sorts_files_into_world_folders() {
	let archive = Archive::decode(&shuffled_archive()).expect("decodes");
	let regrouped = regroup_archive(&archive).expect("regroups");
	assert_eq!(regrouped.encode().expect("encodes"), split_archive());
}

#[test]
fn regroup_keeps_other_files_after_world_files() {
	let bytes = U8Builder::new()
		.file("misc", "notes.bin", vec![9; 3])
		.file("zz", "route01.bin", vec![0, 0])
		.build();
	let regrouped = regroup_archive(&Archive::decode(&bytes).expect("decodes")).expect("regroups");

	let paths: Vec<_> = regrouped.files().into_iter().map(|(path, _)| path).collect();
	assert_eq!(paths, ["01/route01.bin", "misc/notes.bin"]);
}

#[test]
fn route_files_alone_are_not_a_world_layout() {
	let bytes = U8Builder::new().file("route", "routeinfo.bin", sample_payload()).build();
	let archive = Archive::decode(&bytes).expect("decodes");
	assert!(decode_world_files(&archive).expect("scan succeeds").is_none());
}
