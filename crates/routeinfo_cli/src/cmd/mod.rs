/// Route table summary command.
pub mod info;
/// Single-path show/edit command.
pub mod path;
/// Archive regrouping command.
pub mod regroup;
/// Node unlock edit command.
pub mod unlock;
/// Shared load/save/output helpers.
pub mod util;
/// Round-trip check command.
pub mod verify;
/// Per-world dump command.
pub mod worlds;
