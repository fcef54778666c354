mod archive;
mod bytes;
mod error;
mod model;
mod split;
mod suspect;
mod table;
mod verify;

/// U8 container types, layout constants, and codec entry points.
pub use archive::{ArcDir, ArcFile, Archive, DATA_ALIGN, FileSpan, Node, U8_MAGIC};
/// Bounded big-endian byte reader and writer.
pub use bytes::{Cursor, Writer};
/// Error and result aliases.
pub use error::{IndexKind, Result, RouteError};
/// Editing model and load/save entry points.
pub use model::{DEFAULT_PAYLOAD_NAME, LoadOptions, RouteLayout, RouteModel, open_archive, save_archive};
/// Out-of-range value reporting.
pub use suspect::{IdLimits, Suspect, scan_suspects};
/// Per-world `point*`/`route*` file pairs.
pub use split::{POINT_HEADER_LEN, POINT_PREFIX, ROUTE_HEADER_LEN, ROUTE_PREFIX, WorldFiles, regroup_archive, world_folder};
/// Route payload records and codec entry points.
pub use table::{MapPath, NODE_SLOTS, PATH_RECORD_LEN, RouteTable, TERMINATOR, UnlockMask, WORLD_HEADER_LEN, World};
/// Round-trip verification helpers.
pub use verify::{RoundTripReport, first_mismatch, verify, verify_table, verify_with};
