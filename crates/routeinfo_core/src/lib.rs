//! Public library API for reading and editing world-map route info archives.

/// U8 container codec, route table codec, and the editing model built on them.
pub mod worldmap;
