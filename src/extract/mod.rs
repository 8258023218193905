//! Wire Format Extraction
//!
//! One extractor per vendor wire family. Each turns a raw response body into
//! an ordered list of [`RawCameraRecord`](crate::record::RawCameraRecord)s.
//!
//! Contract shared by all extractors: a single malformed line, field or
//! record is skipped, never fatal. Only an unparsable top-level payload
//! fails the whole call.

pub mod dotted_config;
pub mod json_inventory;
pub mod xml_tree;
