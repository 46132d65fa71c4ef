//! Scan file (PCD-style) decoding
//!
//! A scan is an ASCII header terminated by a `DATA` line, followed by
//! fixed-stride little-endian float records.

mod decoder;
mod header;

pub use decoder::{FLOATS_PER_RECORD, RECORD_SIZE, decode_pcd, decode_pcd_bytes};
pub use header::PcdHeader;
