//! Binary payload decoding for scan files.

use crate::error::DecodeError;
use crate::pcd::header::PcdHeader;
use crate::types::PointBuffer;
use glam::Vec3;
use std::path::Path;
use tracing::{debug, info, warn};

/// Floats stored per point record: x, y, z followed by five channels the
/// viewer ignores (intensity among them).
pub const FLOATS_PER_RECORD: usize = 8;

/// Size of one point record in bytes.
pub const RECORD_SIZE: usize = FLOATS_PER_RECORD * 4;

/// Read and decode a scan file.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn decode_pcd(path: impl AsRef<Path>) -> Result<PointBuffer, DecodeError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => DecodeError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => DecodeError::Io(err),
    })?;

    let points = decode_pcd_bytes(&bytes)?;
    info!("Loaded {} points from {}", points.len(), path.display());
    Ok(points)
}

/// Decode a scan held in memory.
pub fn decode_pcd_bytes(bytes: &[u8]) -> Result<PointBuffer, DecodeError> {
    let header = PcdHeader::parse(bytes)?;
    debug!(
        "PCD header: version={:?}, fields={:?}, points={}, data={}, payload offset={}",
        header.version, header.fields, header.point_count, header.data_kind, header.data_offset
    );

    if !header.is_binary() {
        warn!(
            "DATA kind '{}' is not binary; decoding payload as binary records",
            header.data_kind
        );
    }

    let payload = &bytes[header.data_offset.min(bytes.len())..];
    let expected = header.point_count.checked_mul(RECORD_SIZE).ok_or_else(|| {
        DecodeError::MalformedHeader(format!("point count {} is too large", header.point_count))
    })?;

    if payload.len() < expected {
        return Err(DecodeError::TruncatedData {
            expected,
            actual: payload.len(),
        });
    }
    if payload.len() > expected {
        debug!(
            "Ignoring {} trailing bytes after {} point records",
            payload.len() - expected,
            header.point_count
        );
    }

    let positions = payload[..expected]
        .chunks_exact(RECORD_SIZE)
        .map(|record| {
            Vec3::new(
                read_f32_le(record, 0),
                read_f32_le(record, 1),
                read_f32_le(record, 2),
            )
        })
        .collect();

    Ok(PointBuffer::new(positions))
}

fn read_f32_le(record: &[u8], index: usize) -> f32 {
    let offset = index * 4;
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&record[offset..offset + 4]);
    f32::from_le_bytes(raw)
}
