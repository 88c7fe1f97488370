//! Minimal PNG encoder for solid-color images
//!
//! Builds the byte stream by hand: the 8-byte signature followed by an `IHDR`,
//! a single zlib-compressed `IDAT` and an empty `IEND` chunk. Only the DEFLATE
//! compressor (`miniz_oxide`) and the CRC-32 checksum (`crc32fast`) come from
//! libraries; chunk framing is done here.
//!
//! The produced images are always 8-bit truecolor with alpha (color type 6),
//! non-interlaced, with filter type 0 on every scanline and no ancillary
//! chunks.

use anyhow::{Context, Result};
use image::Rgba;
use std::{fmt, io::Write};

/// PNG file signature
pub const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

pub const IHDR: &[u8; 4] = b"IHDR";
pub const IDAT: &[u8; 4] = b"IDAT";
pub const IEND: &[u8; 4] = b"IEND";

const BIT_DEPTH: u8 = 8;
const COLOR_TYPE_RGBA: u8 = 6;
const COMPRESSION_DEFLATE: u8 = 0;
const FILTER_METHOD_ADAPTIVE: u8 = 0;
const INTERLACE_NONE: u8 = 0;
const FILTER_TYPE_NONE: u8 = 0;

/// Highest zlib compression level
const COMPRESSION_LEVEL: u8 = 9;

/// Largest width or height a PNG header may declare (2^31 - 1)
pub const MAX_DIMENSION: u32 = i32::MAX as u32;

const BYTES_PER_PIXEL: usize = 4;

/// Errors raised while encoding a PNG stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Width or height is zero or exceeds [`MAX_DIMENSION`]
    InvalidDimension { width: u32, height: u32 },
    /// The raw scanline buffer length overflows `usize` or cannot be reserved
    ImageTooLarge { width: u32, height: u32 },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimension { width, height } => write!(
                f,
                "invalid image dimensions {width}x{height}: width and height must be in 1..={MAX_DIMENSION}"
            ),
            Self::ImageTooLarge { width, height } => {
                write!(f, "image {width}x{height} is too large to encode in memory")
            }
        }
    }
}

impl std::error::Error for EncodeError {}

/// Encode a solid-color RGBA image of `width` x `height` pixels as a PNG
/// byte stream.
///
/// # Errors
/// Returns [`EncodeError::InvalidDimension`] when either dimension is zero or
/// larger than [`MAX_DIMENSION`], and [`EncodeError::ImageTooLarge`] when the
/// uncompressed scanlines overflow `usize` or the allocator refuses them.
pub fn encode(width: u32, height: u32, color: Rgba<u8>) -> Result<Vec<u8>> {
    validate_dimensions(width, height)?;

    let raw = raw_scanlines(width, height, color)?;
    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&raw, COMPRESSION_LEVEL);
    drop(raw);

    let mut png = Vec::with_capacity(SIGNATURE.len() + 3 * 12 + 13 + compressed.len());
    png.extend_from_slice(&SIGNATURE);
    write_chunk(&mut png, IHDR, &ihdr_payload(width, height))?;
    write_chunk(&mut png, IDAT, &compressed)?;
    write_chunk(&mut png, IEND, &[])?;

    Ok(png)
}

fn validate_dimensions(width: u32, height: u32) -> Result<(), EncodeError> {
    let valid = 1..=MAX_DIMENSION;
    if valid.contains(&width) && valid.contains(&height) {
        Ok(())
    } else {
        Err(EncodeError::InvalidDimension { width, height })
    }
}

/// The 13-byte `IHDR` payload for an 8-bit RGBA image
pub fn ihdr_payload(width: u32, height: u32) -> [u8; 13] {
    let mut payload = [0u8; 13];
    payload[0..4].copy_from_slice(&width.to_be_bytes());
    payload[4..8].copy_from_slice(&height.to_be_bytes());
    payload[8] = BIT_DEPTH;
    payload[9] = COLOR_TYPE_RGBA;
    payload[10] = COMPRESSION_DEFLATE;
    payload[11] = FILTER_METHOD_ADAPTIVE;
    payload[12] = INTERLACE_NONE;
    payload
}

/// Build the unfiltered scanlines: each row is a `0` filter byte followed by
/// `width` copies of `color`.
///
/// The buffer is exactly `height * (1 + width * 4)` bytes long.
pub fn raw_scanlines(width: u32, height: u32, color: Rgba<u8>) -> Result<Vec<u8>, EncodeError> {
    let too_large = || EncodeError::ImageTooLarge { width, height };

    let row_len = usize::try_from(width)
        .ok()
        .and_then(|w| w.checked_mul(BYTES_PER_PIXEL))
        .and_then(|n| n.checked_add(1))
        .ok_or_else(too_large)?;
    let total = usize::try_from(height)
        .ok()
        .and_then(|h| h.checked_mul(row_len))
        .ok_or_else(too_large)?;

    let mut raw = Vec::new();
    raw.try_reserve_exact(total).map_err(|_| too_large())?;

    raw.push(FILTER_TYPE_NONE);
    for _ in 0..width {
        raw.extend_from_slice(&color.0);
    }
    for _ in 1..height {
        raw.extend_from_within(..row_len);
    }
    Ok(raw)
}

/// CRC-32 (zlib/PNG polynomial) over the chunk type followed by its payload
pub fn chunk_crc(chunk_type: &[u8; 4], payload: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(payload);
    hasher.finalize()
}

/// Write one chunk: big-endian payload length, type tag, payload, and the
/// big-endian CRC of type tag plus payload.
pub fn write_chunk<W: Write>(mut w: W, chunk_type: &[u8; 4], payload: &[u8]) -> Result<()> {
    let len = u32::try_from(payload.len()).with_context(|| {
        format!(
            "{} payload of {} bytes exceeds the chunk length limit",
            String::from_utf8_lossy(chunk_type),
            payload.len()
        )
    })?;

    w.write_all(&len.to_be_bytes())?;
    w.write_all(chunk_type)?;
    w.write_all(payload)?;
    w.write_all(&chunk_crc(chunk_type, payload).to_be_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Split a PNG stream into (type, payload, stored crc) after the signature
    fn chunks(png: &[u8]) -> Vec<([u8; 4], Vec<u8>, u32)> {
        let mut out = Vec::new();
        let mut pos = SIGNATURE.len();
        while pos < png.len() {
            let len = u32::from_be_bytes(png[pos..pos + 4].try_into().unwrap()) as usize;
            let tag: [u8; 4] = png[pos + 4..pos + 8].try_into().unwrap();
            let payload = png[pos + 8..pos + 8 + len].to_vec();
            let crc_at = pos + 8 + len;
            let crc = u32::from_be_bytes(png[crc_at..crc_at + 4].try_into().unwrap());
            out.push((tag, payload, crc));
            pos = crc_at + 4;
        }
        out
    }

    #[test]
    fn test_stream_starts_with_signature() {
        let png = encode(3, 5, Rgba([1, 2, 3, 4])).unwrap();
        assert_eq!(&png[..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_chunk_order_and_header() {
        let png = encode(300, 7, Rgba([14, 165, 233, 255])).unwrap();
        let chunks = chunks(&png);

        let tags: Vec<&[u8; 4]> = chunks.iter().map(|(tag, _, _)| tag).collect();
        assert_eq!(tags, vec![IHDR, IDAT, IEND]);

        let ihdr = &chunks[0].1;
        assert_eq!(
            ihdr.as_slice(),
            &[0, 0, 1, 44, 0, 0, 0, 7, 8, 6, 0, 0, 0],
            "width, height, depth 8, RGBA, deflate, adaptive, no interlace"
        );
        assert!(chunks[2].1.is_empty());
    }

    #[test]
    fn test_every_chunk_crc_matches() {
        let png = encode(16, 16, Rgba([0, 128, 255, 200])).unwrap();
        for (tag, payload, stored) in chunks(&png) {
            assert_eq!(stored, chunk_crc(&tag, &payload));
            assert_eq!(stored, crc32fast::hash(&[&tag[..], &payload[..]].concat()));
        }
    }

    #[test]
    fn test_iend_is_well_known_trailer() {
        let png = encode(1, 1, Rgba([0, 0, 0, 0])).unwrap();
        assert_eq!(
            &png[png.len() - 12..],
            &[0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82]
        );
    }

    #[test]
    fn test_corrupted_payload_changes_crc() {
        let payload = ihdr_payload(64, 64);
        let original = chunk_crc(IHDR, &payload);

        for i in 0..payload.len() {
            let mut corrupted = payload;
            corrupted[i] ^= 0x01;
            assert_ne!(original, chunk_crc(IHDR, &corrupted), "byte {i}");
        }
    }

    #[test]
    fn test_raw_scanlines_layout() {
        let color = Rgba([9, 8, 7, 6]);
        let raw = raw_scanlines(3, 2, color).unwrap();
        assert_eq!(raw.len(), 2 * (1 + 3 * 4));
        assert_eq!(
            raw,
            vec![
                0, 9, 8, 7, 6, 9, 8, 7, 6, 9, 8, 7, 6, //
                0, 9, 8, 7, 6, 9, 8, 7, 6, 9, 8, 7, 6,
            ]
        );
    }

    #[test]
    fn test_idat_inflates_to_scanlines() {
        let color = Rgba([255, 0, 0, 255]);
        let png = encode(5, 4, color).unwrap();
        let idat = &chunks(&png)[1].1;
        let inflated = miniz_oxide::inflate::decompress_to_vec_zlib(idat).unwrap();
        assert_eq!(inflated, raw_scanlines(5, 4, color).unwrap());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        for (w, h) in [(0, 1), (1, 0), (0, 0)] {
            let err = encode(w, h, Rgba([0, 0, 0, 255])).unwrap_err();
            assert_eq!(
                err.downcast_ref::<EncodeError>(),
                Some(&EncodeError::InvalidDimension { width: w, height: h })
            );
        }
    }

    #[test]
    fn test_oversized_dimension_rejected() {
        let err = encode(MAX_DIMENSION + 1, 1, Rgba([0, 0, 0, 255])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EncodeError>(),
            Some(EncodeError::InvalidDimension { .. })
        ));
    }

    #[test]
    fn test_unallocatable_scanlines_rejected() {
        let err = raw_scanlines(MAX_DIMENSION, MAX_DIMENSION, Rgba([0, 0, 0, 255])).unwrap_err();
        assert_eq!(
            err,
            EncodeError::ImageTooLarge {
                width: MAX_DIMENSION,
                height: MAX_DIMENSION
            }
        );

        let err = encode(MAX_DIMENSION, MAX_DIMENSION, Rgba([0, 0, 0, 255])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EncodeError>(),
            Some(EncodeError::ImageTooLarge { .. })
        ));
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let color = Rgba([14, 165, 233, 255]);
        assert_eq!(encode(48, 48, color).unwrap(), encode(48, 48, color).unwrap());
    }

    #[test]
    fn test_write_chunk_framing() {
        let mut buf = Vec::new();
        write_chunk(&mut buf, b"teSt", &[1, 2, 3]).unwrap();

        assert_eq!(&buf[..4], &3u32.to_be_bytes());
        assert_eq!(&buf[4..8], b"teSt");
        assert_eq!(&buf[8..11], &[1, 2, 3]);
        assert_eq!(&buf[11..], &chunk_crc(b"teSt", &[1, 2, 3]).to_be_bytes());
    }
}
