#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
///
/// Defines [`error::IoError`] variants for file access, unsupported formats,
/// truncated payloads and dimension limits.
pub mod error;

/// BMP image encoding and decoding.
///
/// Read and write uncompressed 24-bit BMP images, carrying the original headers
/// through unchanged. See [`bmp::read_image_bmp_rgb8`].
pub mod bmp;

pub use crate::error::IoError;
