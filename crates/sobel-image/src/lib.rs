#![deny(missing_docs)]
//! Image types used to hold color, intensity and edge grids

/// image representation for the processing stages.
pub mod image;

/// Error types for the image module.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
