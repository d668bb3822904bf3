//! Filter operations
//!
//! This module provides the sobel gradient and edge thresholding operations.

/// Filter kernels
pub mod kernels;

/// Filter operations
mod ops;
pub use ops::*;
