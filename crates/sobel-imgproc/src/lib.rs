#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color transformations module.
pub mod color;

/// image filtering module.
pub mod filter;

/// border handling module.
pub mod padding;

/// module containing parallization utilities.
pub mod parallel;
