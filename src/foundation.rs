//! Shared primitives: coordinates and frame timing, errors, the color table, hashing.

pub mod core;
pub mod error;
pub(crate) mod math;
pub mod palette;
