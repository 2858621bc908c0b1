//! Animation descriptions and rate functions.

pub mod anim;
pub mod ease;
pub mod ops;
