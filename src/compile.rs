//! Lowering evaluated frames into pixel-space render plans.

pub mod plan;
