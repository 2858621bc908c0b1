//! Sampling a storyboard at a frame index.

pub mod evaluator;
