//! Scene graph, shapes, text metrics, and relative layout.
//!
//! Coordinates are scene units with y pointing up; the visible frame is
//! [`FRAME_HEIGHT`](crate::foundation::core::FRAME_HEIGHT) units tall and centered on the origin.

pub mod graph;
pub mod layout;
pub mod shape;
pub mod text;
