//! Recording scenes into timed storyboards.

pub mod director;
pub mod storyboard;
