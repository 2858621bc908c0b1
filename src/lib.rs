//! clipstory renders two animated explainers of CLIP (contrastive language-image pre-training).
//!
//! A scene is a fixed script recorded by a [`Director`] into a [`Storyboard`]. Rendering samples
//! the storyboard frame by frame:
//!
//! - [`Evaluator::eval_frame`] resolves the draw list at a frame index
//! - [`compile_frame`] lowers it to a pixel-space [`RenderPlan`]
//! - [`CpuBackend`] rasterizes the plan
//! - [`render_to_mp4`] streams frames into the system `ffmpeg`
//!
//! Recording and evaluation are pure: the same scene always produces the same storyboard and the
//! same pixels.
#![forbid(unsafe_code)]

pub mod animation;
pub mod compile;
pub mod config;
pub mod encode;
pub mod eval;
pub mod foundation;
pub mod render;
pub mod scene;
pub mod scenes;
pub mod timeline;

pub use crate::foundation::core::{
    Affine, BezPath, Canvas, DOWN, Fps, FrameIndex, FrameRange, LEFT, Point, RIGHT, Rect, Rgba8,
    UP, Vec2,
};
pub use crate::foundation::error::{StoryError, StoryResult};
pub use crate::foundation::palette::Palette;

pub use crate::animation::anim::{AnimKind, Animation};
pub use crate::animation::ease::Ease;
pub use crate::compile::plan::{RenderPlan, compile_frame};
pub use crate::config::StoryConfig;
pub use crate::encode::png::write_png;
pub use crate::eval::evaluator::{EvaluatedFrame, Evaluator};
pub use crate::render::cpu::CpuBackend;
pub use crate::render::pipeline::{
    RenderStats, RenderTarget, RenderThreading, RenderToMp4Opts, render_frame, render_frames,
    render_to_mp4,
};
pub use crate::render::{FrameRGBA, RenderBackend, RenderSettings};
pub use crate::scene::graph::{MobjectId, SceneGraph};
pub use crate::scene::shape::Mobject;
pub use crate::scenes::{ClipEncoding, ClipExplainer, SceneDef, build_storyboard};
pub use crate::timeline::director::Director;
pub use crate::timeline::storyboard::Storyboard;
