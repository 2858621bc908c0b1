//! Turning render plans into pixels.

pub mod cpu;
pub mod pipeline;
pub mod text_raster;

use crate::{
    compile::plan::RenderPlan,
    foundation::core::Rgba8,
    foundation::error::StoryResult,
};

#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

pub trait RenderBackend {
    fn render_plan(&mut self, plan: &RenderPlan) -> StoryResult<FrameRGBA>;

    /// Settings for spawning equivalent per-thread backends, if this backend supports it.
    fn worker_render_settings(&self) -> Option<RenderSettings> {
        None
    }
}

#[derive(Clone, Debug, Default)]
pub struct RenderSettings {
    /// Overrides the storyboard background when set.
    pub clear_rgba: Option<Rgba8>,
}
