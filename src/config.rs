//! Render configuration read from JSON.
//!
//! Every field is optional in the file; missing ones take the defaults below. The CLI layers its
//! flags on top of whatever was loaded.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context as _;

use crate::{
    foundation::core::{Canvas, Fps, Rgba8},
    foundation::error::{StoryError, StoryResult},
    render::pipeline::{RenderTarget, RenderThreading},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoryConfig {
    pub canvas: Canvas,
    pub fps: Fps,
    /// `#rrggbb` override for the scene background.
    pub background: Option<String>,
    pub threading: RenderThreading,
    pub overwrite: bool,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 1280,
                height: 720,
            },
            fps: Fps { num: 30, den: 1 },
            background: None,
            threading: RenderThreading::default(),
            overwrite: true,
        }
    }
}

impl StoryConfig {
    pub fn load(path: &Path) -> StoryResult<Self> {
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            StoryError::serde(format!("parse config '{}': {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> StoryResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(StoryError::validation("canvas width/height must be > 0"));
        }
        if self.canvas.width > u32::from(u16::MAX) || self.canvas.height > u32::from(u16::MAX) {
            return Err(StoryError::validation(
                "canvas width/height must fit in 16 bits",
            ));
        }
        Fps::new(self.fps.num, self.fps.den)?;
        if self.threading.threads == Some(0) {
            return Err(StoryError::validation("threading.threads must be >= 1"));
        }
        self.background_override()?;
        Ok(())
    }

    pub fn background_override(&self) -> StoryResult<Option<Rgba8>> {
        self.background.as_deref().map(Rgba8::from_hex).transpose()
    }

    pub fn target(&self) -> RenderTarget {
        RenderTarget {
            canvas: self.canvas,
            fps: self.fps,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
