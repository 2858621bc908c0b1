use std::path::Path;

use anyhow::Context as _;

use crate::{
    encode::ffmpeg::{create_parent_dir, flatten_frame},
    foundation::core::Rgba8,
    foundation::error::StoryResult,
    render::FrameRGBA,
};

/// Write `frame` as an opaque PNG, flattening any alpha over `bg`.
pub fn write_png(frame: &FrameRGBA, bg: Rgba8, path: &Path) -> StoryResult<()> {
    create_parent_dir(path)?;
    let mut opaque = Vec::new();
    flatten_frame(frame, (frame.width, frame.height), bg, &mut opaque)?;

    image::save_buffer_with_format(
        path,
        &opaque,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}
