//! MP4 output: straight RGBA frames piped into a system `ffmpeg` running libx264.

use std::{
    ffi::OsString,
    io::Write as _,
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use anyhow::Context as _;

use crate::{
    foundation::core::{Fps, Rgba8},
    foundation::error::{StoryError, StoryResult},
    foundation::math::mul_div255,
    render::FrameRGBA,
};

/// Output geometry and destination of one MP4.
#[derive(Clone, Debug)]
pub struct Mp4Settings {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    pub out_path: PathBuf,
    pub overwrite: bool,
}

impl Mp4Settings {
    pub fn new(out_path: impl Into<PathBuf>, width: u32, height: u32, fps: Fps) -> Self {
        Self {
            width,
            height,
            fps,
            out_path: out_path.into(),
            overwrite: true,
        }
    }

    pub fn validate(&self) -> StoryResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(StoryError::validation("mp4 width/height must be non-zero"));
        }
        // yuv420p subsamples chroma 2x2.
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(StoryError::validation(format!(
                "mp4 dimensions must be even for yuv420p, got {}x{}",
                self.width, self.height
            )));
        }
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(StoryError::validation("mp4 fps must be non-zero"));
        }
        Ok(())
    }

    /// Value for `-r`; whole rates print bare, others as `num/den`.
    fn frame_rate(&self) -> String {
        match self.fps.den {
            1 => self.fps.num.to_string(),
            den => format!("{}/{den}", self.fps.num),
        }
    }

    fn ffmpeg_args(&self) -> Vec<OsString> {
        let size = format!("{}x{}", self.width, self.height);
        let rate = self.frame_rate();
        let flags: [&str; 20] = [
            if self.overwrite { "-y" } else { "-n" },
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &size,
            "-r",
            &rate,
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ];
        let mut args: Vec<OsString> = flags.into_iter().map(OsString::from).collect();
        args.push(self.out_path.clone().into_os_string());
        args
    }
}

pub fn ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok_and(|s| s.success())
}

pub fn create_parent_dir(path: &Path) -> StoryResult<()> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    std::fs::create_dir_all(parent)
        .with_context(|| format!("create output directory '{}'", parent.display()))?;
    Ok(())
}

/// A running `ffmpeg` child fed one flattened frame at a time.
pub struct Mp4Writer {
    settings: Mp4Settings,
    bg: Rgba8,
    child: Child,
    pipe: Option<ChildStdin>,
    opaque: Vec<u8>,
    written: u64,
}

impl Mp4Writer {
    pub fn spawn(settings: Mp4Settings, bg: Rgba8) -> StoryResult<Self> {
        settings.validate()?;
        if !settings.overwrite && settings.out_path.exists() {
            return Err(StoryError::validation(format!(
                "refusing to overwrite '{}'",
                settings.out_path.display()
            )));
        }
        if !ffmpeg_available() {
            return Err(StoryError::evaluation(
                "MP4 output needs `ffmpeg` on PATH and none was found",
            ));
        }
        create_parent_dir(&settings.out_path)?;

        tracing::debug!(
            out = %settings.out_path.display(),
            rate = %settings.frame_rate(),
            "starting ffmpeg"
        );
        let mut child = Command::new("ffmpeg")
            .args(settings.ffmpeg_args())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| StoryError::evaluation(format!("could not start ffmpeg: {e}")))?;
        let pipe = child.stdin.take();
        if pipe.is_none() {
            return Err(StoryError::evaluation("ffmpeg stdin was not captured"));
        }

        Ok(Self {
            settings,
            bg,
            child,
            pipe,
            opaque: Vec::new(),
            written: 0,
        })
    }

    pub fn push(&mut self, frame: &FrameRGBA) -> StoryResult<()> {
        let size = (self.settings.width, self.settings.height);
        flatten_frame(frame, size, self.bg, &mut self.opaque)?;
        let pipe = self
            .pipe
            .as_mut()
            .ok_or_else(|| StoryError::evaluation("ffmpeg pipe is already closed"))?;
        pipe.write_all(&self.opaque)
            .map_err(|e| StoryError::evaluation(format!("ffmpeg pipe write failed: {e}")))?;
        self.written += 1;
        Ok(())
    }

    /// Close the pipe, wait for ffmpeg, and return how many frames it received.
    pub fn finish(mut self) -> StoryResult<u64> {
        self.pipe = None;
        let output = self
            .child
            .wait_with_output()
            .map_err(|e| StoryError::evaluation(format!("waiting on ffmpeg failed: {e}")))?;
        if output.status.success() {
            return Ok(self.written);
        }
        Err(StoryError::evaluation(format!(
            "ffmpeg failed ({}): {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }
}

/// Composite `frame` over the opaque `bg` into `out` as straight RGBA with alpha 255.
///
/// Fails unless the frame is exactly `size` and its buffer holds `width * height` pixels.
pub(crate) fn flatten_frame(
    frame: &FrameRGBA,
    size: (u32, u32),
    bg: Rgba8,
    out: &mut Vec<u8>,
) -> StoryResult<()> {
    if (frame.width, frame.height) != size {
        return Err(StoryError::validation(format!(
            "frame is {}x{}, expected {}x{}",
            frame.width, frame.height, size.0, size.1
        )));
    }
    let bytes = frame.width as usize * frame.height as usize * 4;
    if frame.data.len() != bytes {
        return Err(StoryError::validation(format!(
            "frame buffer holds {} bytes, {}x{} RGBA needs {bytes}",
            frame.data.len(),
            frame.width,
            frame.height
        )));
    }

    out.resize(bytes, 0);
    let bg = [bg.r, bg.g, bg.b].map(u16::from);
    for (px, dst) in frame.data.chunks_exact(4).zip(out.chunks_exact_mut(4)) {
        let alpha = u16::from(px[3]);
        for ((d, &s), &b) in dst.iter_mut().zip(&px[..3]).zip(&bg) {
            let fg = if frame.premultiplied {
                u16::from(s)
            } else {
                mul_div255(u16::from(s), alpha)
            };
            *d = (fg + mul_div255(b, 255 - alpha)).min(255) as u8;
        }
        dst[3] = 255;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
