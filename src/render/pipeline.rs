use std::{collections::HashMap, sync::Arc};

use rayon::prelude::*;

use crate::{
    compile::plan::{FrameFingerprint, RenderPlan, compile_frame, fingerprint_plan},
    encode::ffmpeg::{Mp4Settings, Mp4Writer},
    eval::evaluator::Evaluator,
    foundation::core::{Canvas, Fps, FrameIndex, FrameRange, Rgba8},
    foundation::error::{StoryError, StoryResult},
    render::cpu::CpuBackend,
    render::text_raster::build_fontdb,
    render::{FrameRGBA, RenderBackend, RenderSettings},
    timeline::storyboard::Storyboard,
};

/// Output geometry and timing for a render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderTarget {
    pub canvas: Canvas,
    pub fps: Fps,
}

impl RenderTarget {
    /// Every frame of `storyboard` at this frame rate.
    pub fn full_range(self, storyboard: &Storyboard) -> FrameRange {
        FrameRange {
            start: FrameIndex(0),
            end: FrameIndex(storyboard.frame_count(self.fps)),
        }
    }
}

/// Evaluate + compile + render a single frame.
///
/// Returns a [`FrameRGBA`] containing **premultiplied** RGBA8 pixels.
#[tracing::instrument(skip(storyboard, backend), fields(scene = %storyboard.scene))]
pub fn render_frame(
    storyboard: &Storyboard,
    target: RenderTarget,
    frame: FrameIndex,
    backend: &mut dyn RenderBackend,
) -> StoryResult<FrameRGBA> {
    let plan = plan_frame(storyboard, target, frame)?;
    backend.render_plan(&plan)
}

fn plan_frame(
    storyboard: &Storyboard,
    target: RenderTarget,
    frame: FrameIndex,
) -> StoryResult<RenderPlan> {
    let eval = Evaluator::eval_frame(storyboard, target.fps, frame)?;
    compile_frame(&eval, target.canvas)
}

/// Render a range of frames (inclusive start, exclusive end) in order.
pub fn render_frames(
    storyboard: &Storyboard,
    target: RenderTarget,
    range: FrameRange,
    backend: &mut dyn RenderBackend,
) -> StoryResult<Vec<FrameRGBA>> {
    render_frames_with_stats(
        storyboard,
        target,
        range,
        backend,
        &RenderThreading::default(),
    )
    .map(|(frames, _)| frames)
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderThreading {
    pub parallel: bool,
    pub chunk_size: usize,
    pub threads: Option<usize>,
    /// Render each distinct frame once and reuse it for identical neighbours.
    pub static_frame_elision: bool,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
            static_frame_elision: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub frames_total: u64,
    pub frames_rendered: u64,
    pub frames_elided: u64,
}

impl RenderStats {
    fn absorb(&mut self, other: RenderStats) {
        self.frames_total += other.frames_total;
        self.frames_rendered += other.frames_rendered;
        self.frames_elided += other.frames_elided;
    }
}

pub fn render_frames_with_stats(
    storyboard: &Storyboard,
    target: RenderTarget,
    range: FrameRange,
    backend: &mut dyn RenderBackend,
    threading: &RenderThreading,
) -> StoryResult<(Vec<FrameRGBA>, RenderStats)> {
    if range.is_empty() {
        return Err(StoryError::validation("render range must be non-empty"));
    }

    let mut out = Vec::with_capacity(range.len_frames().min(4096) as usize);
    let mut stats = RenderStats::default();
    let mut chunks = ChunkRunner::new(backend, threading)?;
    for chunk in chunk_ranges(range, threading.chunk_size)? {
        let (mut frames, chunk_stats) = chunks.run(storyboard, target, chunk)?;
        out.append(&mut frames);
        stats.absorb(chunk_stats);
    }
    Ok((out, stats))
}

/// Options for [`render_to_mp4`].
#[derive(Clone, Debug, Default)]
pub struct RenderToMp4Opts {
    /// Frames to encode; `None` means the whole storyboard.
    pub range: Option<FrameRange>,
    /// Color to flatten alpha over; `None` uses the storyboard background.
    pub bg_rgba: Option<Rgba8>,
    /// Whether to overwrite `out_path` if it already exists.
    pub overwrite: bool,
    pub threading: RenderThreading,
}

/// Render a storyboard to an MP4 by invoking the system `ffmpeg` binary.
///
/// `ffmpeg` must be installed and on `PATH`. Frames are streamed to the encoder one chunk at a
/// time, so memory stays bounded by `threading.chunk_size`.
#[tracing::instrument(skip(storyboard, out_path, opts, backend), fields(scene = %storyboard.scene))]
pub fn render_to_mp4(
    storyboard: &Storyboard,
    target: RenderTarget,
    out_path: impl Into<std::path::PathBuf>,
    opts: RenderToMp4Opts,
    backend: &mut dyn RenderBackend,
) -> StoryResult<RenderStats> {
    let full = target.full_range(storyboard);
    let range = opts.range.unwrap_or(full);
    if range.end.0 > full.end.0 {
        return Err(StoryError::validation(
            "render_to_mp4 range must be within the storyboard duration",
        ));
    }
    if range.is_empty() {
        return Err(StoryError::validation(
            "render_to_mp4 range must be non-empty",
        ));
    }

    let mut settings = Mp4Settings::new(
        out_path,
        target.canvas.width,
        target.canvas.height,
        target.fps,
    );
    settings.overwrite = opts.overwrite;
    let out_display = settings.out_path.display().to_string();
    let bg = opts.bg_rgba.unwrap_or(storyboard.background);
    let mut mp4 = Mp4Writer::spawn(settings, bg)?;

    let mut stats = RenderStats::default();
    let mut chunks = ChunkRunner::new(backend, &opts.threading)?;
    for chunk in chunk_ranges(range, opts.threading.chunk_size)? {
        let (frames, chunk_stats) = chunks.run(storyboard, target, chunk)?;
        for frame in &frames {
            mp4.push(frame)?;
        }
        stats.absorb(chunk_stats);
    }
    mp4.finish()?;

    tracing::info!(
        out = %out_display,
        frames = stats.frames_total,
        rendered = stats.frames_rendered,
        elided = stats.frames_elided,
        "mp4 written"
    );
    Ok(stats)
}

/// Renders chunks either on the caller's backend or on a rayon pool of per-worker backends.
struct ChunkRunner<'a> {
    backend: &'a mut dyn RenderBackend,
    elide: bool,
    parallel: Option<ParallelWorkers>,
}

struct ParallelWorkers {
    pool: rayon::ThreadPool,
    settings: RenderSettings,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl ParallelWorkers {
    /// A fresh backend for one rayon worker, sharing the font database.
    fn backend(&self) -> CpuBackend {
        CpuBackend::with_fontdb(self.settings.clone(), self.fontdb.clone())
    }
}

impl<'a> ChunkRunner<'a> {
    fn new(backend: &'a mut dyn RenderBackend, threading: &RenderThreading) -> StoryResult<Self> {
        let parallel = if threading.parallel {
            let settings = backend.worker_render_settings().ok_or_else(|| {
                StoryError::evaluation(
                    "parallel render requires backend worker settings support (CpuBackend)",
                )
            })?;
            Some(ParallelWorkers {
                pool: build_thread_pool(threading.threads)?,
                settings,
                fontdb: build_fontdb(),
            })
        } else {
            None
        };
        Ok(Self {
            backend,
            elide: threading.static_frame_elision,
            parallel,
        })
    }

    fn run(
        &mut self,
        storyboard: &Storyboard,
        target: RenderTarget,
        range: FrameRange,
    ) -> StoryResult<(Vec<FrameRGBA>, RenderStats)> {
        let mut plans = Vec::with_capacity(range.len_frames() as usize);
        for f in range.start.0..range.end.0 {
            plans.push(plan_frame(storyboard, target, FrameIndex(f))?);
        }
        let (unique, frame_to_unique) = dedup_plans(&plans, self.elide);

        let rendered: Vec<StoryResult<FrameRGBA>> = match &self.parallel {
            Some(workers) => workers.pool.install(|| {
                unique
                    .par_iter()
                    .map_init(
                        || workers.backend(),
                        |worker, &idx| worker.render_plan(&plans[idx]),
                    )
                    .collect()
            }),
            None => unique
                .iter()
                .map(|&idx| self.backend.render_plan(&plans[idx]))
                .collect(),
        };

        let mut unique_frames = Vec::<Option<FrameRGBA>>::with_capacity(rendered.len());
        for item in rendered {
            unique_frames.push(Some(item?));
        }
        let out = expand_frames(unique_frames, &frame_to_unique)?;

        let total = plans.len() as u64;
        let rendered_count = unique.len() as u64;
        Ok((
            out,
            RenderStats {
                frames_total: total,
                frames_rendered: rendered_count,
                frames_elided: total.saturating_sub(rendered_count),
            },
        ))
    }
}

/// Indices of plans to render, plus the unique slot each frame maps to.
fn dedup_plans(plans: &[RenderPlan], elide: bool) -> (Vec<usize>, Vec<usize>) {
    let mut unique = Vec::<usize>::with_capacity(plans.len());
    let mut frame_to_unique = Vec::<usize>::with_capacity(plans.len());
    if !elide {
        for idx in 0..plans.len() {
            unique.push(idx);
            frame_to_unique.push(idx);
        }
        return (unique, frame_to_unique);
    }

    let mut first = HashMap::<FrameFingerprint, usize>::new();
    for (idx, plan) in plans.iter().enumerate() {
        let fp = fingerprint_plan(plan);
        if let Some(&slot) = first.get(&fp) {
            frame_to_unique.push(slot);
        } else {
            let slot = unique.len();
            unique.push(idx);
            first.insert(fp, slot);
            frame_to_unique.push(slot);
        }
    }
    (unique, frame_to_unique)
}

/// Fan unique frames back out to frame order, moving each on its last use.
fn expand_frames(
    mut unique_frames: Vec<Option<FrameRGBA>>,
    frame_to_unique: &[usize],
) -> StoryResult<Vec<FrameRGBA>> {
    let mut remaining = vec![0usize; unique_frames.len()];
    for &u in frame_to_unique {
        remaining[u] += 1;
    }

    let mut out = Vec::<FrameRGBA>::with_capacity(frame_to_unique.len());
    for &u in frame_to_unique {
        let frame = if remaining[u] == 1 {
            unique_frames[u].take()
        } else {
            unique_frames[u].clone()
        };
        out.push(frame.ok_or_else(|| {
            StoryError::evaluation("internal error: unique frame missing")
        })?);
        remaining[u] -= 1;
    }
    Ok(out)
}

fn chunk_ranges(range: FrameRange, chunk_size: usize) -> StoryResult<Vec<FrameRange>> {
    let chunk_size = normalized_chunk_size(chunk_size);
    let mut out = Vec::new();
    let mut start = range.start.0;
    while start < range.end.0 {
        let end = (start + chunk_size).min(range.end.0);
        out.push(FrameRange::new(FrameIndex(start), FrameIndex(end))?);
        start = end;
    }
    Ok(out)
}

fn build_thread_pool(threads: Option<usize>) -> StoryResult<rayon::ThreadPool> {
    if threads == Some(0) {
        return Err(StoryError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| StoryError::evaluation(format!("failed to build rayon thread pool: {e}")))
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    chunk_size.max(1) as u64
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
