use std::{collections::HashMap, sync::Arc};

use crate::{
    compile::plan::{DrawOp, RenderPlan, TextOp},
    foundation::core::{Affine, BezPath, Point, Rgba8, Vec2},
    foundation::error::{StoryError, StoryResult},
    render::text_raster::{TextRasterKey, build_fontdb, rasterize_text},
    render::{FrameRGBA, RenderBackend, RenderSettings},
};

/// Software backend on `vello_cpu`. Text goes through `resvg` and is cached per label and size.
pub struct CpuBackend {
    settings: RenderSettings,
    fontdb: Arc<usvg::fontdb::Database>,
    text_cache: HashMap<TextRasterKey, CachedText>,
}

#[derive(Clone)]
struct CachedText {
    image: vello_cpu::Image,
    width: f64,
    height: f64,
    anchor: (f64, f64),
    ink_x0: f64,
    ink_x1: f64,
}

impl CpuBackend {
    pub fn new(settings: RenderSettings) -> Self {
        Self::with_fontdb(settings, build_fontdb())
    }

    /// Share one font database across workers instead of scanning system fonts per backend.
    pub fn with_fontdb(settings: RenderSettings, fontdb: Arc<usvg::fontdb::Database>) -> Self {
        Self {
            settings,
            fontdb,
            text_cache: HashMap::new(),
        }
    }

    pub fn cached_labels(&self) -> usize {
        self.text_cache.len()
    }

    fn text_image(&mut self, op: &TextOp) -> StoryResult<CachedText> {
        let key = TextRasterKey::for_op(op);
        if let Some(hit) = self.text_cache.get(&key) {
            return Ok(hit.clone());
        }

        let raster = rasterize_text(op, &self.fontdb)?;
        let pixmap =
            image_premul_bytes_to_pixmap(&raster.rgba8_premul, raster.width, raster.height)?;
        let cached = CachedText {
            image: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
            width: f64::from(raster.width),
            height: f64::from(raster.height),
            anchor: raster.anchor,
            ink_x0: raster.ink_x0,
            ink_x1: raster.ink_x1,
        };
        self.text_cache.insert(key, cached.clone());
        Ok(cached)
    }
}

impl RenderBackend for CpuBackend {
    fn render_plan(&mut self, plan: &RenderPlan) -> StoryResult<FrameRGBA> {
        let width: u16 = plan
            .canvas
            .width
            .try_into()
            .map_err(|_| StoryError::evaluation("canvas width exceeds u16"))?;
        let height: u16 = plan
            .canvas
            .height
            .try_into()
            .map_err(|_| StoryError::evaluation("canvas height exceeds u16"))?;
        if width == 0 || height == 0 {
            return Err(StoryError::evaluation("canvas width/height must be > 0"));
        }

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        let background = self.settings.clear_rgba.unwrap_or(plan.background);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(to_cpu_color(background));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
        ));

        for op in &plan.ops {
            draw_op(self, &mut ctx, op)?;
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRGBA {
            width: plan.canvas.width,
            height: plan.canvas.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn worker_render_settings(&self) -> Option<RenderSettings> {
        Some(self.settings.clone())
    }
}

fn draw_op(
    backend: &mut CpuBackend,
    ctx: &mut vello_cpu::RenderContext,
    op: &DrawOp,
) -> StoryResult<()> {
    match op {
        DrawOp::FillPath {
            path,
            color,
            opacity,
        } => {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(to_cpu_color(*color));
            with_opacity(ctx, *opacity, |ctx| ctx.fill_path(&bezpath_to_cpu(path)));
        }
        DrawOp::StrokePath {
            path,
            color,
            width,
            dash,
            opacity,
        } => {
            let mut stroke = vello_cpu::kurbo::Stroke::new(*width)
                .with_caps(vello_cpu::kurbo::Cap::Round)
                .with_join(vello_cpu::kurbo::Join::Round);
            if let Some(d) = dash {
                stroke = stroke.with_dashes(0.0, [*d, *d]);
            }
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_stroke(stroke);
            ctx.set_paint(to_cpu_color(*color));
            with_opacity(ctx, *opacity, |ctx| ctx.stroke_path(&bezpath_to_cpu(path)));
        }
        DrawOp::Text(text) => {
            let cached = backend.text_image(text)?;
            let origin = text.center - Vec2::new(cached.anchor.0, cached.anchor.1);
            let visible_w = if text.reveal >= 1.0 {
                cached.width
            } else {
                let span = cached.ink_x1 - cached.ink_x0;
                (cached.ink_x0 + span * f64::from(text.reveal.max(0.0))).min(cached.width)
            };
            if visible_w <= 0.0 {
                return Ok(());
            }

            ctx.set_transform(affine_to_cpu(Affine::translate(origin.to_vec2())));
            ctx.set_paint(cached.image);
            with_opacity(ctx, text.opacity, |ctx| {
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                    0.0,
                    0.0,
                    visible_w,
                    cached.height,
                ));
            });
        }
    }
    Ok(())
}

fn with_opacity(
    ctx: &mut vello_cpu::RenderContext,
    opacity: f32,
    draw: impl FnOnce(&mut vello_cpu::RenderContext),
) {
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity.max(0.0));
        draw(ctx);
        ctx.pop_layer();
    } else {
        draw(ctx);
    }
}

fn to_cpu_color(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> StoryResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| StoryError::evaluation("text raster width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StoryError::evaluation("text raster height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(StoryError::evaluation("text raster byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
