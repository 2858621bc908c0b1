use kurbo::{ParamCurve, ParamCurveArclen, PathEl, PathSeg};

use crate::{
    eval::evaluator::{DrawItem, EvaluatedFrame},
    foundation::core::{Affine, BezPath, Canvas, Point, Rgba8},
    foundation::error::{StoryError, StoryResult},
    foundation::math::Fnv1a64,
    foundation::palette::BLACK,
    scene::shape::{Mobject, Shape},
    scene::text::TextRun,
};

/// Stroke pixels per display point at [`STROKE_REFERENCE_HEIGHT`].
pub const STROKE_PX_PER_POINT: f64 = 1.0;
/// Canvas height at which one stroke point is [`STROKE_PX_PER_POINT`] pixels.
pub const STROKE_REFERENCE_HEIGHT: f64 = 1080.0;

/// Halo color behind text with a backstroke.
pub const BACKSTROKE_COLOR: Rgba8 = BLACK;

const ARCLEN_ACCURACY: f64 = 1e-3;

/// Backend-agnostic draw list for one frame, in pixel space (y down).
#[derive(Clone, Debug, PartialEq)]
pub struct RenderPlan {
    pub canvas: Canvas,
    pub background: Rgba8,
    pub ops: Vec<DrawOp>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    FillPath {
        path: BezPath,
        color: Rgba8,
        opacity: f32,
    },
    StrokePath {
        path: BezPath,
        color: Rgba8,
        width: f64,
        /// Dash and gap length in pixels.
        dash: Option<f64>,
        opacity: f32,
    },
    Text(TextOp),
}

/// Text placed by its metric box center.
#[derive(Clone, Debug, PartialEq)]
pub struct TextOp {
    pub markup: String,
    pub runs: Vec<TextRun>,
    pub font_px: f64,
    pub center: Point,
    pub color: Rgba8,
    /// Halo width in pixels, drawn in black behind the glyphs.
    pub backstroke: Option<f64>,
    /// Visible fraction, clipped from the left.
    pub reveal: f32,
    pub opacity: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameFingerprint {
    pub hi: u64,
    pub lo: u64,
}

pub fn stroke_px(points: f64, canvas: Canvas) -> f64 {
    points * STROKE_PX_PER_POINT * f64::from(canvas.height) / STROKE_REFERENCE_HEIGHT
}

pub fn compile_frame(frame: &EvaluatedFrame, canvas: Canvas) -> StoryResult<RenderPlan> {
    if canvas.width == 0 || canvas.height == 0 {
        return Err(StoryError::validation("canvas width/height must be > 0"));
    }
    let to_px = canvas.scene_to_pixels();
    let mut ops = Vec::with_capacity(frame.items.len() * 2);
    for item in &frame.items {
        compile_item(item, canvas, to_px, &mut ops);
    }
    Ok(RenderPlan {
        canvas,
        background: frame.background,
        ops,
    })
}

fn compile_item(item: &DrawItem, canvas: Canvas, to_px: Affine, ops: &mut Vec<DrawOp>) {
    let opacity = item.opacity.clamp(0.0, 1.0);
    let reveal = item.reveal.clamp(0.0, 1.0);
    if opacity <= 0.0 || reveal <= 0.0 {
        return;
    }
    let m = &item.mobject;

    if let Shape::Text(text) = &m.shape {
        let Some(fill) = m.style.fill else {
            return;
        };
        ops.push(DrawOp::Text(TextOp {
            markup: text.markup.clone(),
            runs: text.runs.clone(),
            font_px: text.em() * canvas.pixels_per_unit(),
            center: to_px * m.center,
            color: fill.color,
            backstroke: m.style.backstroke.map(|w| stroke_px(w, canvas)),
            reveal: reveal as f32,
            opacity: (fill.opacity * opacity) as f32,
        }));
        return;
    }

    let Some(outline) = m.outline() else {
        return;
    };
    let outline = to_px * outline;

    if let Some(fill) = m.style.fill {
        let alpha = fill.opacity * opacity * reveal;
        if alpha > 0.0 && is_closed(&m.shape) {
            ops.push(DrawOp::FillPath {
                path: outline.clone(),
                color: fill.color,
                opacity: alpha as f32,
            });
        }
    }

    if let Some(stroke) = m.style.stroke {
        let alpha = stroke.opacity * opacity;
        let width = stroke_px(stroke.width, canvas);
        if alpha > 0.0 && width > 0.0 {
            let path = if reveal < 1.0 {
                trim_path(&outline, reveal)
            } else {
                outline
            };
            let dash = match &m.shape {
                Shape::Line { dash: Some(d), .. } => Some(d * canvas.pixels_per_unit()),
                _ => None,
            };
            ops.push(DrawOp::StrokePath {
                path,
                color: stroke.color,
                width,
                dash,
                opacity: alpha as f32,
            });
            if let Some(tip) = arrow_tip_px(m, to_px) {
                // The tip lands once the shaft is nearly drawn.
                let tip_alpha = alpha * ((reveal - 0.8) / 0.2).clamp(0.0, 1.0);
                if tip_alpha > 0.0 {
                    ops.push(DrawOp::FillPath {
                        path: tip,
                        color: stroke.color,
                        opacity: tip_alpha as f32,
                    });
                }
            }
        }
    }
}

fn is_closed(shape: &Shape) -> bool {
    matches!(
        shape,
        Shape::Rect { .. } | Shape::Ellipse { .. } | Shape::Dot { .. }
    )
}

fn arrow_tip_px(m: &Mobject, to_px: Affine) -> Option<BezPath> {
    m.arrow_tip().map(|tip| to_px * tip)
}

/// Leading `fraction` of `path` by arc length.
pub fn trim_path(path: &BezPath, fraction: f64) -> BezPath {
    let fraction = fraction.clamp(0.0, 1.0);
    let segs: Vec<PathSeg> = path.segments().collect();
    let lens: Vec<f64> = segs.iter().map(|s| s.arclen(ARCLEN_ACCURACY)).collect();
    let mut remaining = fraction * lens.iter().sum::<f64>();

    let mut out = BezPath::new();
    let mut last_end: Option<Point> = None;
    for (seg, len) in segs.into_iter().zip(lens) {
        if remaining <= 0.0 {
            break;
        }
        let piece = if len <= remaining {
            seg
        } else {
            let t = seg.inv_arclen(remaining, ARCLEN_ACCURACY);
            seg.subsegment(0.0..t)
        };
        remaining -= len;

        if last_end != Some(piece.start()) {
            out.move_to(piece.start());
        }
        match piece {
            PathSeg::Line(l) => out.line_to(l.p1),
            PathSeg::Quad(q) => out.quad_to(q.p1, q.p2),
            PathSeg::Cubic(c) => out.curve_to(c.p1, c.p2, c.p3),
        }
        last_end = Some(piece.end());
    }
    out
}

/// Order-sensitive hash of everything a backend would draw.
pub fn fingerprint_plan(plan: &RenderPlan) -> FrameFingerprint {
    let mut a = Fnv1a64::new_default();
    let mut b = Fnv1a64::new(0x9ae1_6a3b_2f90_404f);
    let mut put = |v: u64| {
        a.write_u64(v);
        b.write_u64(v);
    };

    put((u64::from(plan.canvas.width) << 32) | u64::from(plan.canvas.height));
    put(color_bits(plan.background));
    put(plan.ops.len() as u64);
    for op in &plan.ops {
        match op {
            DrawOp::FillPath {
                path,
                color,
                opacity,
            } => {
                put(1);
                put_path(&mut put, path);
                put(color_bits(*color));
                put(u64::from(opacity.to_bits()));
            }
            DrawOp::StrokePath {
                path,
                color,
                width,
                dash,
                opacity,
            } => {
                put(2);
                put_path(&mut put, path);
                put(color_bits(*color));
                put(width.to_bits());
                put(dash.map_or(0, f64::to_bits));
                put(u64::from(opacity.to_bits()));
            }
            DrawOp::Text(t) => {
                put(3);
                for byte in t.markup.bytes() {
                    put(u64::from(byte));
                }
                put(t.font_px.to_bits());
                put(t.center.x.to_bits());
                put(t.center.y.to_bits());
                put(color_bits(t.color));
                put(t.backstroke.map_or(0, f64::to_bits));
                put(u64::from(t.reveal.to_bits()));
                put(u64::from(t.opacity.to_bits()));
            }
        }
    }
    FrameFingerprint {
        hi: a.finish(),
        lo: b.finish(),
    }
}

fn put_path(put: &mut impl FnMut(u64), path: &BezPath) {
    let els = path.elements();
    put(els.len() as u64);
    for el in els {
        match *el {
            PathEl::MoveTo(p) | PathEl::LineTo(p) => put_point(put, p),
            PathEl::QuadTo(p1, p2) => {
                put_point(put, p1);
                put_point(put, p2);
            }
            PathEl::CurveTo(p1, p2, p3) => {
                put_point(put, p1);
                put_point(put, p2);
                put_point(put, p3);
            }
            PathEl::ClosePath => put(u64::MAX),
        }
    }
}

fn put_point(put: &mut impl FnMut(u64), p: Point) {
    put(p.x.to_bits());
    put(p.y.to_bits());
}

fn color_bits(c: Rgba8) -> u64 {
    u64::from(u32::from_be_bytes([c.r, c.g, c.b, c.a]))
}

#[cfg(test)]
#[path = "../../tests/unit/compile/plan.rs"]
mod tests;
