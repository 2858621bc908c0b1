use kurbo::Shape as _;

use crate::{
    foundation::core::{BezPath, Point, Rect, Rgba8, Vec2, lerp_f64, lerp_point, lerp_vec},
    foundation::error::StoryResult,
    scene::text::TextShape,
};

/// Default arrow tip length in scene units.
pub const DEFAULT_TIP_LENGTH: f64 = 0.25;
/// Default dash length for dashed lines in scene units.
pub const DEFAULT_DASH_LENGTH: f64 = 0.05;

const PATH_TOLERANCE: f64 = 1e-3;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Fill {
    pub color: Rgba8,
    pub opacity: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stroke {
    pub color: Rgba8,
    /// Stroke width in display points (see `compile::plan::STROKE_PX_PER_POINT`).
    pub width: f64,
    pub opacity: f64,
}

/// Paint attributes shared by every shape kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Style {
    pub fill: Option<Fill>,
    pub stroke: Option<Stroke>,
    /// Dark halo drawn behind text, in display points.
    pub backstroke: Option<f64>,
}

impl Style {
    pub fn with_opacity(mut self, mul: f64) -> Self {
        let mul = mul.clamp(0.0, 1.0);
        if let Some(f) = self.fill.as_mut() {
            f.opacity *= mul;
        }
        if let Some(s) = self.stroke.as_mut() {
            s.opacity *= mul;
        }
        self
    }

    pub fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        let fill = match (a.fill, b.fill) {
            (Some(x), Some(y)) => Some(Fill {
                color: x.color.lerp(y.color, t),
                opacity: lerp_f64(x.opacity, y.opacity, t),
            }),
            (Some(x), None) => Some(Fill {
                opacity: x.opacity * (1.0 - t),
                ..x
            }),
            (None, Some(y)) => Some(Fill {
                opacity: y.opacity * t,
                ..y
            }),
            (None, None) => None,
        };
        let stroke = match (a.stroke, b.stroke) {
            (Some(x), Some(y)) => Some(Stroke {
                color: x.color.lerp(y.color, t),
                width: lerp_f64(x.width, y.width, t),
                opacity: lerp_f64(x.opacity, y.opacity, t),
            }),
            (Some(x), None) => Some(Stroke {
                opacity: x.opacity * (1.0 - t),
                ..x
            }),
            (None, Some(y)) => Some(Stroke {
                opacity: y.opacity * t,
                ..y
            }),
            (None, None) => None,
        };
        let backstroke = match (a.backstroke, b.backstroke) {
            (Some(x), Some(y)) => Some(lerp_f64(x, y, t)),
            (x, y) => if t < 0.5 { x } else { y },
        };
        Self {
            fill,
            stroke,
            backstroke,
        }
    }

    /// Dominant display color: fill if present, otherwise stroke.
    pub fn color(&self) -> Option<Rgba8> {
        self.fill
            .map(|f| f.color)
            .or_else(|| self.stroke.map(|s| s.color))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ShapeKind {
    Rect,
    Ellipse,
    Dot,
    Line,
    Arrow,
    Text,
}

/// Geometry of a drawable leaf, relative to its center.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Shape {
    Rect {
        width: f64,
        height: f64,
        corner_radius: f64,
    },
    Ellipse {
        width: f64,
        height: f64,
    },
    Dot {
        radius: f64,
    },
    Line {
        start: Vec2,
        end: Vec2,
        /// Dash length; `None` draws a solid line.
        dash: Option<f64>,
    },
    Arrow {
        start: Vec2,
        end: Vec2,
        tip_length: f64,
    },
    Text(TextShape),
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Rect { .. } => ShapeKind::Rect,
            Self::Ellipse { .. } => ShapeKind::Ellipse,
            Self::Dot { .. } => ShapeKind::Dot,
            Self::Line { .. } => ShapeKind::Line,
            Self::Arrow { .. } => ShapeKind::Arrow,
            Self::Text(_) => ShapeKind::Text,
        }
    }

    /// Local bounding box, centered on the origin for closed shapes.
    pub fn local_bounds(&self) -> Rect {
        match self {
            Self::Rect { width, height, .. } | Self::Ellipse { width, height } => {
                Rect::new(-width / 2.0, -height / 2.0, width / 2.0, height / 2.0)
            }
            Self::Dot { radius } => Rect::new(-radius, -radius, *radius, *radius),
            Self::Line { start, end, .. } | Self::Arrow { start, end, .. } => {
                Rect::from_points(start.to_point(), end.to_point())
            }
            Self::Text(t) => {
                let (w, h) = (t.width(), t.height());
                Rect::new(-w / 2.0, -h / 2.0, w / 2.0, h / 2.0)
            }
        }
    }

    pub fn scaled(&self, sx: f64, sy: f64) -> Self {
        let uniform = sx.min(sy);
        match self {
            Self::Rect {
                width,
                height,
                corner_radius,
            } => Self::Rect {
                width: width * sx,
                height: height * sy,
                corner_radius: corner_radius * uniform,
            },
            Self::Ellipse { width, height } => Self::Ellipse {
                width: width * sx,
                height: height * sy,
            },
            Self::Dot { radius } => Self::Dot {
                radius: radius * uniform,
            },
            Self::Line { start, end, dash } => Self::Line {
                start: Vec2::new(start.x * sx, start.y * sy),
                end: Vec2::new(end.x * sx, end.y * sy),
                dash: *dash,
            },
            Self::Arrow {
                start,
                end,
                tip_length,
            } => Self::Arrow {
                start: Vec2::new(start.x * sx, start.y * sy),
                end: Vec2::new(end.x * sx, end.y * sy),
                tip_length: tip_length * uniform,
            },
            Self::Text(t) => Self::Text(t.scaled(uniform)),
        }
    }

    fn lerp_same_kind(a: &Self, b: &Self, t: f64) -> Option<Self> {
        let out = match (a, b) {
            (
                Self::Rect {
                    width: w0,
                    height: h0,
                    corner_radius: r0,
                },
                Self::Rect {
                    width: w1,
                    height: h1,
                    corner_radius: r1,
                },
            ) => Self::Rect {
                width: lerp_f64(*w0, *w1, t),
                height: lerp_f64(*h0, *h1, t),
                corner_radius: lerp_f64(*r0, *r1, t),
            },
            (
                Self::Ellipse {
                    width: w0,
                    height: h0,
                },
                Self::Ellipse {
                    width: w1,
                    height: h1,
                },
            ) => Self::Ellipse {
                width: lerp_f64(*w0, *w1, t),
                height: lerp_f64(*h0, *h1, t),
            },
            (Self::Dot { radius: r0 }, Self::Dot { radius: r1 }) => Self::Dot {
                radius: lerp_f64(*r0, *r1, t),
            },
            (
                Self::Line {
                    start: s0,
                    end: e0,
                    dash: d0,
                },
                Self::Line {
                    start: s1,
                    end: e1,
                    dash: d1,
                },
            ) => Self::Line {
                start: lerp_vec(*s0, *s1, t),
                end: lerp_vec(*e0, *e1, t),
                dash: match (d0, d1) {
                    (Some(x), Some(y)) => Some(lerp_f64(*x, *y, t)),
                    (x, y) => {
                        if t < 0.5 {
                            *x
                        } else {
                            *y
                        }
                    }
                },
            },
            (
                Self::Arrow {
                    start: s0,
                    end: e0,
                    tip_length: l0,
                },
                Self::Arrow {
                    start: s1,
                    end: e1,
                    tip_length: l1,
                },
            ) => Self::Arrow {
                start: lerp_vec(*s0, *s1, t),
                end: lerp_vec(*e0, *e1, t),
                tip_length: lerp_f64(*l0, *l1, t),
            },
            (Self::Text(x), Self::Text(y)) if x.markup == y.markup => {
                Self::Text(x.scaled(lerp_f64(1.0, y.font_size / x.font_size, t)))
            }
            _ => return None,
        };
        Some(out)
    }
}

/// One drawable leaf: geometry, placement, and paint.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Mobject {
    pub shape: Shape,
    pub center: Point,
    pub style: Style,
}

impl Mobject {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            center: Point::ORIGIN,
            style: Style::default(),
        }
    }

    pub fn square(side: f64) -> Self {
        Self::rect(side, side)
    }

    pub fn rect(width: f64, height: f64) -> Self {
        Self::new(Shape::Rect {
            width,
            height,
            corner_radius: 0.0,
        })
    }

    pub fn rounded_rect(width: f64, height: f64, corner_radius: f64) -> Self {
        Self::new(Shape::Rect {
            width,
            height,
            corner_radius,
        })
    }

    pub fn ellipse(width: f64, height: f64) -> Self {
        Self::new(Shape::Ellipse { width, height })
    }

    pub fn dot(radius: f64, color: Rgba8) -> Self {
        Self::new(Shape::Dot { radius }).with_fill(color, 1.0)
    }

    pub fn line(start: Point, end: Point) -> Self {
        Self::segment(start, end, None)
    }

    pub fn dashed_line(start: Point, end: Point) -> Self {
        Self::segment(start, end, Some(DEFAULT_DASH_LENGTH))
    }

    fn segment(start: Point, end: Point, dash: Option<f64>) -> Self {
        let center = start.midpoint(end);
        Self {
            shape: Shape::Line {
                start: start - center,
                end: end - center,
                dash,
            },
            center,
            style: Style::default(),
        }
    }

    /// Arrow from `start` to `end`, shortened by `buff` at both ends.
    pub fn arrow(start: Point, end: Point, buff: f64) -> Self {
        let d = end - start;
        let len = d.hypot();
        let (s, e) = if len > 2.0 * buff && len > 0.0 {
            let u = d / len;
            (start + u * buff, end - u * buff)
        } else {
            (start, end)
        };
        let shaft = (e - s).hypot();
        let center = s.midpoint(e);
        Self {
            shape: Shape::Arrow {
                start: s - center,
                end: e - center,
                tip_length: DEFAULT_TIP_LENGTH.min(0.5 * shaft),
            },
            center,
            style: Style::default(),
        }
    }

    pub fn text(markup: &str, font_size: f64, color: Rgba8) -> StoryResult<Self> {
        Ok(Self::new(Shape::Text(TextShape::parse(markup, font_size)?)).with_fill(color, 1.0))
    }

    pub fn at(mut self, center: Point) -> Self {
        self.center = center;
        self
    }

    pub fn with_fill(mut self, color: Rgba8, opacity: f64) -> Self {
        self.style.fill = Some(Fill { color, opacity });
        self
    }

    pub fn with_stroke(mut self, color: Rgba8, width: f64) -> Self {
        self.style.stroke = Some(Stroke {
            color,
            width,
            opacity: 1.0,
        });
        self
    }

    pub fn with_stroke_opacity(mut self, opacity: f64) -> Self {
        if let Some(s) = self.style.stroke.as_mut() {
            s.opacity = opacity;
        }
        self
    }

    pub fn with_backstroke(mut self, width: f64) -> Self {
        self.style.backstroke = Some(width);
        self
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    pub fn bounds(&self) -> Rect {
        self.shape.local_bounds() + self.center.to_vec2()
    }

    /// Scale about `about`; positions and geometry scale, stroke widths do not.
    pub fn scaled_about(&self, factor: f64, about: Point) -> Self {
        Self {
            shape: self.shape.scaled(factor, factor),
            center: about + (self.center - about) * factor,
            style: self.style,
        }
    }

    /// Stretch geometry so the bounding box matches `target`.
    pub fn fit_to(&self, target: Rect) -> Self {
        let b = self.shape.local_bounds();
        let sx = if b.width() > 1e-9 {
            target.width() / b.width()
        } else {
            1.0
        };
        let sy = if b.height() > 1e-9 {
            target.height() / b.height()
        } else {
            1.0
        };
        let shape = self.shape.scaled(sx, sy);
        let offset = shape.local_bounds().center().to_vec2();
        Self {
            shape,
            center: target.center() - offset,
            style: self.style,
        }
    }

    pub fn with_opacity(&self, mul: f64) -> Self {
        Self {
            style: self.style.with_opacity(mul),
            ..self.clone()
        }
    }

    /// Interpolate two leaves of the same kind; `None` when geometry is not comparable.
    pub fn interpolate(a: &Self, b: &Self, t: f64) -> Option<Self> {
        Some(Self {
            shape: Shape::lerp_same_kind(&a.shape, &b.shape, t)?,
            center: lerp_point(a.center, b.center, t),
            style: Style::lerp(&a.style, &b.style, t),
        })
    }

    /// Outline in absolute scene units. Text has no outline.
    pub fn outline(&self) -> Option<BezPath> {
        let c = self.center;
        let path = match &self.shape {
            Shape::Rect {
                width,
                height,
                corner_radius,
            } => {
                let rect = Rect::from_center_size(c, (*width, *height));
                if *corner_radius > 0.0 {
                    kurbo::RoundedRect::from_rect(rect, *corner_radius).to_path(PATH_TOLERANCE)
                } else {
                    rect.to_path(PATH_TOLERANCE)
                }
            }
            Shape::Ellipse { width, height } => {
                kurbo::Ellipse::new(c, (width / 2.0, height / 2.0), 0.0).to_path(PATH_TOLERANCE)
            }
            Shape::Dot { radius } => kurbo::Circle::new(c, *radius).to_path(PATH_TOLERANCE),
            Shape::Line { start, end, .. } => {
                let mut p = BezPath::new();
                p.move_to(c + *start);
                p.line_to(c + *end);
                p
            }
            Shape::Arrow {
                start,
                end,
                tip_length,
            } => {
                let (base, _) = arrow_tip_base(*start, *end, *tip_length);
                let mut p = BezPath::new();
                p.move_to(c + *start);
                p.line_to(c + base);
                p
            }
            Shape::Text(_) => return None,
        };
        Some(path)
    }

    /// Filled triangular tip for arrows, in absolute scene units.
    pub fn arrow_tip(&self) -> Option<BezPath> {
        let Shape::Arrow {
            start,
            end,
            tip_length,
        } = &self.shape
        else {
            return None;
        };
        let (base, normal) = arrow_tip_base(*start, *end, *tip_length);
        let half_width = tip_length * 0.5;
        let c = self.center;
        let mut p = BezPath::new();
        p.move_to(c + *end);
        p.line_to(c + base + normal * half_width);
        p.line_to(c + base - normal * half_width);
        p.close_path();
        Some(p)
    }
}

fn arrow_tip_base(start: Vec2, end: Vec2, tip_length: f64) -> (Vec2, Vec2) {
    let d = end - start;
    let len = d.hypot();
    if len <= 1e-9 {
        return (end, Vec2::new(0.0, 1.0));
    }
    let u = d / len;
    (end - u * tip_length.min(len), Vec2::new(-u.y, u.x))
}

#[cfg(test)]
#[path = "../../tests/unit/scene/shape.rs"]
mod tests;
