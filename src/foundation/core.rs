use crate::foundation::error::{StoryError, StoryResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Height of the visible frame in scene units. Width follows the canvas aspect ratio.
pub const FRAME_HEIGHT: f64 = 8.0;
/// Width of the authored frame in scene units (16:9).
pub const FRAME_WIDTH: f64 = FRAME_HEIGHT * 16.0 / 9.0;

/// Unit vector pointing up (scene space is y-up).
pub const UP: Vec2 = Vec2::new(0.0, 1.0);
/// Unit vector pointing down.
pub const DOWN: Vec2 = Vec2::new(0.0, -1.0);
/// Unit vector pointing left.
pub const LEFT: Vec2 = Vec2::new(-1.0, 0.0);
/// Unit vector pointing right.
pub const RIGHT: Vec2 = Vec2::new(1.0, 0.0);
/// Zero vector.
pub const ORIGIN: Vec2 = Vec2::ZERO;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    pub start: FrameIndex,
    pub end: FrameIndex, // exclusive
}

impl FrameRange {
    pub fn new(start: FrameIndex, end: FrameIndex) -> StoryResult<Self> {
        if start.0 > end.0 {
            return Err(StoryError::validation("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    pub fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }

    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 < self.end.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> StoryResult<Self> {
        if den == 0 {
            return Err(StoryError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(StoryError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    pub fn secs_to_frames_ceil(self, secs: f64) -> u64 {
        // Guard against 2.0000000001 * 30 rounding up a whole extra frame.
        let raw = secs * self.as_f64();
        let rounded = raw.round();
        if (raw - rounded).abs() < 1e-6 {
            rounded.max(0.0) as u64
        } else {
            raw.ceil().max(0.0) as u64
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// Pixels per scene unit.
    pub fn pixels_per_unit(self) -> f64 {
        f64::from(self.height) / FRAME_HEIGHT
    }

    /// Visible frame width in scene units.
    pub fn frame_width(self) -> f64 {
        FRAME_HEIGHT * f64::from(self.width) / f64::from(self.height.max(1))
    }

    /// Affine mapping y-up scene units (origin at center) to y-down pixel space.
    pub fn scene_to_pixels(self) -> Affine {
        let ppu = self.pixels_per_unit();
        Affine::translate(Vec2::new(
            f64::from(self.width) / 2.0,
            f64::from(self.height) / 2.0,
        )) * Affine::scale_non_uniform(ppu, -ppu)
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(s: &str) -> StoryResult<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            return Err(StoryError::validation(format!(
                "color '{s}' must be #rrggbb or #rrggbbaa"
            )));
        }
        let channel = |i: usize| -> StoryResult<u8> {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| StoryError::validation(format!("color '{s}' has invalid hex digits")))
        };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if hex.len() == 8 { channel(6)? } else { 255 },
        })
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn lerp(self, other: Self, t: f64) -> Self {
        fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
            let a = f64::from(a);
            let b = f64::from(b);
            (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
        }

        Self {
            r: lerp_u8(self.r, other.r, t),
            g: lerp_u8(self.g, other.g, t),
            b: lerp_u8(self.b, other.b, t),
            a: lerp_u8(self.a, other.a, t),
        }
    }

    pub fn to_premul(self) -> [u8; 4] {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        [
            premul(self.r, self.a),
            premul(self.g, self.a),
            premul(self.b, self.a),
            self.a,
        ]
    }
}

pub(crate) fn lerp_f64(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

pub(crate) fn lerp_point(a: Point, b: Point, t: f64) -> Point {
    Point::new(lerp_f64(a.x, b.x, t), lerp_f64(a.y, b.y, t))
}

pub(crate) fn lerp_vec(a: Vec2, b: Vec2, t: f64) -> Vec2 {
    Vec2::new(lerp_f64(a.x, b.x, t), lerp_f64(a.y, b.y, t))
}

pub(crate) fn lerp_rect(a: Rect, b: Rect, t: f64) -> Rect {
    Rect::new(
        lerp_f64(a.x0, b.x0, t),
        lerp_f64(a.y0, b.y0, t),
        lerp_f64(a.x1, b.x1, t),
        lerp_f64(a.y1, b.y1, t),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
