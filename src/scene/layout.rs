use crate::foundation::core::{Point, Rect, Vec2};

/// Point on `rect` selected per axis by the sign of `dir` (min / center / max).
pub fn critical_point(rect: Rect, dir: Vec2) -> Point {
    fn pick(lo: f64, hi: f64, d: f64) -> f64 {
        if d > 0.0 {
            hi
        } else if d < 0.0 {
            lo
        } else {
            (lo + hi) / 2.0
        }
    }
    Point::new(pick(rect.x0, rect.x1, dir.x), pick(rect.y0, rect.y1, dir.y))
}

/// Translation that places `moving` beside `anchor` in direction `dir`, `buff` apart, centered
/// on the perpendicular axis.
pub fn next_to_shift(moving: Rect, anchor: Rect, dir: Vec2, buff: f64) -> Vec2 {
    let target = critical_point(anchor, dir) + dir * buff;
    let align = critical_point(moving, -dir);
    target - align
}

/// Union of rects; `None` for an empty input.
pub fn union_all(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
    rects.into_iter().reduce(|a, b| a.union(b))
}
