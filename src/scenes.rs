//! The two CLIP storyboards and the shared builders they use.
//!
//! Each scene is a fixed script over a [`Director`]: build mobjects, lay them out, play.

pub mod clip_encoding;
pub mod clip_explainer;

use crate::{
    foundation::core::{Point, Rgba8},
    foundation::error::{StoryError, StoryResult},
    foundation::palette::{Palette, WHITE},
    scene::graph::{MobjectId, SceneGraph},
    scene::shape::Mobject,
    timeline::director::Director,
    timeline::storyboard::Storyboard,
};

pub use clip_encoding::ClipEncoding;
pub use clip_explainer::ClipExplainer;

/// Patches per side of the image grid.
pub const GRID_SIDE: usize = 4;

pub trait SceneDef: Sync {
    /// CLI name, e.g. `clip-encoding`.
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn construct(&self, d: &mut Director) -> StoryResult<()>;
}

pub fn all() -> [&'static dyn SceneDef; 2] {
    [&ClipEncoding, &ClipExplainer]
}

pub fn by_name(name: &str) -> StoryResult<&'static dyn SceneDef> {
    all().into_iter().find(|s| s.name() == name).ok_or_else(|| {
        let known: Vec<&str> = all().iter().map(|s| s.name()).collect();
        StoryError::validation(format!(
            "unknown scene '{name}' (known: {})",
            known.join(", ")
        ))
    })
}

/// Record `scene` on a fresh director.
#[tracing::instrument(skip(scene), fields(scene = scene.name()))]
pub fn build_storyboard(scene: &dyn SceneDef) -> StoryResult<Storyboard> {
    let mut d = Director::new(scene.name());
    scene.construct(&mut d)?;
    let sb = d.finish();
    tracing::debug!(
        steps = sb.steps.len(),
        duration = sb.duration_secs(),
        "scene recorded"
    );
    Ok(sb)
}

/// Add a leaf and give it a name in one go.
pub(crate) fn named(g: &mut SceneGraph, name: &str, m: Mobject) -> StoryResult<MobjectId> {
    let id = g.add_leaf(m);
    g.set_name(id, name)?;
    Ok(id)
}

/// `\text{..}` label as a leaf.
pub(crate) fn label(
    g: &mut SceneGraph,
    text: &str,
    font_size: f64,
    color: Rgba8,
) -> StoryResult<MobjectId> {
    Ok(g.add_leaf(Mobject::text(
        &format!("\\text{{{text}}}"),
        font_size,
        color,
    )?))
}

/// Row-major grid of filled squares centered on `center`. Returns the group and its cells.
pub fn patch_grid(
    g: &mut SceneGraph,
    palette: &Palette,
    side: f64,
    stroke_width: f64,
    center: Point,
) -> StoryResult<(MobjectId, Vec<MobjectId>)> {
    let colors = palette.expect_len(GRID_SIDE * GRID_SIDE)?;
    let mut cells = Vec::with_capacity(colors.len());
    for (k, &color) in colors.iter().enumerate() {
        let (row, col) = (k / GRID_SIDE, k % GRID_SIDE);
        cells.push(
            g.add_leaf(
                Mobject::square(side)
                    .with_fill(color, 1.0)
                    .with_stroke(WHITE, stroke_width)
                    .at(Point::new(col as f64 * side, -(row as f64) * side)),
            ),
        );
    }
    let grid = g.add_group(cells.iter().copied())?;
    g.move_to(grid, center)?;
    Ok((grid, cells))
}

/// Interior cut lines over a patch grid, horizontal and vertical interleaved.
pub fn grid_lines(
    g: &mut SceneGraph,
    cells: &[MobjectId],
    side: f64,
    width: f64,
) -> StoryResult<MobjectId> {
    let (Some(&first), Some(&last_col), Some(&last_row)) = (
        cells.first(),
        cells.get(GRID_SIDE - 1),
        cells.get(GRID_SIDE * (GRID_SIDE - 1)),
    ) else {
        return Err(StoryError::validation(format!(
            "grid lines need a {GRID_SIDE}x{GRID_SIDE} grid, got {} cells",
            cells.len()
        )));
    };
    let left_x = g.left(first)?.x;
    let right_x = g.right(last_col)?.x;
    let top_y = g.top(first)?.y;
    let bottom_y = g.bottom(last_row)?.y;

    let mut lines = Vec::with_capacity(2 * (GRID_SIDE - 1));
    for k in 1..GRID_SIDE {
        let y = top_y - k as f64 * side;
        lines.push(g.add_leaf(Mobject::line(Point::new(left_x, y), Point::new(right_x, y))));
        let x = left_x + k as f64 * side;
        lines.push(g.add_leaf(Mobject::line(Point::new(x, top_y), Point::new(x, bottom_y))));
    }
    let group = g.add_group(lines)?;
    g.set_stroke(group, WHITE, width)?;
    Ok(group)
}

/// One boxed word per entry of `words`. Each box is a `(rectangle, text)` group.
pub fn token_boxes(
    g: &mut SceneGraph,
    words: &[&str],
    colors: &[Rgba8],
    font_size: f64,
    buff: f64,
) -> StoryResult<MobjectId> {
    if words.len() != colors.len() {
        return Err(StoryError::validation(format!(
            "{} token colors for {} words",
            colors.len(),
            words.len()
        )));
    }
    let mut boxes = Vec::with_capacity(words.len());
    for (word, &color) in words.iter().zip(colors) {
        let text = label(g, word, font_size, color)?;
        let frame = g.surrounding_rectangle(text, buff)?.with_stroke(color, 1.5);
        let frame = g.add_leaf(frame);
        boxes.push(g.add_group([frame, text])?);
    }
    g.add_group(boxes)
}

/// Bars with one fill color each, stacked downward around the origin.
pub fn bar_stack(
    g: &mut SceneGraph,
    colors: &[Rgba8],
    size: (f64, f64),
    fill_opacity: f64,
    stroke_width: f64,
    buff: f64,
) -> StoryResult<MobjectId> {
    let bars: Vec<MobjectId> = colors
        .iter()
        .map(|&c| g.add_leaf(Mobject::rect(size.0, size.1).with_fill(c, fill_opacity)))
        .collect();
    let stack = g.add_group(bars)?;
    g.set_stroke(stack, WHITE, stroke_width)?;
    g.arrange(stack, crate::foundation::core::DOWN, buff)?;
    Ok(stack)
}
