use std::collections::{HashMap, HashSet};

use crate::{
    animation::anim::{AnimKind, Animation, lagged_alpha},
    foundation::core::{Fps, FrameIndex, Rgba8, lerp_f64, lerp_rect},
    foundation::error::{StoryError, StoryResult},
    scene::graph::{MobjectId, SceneGraph},
    scene::shape::Mobject,
    timeline::storyboard::{StepKind, Storyboard},
};

/// One leaf as it should be drawn on this frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct DrawItem {
    /// Leaf this item was derived from.
    pub source: MobjectId,
    pub mobject: Mobject,
    pub opacity: f64,
    /// Fraction of the outline (or text width) that is visible.
    pub reveal: f64,
}

impl DrawItem {
    fn settled(source: MobjectId, mobject: Mobject) -> Self {
        Self {
            source,
            mobject,
            opacity: 1.0,
            reveal: 1.0,
        }
    }
}

/// Painter-ordered draw list for a single frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct EvaluatedFrame {
    pub frame: FrameIndex,
    pub time_secs: f64,
    /// Step being sampled; `None` once the storyboard has ended.
    pub step: Option<usize>,
    pub background: Rgba8,
    pub items: Vec<DrawItem>,
}

pub struct Evaluator;

impl Evaluator {
    #[tracing::instrument(skip(storyboard), fields(scene = %storyboard.scene))]
    pub fn eval_frame(
        storyboard: &Storyboard,
        fps: Fps,
        frame: FrameIndex,
    ) -> StoryResult<EvaluatedFrame> {
        if frame.0 >= storyboard.frame_count(fps) {
            return Err(StoryError::evaluation("frame is out of bounds"));
        }
        let time_secs = fps.frames_to_secs(frame.0);
        let step = storyboard.step_at(time_secs);

        let items = match step {
            None => settled_items(&storyboard.final_graph)?,
            Some(i) => {
                let step = &storyboard.steps[i];
                match &step.kind {
                    StepKind::Wait | StepKind::Inspect => settled_items(&step.graph)?,
                    StepKind::Play { animations } => {
                        let alpha = step.progress(time_secs);
                        let mut builder = FrameBuilder::new(&step.graph)?;
                        for anim in animations {
                            builder.apply(anim, alpha)?;
                        }
                        builder.finish()
                    }
                }
            }
        };

        Ok(EvaluatedFrame {
            frame,
            time_secs,
            step,
            background: storyboard.background,
            items,
        })
    }
}

fn settled_items(graph: &SceneGraph) -> StoryResult<Vec<DrawItem>> {
    graph
        .displayed_leaves()?
        .into_iter()
        .map(|id| Ok(DrawItem::settled(id, graph.leaf(id)?.clone())))
        .collect()
}

/// Collects per-leaf overrides on top of the displayed leaves of a step's graph.
struct FrameBuilder<'a> {
    graph: &'a SceneGraph,
    base: Vec<MobjectId>,
    on_screen: HashSet<MobjectId>,
    overrides: HashMap<MobjectId, Vec<DrawItem>>,
    appended: Vec<DrawItem>,
}

impl<'a> FrameBuilder<'a> {
    fn new(graph: &'a SceneGraph) -> StoryResult<Self> {
        let base = graph.displayed_leaves()?;
        let on_screen = base.iter().copied().collect();
        Ok(Self {
            graph,
            base,
            on_screen,
            overrides: HashMap::new(),
            appended: Vec::new(),
        })
    }

    /// Draw `items` where `leaf` sits in the display order, or on top if it is not displayed.
    fn place(&mut self, leaf: MobjectId, items: Vec<DrawItem>) {
        if self.on_screen.contains(&leaf) {
            self.overrides.insert(leaf, items);
        } else {
            self.appended.extend(items);
        }
    }

    fn suppress(&mut self, leaf: MobjectId) {
        if self.on_screen.contains(&leaf) {
            self.overrides.insert(leaf, Vec::new());
        }
    }

    fn apply(&mut self, anim: &Animation, raw_alpha: f64) -> StoryResult<()> {
        let a = anim.rate.apply(raw_alpha);
        match &anim.kind {
            AnimKind::FadeIn {
                target,
                shift,
                scale,
            } => {
                let about = self.graph.center_of(*target)?;
                let factor = lerp_f64(1.0 / *scale, 1.0, a);
                let offset = *shift * -(1.0 - a);
                for leaf in self.graph.leaves(*target)? {
                    let mut m = self.graph.leaf(leaf)?.scaled_about(factor, about);
                    m.center += offset;
                    self.place(
                        leaf,
                        vec![DrawItem {
                            source: leaf,
                            mobject: m,
                            opacity: a,
                            reveal: 1.0,
                        }],
                    );
                }
            }
            AnimKind::FadeOut { target, shift } => {
                for leaf in self.graph.leaves(*target)? {
                    let mut m = self.graph.leaf(leaf)?.clone();
                    m.center += *shift * a;
                    self.place(
                        leaf,
                        vec![DrawItem {
                            source: leaf,
                            mobject: m,
                            opacity: 1.0 - a,
                            reveal: 1.0,
                        }],
                    );
                }
            }
            AnimKind::Write { target } => {
                for leaf in self.graph.leaves(*target)? {
                    let m = self.graph.leaf(leaf)?.clone();
                    self.place(
                        leaf,
                        vec![DrawItem {
                            source: leaf,
                            mobject: m,
                            opacity: 1.0,
                            reveal: a,
                        }],
                    );
                }
            }
            AnimKind::ShowCreation { target, lag_ratio } => {
                let leaves = self.graph.leaves(*target)?;
                let n = leaves.len();
                for (i, leaf) in leaves.into_iter().enumerate() {
                    let m = self.graph.leaf(leaf)?.clone();
                    self.place(
                        leaf,
                        vec![DrawItem {
                            source: leaf,
                            mobject: m,
                            opacity: 1.0,
                            reveal: lagged_alpha(a, i, n, *lag_ratio),
                        }],
                    );
                }
            }
            AnimKind::ReplacementTransform { source, target }
            | AnimKind::Transform { source, target } => {
                self.morph(*source, *target, a)?;
            }
            AnimKind::Reposition { after, .. } => {
                for (leaf, end) in after {
                    let start = self.graph.leaf(*leaf)?;
                    let items = morph_pair(*leaf, start, end, a);
                    self.place(*leaf, items);
                }
            }
            AnimKind::LaggedStart {
                children,
                lag_ratio,
            } => {
                let n = children.len();
                for (i, child) in children.iter().enumerate() {
                    self.apply(child, lagged_alpha(a, i, n, *lag_ratio))?;
                }
            }
        }
        Ok(())
    }

    /// Pair source and target leaves by stretching the shorter list, then blend each pair.
    fn morph(&mut self, source: MobjectId, target: MobjectId, a: f64) -> StoryResult<()> {
        let src = self.graph.leaves(source)?;
        let dst = self.graph.leaves(target)?;
        let (Some(&anchor), false) = (src.first(), dst.is_empty()) else {
            return Err(StoryError::evaluation("morph between empty mobjects"));
        };
        let n = src.len().max(dst.len());
        let mut items = Vec::with_capacity(n);
        for k in 0..n {
            let s = src[k * src.len() / n];
            let d = dst[k * dst.len() / n];
            items.extend(morph_pair(s, self.graph.leaf(s)?, self.graph.leaf(d)?, a));
        }
        for &leaf in src.iter().chain(dst.iter()) {
            self.suppress(leaf);
        }
        self.place(anchor, items);
        Ok(())
    }

    fn finish(mut self) -> Vec<DrawItem> {
        let mut out = Vec::with_capacity(self.base.len() + self.appended.len());
        for leaf in &self.base {
            match self.overrides.remove(leaf) {
                Some(items) => out.extend(items),
                None => {
                    if let Ok(m) = self.graph.leaf(*leaf) {
                        out.push(DrawItem::settled(*leaf, m.clone()));
                    }
                }
            }
        }
        out.extend(self.appended);
        out
    }
}

/// Blend one leaf into another. Comparable shapes interpolate; anything else cross-fades with
/// both sides stretched over the interpolated bounds.
fn morph_pair(source: MobjectId, from: &Mobject, to: &Mobject, a: f64) -> Vec<DrawItem> {
    if let Some(m) = Mobject::interpolate(from, to, a) {
        return vec![DrawItem::settled(source, m)];
    }
    let rect = lerp_rect(from.bounds(), to.bounds(), a);
    vec![
        DrawItem {
            source,
            mobject: from.fit_to(rect),
            opacity: 1.0 - a,
            reveal: 1.0,
        },
        DrawItem {
            source,
            mobject: to.fit_to(rect),
            opacity: a,
            reveal: 1.0,
        },
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/eval/evaluator.rs"]
mod tests;
