use crate::{
    animation::ease::Ease,
    foundation::core::Vec2,
    foundation::error::{StoryError, StoryResult},
    scene::graph::{MobjectId, SceneGraph},
    scene::shape::Mobject,
};

/// What an animation does to its targets over one step.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum AnimKind {
    /// Opacity 0 → 1 while arriving from `-shift`. Starts at `1/scale` of full size and settles
    /// onto it, so a `scale` below 1 shrinks in.
    FadeIn {
        target: MobjectId,
        shift: Vec2,
        scale: f64,
    },
    /// Opacity 1 → 0 while drifting by `shift`.
    FadeOut { target: MobjectId, shift: Vec2 },
    /// Left-to-right reveal.
    Write { target: MobjectId },
    /// Outline drawn by arc length, leaves staggered by `lag_ratio`.
    ShowCreation { target: MobjectId, lag_ratio: f64 },
    /// Morph `source` into `target`; afterwards only `target` is on screen.
    ReplacementTransform {
        source: MobjectId,
        target: MobjectId,
    },
    /// Morph `source` into the shape of `target`; afterwards `source` carries that geometry.
    Transform {
        source: MobjectId,
        target: MobjectId,
    },
    /// Interpolate leaves from their current state to the recorded `after` states.
    Reposition {
        target: MobjectId,
        after: Vec<(MobjectId, Mobject)>,
    },
    LaggedStart {
        children: Vec<Animation>,
        lag_ratio: f64,
    },
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Animation {
    pub kind: AnimKind,
    pub rate: Ease,
}

impl Animation {
    pub fn new(kind: AnimKind) -> Self {
        Self {
            kind,
            rate: Ease::default(),
        }
    }

    pub fn with_rate(mut self, rate: Ease) -> Self {
        self.rate = rate;
        self
    }

    /// Set the travel vector of a fade. Other kinds are returned unchanged.
    pub fn with_shift(mut self, by: Vec2) -> Self {
        match &mut self.kind {
            AnimKind::FadeIn { shift, .. } | AnimKind::FadeOut { shift, .. } => *shift = by,
            _ => {}
        }
        self
    }

    /// Set the scale factor of a fade-in; it starts at `1/factor` of full size. Other kinds are
    /// returned unchanged.
    pub fn with_scale(mut self, from: f64) -> Self {
        if let AnimKind::FadeIn { scale, .. } = &mut self.kind {
            *scale = from;
        }
        self
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            AnimKind::FadeIn { .. } => "FadeIn",
            AnimKind::FadeOut { .. } => "FadeOut",
            AnimKind::Write { .. } => "Write",
            AnimKind::ShowCreation { .. } => "ShowCreation",
            AnimKind::ReplacementTransform { .. } => "ReplacementTransform",
            AnimKind::Transform { .. } => "Transform",
            AnimKind::Reposition { .. } => "Reposition",
            AnimKind::LaggedStart { .. } => "LaggedStart",
        }
    }

    /// Check ids and parameters against the graph the animation will run on.
    pub fn validate(&self, graph: &SceneGraph) -> StoryResult<()> {
        let has_leaves = |id: MobjectId| -> StoryResult<()> {
            if graph.leaves(id)?.is_empty() {
                return Err(StoryError::animation(format!(
                    "{} target {} has no leaves",
                    self.kind_name(),
                    id.0
                )));
            }
            Ok(())
        };
        let lag_ok = |lag: f64| -> StoryResult<()> {
            if !(lag.is_finite() && lag >= 0.0) {
                return Err(StoryError::animation("lag ratio must be finite and >= 0"));
            }
            Ok(())
        };

        match &self.kind {
            AnimKind::FadeIn {
                target,
                shift,
                scale,
            } => {
                has_leaves(*target)?;
                if !(shift.is_finite() && scale.is_finite() && *scale > 0.0) {
                    return Err(StoryError::animation(
                        "FadeIn needs a finite shift and a scale > 0",
                    ));
                }
            }
            AnimKind::FadeOut { target, shift } => {
                has_leaves(*target)?;
                if !shift.is_finite() {
                    return Err(StoryError::animation("FadeOut shift must be finite"));
                }
            }
            AnimKind::Write { target } => has_leaves(*target)?,
            AnimKind::ShowCreation { target, lag_ratio } => {
                has_leaves(*target)?;
                lag_ok(*lag_ratio)?;
            }
            AnimKind::ReplacementTransform { source, target }
            | AnimKind::Transform { source, target } => {
                has_leaves(*source)?;
                has_leaves(*target)?;
            }
            AnimKind::Reposition { target, after } => {
                has_leaves(*target)?;
                for (id, _) in after {
                    graph.leaf(*id)?;
                }
            }
            AnimKind::LaggedStart {
                children,
                lag_ratio,
            } => {
                if children.is_empty() {
                    return Err(StoryError::animation(
                        "LaggedStart needs at least one child",
                    ));
                }
                lag_ok(*lag_ratio)?;
                for child in children {
                    child.validate(graph)?;
                }
            }
        }
        Ok(())
    }
}

/// Length of a lagged run in units of one child's duration: `(n − 1)·r + 1`.
pub fn lag_span(count: usize, lag_ratio: f64) -> f64 {
    if count == 0 {
        return 1.0;
    }
    (count as f64 - 1.0) * lag_ratio + 1.0
}

/// Progress of child `index` of `count` when the whole run is at `alpha`.
pub fn lagged_alpha(alpha: f64, index: usize, count: usize, lag_ratio: f64) -> f64 {
    let span = lag_span(count, lag_ratio);
    (alpha * span - index as f64 * lag_ratio).clamp(0.0, 1.0)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/anim.rs"]
mod tests;
