use crate::{
    animation::anim::{AnimKind, Animation},
    foundation::core::{Fps, Rgba8},
    foundation::error::{StoryError, StoryResult},
    foundation::math::Fnv1a64,
    scene::graph::SceneGraph,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum StepKind {
    Play { animations: Vec<Animation> },
    Wait,
    /// Zero-length hand-off of the final state.
    Inspect,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Step {
    pub start_secs: f64,
    pub duration_secs: f64,
    pub kind: StepKind,
    /// Graph as it was when the step began.
    pub graph: SceneGraph,
}

impl Step {
    pub fn end_secs(&self) -> f64 {
        self.start_secs + self.duration_secs
    }

    /// Linear progress through the step at `time_secs`, clamped to `[0, 1]`.
    pub fn progress(&self, time_secs: f64) -> f64 {
        if self.duration_secs <= 0.0 {
            return 1.0;
        }
        ((time_secs - self.start_secs) / self.duration_secs).clamp(0.0, 1.0)
    }
}

/// Recorded, timed scene. Evaluation samples it; nothing mutates it afterwards.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Storyboard {
    pub scene: String,
    pub background: Rgba8,
    pub steps: Vec<Step>,
    pub final_graph: SceneGraph,
}

impl Storyboard {
    pub fn duration_secs(&self) -> f64 {
        self.steps.last().map(Step::end_secs).unwrap_or(0.0)
    }

    pub fn frame_count(&self, fps: Fps) -> u64 {
        fps.secs_to_frames_ceil(self.duration_secs())
    }

    /// Index of the step running at `time_secs`. Zero-length steps are never selected.
    pub fn step_at(&self, time_secs: f64) -> Option<usize> {
        self.steps.iter().position(|s| {
            s.duration_secs > 0.0 && s.start_secs <= time_secs && time_secs < s.end_secs()
        })
    }

    /// Stable hash of the canonical JSON form.
    pub fn fingerprint(&self) -> StoryResult<u64> {
        let bytes = serde_json::to_vec(self).map_err(|e| StoryError::serde(e.to_string()))?;
        let mut h = Fnv1a64::new_default();
        h.write_bytes(&bytes);
        Ok(h.finish())
    }

    /// One line per step: index, start, duration, and what happens.
    pub fn summary(&self) -> Vec<String> {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                let what = match &step.kind {
                    StepKind::Play { animations } => {
                        let names = animations
                            .iter()
                            .map(|a| describe(a, &step.graph))
                            .collect::<Vec<_>>();
                        format!("play {}", names.join(", "))
                    }
                    StepKind::Wait => "wait".to_string(),
                    StepKind::Inspect => "inspect".to_string(),
                };
                format!(
                    "{i:>3}  {:>6.2}s  +{:.2}s  {what}",
                    step.start_secs, step.duration_secs
                )
            })
            .collect()
    }
}

fn describe(anim: &Animation, graph: &SceneGraph) -> String {
    let label = |id: crate::scene::graph::MobjectId| match graph.name_of(id) {
        Some(name) => name.to_string(),
        None => format!("#{}", id.0),
    };
    match &anim.kind {
        AnimKind::FadeIn { target, .. }
        | AnimKind::FadeOut { target, .. }
        | AnimKind::Write { target }
        | AnimKind::ShowCreation { target, .. }
        | AnimKind::Reposition { target, .. } => {
            format!("{}({})", anim.kind_name(), label(*target))
        }
        AnimKind::ReplacementTransform { source, target }
        | AnimKind::Transform { source, target } => format!(
            "{}({} -> {})",
            anim.kind_name(),
            label(*source),
            label(*target)
        ),
        AnimKind::LaggedStart { children, .. } => match children.first() {
            Some(first) => format!("LaggedStart({}x {})", children.len(), first.kind_name()),
            None => "LaggedStart()".to_string(),
        },
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/storyboard.rs"]
mod tests;
