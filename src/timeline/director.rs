use crate::{
    animation::anim::{AnimKind, Animation},
    foundation::core::Rgba8,
    foundation::error::{StoryError, StoryResult},
    foundation::palette::BLACK,
    scene::graph::{MobjectId, SceneGraph},
    timeline::storyboard::{Step, StepKind, Storyboard},
};

/// Records a scene: owns the live graph and appends one timed step per `play`/`wait`.
///
/// Every step stores the graph as it was when the step began, so evaluation never replays
/// earlier steps.
#[derive(Debug)]
pub struct Director {
    scene: String,
    graph: SceneGraph,
    steps: Vec<Step>,
    clock_secs: f64,
    background: Rgba8,
}

impl Director {
    pub fn new(scene: impl Into<String>) -> Self {
        Self {
            scene: scene.into(),
            graph: SceneGraph::new(),
            steps: Vec::new(),
            clock_secs: 0.0,
            background: BLACK,
        }
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    pub fn set_background(&mut self, color: Rgba8) {
        self.background = color;
    }

    /// Time at which the next step will start.
    pub fn clock_secs(&self) -> f64 {
        self.clock_secs
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Run `animations` together for `run_time` seconds.
    #[tracing::instrument(skip_all, fields(scene = %self.scene, step = self.steps.len()))]
    pub fn play(
        &mut self,
        animations: impl IntoIterator<Item = Animation>,
        run_time: f64,
    ) -> StoryResult<()> {
        let animations: Vec<Animation> = animations.into_iter().collect();
        if !(run_time.is_finite() && run_time > 0.0) {
            return Err(StoryError::validation(format!(
                "play run_time must be > 0, got {run_time}"
            )));
        }
        if animations.is_empty() {
            return Err(StoryError::validation("play needs at least one animation"));
        }
        for anim in &animations {
            anim.validate(&self.graph)?;
        }

        let before = self.graph.clone();
        for anim in &animations {
            apply_end_state(&mut self.graph, anim)?;
        }
        tracing::debug!(
            start = self.clock_secs,
            run_time,
            animations = animations.len(),
            "recorded play"
        );
        self.push_step(StepKind::Play { animations }, run_time, before);
        Ok(())
    }

    pub fn wait(&mut self, secs: f64) -> StoryResult<()> {
        if !(secs.is_finite() && secs > 0.0) {
            return Err(StoryError::validation(format!(
                "wait duration must be > 0, got {secs}"
            )));
        }
        tracing::debug!(start = self.clock_secs, secs, "recorded wait");
        let before = self.graph.clone();
        self.push_step(StepKind::Wait, secs, before);
        Ok(())
    }

    /// Zero-length marker where the scene hands its final state over for inspection.
    pub fn inspect(&mut self) {
        tracing::debug!(start = self.clock_secs, "recorded inspect");
        let before = self.graph.clone();
        self.push_step(StepKind::Inspect, 0.0, before);
    }

    /// Build a [`AnimKind::Reposition`] for `target` from whatever `mutate` does to a scratch copy
    /// of the graph. The live graph is untouched until the animation is played.
    pub fn animate(
        &self,
        target: MobjectId,
        mutate: impl FnOnce(&mut SceneGraph, MobjectId) -> StoryResult<()>,
    ) -> StoryResult<Animation> {
        let mut scratch = self.graph.clone();
        mutate(&mut scratch, target)?;
        let after = scratch
            .leaves(target)?
            .into_iter()
            .map(|leaf| Ok((leaf, scratch.leaf(leaf)?.clone())))
            .collect::<StoryResult<Vec<_>>>()?;
        Ok(Animation::new(AnimKind::Reposition { target, after }))
    }

    pub fn finish(self) -> Storyboard {
        tracing::debug!(
            scene = %self.scene,
            steps = self.steps.len(),
            duration = self.clock_secs,
            "storyboard finished"
        );
        Storyboard {
            scene: self.scene,
            background: self.background,
            steps: self.steps,
            final_graph: self.graph,
        }
    }

    fn push_step(&mut self, kind: StepKind, duration_secs: f64, graph: SceneGraph) {
        self.steps.push(Step {
            start_secs: self.clock_secs,
            duration_secs,
            kind,
            graph,
        });
        self.clock_secs += duration_secs;
    }
}

/// Commit the state an animation leaves behind.
fn apply_end_state(graph: &mut SceneGraph, anim: &Animation) -> StoryResult<()> {
    match &anim.kind {
        AnimKind::FadeIn { target, .. }
        | AnimKind::Write { target }
        | AnimKind::ShowCreation { target, .. } => graph.show(*target),
        AnimKind::FadeOut { target, .. } => graph.hide(*target),
        AnimKind::ReplacementTransform { source, target } => {
            graph.hide(*source)?;
            graph.show(*target)
        }
        AnimKind::Transform { source, target } => {
            let src = graph.leaves(*source)?;
            let dst = graph.leaves(*target)?;
            for (k, &s) in src.iter().enumerate() {
                let d = dst[k * dst.len() / src.len()];
                let m = graph.leaf(d)?.clone();
                graph.set_leaf(s, m)?;
            }
            graph.show(*source)
        }
        AnimKind::Reposition { after, .. } => {
            for (id, m) in after {
                graph.set_leaf(*id, m.clone())?;
            }
            Ok(())
        }
        AnimKind::LaggedStart { children, .. } => {
            for child in children {
                apply_end_state(graph, child)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/director.rs"]
mod tests;
