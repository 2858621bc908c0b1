use std::collections::HashSet;

use crate::{
    foundation::core::{DOWN, FRAME_HEIGHT, FRAME_WIDTH, LEFT, Point, RIGHT, Rect, Rgba8, UP, Vec2},
    foundation::error::{StoryError, StoryResult},
    scene::layout::{critical_point, next_to_shift, union_all},
    scene::shape::{Fill, Mobject, Stroke},
};

/// Stable handle to a node in a [`SceneGraph`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct MobjectId(pub u32);

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum NodeKind {
    Leaf(Mobject),
    /// Ordered children. Children always have smaller ids than the group, so the graph is acyclic.
    Group(Vec<MobjectId>),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub kind: NodeKind,
}

/// Arena of leaves and groups plus the ordered list of roots currently on screen.
///
/// Each `Director` owns one graph; there is no shared or global scene state.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    display: Vec<MobjectId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> MobjectId {
        let id = MobjectId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn add_leaf(&mut self, m: Mobject) -> MobjectId {
        self.push(Node {
            name: None,
            kind: NodeKind::Leaf(m),
        })
    }

    pub fn add_group(
        &mut self,
        children: impl IntoIterator<Item = MobjectId>,
    ) -> StoryResult<MobjectId> {
        let children: Vec<MobjectId> = children.into_iter().collect();
        for &c in &children {
            self.node(c)?;
        }
        Ok(self.push(Node {
            name: None,
            kind: NodeKind::Group(children),
        }))
    }

    pub fn set_name(&mut self, id: MobjectId, name: impl Into<String>) -> StoryResult<()> {
        self.node_mut(id)?.name = Some(name.into());
        Ok(())
    }

    pub fn name_of(&self, id: MobjectId) -> Option<&str> {
        self.nodes.get(id.0 as usize)?.name.as_deref()
    }

    /// First node carrying `name`.
    pub fn find(&self, name: &str) -> Option<MobjectId> {
        self.nodes
            .iter()
            .position(|n| n.name.as_deref() == Some(name))
            .map(|i| MobjectId(i as u32))
    }

    pub fn node(&self, id: MobjectId) -> StoryResult<&Node> {
        self.nodes
            .get(id.0 as usize)
            .ok_or_else(|| StoryError::validation(format!("unknown mobject id {}", id.0)))
    }

    fn node_mut(&mut self, id: MobjectId) -> StoryResult<&mut Node> {
        self.nodes
            .get_mut(id.0 as usize)
            .ok_or_else(|| StoryError::validation(format!("unknown mobject id {}", id.0)))
    }

    pub fn leaf(&self, id: MobjectId) -> StoryResult<&Mobject> {
        match &self.node(id)?.kind {
            NodeKind::Leaf(m) => Ok(m),
            NodeKind::Group(_) => Err(StoryError::validation(format!(
                "mobject {} is a group, not a leaf",
                id.0
            ))),
        }
    }

    pub fn set_leaf(&mut self, id: MobjectId, m: Mobject) -> StoryResult<()> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Leaf(slot) => {
                *slot = m;
                Ok(())
            }
            NodeKind::Group(_) => Err(StoryError::validation(format!(
                "mobject {} is a group, not a leaf",
                id.0
            ))),
        }
    }

    pub fn children(&self, id: MobjectId) -> StoryResult<&[MobjectId]> {
        match &self.node(id)?.kind {
            NodeKind::Group(c) => Ok(c),
            NodeKind::Leaf(_) => Err(StoryError::validation(format!(
                "mobject {} is a leaf, not a group",
                id.0
            ))),
        }
    }

    /// `idx`-th child of a group.
    pub fn child(&self, id: MobjectId, idx: usize) -> StoryResult<MobjectId> {
        self.children(id)?.get(idx).copied().ok_or_else(|| {
            StoryError::validation(format!("group {} has no child {idx}", id.0))
        })
    }

    /// Leaves under `id`, depth-first, each reported once.
    pub fn leaves(&self, id: MobjectId) -> StoryResult<Vec<MobjectId>> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        self.collect_leaves(id, &mut out, &mut seen)?;
        Ok(out)
    }

    fn collect_leaves(
        &self,
        id: MobjectId,
        out: &mut Vec<MobjectId>,
        seen: &mut HashSet<MobjectId>,
    ) -> StoryResult<()> {
        match &self.node(id)?.kind {
            NodeKind::Leaf(_) => {
                if seen.insert(id) {
                    out.push(id);
                }
            }
            NodeKind::Group(children) => {
                for &c in children {
                    self.collect_leaves(c, out, seen)?;
                }
            }
        }
        Ok(())
    }

    /// Deep copy of `id` with fresh ids. The copy is not displayed.
    pub fn copy(&mut self, id: MobjectId) -> StoryResult<MobjectId> {
        let node = self.node(id)?.clone();
        match node.kind {
            NodeKind::Leaf(m) => Ok(self.add_leaf(m)),
            NodeKind::Group(children) => {
                let mut copies = Vec::with_capacity(children.len());
                for c in children {
                    copies.push(self.copy(c)?);
                }
                self.add_group(copies)
            }
        }
    }

    pub fn bounds(&self, id: MobjectId) -> StoryResult<Rect> {
        let leaves = self.leaves(id)?;
        let rects = leaves
            .iter()
            .map(|&l| self.leaf(l).map(Mobject::bounds))
            .collect::<StoryResult<Vec<_>>>()?;
        union_all(rects)
            .ok_or_else(|| StoryError::validation(format!("group {} has no leaves", id.0)))
    }

    pub fn center_of(&self, id: MobjectId) -> StoryResult<Point> {
        Ok(self.bounds(id)?.center())
    }

    /// Bounding-box point in direction `dir` (e.g. `DOWN` gives the bottom-center).
    pub fn edge(&self, id: MobjectId, dir: Vec2) -> StoryResult<Point> {
        Ok(critical_point(self.bounds(id)?, dir))
    }

    pub fn top(&self, id: MobjectId) -> StoryResult<Point> {
        self.edge(id, UP)
    }

    pub fn bottom(&self, id: MobjectId) -> StoryResult<Point> {
        self.edge(id, DOWN)
    }

    pub fn left(&self, id: MobjectId) -> StoryResult<Point> {
        self.edge(id, LEFT)
    }

    pub fn right(&self, id: MobjectId) -> StoryResult<Point> {
        self.edge(id, RIGHT)
    }

    /// Apply `f` to every leaf under `id`.
    pub fn for_each_leaf(
        &mut self,
        id: MobjectId,
        mut f: impl FnMut(&mut Mobject),
    ) -> StoryResult<()> {
        for leaf in self.leaves(id)? {
            if let NodeKind::Leaf(m) = &mut self.node_mut(leaf)?.kind {
                f(m);
            }
        }
        Ok(())
    }

    /// Replace the stroke of every leaf under `id`.
    pub fn set_stroke(&mut self, id: MobjectId, color: Rgba8, width: f64) -> StoryResult<()> {
        self.for_each_leaf(id, |m| {
            m.style.stroke = Some(Stroke {
                color,
                width,
                opacity: 1.0,
            })
        })
    }

    /// Replace the fill of every leaf under `id`.
    pub fn set_fill(&mut self, id: MobjectId, color: Rgba8, opacity: f64) -> StoryResult<()> {
        self.for_each_leaf(id, |m| m.style.fill = Some(Fill { color, opacity }))
    }

    pub fn shift(&mut self, id: MobjectId, by: Vec2) -> StoryResult<()> {
        self.for_each_leaf(id, |m| m.center += by)
    }

    /// Move so the bounding-box center lands on `to`.
    pub fn move_to(&mut self, id: MobjectId, to: Point) -> StoryResult<()> {
        let c = self.center_of(id)?;
        self.shift(id, to - c)
    }

    /// Scale about the bounding-box center.
    pub fn scale(&mut self, id: MobjectId, factor: f64) -> StoryResult<()> {
        let about = self.center_of(id)?;
        self.scale_about(id, factor, about)
    }

    pub fn scale_about(&mut self, id: MobjectId, factor: f64, about: Point) -> StoryResult<()> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(StoryError::validation("scale factor must be > 0"));
        }
        self.for_each_leaf(id, |m| *m = m.scaled_about(factor, about))
    }

    pub fn set_height(&mut self, id: MobjectId, height: f64) -> StoryResult<()> {
        let h = self.bounds(id)?.height();
        if h <= 1e-12 {
            return Err(StoryError::validation(format!(
                "cannot set height of flat mobject {}",
                id.0
            )));
        }
        self.scale(id, height / h)
    }

    pub fn center(&mut self, id: MobjectId) -> StoryResult<()> {
        self.move_to(id, Point::ORIGIN)
    }

    /// Push against the frame edge in `dir`, `buff` away from it.
    pub fn to_edge(&mut self, id: MobjectId, dir: Vec2, buff: f64) -> StoryResult<()> {
        let frame = Rect::new(
            -FRAME_WIDTH / 2.0,
            -FRAME_HEIGHT / 2.0,
            FRAME_WIDTH / 2.0,
            FRAME_HEIGHT / 2.0,
        );
        let b = self.bounds(id)?;
        let target = critical_point(frame, dir) - dir * buff;
        let current = critical_point(b, dir);
        let mut delta = target - current;
        // Only move along the axes `dir` points at.
        if dir.x == 0.0 {
            delta.x = 0.0;
        }
        if dir.y == 0.0 {
            delta.y = 0.0;
        }
        self.shift(id, delta)
    }

    pub fn next_to(
        &mut self,
        id: MobjectId,
        anchor: MobjectId,
        dir: Vec2,
        buff: f64,
    ) -> StoryResult<()> {
        let by = next_to_shift(self.bounds(id)?, self.bounds(anchor)?, dir, buff);
        self.shift(id, by)
    }

    /// Lay children out one after another along `dir`, then center the group on the origin.
    pub fn arrange(&mut self, id: MobjectId, dir: Vec2, buff: f64) -> StoryResult<()> {
        let children = self.children(id)?.to_vec();
        for pair in children.windows(2) {
            self.next_to(pair[1], pair[0], dir, buff)?;
        }
        self.center(id)
    }

    /// Rectangle enclosing `id` with `buff` padding on every side (not added to the graph).
    pub fn surrounding_rectangle(&self, id: MobjectId, buff: f64) -> StoryResult<Mobject> {
        let b = self.bounds(id)?.inflate(buff, buff);
        Ok(Mobject::rect(b.width(), b.height()).at(b.center()))
    }

    pub fn show(&mut self, id: MobjectId) -> StoryResult<()> {
        self.node(id)?;
        if !self.display.contains(&id) {
            self.display.push(id);
        }
        Ok(())
    }

    /// Take `id` and everything under it off screen.
    ///
    /// A displayed group that contains part of `id` is split into its remaining children, so
    /// siblings stay visible.
    pub fn hide(&mut self, id: MobjectId) -> StoryResult<()> {
        let family = self.family(id)?;
        let mut display = Vec::with_capacity(self.display.len());
        for root in std::mem::take(&mut self.display) {
            self.exclude_family(root, &family, &mut display)?;
        }
        self.display = display;
        Ok(())
    }

    /// `id` plus every node below it.
    fn family(&self, id: MobjectId) -> StoryResult<HashSet<MobjectId>> {
        let mut out = HashSet::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if !out.insert(next) {
                continue;
            }
            if let NodeKind::Group(children) = &self.node(next)?.kind {
                stack.extend(children.iter().copied());
            }
        }
        Ok(out)
    }

    fn exclude_family(
        &self,
        root: MobjectId,
        family: &HashSet<MobjectId>,
        out: &mut Vec<MobjectId>,
    ) -> StoryResult<()> {
        if family.contains(&root) {
            return Ok(());
        }
        if self.family(root)?.is_disjoint(family) {
            if !out.contains(&root) {
                out.push(root);
            }
            return Ok(());
        }
        for &child in self.children(root)? {
            self.exclude_family(child, family, out)?;
        }
        Ok(())
    }

    pub fn is_displayed(&self, id: MobjectId) -> bool {
        self.display.contains(&id)
    }

    pub fn display_roots(&self) -> &[MobjectId] {
        &self.display
    }

    /// Every displayed leaf in painter's order, each once.
    pub fn displayed_leaves(&self) -> StoryResult<Vec<MobjectId>> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for &root in &self.display {
            self.collect_leaves(root, &mut out, &mut seen)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/graph.rs"]
mod tests;
