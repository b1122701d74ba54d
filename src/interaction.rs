use std::collections::HashSet;

use eframe::egui::{Pos2, Vec2};

use crate::graph::{CollabGraph, Edge};

/// Opacity of nodes and edges outside the active neighbourhood.
pub const DIMMED_OPACITY: f32 = 0.15;

/// Hover wins over selection while the pointer rests on a node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InteractionState {
    hovered: Option<usize>,
    selected: Option<usize>,
}

impl InteractionState {
    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn set_hovered(&mut self, index: Option<usize>) {
        self.hovered = index;
    }

    pub fn select(&mut self, index: Option<usize>) {
        self.selected = index;
    }

    /// Clicking the selected node again clears the selection.
    pub fn toggle_select(&mut self, index: usize) {
        self.selected = if self.selected == Some(index) {
            None
        } else {
            Some(index)
        };
    }

    pub fn active(&self) -> Option<usize> {
        self.hovered.or(self.selected)
    }

    pub fn clear(&mut self) {
        self.hovered = None;
        self.selected = None;
    }
}

/// The active node plus every node sharing an edge with it.
#[derive(Clone, Debug, Default)]
pub struct Highlight {
    active: Option<usize>,
    neighbors: HashSet<usize>,
}

impl Highlight {
    pub fn new(graph: &CollabGraph, active: Option<usize>) -> Self {
        let neighbors = active
            .map(|index| graph.neighbors(index).iter().copied().collect())
            .unwrap_or_default();
        Self { active, neighbors }
    }

    pub fn from_state(graph: &CollabGraph, state: &InteractionState) -> Self {
        Self::new(graph, state.active())
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.active == Some(index) || self.neighbors.contains(&index)
    }

    pub fn is_neighbor(&self, index: usize) -> bool {
        self.neighbors.contains(&index)
    }

    pub fn node_opacity(&self, index: usize) -> f32 {
        if self.active.is_none() || self.contains(index) {
            1.0
        } else {
            DIMMED_OPACITY
        }
    }

    /// Only edges incident to the active node stay at full opacity.
    pub fn edge_opacity(&self, edge: &Edge) -> f32 {
        match self.active {
            None => 1.0,
            Some(active) if edge.source == active || edge.target == active => 1.0,
            Some(_) => DIMMED_OPACITY,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragTarget {
    /// Rotating or panning the whole view.
    View,
    Node(usize),
}

/// Pointer capture for one drag gesture. Released on pointer up and on
/// pointer leave, so a drag never sticks after the cursor exits the canvas.
#[derive(Clone, Debug, Default)]
pub struct DragCapture {
    target: Option<DragTarget>,
    last: Option<Pos2>,
}

impl DragCapture {
    pub fn begin(&mut self, target: DragTarget, pointer: Pos2) {
        self.target = Some(target);
        self.last = Some(pointer);
    }

    /// Returns the captured target and the movement since the last event.
    pub fn move_to(&mut self, pointer: Pos2) -> Option<(DragTarget, Vec2)> {
        let target = self.target?;
        let last = self.last.replace(pointer)?;
        Some((target, pointer - last))
    }

    pub fn release(&mut self) -> Option<DragTarget> {
        self.last = None;
        self.target.take()
    }

    pub fn target(&self) -> Option<DragTarget> {
        self.target
    }

    pub fn is_active(&self) -> bool {
        self.target.is_some()
    }
}

/// Nearest position within `radius` of `pointer`.
pub fn hit_test(positions: &[Pos2], pointer: Pos2, radius: f32) -> Option<usize> {
    positions
        .iter()
        .enumerate()
        .filter_map(|(index, position)| {
            let distance = position.distance(pointer);
            (distance <= radius).then_some((index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

/// Like [`hit_test`] with a radius per position, limited to `candidates`.
pub fn hit_test_sized(
    candidates: &[usize],
    positions: &[Pos2],
    radii: &[f32],
    pointer: Pos2,
) -> Option<usize> {
    candidates
        .iter()
        .filter_map(|&index| {
            let distance = positions.get(index)?.distance(pointer);
            (distance <= *radii.get(index)?).then_some((index, distance))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}
