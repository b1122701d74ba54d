//! Deterministic ring layout for one member's ego network.

use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{Pos2, Vec2, vec2};
use serde::Serialize;

use crate::config::OrbitParams;
use crate::graph::CollabGraph;
use crate::model::Relation;

/// Share of the strongest tie a pairing neighbour needs for the inner ring.
pub const INNER_RING_RATIO: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Ring {
    Inner,
    Middle,
    Outer,
}

impl Ring {
    pub const ALL: [Ring; 3] = [Ring::Inner, Ring::Middle, Ring::Outer];

    fn slot(self) -> usize {
        match self {
            Ring::Inner => 0,
            Ring::Middle => 1,
            Ring::Outer => 2,
        }
    }

    pub fn radius(self, params: &OrbitParams) -> f32 {
        params.ring_radii[self.slot()]
    }
}

/// One collaborator of the focal member, tallied over both edge directions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EgoNeighbor {
    pub node: usize,
    pub name: String,
    pub pair: usize,
    pub wait: usize,
    pub other: usize,
}

impl EgoNeighbor {
    /// Pair or wait when that kind holds the largest tally, `None` when the
    /// generic kinds outweigh both. Ties favour pair, then wait.
    pub fn dominant_kind(&self) -> Option<Relation> {
        if self.pair > 0 && self.pair >= self.wait && self.pair >= self.other {
            Some(Relation::Pair)
        } else if self.wait > 0 && self.wait >= self.other {
            Some(Relation::Wait)
        } else {
            None
        }
    }

    pub fn total(&self) -> usize {
        self.pair + self.wait + self.other
    }
}

/// Strongest ties first; ties keep first-seen order.
pub fn ego_neighbors(graph: &CollabGraph, focal: usize) -> Vec<EgoNeighbor> {
    let mut slot_by_node: HashMap<usize, usize> = HashMap::new();
    let mut neighbors: Vec<EgoNeighbor> = Vec::new();

    for edge in graph.edges_touching(focal) {
        let other = if edge.source == focal {
            edge.target
        } else {
            edge.source
        };
        if other == focal {
            continue;
        }

        let slot = *slot_by_node.entry(other).or_insert_with(|| {
            neighbors.push(EgoNeighbor {
                node: other,
                name: graph.nodes[other].id.clone(),
                pair: 0,
                wait: 0,
                other: 0,
            });
            neighbors.len() - 1
        });

        let neighbor = &mut neighbors[slot];
        if edge.relation.is_pair() {
            neighbor.pair += edge.count;
        } else if edge.relation.is_wait() {
            neighbor.wait += edge.count;
        } else {
            neighbor.other += edge.count;
        }
    }

    neighbors.sort_by(|a, b| b.total().cmp(&a.total()));
    neighbors
}

pub fn classify(neighbor: &EgoNeighbor, max_total: usize) -> Ring {
    if neighbor.pair == 0 {
        return Ring::Outer;
    }
    let ratio = neighbor.total() as f32 / max_total.max(1) as f32;
    if ratio >= INNER_RING_RATIO {
        Ring::Inner
    } else {
        Ring::Middle
    }
}

/// Angle of slot `index` out of `count`, starting at 12 o'clock and going
/// clockwise on screen.
pub fn ring_angle(index: usize, count: usize) -> f32 {
    -FRAC_PI_2 + TAU * index as f32 / count.max(1) as f32
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrbitNode {
    pub neighbor: EgoNeighbor,
    pub ring: Ring,
    pub home: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitEdge {
    /// Index into `OrbitLayout::nodes`.
    pub node: usize,
    pub width: f32,
    /// Bend as a fraction of the edge length.
    pub curvature: f32,
}

impl OrbitEdge {
    /// Quadratic control point bending the chord from `start` to `end`.
    pub fn control_point(&self, start: Pos2, end: Pos2) -> Pos2 {
        let chord = end - start;
        let normal = vec2(-chord.y, chord.x);
        start + chord * 0.5 + normal * self.curvature
    }
}

#[derive(Clone, Debug)]
pub struct OrbitLayout {
    focal: usize,
    focal_name: String,
    params: OrbitParams,
    nodes: Vec<OrbitNode>,
    edges: Vec<OrbitEdge>,
    overrides: HashMap<usize, Vec2>,
    zoom: f32,
}

impl OrbitLayout {
    pub fn new(graph: &CollabGraph, focal: usize, params: OrbitParams) -> Self {
        let neighbors = ego_neighbors(graph, focal);
        let max_total = neighbors.iter().map(EgoNeighbor::total).max().unwrap_or(0);

        let rings = neighbors
            .iter()
            .map(|neighbor| classify(neighbor, max_total))
            .collect::<Vec<_>>();
        let mut ring_sizes = [0usize; 3];
        for ring in &rings {
            ring_sizes[ring.slot()] += 1;
        }

        let mut ring_cursor = [0usize; 3];
        let nodes = neighbors
            .into_iter()
            .zip(rings)
            .map(|(neighbor, ring)| {
                let slot = ring.slot();
                let angle = ring_angle(ring_cursor[slot], ring_sizes[slot]);
                ring_cursor[slot] += 1;
                OrbitNode {
                    neighbor,
                    ring,
                    home: vec2(angle.cos(), angle.sin()) * ring.radius(&params),
                }
            })
            .collect::<Vec<_>>();

        let edges = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| {
                let strength = node.neighbor.total() as f32 / max_total.max(1) as f32;
                OrbitEdge {
                    node: index,
                    width: params.min_edge_width
                        + (params.max_edge_width - params.min_edge_width) * strength,
                    curvature: params.max_curvature * strength,
                }
            })
            .collect();

        Self {
            focal,
            focal_name: graph
                .nodes
                .get(focal)
                .map(|node| node.id.clone())
                .unwrap_or_default(),
            params,
            nodes,
            edges,
            overrides: HashMap::new(),
            zoom: 1.0,
        }
    }

    pub fn focal(&self) -> usize {
        self.focal
    }

    pub fn focal_name(&self) -> &str {
        &self.focal_name
    }

    pub fn nodes(&self) -> &[OrbitNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[OrbitEdge] {
        &self.edges
    }

    pub fn params(&self) -> &OrbitParams {
        &self.params
    }

    pub fn ring_members(&self, ring: Ring) -> impl Iterator<Item = &OrbitNode> {
        self.nodes.iter().filter(move |node| node.ring == ring)
    }

    /// World position of layout node `index`: the dragged position if one
    /// was set, else its ring slot. The focal member sits at the origin.
    pub fn position(&self, index: usize) -> Option<Vec2> {
        let node = self.nodes.get(index)?;
        Some(self.overrides.get(&index).copied().unwrap_or(node.home))
    }

    pub fn is_overridden(&self, index: usize) -> bool {
        self.overrides.contains_key(&index)
    }

    pub fn drag_node(&mut self, index: usize, screen_delta: Vec2) {
        let Some(current) = self.position(index) else {
            return;
        };
        self.overrides
            .insert(index, current + screen_delta / self.zoom);
    }

    pub fn reset_positions(&mut self) {
        self.overrides.clear();
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(self.params.min_zoom, self.params.max_zoom);
    }

    pub fn zoom_by(&mut self, factor: f32) {
        self.set_zoom(self.zoom * factor);
    }

    pub fn to_screen(&self, world: Vec2, center: Pos2) -> Pos2 {
        center + world * self.zoom
    }

    pub fn screen_to_world(&self, screen: Pos2, center: Pos2) -> Vec2 {
        (screen - center) / self.zoom
    }

    /// Screen positions of every layout node, in layout order.
    pub fn screen_positions(&self, center: Pos2) -> Vec<Pos2> {
        (0..self.nodes.len())
            .filter_map(|index| self.position(index))
            .map(|world| self.to_screen(world, center))
            .collect()
    }

    pub fn hit_test(&self, pointer: Pos2, center: Pos2, radius: f32) -> Option<usize> {
        crate::interaction::hit_test(&self.screen_positions(center), pointer, radius)
    }
}

impl Default for OrbitLayout {
    fn default() -> Self {
        Self {
            focal: 0,
            focal_name: String::new(),
            params: OrbitParams::default(),
            nodes: Vec::new(),
            edges: Vec::new(),
            overrides: HashMap::new(),
            zoom: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;
    use crate::graph::build_graph;
    use crate::model::Relation::{Handoff, Pair, Review, Wait};
    use crate::model::WorkItem;

    fn ego_graph() -> CollabGraph {
        build_graph(&[
            WorkItem::new("Me", "X")
                .with("Ana", Pair)
                .with("Ana", Pair)
                .with("Ana", Pair)
                .with("Ben", Pair)
                .with("Cy", Wait)
                .with("Cy", Wait),
            WorkItem::new("Dee", "Y").with("Me", Pair).with("Me", Review),
            WorkItem::new("Ana", "X").with("Ben", Pair),
        ])
    }

    fn layout() -> OrbitLayout {
        let graph = ego_graph();
        let focal = graph.index_of("Me").expect("focal");
        OrbitLayout::new(&graph, focal, OrbitParams::default())
    }

    #[test]
    fn neighbours_cover_both_directions() {
        let graph = ego_graph();
        let neighbors = ego_neighbors(&graph, graph.index_of("Me").expect("focal"));
        let tallies = neighbors
            .iter()
            .map(|n| (n.name.as_str(), n.pair, n.wait, n.other))
            .collect::<Vec<_>>();
        assert_eq!(
            tallies,
            vec![
                ("Ana", 3, 0, 0),
                ("Cy", 0, 2, 0),
                ("Dee", 1, 0, 1),
                ("Ben", 1, 0, 0),
            ]
        );
    }

    #[test]
    fn dominant_kind_ignores_generic_relations_for_colouring() {
        let graph = build_graph(&[
            WorkItem::new("Me", "X")
                .with("Ana", Pair)
                .with("Ana", Review)
                .with("Cy", Wait)
                .with("Eli", Handoff)
                .with("Eli", Handoff)
                .with("Eli", Wait),
        ]);
        let neighbors = ego_neighbors(&graph, graph.index_of("Me").expect("focal"));
        let kinds = neighbors
            .iter()
            .map(|n| (n.name.as_str(), n.dominant_kind()))
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![("Eli", None), ("Ana", Some(Pair)), ("Cy", Some(Wait))]
        );
    }

    #[test]
    fn rings_follow_pairing_and_intensity() {
        let layout = layout();
        let ring_of = |name: &str| {
            layout
                .nodes()
                .iter()
                .find(|node| node.neighbor.name == name)
                .map(|node| node.ring)
        };
        assert_eq!(ring_of("Ana"), Some(Ring::Inner));
        assert_eq!(ring_of("Dee"), Some(Ring::Inner));
        assert_eq!(ring_of("Ben"), Some(Ring::Middle));
        assert_eq!(ring_of("Cy"), Some(Ring::Outer));
    }

    #[test]
    fn first_slot_in_a_ring_is_twelve_o_clock() {
        let layout = layout();
        let first_inner = layout.ring_members(Ring::Inner).next().expect("inner");
        assert!(first_inner.home.x.abs() < 1e-3);
        assert!((first_inner.home.y + 90.0).abs() < 1e-3);

        let second_inner = layout.ring_members(Ring::Inner).nth(1).expect("inner");
        assert!((second_inner.home.y - 90.0).abs() < 1e-3);
    }

    #[test]
    fn edges_scale_with_relation_count() {
        let layout = layout();
        let params = OrbitParams::default();
        let strongest = layout.edges()[0];
        assert!((strongest.width - params.max_edge_width).abs() < 1e-6);
        assert!((strongest.curvature - params.max_curvature).abs() < 1e-6);
        assert!(layout.edges()[3].width < strongest.width);
        assert!(layout.edges()[3].width >= params.min_edge_width);
    }

    #[test]
    fn dragging_overrides_until_reset() {
        let mut layout = layout();
        let home = layout.position(1).expect("node");
        layout.set_zoom(2.0);
        layout.drag_node(1, vec2(20.0, -10.0));
        assert!(layout.is_overridden(1));
        assert_eq!(layout.position(1), Some(home + vec2(10.0, -5.0)));
        assert_eq!(layout.position(0), Some(layout.nodes()[0].home));

        layout.reset_positions();
        assert_eq!(layout.position(1), Some(home));
    }

    #[test]
    fn zoom_only_touches_the_viewport() {
        let mut layout = layout();
        let world = layout.position(0).expect("node");
        layout.zoom_by(100.0);
        assert_eq!(layout.zoom(), OrbitParams::default().max_zoom);
        assert_eq!(layout.position(0), Some(world));

        let center = pos2(300.0, 200.0);
        let screen = layout.to_screen(world, center);
        let back = layout.screen_to_world(screen, center);
        assert!((back - world).length() < 1e-3);

        layout.set_zoom(0.0);
        assert_eq!(layout.zoom(), OrbitParams::default().min_zoom);
    }

    #[test]
    fn hit_test_finds_nearest_node() {
        let layout = layout();
        let center = Pos2::ZERO;
        let target = layout.to_screen(layout.position(2).expect("node"), center);
        assert_eq!(layout.hit_test(target + vec2(3.0, 0.0), center, 10.0), Some(2));
        assert_eq!(layout.hit_test(pos2(1000.0, 1000.0), center, 10.0), None);
    }

    #[test]
    fn isolated_member_has_empty_orbit() {
        let graph = build_graph(&[WorkItem::new("Solo", "X")]);
        let layout = OrbitLayout::new(&graph, 0, OrbitParams::default());
        assert!(layout.nodes().is_empty());
        assert_eq!(layout.focal_name(), "Solo");
    }
}
