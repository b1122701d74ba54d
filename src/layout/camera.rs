use std::f32::consts::TAU;

use eframe::egui::{Pos2, Vec2, vec2};
use glam::{Quat, Vec3};

use crate::config::CameraParams;
use crate::graph::Edge;

use super::sphere::LayoutSnapshot;

/// Per-frame view rotation for the sphere layout.
///
/// The frame loop only runs while the view is shown. Auto-rotation advances
/// yaw when no drag is in progress; a drag takes over both angles and turns
/// auto-rotation off so the two motion sources never compete.
#[derive(Clone, Debug)]
pub struct Camera {
    params: CameraParams,
    yaw: f32,
    pitch: f32,
    auto_rotate: bool,
    dragging: bool,
    visible: bool,
}

impl Camera {
    pub fn new(params: CameraParams) -> Self {
        Self {
            params,
            yaw: 0.0,
            pitch: 0.0,
            auto_rotate: true,
            dragging: false,
            visible: false,
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn auto_rotate(&self) -> bool {
        self.auto_rotate
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn set_params(&mut self, params: CameraParams) {
        self.params = params;
        self.pitch = self.pitch.clamp(-params.pitch_limit, params.pitch_limit);
    }

    pub fn set_auto_rotate(&mut self, enabled: bool) {
        self.auto_rotate = enabled;
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    /// Stops the frame loop and drops any drag in progress.
    pub fn hide(&mut self) {
        self.visible = false;
        self.dragging = false;
    }

    pub fn is_running(&self) -> bool {
        self.visible && (self.dragging || self.auto_rotate)
    }

    /// Advances auto-rotation by `dt` seconds. Returns whether another frame
    /// should be scheduled.
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.visible {
            return false;
        }
        if self.auto_rotate && !self.dragging {
            self.yaw = (self.yaw + self.params.auto_rotate_speed * dt.max(0.0)).rem_euclid(TAU);
        }
        self.is_running()
    }

    pub fn begin_drag(&mut self) {
        self.dragging = true;
        self.auto_rotate = false;
    }

    pub fn drag_by(&mut self, delta: Vec2) {
        if !self.dragging {
            return;
        }
        let sensitivity = self.params.drag_sensitivity;
        let limit = self.params.pitch_limit;
        self.yaw = (self.yaw + delta.x * sensitivity).rem_euclid(TAU);
        self.pitch = (self.pitch + delta.y * sensitivity).clamp(-limit, limit);
    }

    pub fn end_drag(&mut self) {
        self.dragging = false;
    }

    pub fn reset(&mut self) {
        self.yaw = 0.0;
        self.pitch = 0.0;
        self.auto_rotate = true;
        self.dragging = false;
    }

    fn rotation(&self) -> Quat {
        Quat::from_rotation_x(self.pitch) * Quat::from_rotation_y(self.yaw)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectedNode {
    pub screen: Pos2,
    /// Perspective factor for radii and stroke widths.
    pub scale: f32,
    /// Larger is farther from the viewer.
    pub depth: f32,
}

/// Screen geometry for one frame, with far-to-near paint orders.
#[derive(Clone, Debug, Default)]
pub struct Projection {
    pub nodes: Vec<ProjectedNode>,
    pub node_order: Vec<usize>,
    pub edge_order: Vec<usize>,
}

impl Projection {
    pub fn edge_scale(&self, edge: &Edge) -> f32 {
        match (self.nodes.get(edge.source), self.nodes.get(edge.target)) {
            (Some(source), Some(target)) => (source.scale + target.scale) * 0.5,
            _ => 1.0,
        }
    }
}

pub fn project_point(camera: &Camera, point: Vec3, center: Pos2, zoom: f32) -> ProjectedNode {
    let rotated = camera.rotation() * point;
    let focal = camera.params.focal_length;
    let denominator = (focal + rotated.z).max(focal * 0.05);
    let scale = focal / denominator;
    ProjectedNode {
        screen: center + vec2(rotated.x, -rotated.y) * (scale * zoom),
        scale,
        depth: rotated.z,
    }
}

pub fn project(
    snapshot: &LayoutSnapshot,
    edges: &[Edge],
    camera: &Camera,
    center: Pos2,
    zoom: f32,
) -> Projection {
    let nodes = snapshot
        .positions()
        .iter()
        .map(|&point| project_point(camera, point, center, zoom))
        .collect::<Vec<_>>();

    let mut node_order = (0..nodes.len()).collect::<Vec<_>>();
    node_order.sort_by(|&a, &b| nodes[b].depth.total_cmp(&nodes[a].depth));

    let edge_depth = |edge: &Edge| match (nodes.get(edge.source), nodes.get(edge.target)) {
        (Some(source), Some(target)) => (source.depth + target.depth) * 0.5,
        _ => f32::INFINITY,
    };
    let mut edge_order = (0..edges.len()).collect::<Vec<_>>();
    edge_order.sort_by(|&a, &b| edge_depth(&edges[b]).total_cmp(&edge_depth(&edges[a])));

    Projection {
        nodes,
        node_order,
        edge_order,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationParams;
    use crate::graph::build_graph;
    use crate::layout::sphere::relax;
    use crate::model::Relation::Pair;
    use crate::model::WorkItem;

    fn shown_camera() -> Camera {
        let mut camera = Camera::new(CameraParams::default());
        camera.show();
        camera
    }

    #[test]
    fn hidden_camera_does_not_advance() {
        let mut camera = Camera::new(CameraParams::default());
        assert!(!camera.tick(1.0));
        assert_eq!(camera.yaw(), 0.0);
    }

    #[test]
    fn auto_rotation_advances_yaw() {
        let mut camera = shown_camera();
        assert!(camera.tick(2.0));
        assert!((camera.yaw() - 0.5).abs() < 1e-6);
        assert_eq!(camera.pitch(), 0.0);
    }

    #[test]
    fn drag_turns_off_auto_rotation() {
        let mut camera = shown_camera();
        camera.begin_drag();
        camera.drag_by(vec2(100.0, -50.0));
        assert!(!camera.auto_rotate());
        assert!((camera.yaw() - 0.8).abs() < 1e-5);
        assert!((camera.pitch() + 0.4).abs() < 1e-5);

        let yaw = camera.yaw();
        camera.end_drag();
        assert!(!camera.tick(1.0));
        assert_eq!(camera.yaw(), yaw);
    }

    #[test]
    fn drag_without_begin_is_ignored() {
        let mut camera = shown_camera();
        camera.drag_by(vec2(100.0, 100.0));
        assert_eq!(camera.pitch(), 0.0);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = shown_camera();
        camera.begin_drag();
        camera.drag_by(vec2(0.0, 10_000.0));
        assert!((camera.pitch() - CameraParams::default().pitch_limit).abs() < 1e-6);
    }

    #[test]
    fn hide_releases_drag() {
        let mut camera = shown_camera();
        camera.begin_drag();
        camera.hide();
        assert!(!camera.is_dragging());
        assert!(!camera.is_running());
    }

    #[test]
    fn nearer_points_scale_up_and_paint_last() {
        let camera = shown_camera();
        let center = Pos2::new(400.0, 300.0);
        let near = project_point(&camera, Vec3::new(0.0, 0.0, -100.0), center, 1.0);
        let far = project_point(&camera, Vec3::new(0.0, 0.0, 100.0), center, 1.0);
        assert!(near.scale > 1.0);
        assert!(far.scale < 1.0);
        assert_eq!(near.screen, center);

        let up = project_point(&camera, Vec3::new(0.0, 50.0, 0.0), center, 1.0);
        assert!(up.screen.y < center.y);
    }

    #[test]
    fn projection_orders_far_to_near() {
        let graph = build_graph(&[
            WorkItem::new("A", "X").with("B", Pair).with("C", Pair),
            WorkItem::new("D", "X").with("C", Pair),
        ]);
        let snapshot = relax(&graph, &SimulationParams::default());
        let projection = project(
            &snapshot,
            &graph.edges,
            &shown_camera(),
            Pos2::new(0.0, 0.0),
            1.0,
        );

        assert_eq!(projection.nodes.len(), graph.node_count());
        assert_eq!(projection.edge_order.len(), graph.edge_count());
        for pair in projection.node_order.windows(2) {
            assert!(projection.nodes[pair[0]].depth >= projection.nodes[pair[1]].depth);
        }
    }
}
