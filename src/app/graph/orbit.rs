use collab_graph::interaction::DragTarget;
use collab_graph::layout::{OrbitLayout, Ring};
use eframe::egui::{self, Align2, Color32, FontId, Sense, Stroke, Ui, epaint, vec2};

use super::super::ViewModel;
use super::super::render_utils::{
    OTHER_RELATION_COLOR, blend_color, draw_background, draw_ring_guide, group_color,
    relation_color, with_opacity,
};
use super::interaction::{pointer_pos, scroll_zoom_factor, track_drag};

const ORBIT_NODE_RADIUS: f32 = 11.0;
const FOCAL_NODE_RADIUS: f32 = 16.0;

impl ViewModel {
    /// Rebuilds the orbit when the selected member changes. Manual positions
    /// and zoom survive as long as the focal member stays the same.
    fn ensure_orbit(&mut self) -> bool {
        let Some(focal) = self.selected_index() else {
            return false;
        };
        if self.orbit.as_ref().is_none_or(|orbit| orbit.focal() != focal) {
            self.orbit_drag.release();
            self.orbit = Some(OrbitLayout::new(
                &self.dataset.team.graph,
                focal,
                self.config.orbit,
            ));
        }
        true
    }

    pub(in crate::app) fn draw_orbit(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        draw_background(&painter, rect);

        if !self.ensure_orbit() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "Select a member to see their orbit.",
                FontId::proportional(15.0),
                Color32::from_gray(200),
            );
            return;
        }
        let Some(orbit) = self.orbit.as_mut() else {
            return;
        };
        let center = rect.center();

        if let Some(factor) = scroll_zoom_factor(ui, &response) {
            orbit.zoom_by(factor);
        }

        let moved = track_drag(ui, &response, &mut self.orbit_drag, |origin| {
            orbit
                .hit_test(origin, center, ORBIT_NODE_RADIUS * orbit.zoom().sqrt())
                .map(DragTarget::Node)
        });
        if let Some((DragTarget::Node(index), delta)) = moved {
            orbit.drag_node(index, delta);
        }

        let zoom = orbit.zoom();
        for ring in Ring::ALL {
            draw_ring_guide(&painter, center, ring.radius(orbit.params()) * zoom);
        }

        let positions = orbit.screen_positions(center);
        for edge in orbit.edges() {
            let node = &orbit.nodes()[edge.node];
            let end = positions[edge.node];
            let color = node
                .neighbor
                .dominant_kind()
                .map_or(OTHER_RELATION_COLOR, |relation| relation_color(&relation));
            let control = edge.control_point(center, end);
            let stroke = Stroke::new(edge.width * zoom.sqrt(), with_opacity(color, 0.8));
            painter.add(epaint::QuadraticBezierShape::from_points_stroke(
                [center, control, end],
                false,
                Color32::TRANSPARENT,
                stroke,
            ));
        }

        let dragging = self.orbit_drag.target();
        let hovered = if dragging.is_some() {
            None
        } else {
            pointer_pos(ui).and_then(|pointer| {
                orbit.hit_test(pointer, center, ORBIT_NODE_RADIUS * zoom.sqrt())
            })
        };

        let graph = &self.dataset.team.graph;
        let radius = ORBIT_NODE_RADIUS * zoom.sqrt();
        for (index, node) in orbit.nodes().iter().enumerate() {
            let position = positions[index];
            let group = graph
                .nodes
                .get(node.neighbor.node)
                .map(|member| member.group.as_str())
                .unwrap_or_default();
            let mut color = group_color(group);
            if hovered == Some(index) || dragging == Some(DragTarget::Node(index)) {
                color = blend_color(color, Color32::from_rgb(255, 164, 101), 0.6);
            }
            painter.circle_filled(position, radius, color);
            if orbit.is_overridden(index) {
                painter.circle_stroke(
                    position,
                    radius + 3.0,
                    Stroke::new(1.0, Color32::from_gray(200)),
                );
            }
            painter.text(
                position + vec2(radius + 5.0, 0.0),
                Align2::LEFT_CENTER,
                format!("{} ({})", node.neighbor.name, node.neighbor.total()),
                FontId::proportional(12.0),
                Color32::from_gray(238),
            );
        }

        let focal_group = graph
            .nodes
            .get(orbit.focal())
            .map(|member| member.group.as_str())
            .unwrap_or_default();
        painter.circle_filled(
            center,
            FOCAL_NODE_RADIUS * zoom.sqrt(),
            blend_color(group_color(focal_group), Color32::from_rgb(245, 206, 93), 0.6),
        );
        painter.text(
            center + vec2(0.0, FOCAL_NODE_RADIUS * zoom.sqrt() + 10.0),
            Align2::CENTER_CENTER,
            orbit.focal_name(),
            FontId::proportional(13.0),
            Color32::from_gray(245),
        );

        if orbit.nodes().is_empty() {
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                "No collaborations recorded for this member.",
                FontId::proportional(13.0),
                Color32::from_gray(220),
            );
        }

        if hovered.is_some() || dragging.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::Grab;
            });
        }

        let clicked_member = response
            .double_clicked()
            .then(|| hovered.and_then(|index| orbit.nodes().get(index)))
            .flatten()
            .map(|node| node.neighbor.node);
        if let Some(member) = clicked_member {
            self.set_selected(Some(member));
        }
    }
}
