use collab_graph::interaction::{Highlight, hit_test_sized};
use collab_graph::layout::project;
use eframe::egui::{self, Align2, Color32, FontId, Sense, Stroke, Ui, vec2};

use super::super::ViewModel;
use super::super::render_utils::{
    blend_color, circle_visible, draw_background, group_color, node_radius, relation_color,
    with_opacity,
};
use super::interaction::pointer_pos;

impl ViewModel {
    pub(in crate::app) fn draw_sphere(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        draw_background(&painter, rect);

        if self.dataset.team.graph.is_empty() {
            ui.label("No members found in the work items.");
            return;
        }

        self.handle_sphere_zoom(ui, &response);
        self.handle_sphere_rotation(ui, &response);

        let frame_delta_seconds = ui
            .ctx()
            .input(|input| input.stable_dt)
            .clamp(0.0, 1.0 / 20.0);
        if self.camera.tick(frame_delta_seconds) {
            ui.ctx().request_repaint();
        }

        let search_matches = self.search_matches();
        let graph = &self.dataset.team.graph;
        let snapshot = self.layout_cache.get_or_relax(graph, &self.config.simulation);
        let projection = project(
            snapshot,
            &graph.edges,
            &self.camera,
            rect.center(),
            self.sphere_zoom,
        );

        let max_degree = graph.nodes.iter().map(|node| node.degree).max().unwrap_or(0);
        let zoom_sqrt = self.sphere_zoom.sqrt();
        let screen_positions = projection
            .nodes
            .iter()
            .map(|node| node.screen)
            .collect::<Vec<_>>();
        let screen_radii = graph
            .nodes
            .iter()
            .zip(&projection.nodes)
            .map(|(node, projected)| {
                node_radius(node.degree, max_degree) * projected.scale * zoom_sqrt
            })
            .collect::<Vec<_>>();

        let hovered = if self.sphere_drag.is_active() {
            None
        } else {
            pointer_pos(ui).and_then(|pointer| {
                hit_test_sized(&projection.node_order, &screen_positions, &screen_radii, pointer)
            })
        };
        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }
        self.interaction.set_hovered(hovered);

        let highlight = Highlight::from_state(graph, &self.interaction);
        let search_active = search_matches
            .as_ref()
            .is_some_and(|matches| !matches.is_empty());

        for &edge_index in &projection.edge_order {
            let edge = &graph.edges[edge_index];
            if edge.source == edge.target {
                continue;
            }
            let start = screen_positions[edge.source];
            let end = screen_positions[edge.target];
            let width = (0.8 + (edge.count as f32).sqrt() * 0.9)
                * projection.edge_scale(edge)
                * zoom_sqrt;
            let color = with_opacity(
                relation_color(&edge.relation),
                0.75 * highlight.edge_opacity(edge),
            );
            painter.line_segment([start, end], Stroke::new(width.clamp(0.5, 7.0), color));
        }

        let selected_color = Color32::from_rgb(245, 206, 93);
        let selected = self.selected_index();
        for &index in &projection.node_order {
            let node = &graph.nodes[index];
            let position = screen_positions[index];
            let radius = screen_radii[index];
            if !circle_visible(rect, position, radius) {
                continue;
            }

            let is_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));
            let mut opacity = highlight.node_opacity(index);
            if search_active && !is_match && !highlight.is_active() {
                opacity = opacity.min(0.35);
            }

            let base_color = group_color(&node.group);
            let color = if selected == Some(index) {
                blend_color(base_color, selected_color, 0.6)
            } else if is_match {
                blend_color(base_color, Color32::from_rgb(103, 196, 255), 0.5)
            } else {
                base_color
            };

            painter.circle_filled(position, radius, with_opacity(color, opacity));
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(
                    if selected == Some(index) { 2.2 } else { 1.0 },
                    with_opacity(Color32::from_rgba_unmultiplied(15, 15, 15, 190), opacity),
                ),
            );

            let should_draw_label = highlight.contains(index)
                || is_match
                || radius > 14.0
                || self.sphere_zoom > 1.6;
            if should_draw_label {
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    node.id.as_str(),
                    FontId::proportional(12.0),
                    with_opacity(Color32::from_gray(238), opacity),
                );
            }
        }

        if let Some(index) = hovered
            && let Some(node) = graph.nodes.get(index)
        {
            let panel_text = format!(
                "{}  |  {}  |  degree {}  |  pair {}  |  waits out {} / in {}",
                node.id, node.group, node.degree, node.pair_count, node.wait_out, node.wait_in
            );
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                panel_text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        self.apply_click(&response, hovered);
    }
}
