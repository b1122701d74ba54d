use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::render_utils::group_color;
use super::super::{SearchMatchCache, ViewMode, ViewModel};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    /// Node indices whose member name fuzzy-matches the search box, or
    /// `None` while the box is empty.
    pub(in crate::app) fn search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .dataset
            .team
            .graph
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| fuzzy_match_score(&matcher, &node.id, query).is_some())
            .map(|(index, _)| index)
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            matches: Arc::clone(&matches),
        });
        Some(matches)
    }

    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Members");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search members")
            .on_hover_text("Fuzzy-highlight matching members in the sphere view.");
        ui.text_edit_singleline(&mut self.search);

        let matches = self.search_matches();
        let mut clicked = None;
        egui::ScrollArea::vertical()
            .id_salt("member_list_scroll")
            .max_height(320.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for (index, node) in self.dataset.team.graph.nodes.iter().enumerate() {
                    if matches.as_ref().is_some_and(|matches| !matches.contains(&index)) {
                        continue;
                    }
                    let selected = self.selected_index() == Some(index);
                    ui.horizontal(|ui| {
                        ui.label(RichText::new("●").color(group_color(&node.group)));
                        let label = format!("{}  ({}, degree {})", node.id, node.group, node.degree);
                        if ui.selectable_label(selected, label).clicked() {
                            clicked = Some(index);
                        }
                    });
                }
            });
        if let Some(index) = clicked {
            self.set_selected(Some(index));
        }

        ui.horizontal(|ui| {
            if ui
                .add_enabled(self.selected_index().is_some(), egui::Button::new("Clear selection"))
                .clicked()
            {
                self.set_selected(None);
            }
            if ui
                .add_enabled(self.selected_index().is_some(), egui::Button::new("Open orbit"))
                .clicked()
            {
                self.view_mode = ViewMode::Orbit;
            }
        });

        ui.separator();
        ui.collapsing("Sphere layout", |ui| self.draw_sphere_controls(ui));
        ui.collapsing("Orbit layout", |ui| self.draw_orbit_controls(ui));
    }

    fn draw_sphere_controls(&mut self, ui: &mut Ui) {
        let simulation = &mut self.config.simulation;
        ui.add(egui::Slider::new(&mut simulation.iterations, 10..=400).text("Iterations"))
            .on_hover_text("Relax steps run whenever the graph structure changes.");
        ui.add(
            egui::Slider::new(&mut simulation.repulsion, 500.0..=20_000.0)
                .text("Repulsion")
                .clamping(egui::SliderClamping::Always),
        )
        .on_hover_text("How strongly members push away from each other.");
        ui.add(
            egui::Slider::new(&mut simulation.spring, 0.002..=0.1)
                .text("Edge spring")
                .clamping(egui::SliderClamping::Always),
        )
        .on_hover_text("How strongly collaborators pull together.");
        ui.add(
            egui::Slider::new(&mut simulation.damping, 0.5..=0.97)
                .text("Velocity damping")
                .clamping(egui::SliderClamping::Always),
        );

        ui.separator();
        let mut auto_rotate = self.camera.auto_rotate();
        if ui
            .checkbox(&mut auto_rotate, "Auto-rotate")
            .on_hover_text("Dragging the sphere turns auto-rotation off.")
            .changed()
        {
            self.camera.set_auto_rotate(auto_rotate);
        }
        let speed_changed = ui
            .add(
                egui::Slider::new(&mut self.config.camera.auto_rotate_speed, 0.0..=1.5)
                    .text("Rotation speed (rad/s)")
                    .clamping(egui::SliderClamping::Always),
            )
            .changed();
        if speed_changed {
            self.camera.set_params(self.config.camera);
        }
        if ui.button("Reset view").clicked() {
            self.camera.reset();
            self.sphere_zoom = 1.0;
        }
    }

    fn draw_orbit_controls(&mut self, ui: &mut Ui) {
        let Some(orbit) = self.orbit.as_mut() else {
            ui.label("Open the orbit view for a selected member.");
            return;
        };
        ui.label(format!("Focal member: {}", orbit.focal_name()));
        ui.label(format!("Zoom: {:.2}x", orbit.zoom()));
        ui.horizontal(|ui| {
            if ui.button("Reset positions").clicked() {
                orbit.reset_positions();
            }
            if ui.button("Reset zoom").clicked() {
                orbit.set_zoom(1.0);
            }
        });
    }
}
