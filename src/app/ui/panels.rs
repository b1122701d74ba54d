use collab_graph::EngineConfig;
use collab_graph::interaction::{DragCapture, InteractionState};
use collab_graph::layout::{Camera, LayoutCache};
use eframe::egui::{self, Align, Context, Layout};

use super::super::{DataSource, Dataset, ViewMode, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(dataset: Dataset, config: EngineConfig) -> Self {
        Self {
            dataset,
            config,
            view_mode: ViewMode::Sphere,
            search: String::new(),
            search_match_cache: None,
            interaction: InteractionState::default(),
            camera: Camera::new(config.camera),
            layout_cache: LayoutCache::default(),
            sphere_zoom: 1.0,
            sphere_drag: DragCapture::default(),
            orbit: None,
            orbit_drag: DragCapture::default(),
            member_panel_cache: None,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        source: &DataSource,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("collab-graph");
                    ui.separator();
                    ui.label(format!("items: {}", source.items.display()));
                    if let Some(previous) = &source.previous {
                        ui.label(format!("previous: {}", previous.display()));
                    }
                    ui.label(format!("members: {}", self.dataset.team.graph.node_count()));
                    ui.label(format!("edges: {}", self.dataset.team.graph.edge_count()));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload items"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.selectable_value(&mut self.view_mode, ViewMode::Orbit, "Orbit");
                        ui.selectable_value(&mut self.view_mode, ViewMode::Sphere, "Sphere");
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(380.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        self.draw_details(ui);
                        ui.add_space(10.0);
                        self.draw_team(ui);
                    });
            });

        egui::CentralPanel::default().show(ctx, |ui| match self.view_mode {
            ViewMode::Sphere => {
                self.camera.show();
                self.draw_sphere(ui);
            }
            ViewMode::Orbit => {
                self.camera.hide();
                self.sphere_drag.release();
                self.draw_orbit(ui);
            }
        });
    }

    pub(in crate::app) fn selected_index(&self) -> Option<usize> {
        self.interaction.selected()
    }

    pub(in crate::app) fn selected_name(&self) -> Option<String> {
        let index = self.selected_index()?;
        self.dataset
            .team
            .graph
            .nodes
            .get(index)
            .map(|node| node.id.clone())
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<usize>) {
        if self.interaction.selected() == selected {
            return;
        }
        self.interaction.select(selected);
        self.member_panel_cache = None;
    }

    pub(in crate::app) fn select_member(&mut self, member: &str) {
        let index = self.dataset.team.graph.index_of(member);
        if index.is_none() {
            tracing::warn!(member, "preselected member not found");
        }
        self.set_selected(index);
    }
}
