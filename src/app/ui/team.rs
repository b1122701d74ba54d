use eframe::egui::{self, Color32, RichText, Ui};

use super::super::ViewModel;
use super::super::render_utils::{group_color, heat_color};
use super::details::draw_insights;

impl ViewModel {
    pub(in crate::app) fn draw_team(&mut self, ui: &mut Ui) {
        ui.heading("Team");
        ui.add_space(6.0);

        let team = &self.dataset.team;
        ui.label(format!(
            "Pair sessions: {}  |  waits: {}  |  pairs per owner: {:.1}",
            team.total_pair, team.total_wait, team.pair_average
        ));

        ui.separator();
        ui.label(RichText::new("Insights").strong());
        draw_insights(ui, &self.dataset.team_insights);

        let mut clicked = None;

        egui::CollapsingHeader::new("Bottlenecks")
            .default_open(true)
            .show(ui, |ui| {
                if team.bottlenecks.is_empty() {
                    ui.label("Nobody is being waited on.");
                    return;
                }
                for bottleneck in &team.bottlenecks {
                    let label = format!(
                        "{}  ({} waiting, {}%)",
                        bottleneck.member, bottleneck.inbound, bottleneck.intensity
                    );
                    let color = heat_color(bottleneck.intensity as usize, 100);
                    let response = ui
                        .link(RichText::new(label).color(color))
                        .on_hover_text(format!("Waiting: {}", bottleneck.waiters.join(", ")));
                    if response.clicked() {
                        clicked = team.graph.index_of(&bottleneck.member);
                    }
                }
            });

        egui::CollapsingHeader::new("Load heatmap")
            .default_open(false)
            .show(ui, |ui| {
                let max_load = team
                    .heatmap
                    .iter()
                    .map(|row| row.total_load)
                    .max()
                    .unwrap_or(0);
                egui::Grid::new("load_heatmap_grid")
                    .striped(true)
                    .num_columns(8)
                    .show(ui, |ui| {
                        for header in [
                            "Member", "Pair", "Waits", "Waited", "Review", "Handoff", "Other", "Load",
                        ] {
                            ui.label(RichText::new(header).strong());
                        }
                        ui.end_row();
                        for row in &team.heatmap {
                            if ui
                                .link(RichText::new(&row.member).color(group_color(&row.group)))
                                .clicked()
                            {
                                clicked = team.graph.index_of(&row.member);
                            }
                            for value in [
                                row.pair,
                                row.waiting_on,
                                row.waited_on,
                                row.review,
                                row.handoff,
                                row.other,
                            ] {
                                ui.label(value.to_string());
                            }
                            ui.label(
                                RichText::new(row.total_load.to_string())
                                    .background_color(heat_color(row.total_load, max_load))
                                    .color(Color32::from_gray(240)),
                            );
                            ui.end_row();
                        }
                    });
            });

        egui::CollapsingHeader::new("Group matrix")
            .default_open(false)
            .show(ui, |ui| {
                let matrix = &team.matrix;
                let max_total = matrix.max_total();
                egui::Grid::new("group_matrix_grid")
                    .num_columns(matrix.groups.len() + 1)
                    .show(ui, |ui| {
                        ui.label("from \\ to");
                        for group in &matrix.groups {
                            ui.label(RichText::new(group).color(group_color(group)));
                        }
                        ui.end_row();
                        let rows = matrix.cells.chunks(matrix.groups.len().max(1));
                        for (source, cells) in matrix.groups.iter().zip(rows) {
                            ui.label(RichText::new(source).color(group_color(source)));
                            for cell in cells {
                                ui.label(
                                    RichText::new(cell.total.to_string())
                                        .background_color(heat_color(cell.total, max_total))
                                        .color(Color32::from_gray(240)),
                                )
                                .on_hover_text(format!(
                                    "{} -> {}: {} pair, {} wait",
                                    cell.source, cell.target, cell.pair, cell.wait
                                ));
                            }
                            ui.end_row();
                        }
                    });
            });

        if let Some(index) = clicked {
            self.set_selected(Some(index));
        }
    }
}
