use collab_graph::insights::{Insight, personal_insights};
use eframe::egui::{self, RichText, Ui};

use super::super::render_utils::{group_color, insight_color};
use super::super::{MemberPanelCache, ViewModel};

pub(in crate::app) fn draw_insights(ui: &mut Ui, insights: &[Insight]) {
    if insights.is_empty() {
        ui.label("Nothing stands out.");
        return;
    }
    for insight in insights {
        ui.label(RichText::new(&insight.message).color(insight_color(insight.kind)));
        if let Some(detail) = &insight.detail {
            ui.small(detail.as_str());
        }
    }
}

impl ViewModel {
    fn member_insights(&mut self, member: usize) -> &[Insight] {
        let stale = self
            .member_panel_cache
            .as_ref()
            .is_none_or(|cache| cache.member != member);
        if stale && let Some(node) = self.dataset.team.graph.nodes.get(member) {
            let insights = personal_insights(
                &self.dataset.items,
                &node.id,
                self.dataset.previous.as_deref(),
            );
            self.member_panel_cache = Some(MemberPanelCache { member, insights });
        }
        self.member_panel_cache
            .as_ref()
            .map(|cache| cache.insights.as_slice())
            .unwrap_or_default()
    }

    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Member");
        ui.add_space(6.0);

        let Some(index) = self.selected_index() else {
            ui.label("Select a member from the graph or the member list.");
            return;
        };
        let Some(node) = self.dataset.team.graph.nodes.get(index) else {
            ui.label("Selected member no longer exists in the graph.");
            return;
        };
        let Some(summary) = self.dataset.team.summary(&node.id).cloned() else {
            return;
        };

        ui.horizontal(|ui| {
            ui.label(RichText::new(&summary.member).strong());
            ui.label(RichText::new(&summary.group).color(group_color(&summary.group)));
        });
        ui.add_space(4.0);
        ui.label(format!("Collaborations: {}", summary.total_collaborations));
        ui.label(format!("Pair sessions: {}", summary.pair_count));
        ui.label(format!("Waiting on others: {}", summary.wait_out));
        ui.label(format!("Others waiting on them: {}", summary.wait_in));
        ui.label(format!("Cross-group: {}%", summary.cross_group_score));
        ui.label(format!("Cross-module: {}%", summary.cross_module_score));

        if !summary.collaborators.is_empty() {
            ui.separator();
            ui.label(RichText::new("Collaborators").strong());
            egui::Grid::new("collaborator_grid")
                .striped(true)
                .num_columns(5)
                .show(ui, |ui| {
                    ui.label("Name");
                    ui.label("Total");
                    ui.label("Pair");
                    ui.label("Wait");
                    ui.label("Other");
                    ui.end_row();
                    for tally in &summary.collaborators {
                        ui.label(tally.name.as_str());
                        ui.label(tally.total.to_string());
                        ui.label(tally.pair.to_string());
                        ui.label(tally.wait.to_string());
                        ui.label(tally.other.to_string());
                        ui.end_row();
                    }
                });
        }

        ui.separator();
        ui.label(RichText::new("Insights").strong());
        let insights = self.member_insights(index);
        draw_insights(ui, insights);
    }
}
