use collab_graph::interaction::{DragCapture, DragTarget};
use eframe::egui::{self, Pos2, Ui, Vec2};

use super::super::ViewModel;

const MIN_SPHERE_ZOOM: f32 = 0.3;
const MAX_SPHERE_ZOOM: f32 = 4.0;

/// Multiplicative zoom step for this frame's scroll, if the canvas is hovered.
pub(super) fn scroll_zoom_factor(ui: &Ui, response: &egui::Response) -> Option<f32> {
    if !response.hovered() {
        return None;
    }

    let scroll = ui.input(|input| input.raw_scroll_delta.y);
    if scroll.abs() <= f32::EPSILON {
        return None;
    }
    Some((1.0 + (scroll * 0.0018)).clamp(0.85, 1.15))
}

pub(super) fn pointer_pos(ui: &Ui) -> Option<Pos2> {
    ui.input(|input| input.pointer.hover_pos())
}

/// Feeds one frame of pointer state into `capture`. Returns the captured
/// target and this frame's movement while a drag is in progress.
pub(super) fn track_drag(
    ui: &Ui,
    response: &egui::Response,
    capture: &mut DragCapture,
    start_target: impl FnOnce(Pos2) -> Option<DragTarget>,
) -> Option<(DragTarget, Vec2)> {
    let pointer = pointer_pos(ui);

    if response.drag_started_by(egui::PointerButton::Primary)
        && let Some(origin) = response.interact_pointer_pos()
        && let Some(target) = start_target(origin)
    {
        capture.begin(target, origin);
    }

    if response.drag_stopped() || pointer.is_none() {
        capture.release();
        return None;
    }

    if response.dragged_by(egui::PointerButton::Primary) {
        return capture.move_to(pointer?);
    }
    None
}

impl ViewModel {
    pub(in crate::app) fn handle_sphere_zoom(&mut self, ui: &Ui, response: &egui::Response) {
        if let Some(factor) = scroll_zoom_factor(ui, response) {
            self.sphere_zoom = (self.sphere_zoom * factor).clamp(MIN_SPHERE_ZOOM, MAX_SPHERE_ZOOM);
        }
    }

    pub(in crate::app) fn handle_sphere_rotation(&mut self, ui: &Ui, response: &egui::Response) {
        let was_dragging = self.sphere_drag.is_active();
        let moved = track_drag(ui, response, &mut self.sphere_drag, |_| Some(DragTarget::View));

        if self.sphere_drag.is_active() && !was_dragging {
            self.camera.begin_drag();
        }
        if let Some((DragTarget::View, delta)) = moved {
            self.camera.drag_by(delta);
        }
        if !self.sphere_drag.is_active() && self.camera.is_dragging() {
            self.camera.end_drag();
        }
    }

    /// Click on a node toggles its selection; click on empty canvas clears it.
    pub(in crate::app) fn apply_click(&mut self, response: &egui::Response, hovered: Option<usize>) {
        if !response.clicked_by(egui::PointerButton::Primary) {
            return;
        }
        let next = match hovered {
            Some(index) if self.selected_index() == Some(index) => None,
            Some(index) => Some(index),
            None => None,
        };
        self.set_selected(next);
    }
}
