use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use collab_graph::insights::InsightKind;
use collab_graph::{Relation, UNKNOWN_GROUP};
use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke};

const GROUP_PALETTE: [Color32; 8] = [
    Color32::from_rgb(94, 172, 235),
    Color32::from_rgb(240, 146, 92),
    Color32::from_rgb(126, 201, 124),
    Color32::from_rgb(209, 124, 196),
    Color32::from_rgb(238, 205, 96),
    Color32::from_rgb(96, 204, 196),
    Color32::from_rgb(232, 110, 118),
    Color32::from_rgb(160, 146, 236),
];

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    let opacity = opacity.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        color.r(),
        color.g(),
        color.b(),
        (color.a() as f32 * opacity) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));
}

pub(super) fn draw_ring_guide(painter: &Painter, center: Pos2, radius: f32) {
    painter.circle_stroke(
        center,
        radius,
        Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 110)),
    );
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

/// Stable colour per group name; members of the unknown group are grey.
pub(super) fn group_color(group: &str) -> Color32 {
    if group == UNKNOWN_GROUP {
        return Color32::from_gray(140);
    }
    let mut hasher = DefaultHasher::new();
    group.hash(&mut hasher);
    GROUP_PALETTE[(hasher.finish() % GROUP_PALETTE.len() as u64) as usize]
}

/// Colour for review, handoff and unrecognised kinds taken together.
pub(super) const OTHER_RELATION_COLOR: Color32 = Color32::from_gray(150);

pub(super) fn relation_color(relation: &Relation) -> Color32 {
    match relation {
        Relation::Pair => Color32::from_rgb(126, 201, 124),
        Relation::Wait => Color32::from_rgb(240, 146, 92),
        Relation::Review => Color32::from_rgb(94, 172, 235),
        Relation::Handoff => Color32::from_rgb(209, 124, 196),
        Relation::Other(_) | Relation::Unspecified => OTHER_RELATION_COLOR,
    }
}

pub(super) fn insight_color(kind: InsightKind) -> Color32 {
    match kind {
        InsightKind::Warning => Color32::from_rgb(240, 146, 92),
        InsightKind::Success => Color32::from_rgb(126, 201, 124),
        InsightKind::Info => Color32::from_rgb(94, 172, 235),
        InsightKind::Neutral => Color32::from_gray(190),
    }
}

pub(super) fn node_radius(degree: usize, max_degree: usize) -> f32 {
    let t = (degree as f32 / max_degree.max(1) as f32).sqrt();
    5.0 + (t * 13.0)
}

/// Background for a matrix or heatmap cell carrying `value` out of `max`.
pub(super) fn heat_color(value: usize, max: usize) -> Color32 {
    let t = value as f32 / max.max(1) as f32;
    blend_color(
        Color32::from_rgb(30, 36, 44),
        Color32::from_rgb(231, 122, 84),
        t,
    )
}
