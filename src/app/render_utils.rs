use corr_graph::Point;
use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2, vec2};

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

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        (color.r() as f32 * factor) as u8,
        (color.g() as f32 * factor) as u8,
        (color.b() as f32 * factor) as u8,
        (color.a() as f32 * (0.45 + (factor * 0.55))) as u8,
    )
}

/// Group 1 is red, every other group blue.
pub(super) fn group_color(group: i32) -> Color32 {
    if group == 1 {
        Color32::from_rgb(226, 74, 74)
    } else {
        Color32::from_rgb(66, 133, 244)
    }
}

/// Stroke width for a link, proportional to the square root of its value.
pub(super) fn link_width(value: f64, zoom: f32) -> f32 {
    ((value.max(0.0).sqrt() as f32) * zoom.sqrt()).clamp(0.5, 8.0)
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

/// Maps simulation coordinates to the screen; the canvas center sits at the rect center.
pub(super) fn world_to_screen(
    rect: Rect,
    pan: Vec2,
    zoom: f32,
    canvas_center: Point,
    world: Point,
) -> Pos2 {
    let offset = world - canvas_center;
    rect.center() + pan + vec2(offset.x as f32, offset.y as f32) * zoom
}

pub(super) fn screen_to_world(
    rect: Rect,
    pan: Vec2,
    zoom: f32,
    canvas_center: Point,
    screen: Pos2,
) -> Point {
    let offset = (screen - rect.center() - pan) / zoom;
    canvas_center + Point::new(offset.x as f64, offset.y as f64)
}
