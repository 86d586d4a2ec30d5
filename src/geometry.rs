use egui::{Pos2, Rect, Vec2};

/// A coordinate in surface pixel space.
pub type Point = Pos2;

/// Bit of a pointer event's `buttons` mask that is set while the primary button is held
pub const PRIMARY_BUTTON_MASK: u16 = 1;

/// Convert client (window) coordinates into surface coordinates, given the
/// client position of the surface's top-left corner.
pub fn surface_point(client: Pos2, surface_origin: Pos2) -> Point {
    Point::new(client.x - surface_origin.x, client.y - surface_origin.y)
}

/// The first active contact of a touch event, in surface coordinates
pub fn first_touch_point(touches: &[Pos2], surface_origin: Pos2) -> Option<Point> {
    touches
        .first()
        .map(|touch| surface_point(*touch, surface_origin))
}

pub fn mouse_button_is_down(buttons: u16) -> bool {
    buttons & PRIMARY_BUTTON_MASK == PRIMARY_BUTTON_MASK
}

pub fn distance(a: Point, b: Point) -> f32 {
    (b - a).length()
}

pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

pub fn lerp(a: Point, b: Point, t: f32) -> Point {
    a + (b - a) * t
}

/// The surface's own bounds, anchored at the origin
pub fn surface_rect(width: u32, height: u32) -> Rect {
    Rect::from_min_size(Pos2::ZERO, Vec2::new(width as f32, height as f32))
}

/// True if the point lies on the surface (edges inclusive)
pub fn is_inside(point: Point, width: u32, height: u32) -> bool {
    point.x >= 0.0 && point.x <= width as f32 && point.y >= 0.0 && point.y <= height as f32
}

/// True if the point lies within `margin` pixels of the surface bounds
pub fn within_margin(point: Point, width: u32, height: u32, margin: f32) -> bool {
    surface_rect(width, height)
        .expand(margin)
        .contains(point)
}

/// Calculate distance from a point to a line segment
pub fn distance_to_segment(point: Point, start: Point, end: Point) -> f32 {
    let line_vec = end - start;
    let point_vec = point - start;

    let line_len_sq = line_vec.length_sq();
    if line_len_sq == 0.0 {
        return point_vec.length();
    }

    let t = (point_vec.dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
    let projection = start + line_vec * t;
    (point - projection).length()
}

/// Calculate the bounding box for a set of points
pub fn calculate_bounds(points: &[Point], padding: f32) -> Rect {
    if points.is_empty() {
        return Rect::NOTHING;
    }

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;

    for point in points {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    Rect::from_min_max(
        Pos2::new(min_x - padding, min_y - padding),
        Pos2::new(max_x + padding, max_y + padding),
    )
}
