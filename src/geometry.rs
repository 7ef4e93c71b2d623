use eframe::egui::{Pos2, Vec2, pos2};

pub fn center(x: f32, y: f32, width: f32, height: f32) -> Pos2 {
    pos2(x + width / 2.0, y + height / 2.0)
}

/// Point where the segment from `center1` toward `center2` crosses the
/// boundary of the axis-aligned rectangle of `size1` centered at `center1`.
pub fn intersection(center1: Pos2, size1: Vec2, center2: Pos2) -> Pos2 {
    let dx = center2.x - center1.x;
    let dy = center2.y - center1.y;

    if dx == 0.0 && dy == 0.0 {
        return center1;
    }

    let half_width = size1.x / 2.0;
    let half_height = size1.y / 2.0;

    let exits_vertical_edge = dy == 0.0
        || (half_height > 0.0 && dx.abs() * half_height > dy.abs() * half_width);

    if exits_vertical_edge && dx != 0.0 {
        let scale = half_width / dx.abs();
        pos2(center1.x + dx.signum() * half_width, center1.y + dy * scale)
    } else {
        let scale = half_height / dy.abs();
        pos2(center1.x + dx * scale, center1.y + dy.signum() * half_height)
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    #[test]
    fn degenerate_centers_return_center() {
        let c = pos2(10.0, 20.0);
        assert_eq!(intersection(c, vec2(100.0, 50.0), c), c);
    }

    #[test]
    fn exits_through_right_edge() {
        let point = intersection(pos2(0.0, 0.0), vec2(100.0, 50.0), pos2(200.0, 0.0));
        assert_eq!(point, pos2(50.0, 0.0));
    }

    #[test]
    fn exits_through_left_edge() {
        let point = intersection(pos2(0.0, 0.0), vec2(100.0, 50.0), pos2(-200.0, -10.0));
        assert!((point.x - -50.0).abs() < 1e-4);
        assert!((point.y - -2.5).abs() < 1e-4);
    }

    #[test]
    fn exits_through_bottom_edge() {
        let point = intersection(pos2(0.0, 0.0), vec2(100.0, 50.0), pos2(10.0, 200.0));
        assert!((point.y - 25.0).abs() < 1e-4);
        assert!((point.x - 1.25).abs() < 1e-4);
    }

    #[test]
    fn exits_through_top_edge() {
        let point = intersection(pos2(0.0, 0.0), vec2(100.0, 50.0), pos2(0.0, -200.0));
        assert_eq!(point, pos2(0.0, -25.0));
    }

    #[test]
    fn diagonal_target_lands_exactly_on_boundary() {
        let size = vec2(80.0, 60.0);
        let point = intersection(pos2(0.0, 0.0), size, pos2(120.0, 90.0));
        // Same aspect as the rectangle: the corner is the exact crossing.
        assert!((point.x - 40.0).abs() < 1e-4);
        assert!((point.y - 30.0).abs() < 1e-4);
    }

    #[test]
    fn center_is_rect_midpoint() {
        assert_eq!(center(10.0, 20.0, 100.0, 50.0), pos2(60.0, 45.0));
    }
}
