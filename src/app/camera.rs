use eframe::egui::{Pos2, Vec2, pos2};

pub(in crate::app) const MIN_ZOOM: f32 = 0.2;
pub(in crate::app) const MAX_ZOOM: f32 = 3.0;

const WHEEL_ZOOM_RATE: f32 = 0.0018;

/// The view transform: one zoom scalar and a pan offset, in canvas-local
/// screen coordinates. `world_to_screen(p) = p * zoom + offset`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct Camera {
    pub(in crate::app) zoom: f32,
    pub(in crate::app) offset: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            offset: Vec2::ZERO,
        }
    }
}

impl Camera {
    pub(in crate::app) fn world_to_screen(&self, world: Pos2) -> Pos2 {
        pos2(
            world.x * self.zoom + self.offset.x,
            world.y * self.zoom + self.offset.y,
        )
    }

    pub(in crate::app) fn screen_to_world(&self, screen: Pos2) -> Pos2 {
        pos2(
            (screen.x - self.offset.x) / self.zoom,
            (screen.y - self.offset.y) / self.zoom,
        )
    }

    pub(in crate::app) fn screen_delta_to_world(&self, delta: Vec2) -> Vec2 {
        delta / self.zoom
    }

    /// Wheel zoom anchored at the cursor: the world point under `anchor`
    /// stays put across the zoom step.
    pub(in crate::app) fn zoom_by_scroll(&mut self, scroll_y: f32, anchor: Pos2) {
        let world_before = self.screen_to_world(anchor);
        let factor = (1.0 + scroll_y * WHEEL_ZOOM_RATE).clamp(0.85, 1.15);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.offset = anchor.to_vec2() - world_before.to_vec2() * self.zoom;
    }

    /// Captured at pan start so the offset tracks the pointer with no drift.
    pub(in crate::app) fn pan_grab(&self, pointer: Pos2) -> Vec2 {
        pointer.to_vec2() - self.offset
    }

    pub(in crate::app) fn pan_to(&mut self, pointer: Pos2, grab: Vec2) {
        self.offset = pointer.to_vec2() - grab;
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    #[test]
    fn world_and_screen_transforms_are_inverses() {
        let camera = Camera {
            zoom: 1.7,
            offset: vec2(40.0, -25.0),
        };
        let world = pos2(123.0, -45.0);
        let round_trip = camera.screen_to_world(camera.world_to_screen(world));
        assert!((round_trip.x - world.x).abs() < 1e-3);
        assert!((round_trip.y - world.y).abs() < 1e-3);
    }

    #[test]
    fn zoom_never_leaves_bounds() {
        let mut camera = Camera::default();
        for _ in 0..500 {
            camera.zoom_by_scroll(120.0, pos2(300.0, 200.0));
            assert!(camera.zoom <= MAX_ZOOM);
        }
        assert_eq!(camera.zoom, MAX_ZOOM);

        for _ in 0..500 {
            camera.zoom_by_scroll(-120.0, pos2(300.0, 200.0));
            assert!(camera.zoom >= MIN_ZOOM);
        }
        assert_eq!(camera.zoom, MIN_ZOOM);
    }

    #[test]
    fn scroll_up_zooms_in() {
        let mut camera = Camera::default();
        camera.zoom_by_scroll(60.0, pos2(0.0, 0.0));
        assert!(camera.zoom > 1.0);

        let mut camera = Camera::default();
        camera.zoom_by_scroll(-60.0, pos2(0.0, 0.0));
        assert!(camera.zoom < 1.0);
    }

    #[test]
    fn zoom_keeps_the_cursor_world_point_fixed() {
        let mut camera = Camera {
            zoom: 0.8,
            offset: vec2(15.0, 30.0),
        };
        let anchor = pos2(420.0, 310.0);
        let world_before = camera.screen_to_world(anchor);
        camera.zoom_by_scroll(90.0, anchor);
        let world_after = camera.screen_to_world(anchor);
        assert!((world_before.x - world_after.x).abs() < 1e-2);
        assert!((world_before.y - world_after.y).abs() < 1e-2);
    }

    #[test]
    fn pan_tracks_the_pointer_without_drift() {
        let mut camera = Camera {
            zoom: 1.3,
            offset: vec2(10.0, 20.0),
        };
        let start = pos2(200.0, 150.0);
        let grab = camera.pan_grab(start);

        camera.pan_to(pos2(260.0, 110.0), grab);
        assert_eq!(camera.offset, vec2(70.0, -20.0));

        // Returning the pointer to the start restores the original offset.
        camera.pan_to(start, grab);
        assert_eq!(camera.offset, vec2(10.0, 20.0));
    }

    #[test]
    fn screen_delta_scales_by_inverse_zoom() {
        let camera = Camera {
            zoom: 2.0,
            offset: Vec2::ZERO,
        };
        assert_eq!(camera.screen_delta_to_world(vec2(10.0, -6.0)), vec2(5.0, -3.0));
    }
}
