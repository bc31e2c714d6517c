use std::f64::consts::PI;

use vsearch_core::Point;

/// Maps visual-angle coordinates onto a pixel canvas. Fixation sits at the
/// canvas center; positive y is up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayGeometry {
    pub width: u32,
    pub height: u32,
    pub px_per_deg: f64,
}

impl DisplayGeometry {
    pub fn new(width: u32, height: u32, px_per_deg: f64) -> Self {
        Self {
            width,
            height,
            px_per_deg,
        }
    }

    /// Pixel density from the physical monitor width and viewing distance,
    /// using the small-angle approximation (1 degree = distance * pi / 180).
    pub fn from_monitor(width: u32, height: u32, monitor_width_cm: f64, distance_cm: f64) -> Self {
        let px_per_cm = width as f64 / monitor_width_cm;
        let cm_per_deg = distance_cm * PI / 180.0;
        Self::new(width, height, px_per_cm * cm_per_deg)
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    pub fn deg_to_px(&self, deg: f64) -> f32 {
        (deg * self.px_per_deg) as f32
    }

    pub fn to_pixels(&self, p: &Point) -> (f32, f32) {
        let (cx, cy) = self.center();
        (cx + self.deg_to_px(p.x), cy - self.deg_to_px(p.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_maps_to_center_and_y_points_up() {
        let g = DisplayGeometry::new(800, 600, 40.0);
        assert_eq!(g.to_pixels(&Point::ORIGIN), (400.0, 300.0));
        assert_eq!(g.to_pixels(&Point::new(1.0, 2.0)), (440.0, 220.0));
        assert_eq!(g.to_pixels(&Point::new(-1.0, -1.0)), (360.0, 340.0));
    }

    #[test]
    fn monitor_density() {
        // 1920 px over 53 cm viewed from 90 cm: about 56.9 px per degree
        let g = DisplayGeometry::from_monitor(1920, 1080, 53.0, 90.0);
        assert!((g.px_per_deg - 56.9).abs() < 0.1, "{}", g.px_per_deg);
    }
}
