use std::collections::HashMap;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use anyhow::{Result, anyhow, bail};
use tiny_skia::{
    Color, LineCap, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform,
};
use tracing::{debug, warn};
use vsearch_core::{MessageScreen, Rgb, SearchItem, Stimulus, StimulusKind};

use crate::geometry::DisplayGeometry;
use crate::text::{render_text_pixmap, wrap_lines};

/// Colors and sizes for the search display.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasStyle {
    pub background: Rgb,
    pub foreground: Rgb,
    pub stim_size_deg: f64,
    /// Stroke width relative to stimulus size
    pub stroke_ratio: f32,
    pub font_size_px: f32,
}

impl Default for CanvasStyle {
    fn default() -> Self {
        Self {
            background: [128, 128, 128],
            foreground: [0, 0, 0],
            stim_size_deg: 1.0,
            stroke_ratio: 0.18,
            font_size_px: 28.0,
        }
    }
}

/// Offscreen tiny-skia canvas that draws blank, search and message frames.
pub struct SkiaRenderer {
    geometry: DisplayGeometry,
    style: CanvasStyle,
    canvas: Pixmap,
    font: Option<FontVec>,
    // Unit-size outlines, keyed by `Stimulus::cache_id`
    glyphs: HashMap<usize, Path>,
}

fn rgb(c: Rgb) -> Color {
    Color::from_rgba8(c[0], c[1], c[2], 255)
}

/// Outline of a stimulus in a unit box centered on the origin, upright, with
/// the crossbar on top (negative y). The target's stem is centered; the two
/// distractor variants have it offset toward either end.
fn glyph_path(kind: StimulusKind) -> Option<Path> {
    let stem_x = match kind {
        StimulusKind::Target => 0.0,
        StimulusKind::DistractorA => -0.4,
        StimulusKind::DistractorB => 0.4,
    };
    let mut pb = PathBuilder::new();
    pb.move_to(-0.5, -0.5);
    pb.line_to(0.5, -0.5);
    pb.move_to(stem_x, -0.5);
    pb.line_to(stem_x, 0.5);
    pb.finish()
}

impl SkiaRenderer {
    pub fn new(geometry: DisplayGeometry, style: CanvasStyle, font: Option<FontVec>) -> Result<Self> {
        let canvas = Pixmap::new(geometry.width, geometry.height)
            .ok_or_else(|| anyhow!("invalid canvas size {}x{}", geometry.width, geometry.height))?;

        let mut glyphs = HashMap::new();
        for kind in [
            StimulusKind::Target,
            StimulusKind::DistractorA,
            StimulusKind::DistractorB,
        ] {
            let path = glyph_path(kind).ok_or_else(|| anyhow!("empty outline for {}", kind.label()))?;
            glyphs.insert(kind.cache_id(), path);
        }
        if font.is_none() {
            warn!("no font loaded, message screens will show background only");
        }

        let mut renderer = Self {
            geometry,
            style,
            canvas,
            font,
            glyphs,
        };
        renderer.draw_blank();
        Ok(renderer)
    }

    pub fn canvas(&self) -> &Pixmap {
        &self.canvas
    }

    /// Keeps the current pixel density; only the canvas size changes.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.canvas = Pixmap::new(width, height)
            .ok_or_else(|| anyhow!("invalid canvas size {width}x{height}"))?;
        self.geometry.width = width;
        self.geometry.height = height;
        self.draw_blank();
        debug!(width, height, "canvas resized");
        Ok(())
    }

    pub fn draw_blank(&mut self) {
        self.canvas.fill(rgb(self.style.background));
    }

    pub fn draw_search(&mut self, items: &[SearchItem]) {
        self.draw_blank();

        let size = self.geometry.deg_to_px(self.style.stim_size_deg);
        let mut paint = Paint::default();
        paint.anti_alias = true;
        paint.set_color(rgb(self.style.foreground));
        let stroke = Stroke {
            // Transform scales the unit outline, so the width is in unit space
            width: self.style.stroke_ratio,
            line_cap: LineCap::Square,
            ..Stroke::default()
        };

        for item in items {
            let Some(path) = self.glyphs.get(&item.stimulus.cache_id()) else {
                continue;
            };
            let (x, y) = self.geometry.to_pixels(&item.position);
            let transform = Transform::from_scale(size, size)
                .post_rotate(item.rotation as f32)
                .post_translate(x, y);
            self.canvas
                .stroke_path(path, &paint, &stroke, transform, None);
        }
    }

    pub fn draw_message(&mut self, screen: &MessageScreen) {
        self.canvas.fill(rgb(screen.background));
        let Some(font) = &self.font else {
            return;
        };

        let font_size = self.style.font_size_px;
        let max_width = self.geometry.width as f32 * 0.8;
        let lines = wrap_lines(&screen.text, font_size, font, max_width);
        let line_height = {
            let sf = font.as_scaled(PxScale::from(font_size));
            sf.height() + sf.line_gap()
        };

        let (cx, cy) = self.geometry.center();
        let top = cy - line_height * lines.len() as f32 / 2.0;
        let color = rgb(screen.foreground);
        for (row, line) in lines.iter().enumerate() {
            let Some(pm) = render_text_pixmap(line, font_size, font, color) else {
                continue;
            };
            let x = (cx - pm.width() as f32 / 2.0).round() as i32;
            let y = (top + row as f32 * line_height).round() as i32;
            self.canvas.draw_pixmap(
                x,
                y,
                pm.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }
    }

    /// Copies the canvas into an RGBA8 frame of the same size. The canvas is
    /// always opaque, so premultiplied and straight alpha agree.
    pub fn present(&self, frame: &mut [u8]) -> Result<()> {
        let data = self.canvas.data();
        if frame.len() != data.len() {
            bail!(
                "frame buffer holds {} bytes, canvas has {}",
                frame.len(),
                data.len()
            );
        }
        frame.copy_from_slice(data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsearch_core::Point;

    fn renderer() -> SkiaRenderer {
        SkiaRenderer::new(DisplayGeometry::new(400, 300, 20.0), CanvasStyle::default(), None).unwrap()
    }

    fn pixel(r: &SkiaRenderer, x: u32, y: u32) -> [u8; 4] {
        let c = r.canvas().pixel(x, y).unwrap();
        [c.red(), c.green(), c.blue(), c.alpha()]
    }

    #[test]
    fn blank_is_background() {
        let r = renderer();
        assert_eq!(pixel(&r, 0, 0), [128, 128, 128, 255]);
        assert_eq!(pixel(&r, 200, 150), [128, 128, 128, 255]);
    }

    #[test]
    fn search_draws_at_item_location() {
        let mut r = renderer();
        // Upright target 3 deg right of fixation: stem passes through (260, 150)
        r.draw_search(&[SearchItem {
            position: Point::new(3.0, 0.0),
            rotation: 0,
            stimulus: StimulusKind::Target,
        }]);
        assert_eq!(pixel(&r, 260, 150), [0, 0, 0, 255]);
        assert_eq!(pixel(&r, 200, 150), [128, 128, 128, 255]);
    }

    #[test]
    fn rotation_moves_crossbar() {
        let mut r = renderer();
        let item = |rotation| SearchItem {
            position: Point::ORIGIN,
            rotation,
            stimulus: StimulusKind::Target,
        };
        // Crossbar sits half a stimulus (10 px) from center
        r.draw_search(&[item(0)]);
        assert_eq!(pixel(&r, 195, 140), [0, 0, 0, 255]);
        r.draw_search(&[item(90)]);
        assert_eq!(pixel(&r, 210, 145), [0, 0, 0, 255]);
        assert_eq!(pixel(&r, 195, 140), [128, 128, 128, 255]);
    }

    #[test]
    fn message_without_font_fills_background() {
        let mut r = renderer();
        r.draw_message(&MessageScreen::new("Hello", [0, 0, 255], [255, 255, 255]));
        assert_eq!(pixel(&r, 10, 10), [0, 0, 255, 255]);
    }

    #[test]
    fn present_checks_frame_size() {
        let r = renderer();
        let mut frame = vec![0u8; 400 * 300 * 4];
        r.present(&mut frame).unwrap();
        assert_eq!(&frame[..4], &[128, 128, 128, 255]);
        assert!(r.present(&mut [0u8; 16]).is_err());
    }
}
