use eframe::egui;
use egui::{Color32, ColorImage, Pos2, Rect, TextureHandle, TextureOptions, Vec2};
use image::{Rgba, RgbaImage};

use crate::canvas::{CursorPos, ImageBuffer, OVERLAY_SCALE};
use crate::{log_err, log_warn};

/// How a buffer of a given size reaches the screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presentation {
    /// Canvas and overlay both uploaded as textures.
    Textured,
    /// Overlay exceeds the GPU texture limit; the cursor cell is painted directly.
    PaintedCursor,
    /// The canvas itself exceeds the limit and cannot be shown.
    TooLarge,
}

pub fn presentation(max_texture_side: usize, width: u32, height: u32) -> Presentation {
    let side = width.max(height) as usize;
    if side > max_texture_side {
        Presentation::TooLarge
    } else if side * OVERLAY_SCALE as usize > max_texture_side {
        Presentation::PaintedCursor
    } else {
        Presentation::Textured
    }
}

/// Texture pair for one buffer: canvas below, cursor overlay on top.
///
/// Both are sampled nearest-neighbour and stretched over the same rectangle,
/// so each overlay pixel covers a third of a canvas pixel per axis.
#[derive(Default)]
pub struct CanvasView {
    canvas_tex: Option<TextureHandle>,
    overlay_tex: Option<TextureHandle>,
    uploaded_generation: Option<u64>,
    reported: Option<Presentation>,
}

impl CanvasView {
    pub fn show(&mut self, ui: &mut egui::Ui, buffer: &ImageBuffer) {
        let max_side = ui.ctx().input(|i| i.max_texture_side);
        let mode = presentation(max_side, buffer.width(), buffer.height());
        self.report(mode, buffer, max_side);

        if mode == Presentation::TooLarge {
            ui.centered_and_justified(|ui| {
                ui.label(format!(
                    "{}x{} is larger than this GPU can display",
                    buffer.width(),
                    buffer.height()
                ));
            });
            return;
        }

        if self.uploaded_generation != Some(buffer.generation()) {
            upload(ui.ctx(), &mut self.canvas_tex, "canvas", buffer.canvas());
            if mode == Presentation::Textured {
                upload(ui.ctx(), &mut self.overlay_tex, "overlay", buffer.overlay());
            } else {
                self.overlay_tex = None;
            }
            self.uploaded_generation = Some(buffer.generation());
        }

        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::hover());
        let rect = fit_rect(response.rect, buffer.width(), buffer.height());
        let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
        for tex in [&self.canvas_tex, &self.overlay_tex].into_iter().flatten() {
            painter.image(tex.id(), rect, uv, Color32::WHITE);
        }

        if mode == Presentation::PaintedCursor {
            let cell = cursor_cell(rect, buffer.width(), buffer.height(), buffer.cursor());
            let (border, fill) = cursor_colors(buffer);
            painter.rect_filled(cell, 0.0, to_color32(border));
            let inner = Rect::from_center_size(cell.center(), cell.size() / 3.0);
            painter.rect_filled(inner, 0.0, to_color32(fill));
        }
    }

    /// Log once per change of presentation, so oversized buffers are not silent.
    fn report(&mut self, mode: Presentation, buffer: &ImageBuffer, max_side: usize) {
        if self.reported == Some(mode) {
            return;
        }
        match mode {
            Presentation::Textured => {}
            Presentation::PaintedCursor => log_warn!(
                "{}x{} canvas: overlay exceeds texture limit {}, painting cursor directly",
                buffer.width(),
                buffer.height(),
                max_side
            ),
            Presentation::TooLarge => log_err!(
                "{}x{} canvas exceeds texture limit {}, not displayed",
                buffer.width(),
                buffer.height(),
                max_side
            ),
        }
        self.reported = Some(mode);
    }
}

fn upload(ctx: &egui::Context, slot: &mut Option<TextureHandle>, name: &str, img: &RgbaImage) {
    let size = [img.width() as usize, img.height() as usize];
    let color_image = ColorImage::from_rgba_unmultiplied(size, img.as_raw());
    match slot {
        Some(tex) => tex.set(color_image, TextureOptions::NEAREST),
        None => *slot = Some(ctx.load_texture(name, color_image, TextureOptions::NEAREST)),
    }
}

fn to_color32(c: Rgba<u8>) -> Color32 {
    let [r, g, b, a] = c.0;
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

/// Border and fill of the cursor cell, read back from the overlay raster.
fn cursor_colors(buffer: &ImageBuffer) -> (Rgba<u8>, Rgba<u8>) {
    let c = buffer.cursor();
    let (x, y) = (c.x * OVERLAY_SCALE, c.y * OVERLAY_SCALE);
    let overlay = buffer.overlay();
    (*overlay.get_pixel(x, y), *overlay.get_pixel(x + 1, y + 1))
}

/// Screen rect of canvas pixel `cursor` when the canvas is drawn into `rect`.
pub fn cursor_cell(rect: Rect, width: u32, height: u32, cursor: CursorPos) -> Rect {
    let cell = Vec2::new(rect.width() / width as f32, rect.height() / height as f32);
    let min = rect.min + Vec2::new(cursor.x as f32 * cell.x, cursor.y as f32 * cell.y);
    Rect::from_min_size(min, cell)
}

/// Largest rect with the image's aspect ratio centred inside `available`.
pub fn fit_rect(available: Rect, width: u32, height: u32) -> Rect {
    if width == 0 || height == 0 {
        return Rect::from_center_size(available.center(), Vec2::ZERO);
    }
    let scale = (available.width() / width as f32).min(available.height() / height as f32);
    let size = Vec2::new(width as f32 * scale, height as f32 * scale);
    Rect::from_center_size(available.center(), size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{BLACK, WHITE};

    #[test]
    fn fit_keeps_aspect_and_centres() {
        let avail = Rect::from_min_size(Pos2::ZERO, Vec2::new(400.0, 200.0));
        let r = fit_rect(avail, 10, 10);
        assert_eq!(r.size(), Vec2::new(200.0, 200.0));
        assert_eq!(r.center(), avail.center());

        let r = fit_rect(avail, 50, 5);
        assert_eq!(r.size(), Vec2::new(400.0, 40.0));
    }

    #[test]
    fn fit_of_empty_image_is_a_point() {
        let avail = Rect::from_min_size(Pos2::ZERO, Vec2::new(10.0, 10.0));
        assert_eq!(fit_rect(avail, 0, 4).size(), Vec2::ZERO);
    }

    #[test]
    fn oversized_overlay_falls_back_to_painted_cursor() {
        assert_eq!(presentation(2048, 682, 10), Presentation::Textured);
        assert_eq!(presentation(2048, 683, 10), Presentation::PaintedCursor);
        assert_eq!(presentation(2048, 10, 2048), Presentation::PaintedCursor);
        assert_eq!(presentation(2048, 2049, 1), Presentation::TooLarge);
    }

    #[test]
    fn cursor_cell_tracks_canvas_pixel() {
        let rect = Rect::from_min_size(Pos2::new(10.0, 20.0), Vec2::new(40.0, 20.0));
        let cell = cursor_cell(rect, 4, 2, CursorPos::new(3, 1));
        assert_eq!(cell, Rect::from_min_size(Pos2::new(40.0, 30.0), Vec2::new(10.0, 10.0)));
    }

    #[test]
    fn painted_cursor_uses_overlay_colors() {
        let mut buffer = ImageBuffer::blank(3, 3, BLACK);
        let fill = Rgba([0, 200, 0, 255]);
        buffer.move_cursor(2, 1, fill);
        assert_eq!(cursor_colors(&buffer), (WHITE, fill));
    }

    #[test]
    fn oversized_overlay_is_never_uploaded() {
        let buffer = ImageBuffer::blank(8, 8, WHITE);
        let mut view = CanvasView::default();
        let ctx = egui::Context::default();
        let mut input = egui::RawInput::default();
        input.max_texture_side = Some(16);
        let _ = ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| view.show(ui, &buffer));
        });
        assert_eq!(view.reported, Some(Presentation::PaintedCursor));
        assert!(view.overlay_tex.is_none());
        assert!(view.canvas_tex.is_some());
    }
}
