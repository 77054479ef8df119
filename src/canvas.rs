use image::{Rgba, RgbaImage};

/// Overlay pixels per canvas pixel, per axis.
pub const OVERLAY_SCALE: u32 = 3;

/// Channel sum (R+G+B) below which a pixel counts as dark.
pub const LUMINANCE_THRESHOLD: u16 = 384;

pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Cursor position in canvas pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CursorPos {
    pub x: u32,
    pub y: u32,
}

impl CursorPos {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Arrow-key direction on the canvas axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Border color of the cursor mark for the pixel underneath it: white on dark
/// pixels, black on light ones. Alpha is not part of the sum.
pub fn border_color(pixel: Rgba<u8>) -> Rgba<u8> {
    if channel_sum(pixel) < LUMINANCE_THRESHOLD {
        WHITE
    } else {
        BLACK
    }
}

/// R+G+B of a pixel, 0..=765.
pub fn channel_sum(pixel: Rgba<u8>) -> u16 {
    let [r, g, b, _] = pixel.0;
    (r as u16) + (g as u16) + (b as u16)
}

// ============================================================================
// IMAGE BUFFER
// ============================================================================

/// One editable raster plus the overlay that carries the cursor mark.
///
/// The overlay is `OVERLAY_SCALE` times the canvas on both axes and stays
/// transparent except for the decoration cell of the cursor: the border pixel
/// at `(x*3, y*3)` and the fill pixel (selected color) at `(x*3+1, y*3+1)`.
/// Both layers are displayed stretched over the same rectangle, overlay on top.
pub struct ImageBuffer {
    canvas: RgbaImage,
    overlay: RgbaImage,
    cursor: CursorPos,
    /// Bumped on every visible change; the view re-uploads textures when it moves.
    generation: u64,
}

impl ImageBuffer {
    /// Wrap `canvas` with a fresh transparent overlay. The cursor starts at the
    /// top-left corner and is not drawn until the first `draw_cursor`.
    pub fn new(canvas: RgbaImage) -> Self {
        let (w, h) = canvas.dimensions();
        let overlay = RgbaImage::from_pixel(w * OVERLAY_SCALE, h * OVERLAY_SCALE, TRANSPARENT);
        Self {
            canvas,
            overlay,
            cursor: CursorPos::default(),
            generation: 0,
        }
    }

    /// Blank canvas filled with `background`.
    pub fn blank(width: u32, height: u32, background: Rgba<u8>) -> Self {
        Self::new(RgbaImage::from_pixel(width, height, background))
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn overlay(&self) -> &RgbaImage {
        &self.overlay
    }

    pub fn cursor(&self) -> CursorPos {
        self.cursor
    }

    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Mark the buffer as changed so the widget redraws it.
    pub fn refresh(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Canvas pixel under the cursor.
    pub fn sample(&self) -> Rgba<u8> {
        self.canvas
            .get_pixel_checked(self.cursor.x, self.cursor.y)
            .copied()
            .unwrap_or(TRANSPARENT)
    }

    /// Move the cursor to `(x, y)`, clearing the old decoration cell first.
    /// The caller keeps `(x, y)` inside the canvas; see [`Self::step_cursor`].
    pub fn move_cursor(&mut self, x: u32, y: u32, fill: Rgba<u8>) {
        self.clear_cursor();
        self.cursor = CursorPos::new(x, y);
        self.draw_cursor(fill);
    }

    /// Move the cursor one pixel in `direction` if the target is on the canvas.
    /// Returns whether the cursor moved.
    pub fn step_cursor(&mut self, direction: Direction, fill: Rgba<u8>) -> bool {
        let CursorPos { x, y } = self.cursor;
        let target = match direction {
            Direction::Up => y.checked_sub(1).map(|y| (x, y)),
            Direction::Down => (y + 1 < self.height()).then_some((x, y + 1)),
            Direction::Left => x.checked_sub(1).map(|x| (x, y)),
            Direction::Right => (x + 1 < self.width()).then_some((x + 1, y)),
        };
        match target {
            Some((tx, ty)) => {
                self.move_cursor(tx, ty, fill);
                true
            }
            None => false,
        }
    }

    /// Draw the decoration cell at the cursor with `fill` as the inner pixel.
    pub fn draw_cursor(&mut self, fill: Rgba<u8>) {
        let Some(&under) = self.canvas.get_pixel_checked(self.cursor.x, self.cursor.y) else {
            return;
        };
        let (bx, by) = self.cell_origin();
        self.overlay.put_pixel(bx, by, border_color(under));
        self.overlay.put_pixel(bx + 1, by + 1, fill);
        self.refresh();
    }

    /// Write `color` into the canvas under the cursor and redraw the mark.
    pub fn paint(&mut self, color: Rgba<u8>) {
        let CursorPos { x, y } = self.cursor;
        if x >= self.width() || y >= self.height() {
            return;
        }
        self.canvas.put_pixel(x, y, color);
        // Painting always uses the selected color, which is also the fill.
        self.draw_cursor(color);
    }

    fn clear_cursor(&mut self) {
        if self.cursor.x >= self.width() || self.cursor.y >= self.height() {
            return;
        }
        let (bx, by) = self.cell_origin();
        self.overlay.put_pixel(bx, by, TRANSPARENT);
        self.overlay.put_pixel(bx + 1, by + 1, TRANSPARENT);
    }

    fn cell_origin(&self) -> (u32, u32) {
        (self.cursor.x * OVERLAY_SCALE, self.cursor.y * OVERLAY_SCALE)
    }
}
