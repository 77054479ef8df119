use eframe::egui;
use egui::color_picker::{Alpha, color_picker_hsva_2d};
use egui::ecolor::Hsva;
use image::Rgba;

// ============================================================================
// ColorPickerDialog — modal HSVA picker opened with C
// ============================================================================

/// Outcome of one frame of the picker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PickerResult {
    Pending,
    Confirmed(Rgba<u8>),
    Cancelled,
}

/// Works in floating-point HSVA while open; narrows to 8-bit RGBA on OK.
pub struct ColorPickerDialog {
    hsva: Hsva,
}

impl ColorPickerDialog {
    pub fn new(initial: Rgba<u8>) -> Self {
        Self {
            hsva: Hsva::from_srgba_unmultiplied(initial.0),
        }
    }

    pub fn current(&self) -> Rgba<u8> {
        narrow(self.hsva)
    }

    /// Show the dialog. Enter = OK, Esc = Cancel.
    pub fn show(&mut self, ctx: &egui::Context) -> PickerResult {
        let enter = ctx.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::Enter));
        let esc = ctx.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::Escape));
        if esc {
            return PickerResult::Cancelled;
        }
        if enter {
            return PickerResult::Confirmed(self.current());
        }

        let mut result = PickerResult::Pending;
        egui::Window::new("Color picker")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                color_picker_hsva_2d(ui, &mut self.hsva, Alpha::OnlyBlend);
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    let [r, g, b, a] = self.current().0;
                    ui.monospace(format!("#{:02X}{:02X}{:02X}{:02X}", r, g, b, a));
                    if ui.button("Cancel").clicked() {
                        result = PickerResult::Cancelled;
                    }
                    if ui.button("OK").clicked() {
                        result = PickerResult::Confirmed(self.current());
                    }
                });
            });
        result
    }
}

/// Floating-point picker value to the 8-bit unmultiplied sRGBA used on canvas.
pub fn narrow(hsva: Hsva) -> Rgba<u8> {
    Rgba(hsva.to_srgba_unmultiplied())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One headless frame with `keys` pressed; returns what the picker reported.
    fn frame(picker: &mut ColorPickerDialog, keys: &[egui::Key]) -> PickerResult {
        let mut input = egui::RawInput::default();
        for &key in keys {
            input.events.push(egui::Event::Key {
                key,
                pressed: true,
                repeat: false,
                modifiers: egui::Modifiers::NONE,
            });
        }
        let mut result = PickerResult::Pending;
        let ctx = egui::Context::default();
        let _ = ctx.run(input, |ctx| result = picker.show(ctx));
        result
    }

    #[test]
    fn escape_cancels() {
        let mut picker = ColorPickerDialog::new(Rgba([10, 20, 30, 255]));
        assert_eq!(frame(&mut picker, &[egui::Key::Escape]), PickerResult::Cancelled);
    }

    #[test]
    fn enter_confirms_current_color() {
        let initial = Rgba([255, 0, 0, 255]);
        let mut picker = ColorPickerDialog::new(initial);
        assert_eq!(
            frame(&mut picker, &[egui::Key::Enter]),
            PickerResult::Confirmed(initial)
        );
    }

    #[test]
    fn escape_wins_over_enter_in_the_same_frame() {
        let mut picker = ColorPickerDialog::new(Rgba([0, 0, 255, 255]));
        assert_eq!(
            frame(&mut picker, &[egui::Key::Enter, egui::Key::Escape]),
            PickerResult::Cancelled
        );
    }

    #[test]
    fn stays_open_without_input() {
        let mut picker = ColorPickerDialog::new(Rgba([0, 0, 0, 255]));
        assert_eq!(frame(&mut picker, &[]), PickerResult::Pending);
        assert_eq!(frame(&mut picker, &[egui::Key::A]), PickerResult::Pending);
    }

    #[test]
    fn primaries_survive_the_picker() {
        for c in [
            Rgba([255, 0, 0, 255]),
            Rgba([0, 0, 0, 255]),
            Rgba([255, 255, 255, 255]),
            Rgba([0, 0, 255, 255]),
        ] {
            assert_eq!(ColorPickerDialog::new(c).current(), c);
        }
    }

    #[test]
    fn narrowing_clamps_to_byte_range() {
        let c = narrow(Hsva::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(c, Rgba([255, 255, 255, 255]));
    }
}
