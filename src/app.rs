use crate::canvas::ImageBuffer;
use crate::components::colors::{ColorPickerDialog, PickerResult};
use crate::components::view::CanvasView;
use crate::controller::{EditorKey, KeyOutcome, Request, handle_key};
use crate::io::{FileHandler, IoResult};
use crate::project::{BufferId, Project};
use crate::settings::Settings;
use crate::state::AppState;
use crate::{log_err, log_info};
use eframe::egui;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc;

/// Name of the window showing the embedded startup image.
const DEFAULT_NAME: &str = "pixelart";

pub struct PixelArtApp {
    state: AppState,
    settings: Settings,

    // Shared File Handler (for dialogs)
    file_handler: FileHandler,

    // Per-window UI state, keyed like the registry
    views: HashMap<BufferId, CanvasView>,
    pickers: HashMap<BufferId, ColorPickerDialog>,

    // Async IO pipeline: every open and save reports back here
    io_sender: mpsc::Sender<IoResult>,
    io_receiver: mpsc::Receiver<IoResult>,
    pending_io_ops: usize,
}

impl PixelArtApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: Settings,
        startup_files: Vec<PathBuf>,
    ) -> Self {
        let (io_sender, io_receiver) = mpsc::channel();

        let mut state = AppState::new(settings.initial_color);
        match crate::io::load_default() {
            Ok(image) => {
                state.register(Project::named(DEFAULT_NAME, ImageBuffer::new(image)));
            }
            Err(e) => {
                log_err!("Embedded default image failed to decode: {}", e);
                state.open_blank(
                    settings.new_canvas_width,
                    settings.new_canvas_height,
                    settings.new_canvas_background,
                );
            }
        }

        let mut app = Self {
            state,
            settings,
            file_handler: FileHandler::new(),
            views: HashMap::new(),
            pickers: HashMap::new(),
            io_sender,
            io_receiver,
            pending_io_ops: 0,
        };

        for path in startup_files {
            app.open_path(&cc.egui_ctx, path);
        }
        app
    }

    /// Decode `path` in the background; a window opens when it arrives.
    fn open_path(&mut self, ctx: &egui::Context, path: PathBuf) {
        log_info!("Opening {}", path.display());
        self.pending_io_ops += 1;
        let ctx = ctx.clone();
        crate::io::spawn_open(path, self.io_sender.clone(), move || ctx.request_repaint());
    }

    fn save_buffer(&mut self, ctx: &egui::Context, id: BufferId, path: PathBuf) {
        let Some(project) = self.state.get(id) else {
            return;
        };
        log_info!("Saving \"{}\" to {}", project.name, path.display());
        let image = project.buffer.canvas().clone();
        self.pending_io_ops += 1;
        let ctx = ctx.clone();
        crate::io::spawn_save(image, path, self.io_sender.clone(), move || {
            ctx.request_repaint()
        });
    }

    /// Drain completed background opens/saves.
    fn poll_io(&mut self) {
        while let Ok(result) = self.io_receiver.try_recv() {
            self.pending_io_ops = self.pending_io_ops.saturating_sub(1);
            match result {
                IoResult::Opened { image, path } => {
                    self.state
                        .register(Project::from_file(path, ImageBuffer::new(image)));
                }
                IoResult::OpenFailed { path, error } => {
                    log_err!("Failed to open {}: {}", path.display(), error);
                }
                IoResult::Saved { path } => {
                    log_info!("Saved {}", path.display());
                }
                IoResult::SaveFailed { path, error } => {
                    log_err!("Failed to save {}: {}", path.display(), error);
                }
            }
        }
    }

    /// Deregister first; the window is only torn down once it is no longer drawn.
    fn close_buffer(&mut self, id: BufferId) {
        self.state.deregister(id);
        self.views.remove(&id);
        self.pickers.remove(&id);
    }

    fn fulfil(&mut self, ctx: &egui::Context, id: BufferId, request: Request) {
        match request {
            Request::PickColor => {
                let picker = ColorPickerDialog::new(self.state.selected_color());
                self.pickers.insert(id, picker);
            }
            Request::OpenFile => {
                if let Some(path) = self.file_handler.pick_open_path() {
                    self.open_path(ctx, path);
                }
            }
            Request::SaveFile => {
                let name = match self.state.get(id) {
                    Some(project) => project.name.clone(),
                    None => return,
                };
                if let Some(path) = self.file_handler.pick_save_path(&name) {
                    self.save_buffer(ctx, id, path);
                }
            }
        }
    }

    /// Run one frame of the window bound to `id`. Returns true when the user
    /// asked to close it.
    fn show_buffer_window(&mut self, ctx: &egui::Context, id: BufferId) -> bool {
        if ctx.input(|i| i.viewport().close_requested()) {
            return true;
        }

        // The picker is modal: while it is up, keys go to it.
        if let Some(result) = self.pickers.get_mut(&id).map(|p| p.show(ctx)) {
            match result {
                PickerResult::Pending => {}
                PickerResult::Confirmed(color) => {
                    self.pickers.remove(&id);
                    self.state.set_color(color);
                }
                PickerResult::Cancelled => {
                    self.pickers.remove(&id);
                }
            }
        } else {
            let pressed: Vec<EditorKey> = ctx.input(|i| {
                EditorKey::ALL
                    .into_iter()
                    .filter(|k| i.key_pressed(k.egui_key()))
                    .collect()
            });
            for key in pressed {
                match handle_key(&mut self.state, &self.settings, id, key) {
                    KeyOutcome::Request(request) => self.fulfil(ctx, id, request),
                    KeyOutcome::Opened(new_id) => {
                        log_info!("Buffer {} opened from {}", new_id, id);
                    }
                    KeyOutcome::Applied | KeyOutcome::Ignored => {}
                }
            }
        }

        let Some(project) = self.state.get(id) else {
            return false;
        };
        let view = self.views.entry(id).or_default();
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(ctx.style().visuals.extreme_bg_color))
            .show(ctx, |ui| view.show(ui, &project.buffer));
        false
    }
}

impl eframe::App for PixelArtApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_io();

        let Some(root) = self.state.primary() else {
            egui::CentralPanel::default().show(ctx, |ui| {
                if self.pending_io_ops > 0 {
                    ui.centered_and_justified(|ui| ui.spinner());
                }
            });
            return;
        };

        // The first live buffer owns the root window.
        if let Some(project) = self.state.get(root) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(project.display_title()));
        }
        if self.show_buffer_window(ctx, root) {
            if self.state.len() > 1 {
                // Keep the process alive; the next buffer moves into this window.
                ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            }
            self.close_buffer(root);
        }

        // Read after the root step: a promoted buffer now belongs to the root window.
        for id in self.state.secondaries() {
            let Some(title) = self.state.get(id).map(Project::display_title) else {
                continue;
            };
            let builder = egui::ViewportBuilder::default()
                .with_title(title)
                .with_inner_size([self.settings.window_width, self.settings.window_height]);
            let closed = ctx.show_viewport_immediate(
                egui::ViewportId::from_hash_of(id),
                builder,
                |ctx, _class| self.show_buffer_window(ctx, id),
            );
            if closed {
                self.close_buffer(id);
            }
        }
    }
}
