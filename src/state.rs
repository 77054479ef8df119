//! Process-wide editor state: the selected paint color and the registry of
//! open buffers.
//!
//! Registration doubles as subscription to color changes. `set_color` walks
//! the registry and redraws every cursor, so no buffer ever shows a stale fill.

use image::Rgba;

use crate::canvas::{Direction, ImageBuffer};
use crate::project::{BufferId, Project};
use crate::{log_info, log_warn};

pub struct AppState {
    selected_color: Rgba<u8>,
    /// Open order; the first entry lives in the root window.
    projects: Vec<Project>,
    untitled_counter: usize,
}

impl AppState {
    pub fn new(selected_color: Rgba<u8>) -> Self {
        Self {
            selected_color,
            projects: Vec::new(),
            untitled_counter: 0,
        }
    }

    pub fn selected_color(&self) -> Rgba<u8> {
        self.selected_color
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// The buffer shown in the root window.
    pub fn primary(&self) -> Option<BufferId> {
        self.projects.first().map(|p| p.id)
    }

    /// Buffers that get a window of their own, next to the root one.
    pub fn secondaries(&self) -> Vec<BufferId> {
        self.projects.iter().skip(1).map(|p| p.id).collect()
    }

    pub fn get(&self, id: BufferId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: BufferId) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.id == id)
    }

    /// Next "Untitled-N" counter value.
    pub fn next_untitled(&mut self) -> usize {
        self.untitled_counter += 1;
        self.untitled_counter
    }

    /// Add a buffer to the registry and draw its cursor with the selected color.
    pub fn register(&mut self, mut project: Project) -> BufferId {
        project.buffer.draw_cursor(self.selected_color);
        let id = project.id;
        log_info!(
            "Opened buffer {} \"{}\" ({}x{})",
            id,
            project.name,
            project.buffer.width(),
            project.buffer.height()
        );
        self.projects.push(project);
        id
    }

    /// Remove a buffer from the registry. Its window must not be drawn again.
    pub fn deregister(&mut self, id: BufferId) -> Option<Project> {
        let Some(idx) = self.projects.iter().position(|p| p.id == id) else {
            log_warn!("Close requested for unknown buffer {}", id);
            return None;
        };
        let project = self.projects.remove(idx);
        log_info!("Closed buffer {} \"{}\"", id, project.name);
        Some(project)
    }

    /// Set the selected color and redraw the cursor of every open buffer.
    /// Returns how many buffers were notified.
    pub fn set_color(&mut self, color: Rgba<u8>) -> usize {
        self.selected_color = color;
        let [r, g, b, a] = color.0;
        log_info!("Selected color rgba({}, {}, {}, {})", r, g, b, a);
        self.notify_color_changed()
    }

    /// Take the canvas color under `id`'s cursor as the selected color.
    pub fn sample_color(&mut self, id: BufferId) -> Option<Rgba<u8>> {
        let color = self.get(id)?.buffer.sample();
        self.set_color(color);
        Some(color)
    }

    /// Paint the pixel under `id`'s cursor with the selected color.
    pub fn paint(&mut self, id: BufferId) -> bool {
        let color = self.selected_color;
        match self.get_mut(id) {
            Some(project) => {
                project.buffer.paint(color);
                true
            }
            None => false,
        }
    }

    /// Step `id`'s cursor; false when the move would leave the canvas.
    pub fn move_cursor(&mut self, id: BufferId, direction: Direction) -> bool {
        let fill = self.selected_color;
        self.get_mut(id)
            .is_some_and(|p| p.buffer.step_cursor(direction, fill))
    }

    /// Open a blank canvas in a new window.
    pub fn open_blank(&mut self, width: u32, height: u32, background: Rgba<u8>) -> BufferId {
        let n = self.next_untitled();
        let project = Project::new_untitled(n, ImageBuffer::blank(width, height, background));
        self.register(project)
    }

    fn notify_color_changed(&mut self) -> usize {
        let fill = self.selected_color;
        for project in &mut self.projects {
            project.buffer.draw_cursor(fill);
        }
        self.projects.len()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(crate::canvas::BLACK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{BLACK, CursorPos, WHITE};

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);

    fn fill_at(state: &AppState, id: BufferId) -> Rgba<u8> {
        let buf = &state.get(id).unwrap().buffer;
        let c = buf.cursor();
        *buf.overlay().get_pixel(c.x * 3 + 1, c.y * 3 + 1)
    }

    #[test]
    fn register_draws_cursor_with_selected_color() {
        let mut state = AppState::new(RED);
        let id = state.open_blank(4, 4, BLACK);
        assert_eq!(fill_at(&state, id), RED);
        assert_eq!(state.primary(), Some(id));
        assert_eq!(state.get(id).unwrap().name, "Untitled-1");
    }

    #[test]
    fn color_change_redraws_every_buffer() {
        let mut state = AppState::new(BLACK);
        let ids: Vec<_> = (0..3).map(|_| state.open_blank(5, 5, WHITE)).collect();
        assert!(state.move_cursor(ids[1], Direction::Right));
        assert!(state.move_cursor(ids[2], Direction::Down));
        let generations: Vec<u64> = ids
            .iter()
            .map(|id| state.get(*id).unwrap().buffer.generation())
            .collect();

        assert_eq!(state.set_color(GREEN), 3);

        for (id, before) in ids.iter().zip(generations) {
            assert_eq!(fill_at(&state, *id), GREEN);
            assert!(state.get(*id).unwrap().buffer.generation() > before);
        }
        assert_eq!(state.get(ids[0]).unwrap().buffer.cursor(), CursorPos::new(0, 0));
        assert_eq!(state.get(ids[1]).unwrap().buffer.cursor(), CursorPos::new(1, 0));
        assert_eq!(state.get(ids[2]).unwrap().buffer.cursor(), CursorPos::new(0, 1));
    }

    #[test]
    fn sample_takes_color_under_cursor() {
        let mut state = AppState::new(BLACK);
        let a = state.open_blank(2, 2, RED);
        let b = state.open_blank(2, 2, WHITE);
        assert_eq!(state.sample_color(a), Some(RED));
        assert_eq!(state.selected_color(), RED);
        assert_eq!(fill_at(&state, b), RED);
    }

    #[test]
    fn paint_uses_selected_color() {
        let mut state = AppState::new(GREEN);
        let id = state.open_blank(2, 2, BLACK);
        assert!(state.paint(id));
        assert_eq!(*state.get(id).unwrap().buffer.canvas().get_pixel(0, 0), GREEN);
    }

    #[test]
    fn deregistered_buffer_is_not_notified() {
        let mut state = AppState::new(BLACK);
        let a = state.open_blank(2, 2, WHITE);
        let b = state.open_blank(2, 2, WHITE);
        let closed = state.deregister(a).unwrap();
        assert_eq!(closed.id, a);
        assert_eq!(state.set_color(RED), 1);
        assert_eq!(state.primary(), Some(b));
        assert!(state.deregister(a).is_none());
        assert!(!state.paint(a));
        assert!(state.sample_color(a).is_none());
    }

    #[test]
    fn closing_primary_promotes_next_buffer_out_of_secondaries() {
        let mut state = AppState::default();
        let a = state.open_blank(1, 1, WHITE);
        let b = state.open_blank(1, 1, WHITE);
        let c = state.open_blank(1, 1, WHITE);
        assert_eq!(state.secondaries(), vec![b, c]);

        state.deregister(a);
        assert_eq!(state.primary(), Some(b));
        assert_eq!(state.secondaries(), vec![c]);

        state.deregister(b);
        state.deregister(c);
        assert!(state.secondaries().is_empty());
    }

    #[test]
    fn untitled_counter_keeps_counting_after_close() {
        let mut state = AppState::default();
        let a = state.open_blank(1, 1, WHITE);
        state.deregister(a);
        let b = state.open_blank(1, 1, WHITE);
        assert_eq!(state.get(b).unwrap().name, "Untitled-2");
    }
}
