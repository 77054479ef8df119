use std::path::PathBuf;
use uuid::Uuid;

use crate::canvas::ImageBuffer;

/// Stable handle of an open buffer. Never reused within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(Uuid);

impl BufferId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BufferId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BufferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // First block of the UUID is enough to tell windows apart in the log.
        let s = self.0.simple().to_string();
        write!(f, "{}", &s[..8])
    }
}

/// One open document: a buffer plus where it came from.
pub struct Project {
    pub id: BufferId,
    pub buffer: ImageBuffer,
    /// `None` for blank canvases and the embedded default image.
    pub path: Option<PathBuf>,
    /// Display name (file name, or "Untitled-N").
    pub name: String,
}

impl Project {
    pub fn new_untitled(untitled_counter: usize, buffer: ImageBuffer) -> Self {
        Self::named(format!("Untitled-{}", untitled_counter), buffer)
    }

    pub fn named(name: impl Into<String>, buffer: ImageBuffer) -> Self {
        Self {
            id: BufferId::new(),
            buffer,
            path: None,
            name: name.into(),
        }
    }

    pub fn from_file(path: PathBuf, buffer: ImageBuffer) -> Self {
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        Self {
            id: BufferId::new(),
            buffer,
            path: Some(path),
            name,
        }
    }

    /// Window title for this document.
    pub fn display_title(&self) -> String {
        format!("pixelart - {}", self.name)
    }
}
