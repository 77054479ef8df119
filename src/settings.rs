use image::Rgba;
use std::path::PathBuf;

/// Startup configuration. Read once; the editor never writes it back.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub new_canvas_width: u32,
    pub new_canvas_height: u32,
    pub new_canvas_background: Rgba<u8>,
    /// Selected color at launch.
    pub initial_color: Rgba<u8>,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            new_canvas_width: 50,
            new_canvas_height: 50,
            new_canvas_background: Rgba([255, 255, 255, 255]),
            initial_color: Rgba([0, 0, 0, 255]),
            window_width: 480.0,
            window_height: 480.0,
        }
    }
}

/// Largest blank canvas the N key will create, per axis.
const MAX_NEW_CANVAS: u32 = 4096;

impl Settings {
    /// Path to the settings file.
    /// On Linux:   ~/.config/pixelart/pixelart_settings.cfg  (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\pixelart\pixelart_settings.cfg
    /// On macOS:   ~/Library/Application Support/pixelart/pixelart_settings.cfg
    pub fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA").ok()?;
            return Some(PathBuf::from(appdata).join("pixelart").join("pixelart_settings.cfg"));
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").ok()?;
            return Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join("pixelart")
                    .join("pixelart_settings.cfg"),
            );
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            let config_dir = match std::env::var("XDG_CONFIG_HOME") {
                Ok(dir) => PathBuf::from(dir),
                Err(_) => PathBuf::from(std::env::var("HOME").ok()?).join(".config"),
            };
            Some(config_dir.join("pixelart").join("pixelart_settings.cfg"))
        }
    }

    /// Load settings from disk (defaults if the file is missing or unreadable).
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                crate::log_info!("Settings loaded from {}", path.display());
                Self::parse(&content)
            }
            Err(_) => Self::default(),
        }
    }

    /// Parse `key=value` lines. Unknown keys and bad values keep the default.
    pub fn parse(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else { continue };
            let val = val.trim();
            match key.trim() {
                "new_canvas_width" => {
                    if let Some(v) = parse_dimension(val) { s.new_canvas_width = v; }
                }
                "new_canvas_height" => {
                    if let Some(v) = parse_dimension(val) { s.new_canvas_height = v; }
                }
                "new_canvas_background" => {
                    if let Some(c) = str_to_color(val) { s.new_canvas_background = c; }
                }
                "initial_color" => {
                    if let Some(c) = str_to_color(val) { s.initial_color = c; }
                }
                "window_width" => {
                    if let Some(v) = parse_window_size(val) { s.window_width = v; }
                }
                "window_height" => {
                    if let Some(v) = parse_window_size(val) { s.window_height = v; }
                }
                other => {
                    crate::log_warn!("Unknown setting '{}' ignored", other);
                }
            }
        }
        s
    }
}

fn parse_dimension(val: &str) -> Option<u32> {
    val.parse::<u32>()
        .ok()
        .filter(|v| (1..=MAX_NEW_CANVAS).contains(v))
}

fn parse_window_size(val: &str) -> Option<f32> {
    val.parse::<f32>().ok().filter(|v| v.is_finite() && *v >= 64.0)
}

/// Parse "r,g,b,a".
fn str_to_color(s: &str) -> Option<Rgba<u8>> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() == 4 {
        let r = parts[0].trim().parse::<u8>().ok()?;
        let g = parts[1].trim().parse::<u8>().ok()?;
        let b = parts[2].trim().parse::<u8>().ok()?;
        let a = parts[3].trim().parse::<u8>().ok()?;
        Some(Rgba([r, g, b, a]))
    } else {
        None
    }
}
