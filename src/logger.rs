//! Session log: a single file per run, truncated at launch.
//!
//! Location (`<data dir>/pixelart/pixelart.log`):
//!   Windows:  `%APPDATA%\pixelart\pixelart.log`
//!   Linux:    `$XDG_DATA_HOME/pixelart/pixelart.log` or `~/.local/share/...`
//!   macOS:    `~/Library/Application Support/pixelart/pixelart.log`
//!
//! Log through `log_info!` / `log_warn!` / `log_err!`. Until [`init`] has run
//! (unit tests, library use) every write is dropped.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

static SESSION: OnceLock<Session> = OnceLock::new();

struct Session {
    path: PathBuf,
    file: Mutex<File>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
    Panic,
}

impl Level {
    pub fn tag(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Panic => "PANIC",
        }
    }
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Info, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Warn, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_err {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Error, &format!($($arg)*))
    };
}

/// Path of this session's log, once [`init`] succeeded.
pub fn log_path() -> Option<&'static Path> {
    SESSION.get().map(|s| s.path.as_path())
}

/// Append one `[HH:MM:SS] [LEVEL] msg` line. Never fails.
pub fn write(level: Level, msg: &str) {
    raw_line(&format_line(&clock_now(), level, msg));
}

fn raw_line(line: &str) {
    if let Some(session) = SESSION.get()
        && let Ok(mut file) = session.file.lock()
    {
        let _ = writeln!(file, "{}", line);
    }
}

fn format_line(clock: &str, level: Level, msg: &str) -> String {
    format!("[{}] [{}] {}", clock, level.tag(), msg)
}

/// Open (truncate) the session log and mirror panics into it.
/// A log that cannot be opened is reported on stderr and otherwise ignored.
pub fn init() {
    let path = session_log_path();
    let file = match open_truncated(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("[logger] cannot open {}: {}", path.display(), e);
            return;
        }
    };
    let header_path = path.display().to_string();
    if SESSION.set(Session { path, file: Mutex::new(file) }).is_err() {
        return;
    }

    raw_line(&format!("=== pixelart session started (unix {}) ===", unix_secs()));
    raw_line(&format!("Log file: {}", header_path));
    raw_line("");

    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        write(Level::Panic, &info.to_string());
        default_hook(info);
    }));
}

fn open_truncated(path: &Path) -> std::io::Result<File> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
}

fn session_log_path() -> PathBuf {
    platform_data_dir().join("pixelart").join("pixelart.log")
}

fn platform_data_dir() -> PathBuf {
    let env_dir = |key: &str| std::env::var_os(key).map(PathBuf::from);
    let home = env_dir("HOME");

    if cfg!(target_os = "windows") {
        if let Some(appdata) = env_dir("APPDATA") {
            return appdata;
        }
    } else if cfg!(target_os = "macos") {
        if let Some(home) = &home {
            return home.join("Library").join("Application Support");
        }
    }
    env_dir("XDG_DATA_HOME")
        .or_else(|| home.map(|h| h.join(".local").join("share")))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn clock_now() -> String {
    clock_of_day(unix_secs())
}

/// HH:MM:SS (UTC) within the day.
fn clock_of_day(secs: u64) -> String {
    let day = secs % 86_400;
    format!("{:02}:{:02}:{:02}", day / 3600, (day % 3600) / 60, day % 60)
}
