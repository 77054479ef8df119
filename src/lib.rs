//! Minimal pixel-art editor: arrow-key cursor, paint, sample and pick colors,
//! PNG open/save, one window per open image.

pub mod logger;

pub mod app;
pub mod canvas;
pub mod components;
pub mod controller;
pub mod io;
pub mod project;
pub mod settings;
pub mod state;
