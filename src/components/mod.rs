pub mod colors;
pub mod view;
