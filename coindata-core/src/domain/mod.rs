//! Domain types — bars and resolutions.

pub mod bar;

pub use bar::{Bar, Resolution};
