//! Paint model for draw commands.
//!
//! Colors are linear and premultiplied; every device blends with
//! `src + dst * (1 - src.a)`.

pub mod color;

pub use color::Color;
