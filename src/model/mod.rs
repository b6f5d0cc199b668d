//! Presentation document model.
//!
//! A slide is split into a tree of typed shapes (text, picture, group,
//! other) over the underlying XML, so substitution code can walk shapes,
//! paragraphs and runs without touching markup it does not understand.

mod image;
mod shape;
mod slide;
mod text;

pub use image::*;
pub use shape::*;
pub use slide::*;
pub use text::*;
