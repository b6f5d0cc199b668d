//! PPTX (PowerPoint) presentation package.
//!
//! Loads the slides of a presentation in `sldIdLst` order and writes the
//! package back with modified slides and newly embedded media.

mod presentation;

pub use presentation::Presentation;
