//! Placeholder substitution over a slide's shapes.
//!
//! Three passes cover the template's three kinds of placeholder:
//!
//! - [`replace_in_runs`]: a marker inside a run (`[TOPIC]`), replaced in
//!   place so the surrounding text and formatting stay.
//! - [`replace_titles`]: positional `[TITLE-i]` labels, possibly nested in
//!   groups, whose whole shape text becomes the i-th item of a list.
//! - [`fill_content_slide`]: whole-shape text from a placeholder map plus
//!   positional picture replacement.
//!
//! Missing markers and missing images are never errors; each pass returns
//! how much it changed.

mod content;
mod runs;
mod titles;

pub use content::{fill_content_slide, ContentFill, Replacements};
pub use runs::replace_in_runs;
pub use titles::{replace_titles, TitleLabels};
