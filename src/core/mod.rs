// ABOUTME: Presentation object model: decks, slides, layouts and placeholders
// ABOUTME: Wraps the raw package parts with slide-level editing operations

pub mod layout;
pub mod placeholder;
pub mod presentation;
pub mod slide;

pub use layout::{LayoutInfo, LayoutPlaceholder};
pub use placeholder::PlaceholderMap;
pub use presentation::{LayoutRef, Presentation};
pub use slide::{ShapeSummary, Slide, SlideDescription};
