// ABOUTME: Open XML package adapter for PresentationML
// ABOUTME: ZIP container, XML element tree, relationships, shapes, text and theme parts

pub mod blank;
pub mod notes;
pub mod ns;
pub mod package;
pub mod rels;
pub mod shapes;
pub mod text;
pub mod theme;
pub mod xml;

pub use package::Package;
pub use rels::{Relationship, Relationships};
pub use shapes::{PlaceholderInfo, Position, ShapeInfo, ShapeKind};
pub use text::RunStyle;
pub use theme::ThemeInfo;
pub use xml::Element;
