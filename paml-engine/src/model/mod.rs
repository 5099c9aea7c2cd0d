//! Document model: elements, text, flags and embed modes.

pub mod flags;
pub mod mode;
pub mod nodes;

pub use flags::{FormatFlag, FormatFlags};
pub use mode::{EmbedKind, EmbedMode, ModeModifiers};
pub use nodes::{can_span_one_line, is_text_only, Attribute, Document, Element, Node};
