//! Selector grammar and line scanning.

pub mod line;
pub mod selector;

pub use line::IndentationPolicy;
pub use selector::Selector;
