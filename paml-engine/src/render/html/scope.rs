//! Format flag scopes.
//!
//! One scope per rendered element. A flag is active when any open scope sets
//! it; `SINGLE_LINE` is the exception, see [`single_line_wins`].

use crate::model::{FormatFlag, FormatFlags};

/// `SINGLE_LINE` is honoured only when it is set in a scope strictly deeper
/// than every scope setting `PRESERVE`. A tie goes to `PRESERVE`.
pub fn single_line_wins(single_line: Option<usize>, preserve: Option<usize>) -> bool {
    match (single_line, preserve) {
        (Some(single_line), Some(preserve)) => single_line > preserve,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FlagScopes {
    scopes: Vec<FormatFlags>,
}

impl FlagScopes {
    pub fn new() -> Self {
        Self {
            scopes: vec![FormatFlags::empty()],
        }
    }

    /// `SINGLE_LINE` brings `NORMALIZE` along.
    pub fn push(&mut self, mut flags: FormatFlags) {
        if flags.contains(FormatFlag::SingleLine) {
            flags.insert(FormatFlag::Normalize);
        }
        self.scopes.push(flags);
    }

    pub fn pop(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Index of the deepest scope setting `flag`.
    fn deepest(&self, flag: FormatFlag) -> Option<usize> {
        self.scopes.iter().rposition(|scope| scope.contains(flag))
    }

    pub fn has(&self, flag: FormatFlag) -> bool {
        match flag {
            FormatFlag::SingleLine => single_line_wins(
                self.deepest(FormatFlag::SingleLine),
                self.deepest(FormatFlag::Preserve),
            ),
            _ => self.deepest(flag).is_some(),
        }
    }
}
