use serde::{Deserialize, Serialize};

use crate::models::label::Label;

/// From `index` onward, until the next breakpoint, the active label is
/// `label`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Breakpoint {
    pub index: usize,
    pub label: Label,
}

impl Breakpoint {
    #[inline]
    pub const fn new(index: usize, label: Label) -> Self {
        Self {
            index,
            label,
        }
    }
}
