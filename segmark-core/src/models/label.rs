use std::{fmt, num::NonZeroU8};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest label enumeration supported. Each label maps to a digit key.
pub const MAX_LABELS: u8 = 9;

pub const DEFAULT_LABEL_NAMES: [&str; 3] = ["manual", "autonomous", "parked"];

/// A label identifier: a small positive integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Label(NonZeroU8);

impl Label {
    #[inline]
    pub const fn new(value: u8) -> Option<Self> {
        match NonZeroU8::new(value) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0.get()
    }

    /// Zero-based slot of this label in per-label tables.
    #[inline]
    pub const fn slot(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

impl TryFrom<u8> for Label {
    type Error = LabelError;

    #[inline]
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(LabelError::Zero)
    }
}

impl From<Label> for u8 {
    #[inline]
    fn from(label: Label) -> Self {
        label.get()
    }
}

impl fmt::Display for Label {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

/// The closed label enumeration of a session: labels `1..=len` with a display
/// name each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    names:    Vec<String>,
    /// Marks the end of the annotated activity. Its duration is left out of
    /// percentage denominators.
    terminal: Option<Label>,
}

impl LabelSet {
    #[inline]
    pub fn new(names: Vec<String>, terminal: Option<u8>) -> Result<Self, LabelError> {
        if names.is_empty() {
            return Err(LabelError::Empty);
        }
        if names.len() > MAX_LABELS as usize {
            return Err(LabelError::TooMany(names.len()));
        }
        let mut set = Self {
            names,
            terminal: None,
        };
        set.terminal = terminal.map(|value| set.label(value)).transpose()?;

        Ok(set)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[inline]
    pub fn contains(&self, label: Label) -> bool {
        label.slot() < self.names.len()
    }

    /// Resolves a raw label number against this set.
    #[inline]
    pub fn label(&self, value: u8) -> Result<Label, LabelError> {
        let label = Label::try_from(value)?;
        if !self.contains(label) {
            return Err(LabelError::Unknown {
                label: value,
                count: self.names.len(),
            });
        }
        Ok(label)
    }

    #[inline]
    pub fn name(&self, label: Label) -> Option<&str> {
        self.names.get(label.slot()).map(String::as_str)
    }

    #[inline]
    pub const fn terminal(&self) -> Option<Label> {
        self.terminal
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (Label, &str)> + '_ {
        self.names.iter().enumerate().filter_map(|(slot, name)| {
            u8::try_from(slot + 1)
                .ok()
                .and_then(Label::new)
                .map(|label| (label, name.as_str()))
        })
    }
}

impl Default for LabelSet {
    #[inline]
    fn default() -> Self {
        Self {
            names:    DEFAULT_LABEL_NAMES.iter().map(|name| (*name).to_owned()).collect(),
            terminal: None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("Label 0 is reserved; labels start at 1")]
    Zero,
    #[error("Label {label} is not part of the label set (1..={count})")]
    Unknown { label: u8, count: usize },
    #[error("A label set needs at least one label")]
    Empty,
    #[error("A label set holds at most 9 labels, got {0}")]
    TooMany(usize),
}
