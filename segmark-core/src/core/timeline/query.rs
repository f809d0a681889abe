//! Read-only lookups and duration statistics over a canonical breakpoint
//! sequence.

use itertools::Itertools;
use serde::Serialize;

use crate::models::{Breakpoint, Label, LabelSet};

/// Position of the last breakpoint whose index is `<= query`.
#[inline]
pub fn position(breakpoints: &[Breakpoint], query: usize) -> Option<usize> {
    breakpoints.partition_point(|breakpoint| breakpoint.index <= query).checked_sub(1)
}

/// Label active at `query`.
#[inline]
pub fn find(breakpoints: &[Breakpoint], query: usize) -> Option<Label> {
    position(breakpoints, query).map(|position| breakpoints[position].label)
}

/// Cumulative frames per label from the first breakpoint up to `query`,
/// including the open segment that contains `query`.
#[inline]
pub fn stat(breakpoints: &[Breakpoint], labels: &LabelSet, query: usize) -> Stat {
    let mut durations = Durations::new(labels.len());
    let Some(position) = position(breakpoints, query) else {
        return Stat {
            current: None,
            durations,
            terminal: labels.terminal(),
        };
    };

    for (a, b) in breakpoints[..=position].iter().tuple_windows() {
        durations.add(a.label, b.index - a.index);
    }
    let open = breakpoints[position];
    durations.add(open.label, query - open.index);

    Stat {
        current: Some(open.label),
        durations,
        terminal: labels.terminal(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Durations {
    per_label: Vec<usize>,
    total:     usize,
}

impl Durations {
    #[inline]
    pub fn new(label_count: usize) -> Self {
        Self {
            per_label: vec![0; label_count],
            total:     0,
        }
    }

    fn add(&mut self, label: Label, frames: usize) {
        if let Some(slot) = self.per_label.get_mut(label.slot()) {
            *slot += frames;
            self.total += frames;
        }
    }

    /// Frames attributed to `label`. Labels outside the set have none.
    #[inline]
    pub fn of(&self, label: Label) -> usize {
        self.per_label.get(label.slot()).copied().unwrap_or_default()
    }

    #[inline]
    pub const fn total(&self) -> usize {
        self.total
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (Label, usize)> + '_ {
        self.per_label.iter().enumerate().filter_map(|(slot, frames)| {
            u8::try_from(slot + 1).ok().and_then(Label::new).map(|label| (label, *frames))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stat {
    pub current:   Option<Label>,
    pub durations: Durations,
    #[serde(skip)]
    terminal:      Option<Label>,
}

impl Stat {
    /// Frames the percentages are relative to. The terminal label's frames are
    /// excluded and an empty span counts as one frame.
    #[inline]
    pub fn denominator(&self) -> usize {
        let terminal = self.terminal.map_or(0, |label| self.durations.of(label));
        (self.durations.total() - terminal).max(1)
    }

    /// Fraction of the denominator spent in `label`.
    #[inline]
    pub fn share(&self, label: Label) -> f64 {
        if self.terminal == Some(label) {
            return 0.0;
        }
        self.durations.of(label) as f64 / self.denominator() as f64
    }
}
