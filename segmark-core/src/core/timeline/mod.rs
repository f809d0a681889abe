use thiserror::Error;
use tracing::debug;

use crate::models::{Breakpoint, Label, LabelSet};

pub mod coalesce;
pub mod query;


pub use query::{Durations, Stat};

/// The breakpoint store: an always sorted, always coalesced sequence of label
/// changes over the frames `0..frame_count`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    frame_count: usize,
    labels:      LabelSet,
    breakpoints: Vec<Breakpoint>,
}

impl Timeline {
    #[inline]
    pub fn new(frame_count: usize, labels: LabelSet) -> Self {
        Self {
            frame_count,
            labels,
            breakpoints: Vec::new(),
        }
    }

    /// Builds a timeline from previously stored breakpoints. They must be
    /// strictly ascending, inside the frame range and members of `labels`;
    /// redundant breakpoints are coalesced away.
    #[inline]
    pub fn from_breakpoints(
        frame_count: usize,
        labels: LabelSet,
        mut breakpoints: Vec<Breakpoint>,
    ) -> Result<Self, TimelineError> {
        for (position, breakpoint) in breakpoints.iter().enumerate() {
            if !labels.contains(breakpoint.label) {
                return Err(TimelineError::UnknownLabel(breakpoint.label));
            }
            if breakpoint.index >= frame_count {
                return Err(TimelineError::OutOfRange {
                    index: breakpoint.index,
                    frame_count,
                });
            }
            if position > 0 && breakpoints[position - 1].index >= breakpoint.index {
                return Err(TimelineError::Unordered(breakpoint.index));
            }
        }
        coalesce::coalesce(&mut breakpoints);

        Ok(Self {
            frame_count,
            labels,
            breakpoints,
        })
    }

    #[inline]
    pub const fn frame_count(&self) -> usize {
        self.frame_count
    }

    #[inline]
    pub const fn labels(&self) -> &LabelSet {
        &self.labels
    }

    #[inline]
    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }

    /// Last valid frame index.
    #[inline]
    pub const fn last_index(&self) -> usize {
        self.frame_count.saturating_sub(1)
    }

    /// Label active at `index`.
    #[inline]
    pub fn find(&self, index: usize) -> Option<Label> {
        query::find(&self.breakpoints, index)
    }

    #[inline]
    pub fn position(&self, index: usize) -> Option<usize> {
        query::position(&self.breakpoints, index)
    }

    #[inline]
    pub fn stat(&self, index: usize) -> Stat {
        query::stat(&self.breakpoints, &self.labels, index)
    }

    /// Starts `label` at `index`, overwriting any breakpoint already there.
    /// Out of range indices are clamped to the video; the index actually used
    /// is returned. A timeline without frames accepts no breakpoints.
    #[inline]
    pub fn insert(&mut self, index: usize, label: Label) -> Result<usize, TimelineError> {
        if self.frame_count == 0 {
            return Err(TimelineError::NoFrames);
        }
        if !self.labels.contains(label) {
            return Err(TimelineError::UnknownLabel(label));
        }
        let index = index.min(self.last_index());
        let position = match self.breakpoints.binary_search_by_key(&index, |bp| bp.index) {
            Ok(position) => {
                self.breakpoints[position].label = label;
                position
            },
            Err(position) => {
                self.breakpoints.insert(position, Breakpoint::new(index, label));
                position
            },
        };
        coalesce::coalesce_near(&mut self.breakpoints, position);
        debug_assert!(coalesce::is_canonical(&self.breakpoints));
        debug!("Inserted label {} at frame {}", label, index);

        Ok(index)
    }

    /// Removes the breakpoint exactly at `index`. Returns `false` when there
    /// was none.
    #[inline]
    pub fn remove(&mut self, index: usize) -> bool {
        let Ok(position) = self.breakpoints.binary_search_by_key(&index, |bp| bp.index) else {
            return false;
        };
        self.breakpoints.remove(position);
        coalesce::coalesce_near(&mut self.breakpoints, position);
        debug_assert!(coalesce::is_canonical(&self.breakpoints));
        debug!("Removed breakpoint at frame {}", index);

        true
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimelineError {
    #[error("Label {0} is not part of the label set")]
    UnknownLabel(Label),
    #[error("Breakpoint at frame {index} is outside the video ({frame_count} frames)")]
    OutOfRange { index: usize, frame_count: usize },
    #[error("Breakpoint at frame {0} is not after the previous breakpoint")]
    Unordered(usize),
    #[error("The timeline has no frames")]
    NoFrames,
}
