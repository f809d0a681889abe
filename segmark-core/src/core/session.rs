use thiserror::Error;
use tracing::{debug, info};

use crate::{
    core::{
        persistence::{AnnotationFile, PersistError},
        timeline::{Timeline, TimelineError},
    },
    models::{Breakpoint, Label, LabelSet},
};

pub type SaveCallback = Box<dyn FnMut(&[Breakpoint]) -> Result<(), PersistError>>;

/// A timeline that flushes itself after every mutation.
pub struct Session {
    timeline:      Timeline,
    save_callback: SaveCallback,
}

impl Session {
    #[inline]
    pub fn new(timeline: Timeline, save_callback: SaveCallback) -> Self {
        Self {
            timeline,
            save_callback,
        }
    }

    /// Restores the timeline stored in `file` and saves every later change back
    /// to it.
    #[inline]
    pub fn open(file: AnnotationFile, frame_count: usize, labels: &LabelSet) -> Self {
        let timeline = file.load(frame_count, labels);
        info!(
            "Opened {} with {} breakpoints",
            file.path().display(),
            timeline.breakpoints().len()
        );
        Self::new(
            timeline,
            Box::new(move |breakpoints: &[Breakpoint]| file.save(breakpoints)),
        )
    }

    #[inline]
    pub const fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Starts `label` at `index` and saves. When saving fails the change is
    /// kept in memory and [`SessionError::Save`] is returned.
    #[inline]
    pub fn assign(&mut self, index: usize, label: Label) -> Result<usize, SessionError> {
        let index = self.timeline.insert(index, label)?;
        self.flush()?;
        Ok(index)
    }

    /// Removes the breakpoint at `index` and saves. Removing nothing leaves
    /// the file untouched.
    #[inline]
    pub fn remove(&mut self, index: usize) -> Result<bool, SessionError> {
        let removed = self.timeline.remove(index);
        if removed {
            self.flush()?;
        }
        Ok(removed)
    }

    #[inline]
    pub fn flush(&mut self) -> Result<(), SessionError> {
        (self.save_callback)(self.timeline.breakpoints())?;
        debug!("Flushed {} breakpoints", self.timeline.breakpoints().len());
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Timeline(#[from] TimelineError),
    /// The mutation was applied but could not be persisted.
    #[error("Annotations were not saved: {0}")]
    Save(#[from] PersistError),
}
