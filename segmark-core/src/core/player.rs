use std::time::Duration;

use anyhow::{ensure, Result};
use tracing::{debug, info, warn};

use crate::{
    core::{
        command::{Command, Direction},
        session::{Session, SessionError},
        timeline::Stat,
        video::{Frame, VideoInfo, VideoSource},
    },
    models::{Breakpoint, Label, LabelSet},
};

pub const DEFAULT_SEEK_SECONDS: f64 = 5.0;

pub trait InputSource {
    /// Waits up to `timeout` for the next command. `None` means the timeout
    /// elapsed; an exhausted source yields [`Command::Quit`].
    fn next_command(&mut self, timeout: Duration) -> Result<Option<Command>>;
}

pub trait Presenter {
    fn present(&mut self, frame: &Frame, view: &PlaybackView) -> Result<()>;
}

/// Everything a presenter needs to draw the current frame's overlay.
#[derive(Debug)]
pub struct PlaybackView<'a> {
    pub position:     usize,
    pub frame_count:  usize,
    pub fps:          f64,
    pub paused:       bool,
    pub stat:         Stat,
    pub breakpoints:  &'a [Breakpoint],
    pub labels:       &'a LabelSet,
    /// Reason the last save failed, cleared by the next successful save.
    pub save_failure: Option<&'a str>,
}

impl PlaybackView<'_> {
    #[inline]
    pub fn current(&self) -> Option<Label> {
        self.stat.current
    }

    #[inline]
    pub const fn last_index(&self) -> usize {
        self.frame_count.saturating_sub(1)
    }
}

/// Single-threaded playback loop: present a frame, wait one frame interval for
/// a command, apply it, move on.
pub struct Player<V, I, P>
where
    V: VideoSource,
    I: InputSource,
    P: Presenter,
{
    video:        V,
    input:        I,
    presenter:    P,
    session:      Session,
    seek_seconds: f64,
    position:     usize,
    paused:       bool,
    save_failure: Option<String>,
}

impl<V, I, P> Player<V, I, P>
where
    V: VideoSource,
    I: InputSource,
    P: Presenter,
{
    #[inline]
    pub fn new(video: V, input: I, presenter: P, session: Session) -> Self {
        Self {
            video,
            input,
            presenter,
            session,
            seek_seconds: DEFAULT_SEEK_SECONDS,
            position: 0,
            paused: false,
            save_failure: None,
        }
    }

    /// How far a seek jumps while playing.
    #[inline]
    #[must_use]
    pub fn with_seek_seconds(mut self, seek_seconds: f64) -> Self {
        self.seek_seconds = seek_seconds;
        self
    }

    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub const fn paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[inline]
    pub fn into_parts(self) -> (Session, P) {
        (self.session, self.presenter)
    }

    /// Runs until the input asks to quit or the video ends.
    #[tracing::instrument(skip_all)]
    #[inline]
    pub fn run(&mut self) -> Result<()> {
        let info = *self.video.info();
        ensure!(
            info.frame_count == self.session.timeline().frame_count(),
            "Video has {} frames but the timeline expects {}",
            info.frame_count,
            self.session.timeline().frame_count()
        );
        ensure!(
            self.seek_seconds.is_finite() && self.seek_seconds > 0.0,
            "Seek distance must be a positive number of seconds, got {}",
            self.seek_seconds
        );
        info!("Playing {} frames at {:.3} fps", info.frame_count, info.fps);

        let interval = info.frame_interval();
        loop {
            let Some(frame) = self.video.read(self.position)? else {
                info!("End of stream at frame {}", self.position);
                break;
            };
            self.present(&frame, &info)?;

            let command = self.input.next_command(interval)?;
            if !self.step(command, &info) {
                info!("Stopped at frame {}", self.position);
                break;
            }
        }

        Ok(())
    }

    fn present(&mut self, frame: &Frame, info: &VideoInfo) -> Result<()> {
        let timeline = self.session.timeline();
        let view = PlaybackView {
            position:     self.position,
            frame_count:  info.frame_count,
            fps:          info.fps,
            paused:       self.paused,
            stat:         timeline.stat(self.position),
            breakpoints:  timeline.breakpoints(),
            labels:       timeline.labels(),
            save_failure: self.save_failure.as_deref(),
        };
        self.presenter.present(frame, &view)
    }

    /// Applies one event. Returns `false` once the player should stop.
    fn step(&mut self, command: Option<Command>, info: &VideoInfo) -> bool {
        match command {
            Some(Command::Quit) => return false,
            // A seek replaces the regular advance.
            Some(Command::Seek(direction)) => {
                let step = if self.paused { 1 } else { self.seek_step(info.fps) };
                self.position = direction.apply(self.position, step, info.last_index());
                debug!("Seek {} to frame {}", direction, self.position);
                return true;
            },
            Some(Command::TogglePause) => {
                self.paused = !self.paused;
                debug!("Paused: {}", self.paused);
            },
            Some(Command::Assign(value)) => self.assign(value),
            Some(Command::Remove) => self.remove(),
            None => (),
        }
        if !self.paused {
            self.position = Direction::Forward.apply(self.position, 1, info.last_index());
        }

        true
    }

    fn seek_step(&self, fps: f64) -> usize {
        ((self.seek_seconds * fps) as usize).max(1)
    }

    fn assign(&mut self, value: u8) {
        let Some(label) = Label::new(value) else {
            warn!("Ignoring label 0");
            return;
        };
        let result = self.session.assign(self.position, label).map(|_| ());
        self.record(result);
    }

    fn remove(&mut self) {
        match self.session.remove(self.position) {
            // Nothing was saved, so an earlier save failure still stands.
            Ok(false) => debug!("No breakpoint at frame {}", self.position),
            result => self.record(result.map(|_| ())),
        }
    }

    fn record(&mut self, result: Result<(), SessionError>) {
        match result {
            Ok(()) => self.save_failure = None,
            Err(SessionError::Save(error)) => {
                warn!("{}", error);
                self.save_failure = Some(error.to_string());
            },
            Err(error @ SessionError::Timeline(_)) => warn!("Ignoring command: {}", error),
        }
    }
}
