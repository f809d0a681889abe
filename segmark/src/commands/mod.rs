use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use anyhow::{bail, Result};
use clap::{Args, Parser as ClapParser, Subcommand};
use clap_complete::Shell;
use segmark_core::{
    core::{
        persistence::AnnotationFile,
        session::Session,
        timeline::Timeline,
        video::{Frame, ProbedVideo, SyntheticVideo, VideoError, VideoInfo, VideoSource},
    },
    models::LabelSet,
};
use tracing::debug;

use crate::{configuration::Configuration, SegmarkCliError};

pub mod annotate;
pub mod completions;
pub mod init;
pub mod list;
pub mod mark;
pub mod report;

#[derive(ClapParser)]
#[command(
    name = "segmark",
    about = "Scrub through a video and mark which label is active from each frame on.",
    version
)]
pub struct SegmarkCli {
    #[command(subcommand)]
    pub command:     Commands,
    /// Specify the location of the config file. Defaults to `./segmark.json`.
    #[arg(long, global = true)]
    pub config_file: Option<PathBuf>,
    /// Log file. Defaults to `./logs/segmark.log`.
    #[arg(long, global = true)]
    pub logs:        Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default configuration file.
    Init {
        /// Overwrite an existing configuration file.
        #[arg(long)]
        force: bool,
    },
    /// Play a video in the terminal and mark segments (Triggers TUI)
    Annotate {
        #[command(flatten)]
        video: VideoArgs,
    },
    /// Start a label at a frame.
    Mark {
        #[command(flatten)]
        video: VideoArgs,
        /// Frame the label starts at. Frames past the end mark the last frame.
        #[arg(long)]
        at:    usize,
        /// Label number, `1` for the first configured label.
        #[arg(long, short('l'))]
        label: u8,
    },
    /// Remove the breakpoint at a frame.
    Unmark {
        #[command(flatten)]
        video: VideoArgs,
        #[arg(long)]
        at:    usize,
    },
    /// Print the stored breakpoints.
    List {
        #[command(flatten)]
        video: VideoArgs,
    },
    /// Print duration statistics.
    Report {
        #[command(flatten)]
        video: VideoArgs,
        /// Frame to report at. Defaults to the last frame.
        #[arg(long, conflicts_with = "every")]
        at:    Option<usize>,
        /// Report every N frames instead, one line per sampled frame.
        #[arg(long)]
        every: Option<NonZeroUsize>,
        /// Print JSON (one object per line with `--every`).
        #[arg(long)]
        json:  bool,
    },
    /// Print a shell completion script.
    Completions { shell: Shell },
}

#[derive(Debug, Clone, Args)]
pub struct VideoArgs {
    /// Video being annotated.
    pub video:       PathBuf,
    /// Annotation file. Defaults to the video path with the configured
    /// extension.
    #[arg(long)]
    pub annotations: Option<PathBuf>,
    /// Frame count of the video. Together with `--fps` skips ffprobe.
    #[arg(long, requires = "fps")]
    pub frames:      Option<usize>,
    /// Frame rate of the video. Together with `--frames` skips ffprobe.
    #[arg(long, requires = "frames")]
    pub fps:         Option<f64>,
}

impl VideoArgs {
    /// Resolves configuration, labels, video metadata and annotation file.
    #[inline]
    pub fn open(&self, config_path: &Path) -> Result<AnnotationContext> {
        let configuration = Configuration::load_or_default(config_path)?;
        let labels = configuration.label_set()?;
        if !self.video.exists() {
            bail!(SegmarkCliError::VideoNotFound(self.video.clone()));
        }
        let video = match (self.frames, self.fps) {
            (Some(frames), Some(fps)) => LoadedVideo::Synthetic(SyntheticVideo::new(frames, fps)?),
            _ => LoadedVideo::Probed(ProbedVideo::probe(&self.video)?),
        };
        let file = configuration.annotation_file(&self.video, self.annotations.as_deref());
        debug!(
            "Video {} has {} frames at {:.3} fps, annotations in {}",
            self.video.display(),
            video.info().frame_count,
            video.info().fps,
            file.path().display()
        );

        Ok(AnnotationContext {
            configuration,
            labels,
            video,
            file,
        })
    }
}

pub struct AnnotationContext {
    pub configuration: Configuration,
    pub labels:        LabelSet,
    pub video:         LoadedVideo,
    pub file:          AnnotationFile,
}

impl AnnotationContext {
    #[inline]
    pub fn info(&self) -> VideoInfo {
        *self.video.info()
    }

    /// The stored timeline, for read-only commands.
    #[inline]
    pub fn timeline(&self) -> Timeline {
        self.file.load(self.video.info().frame_count, &self.labels)
    }

    #[inline]
    pub fn into_session(self) -> (LoadedVideo, Session) {
        let session = Session::open(self.file, self.video.info().frame_count, &self.labels);
        (self.video, session)
    }
}

pub enum LoadedVideo {
    Probed(ProbedVideo),
    Synthetic(SyntheticVideo),
}

impl VideoSource for LoadedVideo {
    #[inline]
    fn info(&self) -> &VideoInfo {
        match self {
            Self::Probed(video) => video.info(),
            Self::Synthetic(video) => video.info(),
        }
    }

    #[inline]
    fn read(&mut self, index: usize) -> Result<Option<Frame>, VideoError> {
        match self {
            Self::Probed(video) => video.read(index),
            Self::Synthetic(video) => video.read(index),
        }
    }
}
