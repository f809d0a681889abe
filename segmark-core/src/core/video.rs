use std::{
    io,
    path::{Path, PathBuf},
    process::Command,
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// What the annotation session needs to know about a video.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoInfo {
    pub frame_count: usize,
    pub fps:         f64,
    pub resolution:  Option<(u32, u32)>,
}

impl VideoInfo {
    #[inline]
    pub fn new(frame_count: usize, fps: f64) -> Result<Self, VideoError> {
        if frame_count == 0 {
            return Err(VideoError::NoFrames);
        }
        if !fps.is_finite() || fps <= 0.0 {
            return Err(VideoError::InvalidFrameRate(fps.to_string()));
        }
        Ok(Self {
            frame_count,
            fps,
            resolution: None,
        })
    }

    #[inline]
    pub const fn last_index(&self) -> usize {
        self.frame_count.saturating_sub(1)
    }

    /// Time between two frames during playback.
    #[inline]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps)
    }

    #[inline]
    pub fn timestamp(&self, index: usize) -> Duration {
        Duration::from_secs_f64(index as f64 / self.fps)
    }
}

/// A decoded (or located) frame handed to the presenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub index:     usize,
    pub timestamp: Duration,
}

pub trait VideoSource {
    fn info(&self) -> &VideoInfo;

    /// The frame at `index`, or `None` past the end of the stream.
    fn read(&mut self, index: usize) -> Result<Option<Frame>, VideoError>;
}

/// A video on disk, known through its `ffprobe` metadata. Frames carry their
/// position and timestamp, no pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbedVideo {
    path: PathBuf,
    info: VideoInfo,
}

impl ProbedVideo {
    /// Reads frame count, frame rate and resolution of the first video stream
    /// with `ffprobe`.
    #[inline]
    pub fn probe(path: &Path) -> Result<Self, VideoError> {
        if !path.exists() {
            return Err(VideoError::VideoFileNotFound(path.to_path_buf()));
        }
        if which::which("ffprobe").is_err() {
            return Err(VideoError::FfprobeNotInstalled);
        }
        let output = Command::new("ffprobe")
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=width,height,r_frame_rate,avg_frame_rate,nb_frames,duration",
                "-of",
                "json",
            ])
            .arg(path)
            .output()
            .map_err(VideoError::Spawn)?;
        if !output.status.success() {
            return Err(VideoError::ProbeFailed {
                path:   path.to_path_buf(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        let info = parse_ffprobe_json(&output.stdout).map_err(|error| error.with_path(path))?;
        debug!("Probed {}: {:?}", path.display(), info);

        Ok(Self {
            path: path.to_path_buf(),
            info,
        })
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VideoSource for ProbedVideo {
    #[inline]
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    #[inline]
    fn read(&mut self, index: usize) -> Result<Option<Frame>, VideoError> {
        Ok(frame_at(&self.info, index))
    }
}

/// A video described only by frame count and frame rate, used when the
/// caller already knows both.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticVideo {
    info: VideoInfo,
}

impl SyntheticVideo {
    #[inline]
    pub fn new(frame_count: usize, fps: f64) -> Result<Self, VideoError> {
        Ok(Self {
            info: VideoInfo::new(frame_count, fps)?,
        })
    }
}

impl VideoSource for SyntheticVideo {
    #[inline]
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    #[inline]
    fn read(&mut self, index: usize) -> Result<Option<Frame>, VideoError> {
        Ok(frame_at(&self.info, index))
    }
}

fn frame_at(info: &VideoInfo, index: usize) -> Option<Frame> {
    (index < info.frame_count).then(|| Frame {
        index,
        timestamp: info.timestamp(index),
    })
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    width:          Option<u32>,
    height:         Option<u32>,
    r_frame_rate:   Option<String>,
    avg_frame_rate: Option<String>,
    nb_frames:      Option<String>,
    duration:       Option<String>,
}

/// Extracts [`VideoInfo`] from `ffprobe -of json` output. Streams without a
/// frame count fall back to `duration * fps`.
#[inline]
pub fn parse_ffprobe_json(json: &[u8]) -> Result<VideoInfo, VideoError> {
    let output: FfprobeOutput = serde_json::from_slice(json).map_err(VideoError::Parse)?;
    let stream = output.streams.into_iter().next().ok_or(VideoError::NoVideoStream(None))?;

    let fps = [&stream.avg_frame_rate, &stream.r_frame_rate]
        .into_iter()
        .flatten()
        .find_map(|rate| parse_frame_rate(rate))
        .ok_or_else(|| {
            VideoError::InvalidFrameRate(
                stream.r_frame_rate.clone().unwrap_or_else(|| "missing".to_owned()),
            )
        })?;

    let frame_count = stream
        .nb_frames
        .as_deref()
        .and_then(|frames| frames.parse::<usize>().ok())
        .filter(|frames| *frames > 0)
        .or_else(|| {
            stream
                .duration
                .as_deref()
                .and_then(|duration| duration.parse::<f64>().ok())
                .map(|duration| (duration * fps).round() as usize)
        })
        .unwrap_or_default();

    let mut info = VideoInfo::new(frame_count, fps)?;
    info.resolution = stream.width.zip(stream.height);

    Ok(info)
}

/// Parses `num/den` (or a plain number) into frames per second.
fn parse_frame_rate(rate: &str) -> Option<f64> {
    let fps = match rate.split_once('/') {
        Some((numerator, denominator)) => {
            let numerator = numerator.trim().parse::<f64>().ok()?;
            let denominator = denominator.trim().parse::<f64>().ok()?;
            (denominator != 0.0).then(|| numerator / denominator)?
        },
        None => rate.trim().parse::<f64>().ok()?,
    };
    (fps.is_finite() && fps > 0.0).then_some(fps)
}

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("Video file not found: {0}")]
    VideoFileNotFound(PathBuf),
    #[error("ffprobe is not installed or not in PATH; pass --frames and --fps instead")]
    FfprobeNotInstalled,
    #[error("Failed to run ffprobe: {0}")]
    Spawn(io::Error),
    #[error("ffprobe failed on {path}: {stderr}")]
    ProbeFailed { path: PathBuf, stderr: String },
    #[error("Failed to parse ffprobe output: {0}")]
    Parse(serde_json::Error),
    #[error("No video stream found{}", .0.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    NoVideoStream(Option<PathBuf>),
    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(String),
    #[error("Video has no frames")]
    NoFrames,
}

impl VideoError {
    fn with_path(self, path: &Path) -> Self {
        match self {
            Self::NoVideoStream(None) => Self::NoVideoStream(Some(path.to_path_buf())),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ffprobe_stream() {
        let json = br#"{
            "programs": [],
            "streams": [
                {
                    "width": 1920,
                    "height": 1080,
                    "r_frame_rate": "30000/1001",
                    "avg_frame_rate": "30000/1001",
                    "nb_frames": "1438",
                    "duration": "47.981267"
                }
            ]
        }"#;
        let info = parse_ffprobe_json(json).expect("valid probe output");
        assert_eq!(info.frame_count, 1438);
        assert!((info.fps - 29.970_029_970_029_97).abs() < 1e-9);
        assert_eq!(info.resolution, Some((1920, 1080)));
    }

    #[test]
    fn falls_back_to_duration_and_real_frame_rate() {
        let json = br#"{"streams": [{"r_frame_rate": "25/1", "avg_frame_rate": "0/0", "duration": "10.0"}]}"#;
        let info = parse_ffprobe_json(json).expect("valid probe output");
        assert_eq!(info.frame_count, 250);
        assert!((info.fps - 25.0).abs() < f64::EPSILON);
        assert_eq!(info.resolution, None);
    }

    #[test]
    fn rejects_unusable_probe_output() {
        assert!(matches!(
            parse_ffprobe_json(br#"{"streams": []}"#),
            Err(VideoError::NoVideoStream(None))
        ));
        assert!(matches!(
            parse_ffprobe_json(br#"{"streams": [{"r_frame_rate": "0/0", "nb_frames": "3"}]}"#),
            Err(VideoError::InvalidFrameRate(_))
        ));
        assert!(matches!(
            parse_ffprobe_json(br#"{"streams": [{"r_frame_rate": "24/1"}]}"#),
            Err(VideoError::NoFrames)
        ));
        assert!(matches!(parse_ffprobe_json(b"not json"), Err(VideoError::Parse(_))));
    }

    #[test]
    fn frames_end_at_frame_count() {
        let mut video = SyntheticVideo::new(3, 2.0).expect("valid info");
        let frame = video.read(2).expect("readable").expect("inside the video");
        assert_eq!(frame.timestamp, Duration::from_secs(1));
        assert_eq!(video.read(3).expect("readable"), None);
    }

    #[test]
    fn synthetic_video_needs_frames_and_a_frame_rate() {
        assert!(matches!(SyntheticVideo::new(0, 25.0), Err(VideoError::NoFrames)));
        assert!(matches!(
            SyntheticVideo::new(10, 0.0),
            Err(VideoError::InvalidFrameRate(_))
        ));
        assert!(matches!(
            SyntheticVideo::new(10, f64::NAN),
            Err(VideoError::InvalidFrameRate(_))
        ));
    }

    #[test]
    fn missing_video_is_reported() {
        let error = ProbedVideo::probe(Path::new("/definitely/not/here.mp4")).expect_err("missing");
        assert!(matches!(error, VideoError::VideoFileNotFound(_)));
    }
}
