use std::{
    io::{self, BufWriter, Write},
    num::NonZeroUsize,
    path::Path,
};

use anyhow::Result;
use segmark_core::core::timeline::Timeline;
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    commands::VideoArgs,
    components::stats_panel::StatLine,
    utils::time_display::{frames_to_timecode, position_timecode},
};

/// Duration statistics of the timeline at one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub frame:       usize,
    pub timecode:    String,
    pub current:     Option<String>,
    /// Frames since the first breakpoint.
    pub elapsed:     usize,
    pub denominator: usize,
    pub durations:   Vec<StatLine>,
}

impl ReportEntry {
    #[inline]
    pub fn new(timeline: &Timeline, frame: usize, fps: f64) -> Self {
        let stat = timeline.stat(frame);
        Self {
            frame,
            timecode: frames_to_timecode(frame, fps),
            current: stat
                .current
                .and_then(|label| timeline.labels().name(label))
                .map(str::to_owned),
            elapsed: stat.durations.total(),
            denominator: stat.denominator(),
            durations: StatLine::collect(&stat, timeline.labels(), fps),
        }
    }

    /// `position current | label: time (share) | ...` on a single line.
    #[inline]
    pub fn line(&self, last_index: usize, fps: f64) -> String {
        let mut line = format!(
            "{} {}",
            position_timecode(self.frame, last_index, fps),
            self.current.as_deref().unwrap_or("---")
        );
        for duration in &self.durations {
            line.push_str(" | ");
            line.push_str(&duration.text());
        }
        line
    }
}

pub fn report_handler(
    config_path: &Path,
    args: &VideoArgs,
    at: Option<usize>,
    every: Option<NonZeroUsize>,
    json: bool,
) -> Result<()> {
    let context = args.open(config_path)?;
    let info = context.info();
    let timeline = context.timeline();
    let last_index = info.last_index();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if let Some(every) = every {
        info!("Reporting every {} frames of {}", every, info.frame_count);
        for frame in (0..info.frame_count).step_by(every.get()) {
            let entry = ReportEntry::new(&timeline, frame, info.fps);
            if json {
                writeln!(out, "{}", serde_json::to_string(&entry)?)?;
            } else {
                writeln!(out, "{}", entry.line(last_index, info.fps))?;
            }
        }
        out.flush()?;
        return Ok(());
    }

    let frame = match at {
        Some(at) if at > last_index => {
            warn!("Frame {} is past the end of the video, reporting frame {}", at, last_index);
            last_index
        },
        Some(at) => at,
        None => last_index,
    };
    let entry = ReportEntry::new(&timeline, frame, info.fps);
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&entry)?)?;
    } else {
        writeln!(
            out,
            "{} {}",
            position_timecode(entry.frame, last_index, info.fps),
            entry.current.as_deref().unwrap_or("---")
        )?;
        for duration in &entry.durations {
            writeln!(out, "{}", duration.text())?;
        }
    }
    out.flush()?;

    Ok(())
}
