use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::{commands::VideoArgs, utils::time_display::frames_to_timecode};

/// Starts `label` at frame `at` and saves the annotation file.
pub fn mark_handler(config_path: &Path, args: &VideoArgs, at: usize, label: u8) -> Result<()> {
    let context = args.open(config_path)?;
    let label = context.labels.label(label)?;
    let name = context.labels.name(label).unwrap_or_default().to_owned();
    let fps = context.info().fps;
    let (_, mut session) = context.into_session();

    let index = session
        .assign(at, label)
        .with_context(|| format!("Failed to mark frame {}", at))?;
    if index != at {
        warn!("Frame {} is past the end of the video, marked frame {} instead", at, index);
    }
    info!(
        "Marked frame {} as {}, {} breakpoints stored",
        index,
        name,
        session.timeline().breakpoints().len()
    );
    println!("{} {} {} {}", index, frames_to_timecode(index, fps), label, name);

    Ok(())
}

/// Removes the breakpoint at frame `at`, if any, and saves the annotation file.
pub fn unmark_handler(config_path: &Path, args: &VideoArgs, at: usize) -> Result<()> {
    let context = args.open(config_path)?;
    let (_, mut session) = context.into_session();

    let removed = session
        .remove(at)
        .with_context(|| format!("Failed to unmark frame {}", at))?;
    if removed {
        info!("Removed the breakpoint at frame {}", at);
        println!("removed {}", at);
    } else {
        warn!("No breakpoint at frame {}", at);
        println!("unchanged {}", at);
    }

    Ok(())
}
