use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::{commands::VideoArgs, utils::time_display::frames_to_timecode};

/// Prints one `frame  timecode  label name` row per stored breakpoint.
pub fn list_handler(config_path: &Path, args: &VideoArgs) -> Result<()> {
    let context = args.open(config_path)?;
    let info = context.info();
    let timeline = context.timeline();
    info!(
        "{} breakpoints in {}",
        timeline.breakpoints().len(),
        context.file.path().display()
    );

    for breakpoint in timeline.breakpoints() {
        println!(
            "{:>8}  {}  {} {}",
            breakpoint.index,
            frames_to_timecode(breakpoint.index, info.fps),
            breakpoint.label,
            timeline.labels().name(breakpoint.label).unwrap_or_default()
        );
    }

    Ok(())
}
