use std::path::Path;

use anyhow::Result;
use segmark_core::core::player::Player;
use tracing::info;

use crate::{apps::annotator::AnnotatorApp, commands::VideoArgs, input::TerminalInput};

/// Runs the interactive annotation session until the user quits.
#[tracing::instrument(skip_all)]
pub fn annotate_handler(config_path: &Path, args: &VideoArgs) -> Result<()> {
    let context = args.open(config_path)?;
    let seek_seconds = context.configuration.playback.seek_seconds;
    let title = args.video.file_name().map_or_else(
        || args.video.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    );
    let annotations = context.file.path().to_path_buf();
    let (video, session) = context.into_session();

    let mut app = AnnotatorApp::new(title);
    app.start()?;
    let mut player =
        Player::new(video, TerminalInput, app, session).with_seek_seconds(seek_seconds);
    let played = player.run();
    let (session, mut app) = player.into_parts();
    let restored = app.finish();
    played?;
    restored?;

    info!(
        "Session ended with {} breakpoints saved to {}",
        session.timeline().breakpoints().len(),
        annotations.display()
    );

    Ok(())
}
