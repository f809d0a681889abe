use anyhow::{Context, Result};
use ratatui::{
    layout::{Constraint, Layout},
    style::Color,
    text::Line,
    widgets::Paragraph,
    Frame,
};
use segmark_core::{
    core::{
        player::{PlaybackView, Presenter},
        video::Frame as VideoFrame,
    },
    models::LabelSet,
};

use crate::{
    apps::{PanicHook, StdOutOrErrTerminal, TuiApp},
    components::{
        position_bar::PositionBar,
        stats_panel::{StatLine, StatsPanel},
        timeline_bar::{segments, Segment, TimelineBar},
    },
};

const MAIN_COLOR: Color = Color::DarkGray;
const KEY_HELP: &str =
    "space pause | \u{2190}/\u{2192} seek | 1-9 label | del remove | esc quit";

/// Owned copy of the last [`PlaybackView`], what the terminal shows.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub position:     usize,
    pub frame_count:  usize,
    pub fps:          f64,
    pub paused:       bool,
    pub current:      Option<String>,
    pub stats:        Vec<StatLine>,
    pub segments:     Vec<Segment>,
    pub labels:       LabelSet,
    pub save_failure: Option<String>,
}

impl Overlay {
    #[inline]
    pub fn from_view(view: &PlaybackView) -> Self {
        Self {
            position:     view.position,
            frame_count:  view.frame_count,
            fps:          view.fps,
            paused:       view.paused,
            current:      view
                .current()
                .and_then(|label| view.labels.name(label))
                .map(str::to_owned),
            stats:        StatLine::collect(&view.stat, view.labels, view.fps),
            segments:     segments(view.breakpoints, view.frame_count),
            labels:       view.labels.clone(),
            save_failure: view.save_failure.map(str::to_owned),
        }
    }
}

/// Terminal presenter of an annotation session.
pub struct AnnotatorApp {
    pub(crate) original_panic_hook: Option<PanicHook>,
    pub title:                      String,
    terminal:                       Option<StdOutOrErrTerminal>,
    overlay:                        Option<Overlay>,
}

impl TuiApp for AnnotatorApp {
    fn original_panic_hook(&mut self) -> &mut Option<PanicHook> {
        &mut self.original_panic_hook
    }

    fn render(&self, frame: &mut Frame) {
        let layout = Layout::vertical([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

        let Some(overlay) = &self.overlay else {
            frame.render_widget(Paragraph::new(Line::from("Loading...")).centered(), layout[1]);
            return;
        };

        let position_bar = PositionBar {
            color:      MAIN_COLOR,
            title:      format!(
                "{} [{}]",
                self.title,
                if overlay.paused { "paused" } else { "playing" }
            ),
            position:   overlay.position,
            last_index: overlay.frame_count.saturating_sub(1),
            fps:        overlay.fps,
        };
        frame.render_widget(position_bar.generate(), layout[0]);

        let stats_panel = StatsPanel {
            current:      overlay.current.as_deref(),
            lines:        &overlay.stats,
            save_failure: overlay.save_failure.as_deref(),
        };
        frame.render_widget(stats_panel.generate(), layout[1]);

        frame.render_widget(
            TimelineBar {
                segments:    &overlay.segments,
                labels:      &overlay.labels,
                frame_count: overlay.frame_count,
                position:    overlay.position,
            },
            layout[2],
        );

        frame.render_widget(Paragraph::new(Line::from(KEY_HELP)).centered(), layout[3]);
    }
}

impl AnnotatorApp {
    #[inline]
    pub fn new(title: String) -> Self {
        Self {
            original_panic_hook: None,
            title,
            terminal: None,
            overlay: None,
        }
    }

    /// Switches the terminal to the annotation screen.
    #[inline]
    pub fn start(&mut self) -> Result<()> {
        let terminal = self.init()?;
        self.terminal = Some(terminal);
        Ok(())
    }

    /// Restores the terminal. Safe to call when it was never started.
    #[inline]
    pub fn finish(&mut self) -> Result<()> {
        if let Some(terminal) = self.terminal.take() {
            self.restore(terminal)?;
        }
        Ok(())
    }

    #[inline]
    pub const fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }
}

impl Presenter for AnnotatorApp {
    #[inline]
    fn present(&mut self, _frame: &VideoFrame, view: &PlaybackView) -> Result<()> {
        self.overlay = Some(Overlay::from_view(view));
        let mut terminal = self.terminal.take().context("Terminal is not initialized")?;
        let drawn = terminal.draw(|frame| self.render(frame)).map(|_| ());
        self.terminal = Some(terminal);
        Ok(drawn?)
    }
}
