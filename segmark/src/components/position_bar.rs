use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge},
};

use crate::utils::time_display::{frames_to_timecode, percent};

/// Playback position as a gauge over the whole video.
pub struct PositionBar {
    pub color:      Color,
    pub title:      String,
    pub position:   usize,
    pub last_index: usize,
    pub fps:        f64,
}

impl PositionBar {
    #[inline]
    pub fn ratio(&self) -> f64 {
        if self.last_index == 0 {
            return 1.0;
        }
        (self.position as f64 / self.last_index as f64).clamp(0.0, 1.0)
    }

    #[inline]
    pub fn generate(&self) -> Gauge<'_> {
        let ratio = self.ratio();
        let label = format!("Frame {}/{}", self.position, self.last_index);
        Gauge::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title(Line::from(self.title.as_str()).left_aligned())
                    .title(Line::from(percent(ratio)).centered())
                    .title_bottom(
                        Line::from(frames_to_timecode(self.position, self.fps)).left_aligned(),
                    )
                    .title_bottom(
                        Line::from(frames_to_timecode(self.last_index, self.fps)).right_aligned(),
                    ),
            )
            .ratio(ratio)
            .label(Span::styled(label, Style::default()))
            .gauge_style(Style::default().fg(self.color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(position: usize, last_index: usize) -> PositionBar {
        PositionBar {
            color: Color::DarkGray,
            title: String::new(),
            position,
            last_index,
            fps: 25.0,
        }
    }

    #[test]
    fn ratio_covers_the_video() {
        assert!((bar(0, 100).ratio() - 0.0).abs() < f64::EPSILON);
        assert!((bar(50, 100).ratio() - 0.5).abs() < f64::EPSILON);
        assert!((bar(100, 100).ratio() - 1.0).abs() < f64::EPSILON);
        assert!((bar(0, 0).ratio() - 1.0).abs() < f64::EPSILON);
    }
}
