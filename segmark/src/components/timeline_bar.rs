use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Widget},
};
use segmark_core::models::{Breakpoint, Label, LabelSet};

const LABEL_COLORS: [Color; 9] = [
    Color::Green,
    Color::Yellow,
    Color::Red,
    Color::Cyan,
    Color::Magenta,
    Color::Blue,
    Color::LightGreen,
    Color::LightYellow,
    Color::LightRed,
];

#[inline]
pub fn label_color(label: u8) -> Color {
    usize::from(label)
        .checked_sub(1)
        .and_then(|slot| LABEL_COLORS.get(slot))
        .copied()
        .unwrap_or(Color::Reset)
}

/// A run of frames `start..end` under one label, or unlabeled before the first
/// breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub end:   usize,
    pub label: Option<Label>,
}

impl Segment {
    #[inline]
    pub const fn frames(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub const fn contains(&self, position: usize) -> bool {
        self.start <= position && position < self.end
    }
}

/// Splits `0..frame_count` at the breakpoints.
#[inline]
pub fn segments(breakpoints: &[Breakpoint], frame_count: usize) -> Vec<Segment> {
    let mut segments = Vec::with_capacity(breakpoints.len() + 1);
    if let Some(first) = breakpoints.first().filter(|first| first.index > 0) {
        segments.push(Segment {
            start: 0,
            end:   first.index.min(frame_count),
            label: None,
        });
    }
    for (position, breakpoint) in breakpoints.iter().enumerate() {
        let end = breakpoints.get(position + 1).map_or(frame_count, |next| next.index);
        segments.push(Segment {
            start: breakpoint.index,
            end:   end.min(frame_count),
            label: Some(breakpoint.label),
        });
    }
    segments.retain(|segment| segment.end > segment.start);
    segments
}

/// Colored strip of the labeled segments, proportional to their length.
pub struct TimelineBar<'a> {
    pub segments:    &'a [Segment],
    pub labels:      &'a LabelSet,
    pub frame_count: usize,
    pub position:    usize,
}

impl Widget for TimelineBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let total = u32::try_from(self.frame_count).unwrap_or(u32::MAX).max(1);
        let constraints = self.segments.iter().map(|segment| {
            Constraint::Ratio(u32::try_from(segment.frames()).unwrap_or(u32::MAX), total)
        });
        let areas = Layout::horizontal(constraints).split(area);
        for (segment, segment_area) in self.segments.iter().zip(areas.iter()) {
            let Some(label) = segment.label else {
                continue;
            };
            let mut block = Block::default().style(Style::new().bg(label_color(label.get())));
            if let Some(name) = self.labels.name(label) {
                block = block.title(Line::from(name));
            }
            if segment.contains(self.position) {
                block = block.title_bottom(Line::from("^"));
            }
            block.render(*segment_area, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bp(index: usize, value: u8) -> Breakpoint {
        Breakpoint::new(index, Label::new(value).expect("non-zero label"))
    }

    #[test]
    fn splits_the_video_at_breakpoints() {
        let segments = segments(&[bp(10, 1), bp(40, 2)], 100);
        let bounds = segments
            .iter()
            .map(|segment| (segment.start, segment.end, segment.label.map(Label::get)))
            .collect::<Vec<_>>();
        assert_eq!(bounds, vec![(0, 10, None), (10, 40, Some(1)), (40, 100, Some(2))]);
        assert_eq!(segments.iter().map(Segment::frames).sum::<usize>(), 100);
    }

    #[test]
    fn breakpoint_at_zero_has_no_leading_gap() {
        let segments = segments(&[bp(0, 3)], 5);
        assert_eq!(segments, vec![Segment {
            start: 0,
            end:   5,
            label: Some(Label::new(3).expect("non-zero label")),
        }]);
        assert!(super::segments(&[], 5).is_empty());
    }

    #[test]
    fn colors() {
        assert_eq!(label_color(1), Color::Green);
        assert_eq!(label_color(0), Color::Reset);
        assert_eq!(label_color(10), Color::Reset);
    }

    #[test]
    fn renders_without_panicking() {
        let labels = LabelSet::default();
        let segments = segments(&[bp(10, 1), bp(40, 2)], 100);
        let area = Rect::new(0, 0, 40, 3);
        let mut buf = Buffer::empty(area);
        TimelineBar {
            segments:    &segments,
            labels:      &labels,
            frame_count: 100,
            position:    50,
        }
        .render(area, &mut buf);
        assert_eq!(buf.area, area);
    }
}
