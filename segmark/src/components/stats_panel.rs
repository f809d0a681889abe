use ratatui::{
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};
use segmark_core::{core::timeline::Stat, models::LabelSet};
use serde::Serialize;

use crate::{
    components::timeline_bar::label_color,
    utils::time_display::{frames_to_timecode, percent},
};

/// One row of the duration statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatLine {
    pub label:    u8,
    pub name:     String,
    pub frames:   usize,
    pub timecode: String,
    pub share:    f64,
}

impl StatLine {
    /// Rows for every label that has accumulated time, in label order.
    #[inline]
    pub fn collect(stat: &Stat, labels: &LabelSet, fps: f64) -> Vec<Self> {
        labels
            .iter()
            .map(|(label, name)| (label, name, stat.durations.of(label)))
            .filter(|(_, _, frames)| *frames > 0)
            .map(|(label, name, frames)| Self {
                label: label.get(),
                name: name.to_owned(),
                frames,
                timecode: frames_to_timecode(frames, fps),
                share: stat.share(label),
            })
            .collect()
    }

    #[inline]
    pub fn text(&self) -> String {
        format!("{}: {} ({})", self.name, self.timecode, percent(self.share))
    }
}

pub struct StatsPanel<'a> {
    pub current:      Option<&'a str>,
    pub lines:        &'a [StatLine],
    pub save_failure: Option<&'a str>,
}

impl StatsPanel<'_> {
    #[inline]
    pub fn generate(&self) -> Paragraph<'_> {
        let mut lines = Vec::with_capacity(self.lines.len() + 2);
        lines.push(Line::from(vec![
            Span::raw("Current: "),
            Span::raw(self.current.unwrap_or("---")).bold(),
        ]));
        lines.extend(self.lines.iter().map(|line| {
            Line::from(Span::styled(line.text(), Style::default().fg(label_color(line.label))))
        }));
        if let Some(reason) = self.save_failure {
            lines.push(Line::from(Span::styled(
                format!("Not saved: {}", reason),
                Style::default().fg(Color::Red),
            )));
        }

        Paragraph::new(lines).block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .title(Line::from("Durations").centered()),
        )
    }
}

#[cfg(test)]
mod tests {
    use segmark_core::{
        core::timeline::Timeline,
        models::{Label, LabelSet},
    };

    use super::*;

    fn label(value: u8) -> Label {
        Label::new(value).expect("non-zero label")
    }

    #[test]
    fn lines_skip_labels_without_time() {
        let mut timeline = Timeline::new(1000, LabelSet::default());
        timeline.insert(100, label(1)).expect("valid insert");
        timeline.insert(400, label(3)).expect("valid insert");

        let lines = StatLine::collect(&timeline.stat(500), timeline.labels(), 25.0);
        let texts = lines.iter().map(StatLine::text).collect::<Vec<_>>();
        assert_eq!(texts, vec![
            "manual: 00:12.000 (75.00%)".to_owned(),
            "parked: 00:04.000 (25.00%)".to_owned(),
        ]);
    }

    #[test]
    fn terminal_label_is_left_out_of_percentages() {
        let names = ["work", "idle", "done"].iter().map(|name| (*name).to_owned()).collect();
        let labels = LabelSet::new(names, Some(3)).expect("valid label set");
        let mut timeline = Timeline::new(1000, labels);
        timeline.insert(0, label(1)).expect("valid insert");
        timeline.insert(50, label(2)).expect("valid insert");
        timeline.insert(100, label(3)).expect("valid insert");

        let lines = StatLine::collect(&timeline.stat(300), timeline.labels(), 10.0);
        let texts = lines.iter().map(StatLine::text).collect::<Vec<_>>();
        assert_eq!(texts, vec![
            "work: 00:05.000 (50.00%)".to_owned(),
            "idle: 00:05.000 (50.00%)".to_owned(),
            "done: 00:20.000 (0.00%)".to_owned(),
        ]);
    }
}
