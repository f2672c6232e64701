use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::record::format_clock;
use crate::session::study::{ResourceFetch, StudyController, StudyPhase};
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

/// Study screen: topic entry, the running clock and suggested resources.
pub struct Hub<'a> {
    pub study: &'a StudyController,
    pub topic_input: &'a LineInput,
    pub theme: &'a Theme,
}

impl<'a> Hub<'a> {
    pub fn new(study: &'a StudyController, topic_input: &'a LineInput, theme: &'a Theme) -> Self {
        Self {
            study,
            topic_input,
            theme,
        }
    }

    fn render_timer(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(" Study session ")
            .border_style(Style::default().fg(colors.accent()));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = Vec::new();
        if self.study.topic_locked() {
            lines.push(Line::from(vec![
                Span::styled("Topic: ", Style::default().fg(colors.text_muted())),
                Span::styled(
                    self.study.topic().to_string(),
                    Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
                ),
            ]));
        } else {
            let (before, at, after) = self.topic_input.render_parts();
            let cursor = at.map(String::from).unwrap_or_else(|| " ".to_string());
            lines.push(Line::from(vec![
                Span::styled("What are you studying? ", Style::default().fg(colors.text_muted())),
                Span::styled(before, Style::default().fg(colors.fg())),
                Span::styled(cursor, Style::default().fg(colors.bg()).bg(colors.fg())),
                Span::styled(after, Style::default().fg(colors.fg())),
            ]));
        }
        lines.push(Line::from(""));

        let clock_color = match self.study.phase() {
            StudyPhase::Running => colors.success(),
            StudyPhase::Paused => colors.warning(),
            StudyPhase::Idle => colors.text_muted(),
        };
        lines.push(
            Line::from(Span::styled(
                format_clock(self.study.elapsed_secs()),
                Style::default().fg(clock_color).add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
        );
        let status = match self.study.phase() {
            StudyPhase::Idle => "ready",
            StudyPhase::Running => "studying",
            StudyPhase::Paused => "paused",
        };
        lines.push(
            Line::from(Span::styled(status, Style::default().fg(colors.text_muted())))
                .alignment(Alignment::Center),
        );

        Paragraph::new(lines).render(inner, buf);
    }

    fn render_resources(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(" Suggested resources ")
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        let muted = Style::default().fg(colors.text_muted());
        let resources = self.study.resources();
        let lines: Vec<Line> = match (self.study.resource_fetch(), resources.is_empty()) {
            (ResourceFetch::NotRequested, _) => {
                vec![Line::from(Span::styled("Start a session to get resources.", muted))]
            }
            (ResourceFetch::Pending, _) => {
                vec![Line::from(Span::styled("Searching the web...", muted))]
            }
            (ResourceFetch::Done, true) => {
                vec![Line::from(Span::styled("No resources found for this topic.", muted))]
            }
            (ResourceFetch::Done, false) => resources
                .iter()
                .enumerate()
                .flat_map(|(i, r)| {
                    [
                        Line::from(vec![
                            Span::styled(format!("[{}] ", i + 1), Style::default().fg(colors.accent())),
                            Span::styled(
                                r.title.clone(),
                                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
                            ),
                        ]),
                        Line::from(Span::styled(format!("    {}", r.url), Style::default().fg(colors.accent()))),
                        Line::from(Span::styled(format!("    {}", r.summary), muted)),
                    ]
                })
                .collect(),
        };
        Paragraph::new(lines).wrap(Wrap { trim: false }).render(inner, buf);
    }
}

impl Widget for Hub<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(4)])
            .split(area);
        self.render_timer(layout[0], buf);
        self.render_resources(layout[1], buf);
    }
}
