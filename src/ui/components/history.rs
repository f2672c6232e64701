use chrono::{DateTime, Local, Utc};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::engine::review;
use crate::engine::stats::format_duration;
use crate::session::record::StudySession;
use crate::ui::theme::Theme;

/// Archived sessions, newest first, with a review link for the selection.
pub struct HistoryList<'a> {
    pub sessions: Vec<&'a StudySession>,
    pub selected: usize,
    pub now: DateTime<Utc>,
    pub theme: &'a Theme,
}

impl<'a> HistoryList<'a> {
    pub fn new(
        sessions: Vec<&'a StudySession>,
        selected: usize,
        now: DateTime<Utc>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            sessions,
            selected,
            now,
            theme,
        }
    }
}

impl Widget for HistoryList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(" Learning history ")
            .border_style(Style::default().fg(colors.accent()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.sessions.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "No sessions recorded yet.",
                Style::default().fg(colors.text_muted()),
            )))
            .render(inner, buf);
            return;
        }

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(4)])
            .split(inner);

        let rows = layout[0].height as usize;
        let selected = self.selected.min(self.sessions.len() - 1);
        let offset = selected.saturating_sub(rows.saturating_sub(1));

        let lines: Vec<Line> = self
            .sessions
            .iter()
            .enumerate()
            .skip(offset)
            .take(rows)
            .map(|(i, s)| {
                let is_selected = i == selected;
                let base = if is_selected {
                    Style::default()
                        .fg(colors.fg())
                        .bg(colors.accent_dim())
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors.fg())
                };
                let date = s.start_time.with_timezone(&Local).format("%d/%m/%Y").to_string();
                let mut spans = vec![
                    Span::styled(if is_selected { " > " } else { "   " }, base),
                    Span::styled(format!("{date}  "), base.fg(colors.text_muted())),
                    Span::styled(format!("{:<24}", s.topic), base),
                    Span::styled(format!("{:>14}", format_duration(s.duration_seconds)), base),
                ];
                if let Some(ref q) = s.quiz_result {
                    spans.push(Span::styled(
                        format!("   Quiz: {}/{}", q.score, q.total_questions),
                        base.fg(colors.success()),
                    ));
                }
                Line::from(spans)
            })
            .collect();
        Paragraph::new(lines).render(layout[0], buf);

        let link = review::review_url(self.sessions[selected], self.now)
            .map(|u| u.to_string())
            .unwrap_or_default();
        Paragraph::new(vec![
            Line::from(Span::styled(
                "Schedule a review (tomorrow, 1 hour):",
                Style::default().fg(colors.accent()),
            )),
            Line::from(Span::styled(link, Style::default().fg(colors.text_muted()))),
        ])
        .wrap(Wrap { trim: false })
        .render(layout[1], buf);
    }
}
