use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::engine::stats::{self, DayMinutes, TopicMinutes};
use crate::session::record::StudySession;
use crate::ui::layout::LayoutTier;
use crate::ui::theme::Theme;

/// Progress overview: totals, time per topic and minutes per day.
pub struct Dashboard<'a> {
    pub sessions: &'a [StudySession],
    pub theme: &'a Theme,
}

impl<'a> Dashboard<'a> {
    pub fn new(sessions: &'a [StudySession], theme: &'a Theme) -> Self {
        Self { sessions, theme }
    }

    fn render_summary(&self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let summary = stats::summary(self.sessions);
        let cards = [
            ("Total time studied", format!("{} min", summary.total_minutes)),
            ("Sessions", summary.sessions.to_string()),
            ("Quizzes completed", summary.quizzes.to_string()),
        ];
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(area);

        for ((label, value), col) in cards.iter().zip(cols.iter()) {
            let block = Block::bordered().border_style(Style::default().fg(colors.border()));
            let inner = block.inner(*col);
            block.render(*col, buf);
            Paragraph::new(vec![
                Line::from(Span::styled(*label, Style::default().fg(colors.text_muted()))),
                Line::from(Span::styled(
                    value.clone(),
                    Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
                )),
            ])
            .alignment(Alignment::Center)
            .render(inner, buf);
        }
    }

    fn render_topics(&self, topics: &[TopicMinutes], area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(" Time per topic (min) ")
            .border_style(Style::default().fg(colors.accent()));
        let inner = block.inner(area);
        block.render(area, buf);

        if topics.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "Not enough data yet.",
                Style::default().fg(colors.text_muted()),
            )))
            .render(inner, buf);
            return;
        }

        let max = topics.iter().map(|t| t.seconds).max().unwrap_or(1).max(1);
        let palette = [colors.bar_filled(), colors.bar_alt()];
        for (i, topic) in topics.iter().enumerate() {
            let row = Rect::new(inner.x, inner.y + i as u16 * 2, inner.width, 2);
            if row.y + row.height > inner.y + inner.height {
                break;
            }
            let label = format!("{}  {} min", topic.topic, topic.minutes);
            let ratio = topic.seconds as f64 / max as f64;
            render_text_bar(&label, ratio, palette[i % 2], colors.bar_empty(), row, buf);
        }
    }

    fn render_days(&self, days: &[DayMinutes], area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let block = Block::bordered()
            .title(" Recent activity (min/day) ")
            .border_style(Style::default().fg(colors.accent()));
        let inner = block.inner(area);
        block.render(area, buf);

        if days.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "Study today to see the chart!",
                Style::default().fg(colors.text_muted()),
            )))
            .render(inner, buf);
            return;
        }
        if inner.width < 8 || inner.height < 4 {
            return;
        }

        // Bottom row holds the day labels, one above it the values.
        let chart_height = inner.height.saturating_sub(2);
        let slot: u16 = 6;
        let visible = (inner.width / slot) as usize;
        let start = days.len().saturating_sub(visible);
        let shown = &days[start..];
        let max = shown.iter().map(|d| d.minutes).max().unwrap_or(0).max(1);
        let bar_chars = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

        for (i, day) in shown.iter().enumerate() {
            let x = inner.x + i as u16 * slot;
            let ratio = day.minutes as f64 / max as f64;
            let exact = ratio * chart_height as f64;
            let full = exact.floor() as u16;
            for row in 0..chart_height {
                let y = inner.y + chart_height - 1 - row;
                let ch = if row < full {
                    '█'
                } else if row == full && exact > full as f64 {
                    let idx = (((exact - full as f64) * 7.0).round() as usize).min(7);
                    bar_chars[idx]
                } else {
                    continue;
                };
                buf.set_string(x + 1, y, format!("{ch}{ch}{ch}"), Style::default().fg(colors.bar_alt()));
            }
            buf.set_string(
                x + 1,
                inner.y + chart_height,
                format!("{:>3}", day.minutes),
                Style::default().fg(colors.fg()),
            );
            buf.set_string(
                x,
                inner.y + chart_height + 1,
                &day.label,
                Style::default().fg(colors.text_muted()),
            );
        }
    }
}

impl Widget for Dashboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(8)])
            .split(area);
        self.render_summary(layout[0], buf);

        let charts = Layout::default()
            .direction(LayoutTier::from_area(area).split_direction())
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(layout[1]);
        let topics = stats::topic_minutes(self.sessions);
        let days = stats::daily_minutes(self.sessions);
        self.render_topics(&topics, charts[0], buf);
        self.render_days(&days, charts[1], buf);
    }
}

fn render_text_bar(
    label: &str,
    ratio: f64,
    fill_color: Color,
    empty_color: Color,
    area: Rect,
    buf: &mut Buffer,
) {
    if area.height < 2 || area.width < 10 {
        return;
    }

    buf.set_string(area.x, area.y, label, Style::default().fg(fill_color));

    let bar_width = (area.width as usize).saturating_sub(4);
    let filled = (ratio.clamp(0.0, 1.0) * bar_width as f64) as usize;
    let bar_y = area.y + 1;
    for i in 0..bar_width {
        let x = area.x + 2 + i as u16;
        if x >= area.x + area.width {
            break;
        }
        let (ch, color) = if i < filled {
            ('█', fill_color)
        } else {
            ('░', empty_color)
        };
        buf.set_string(x, bar_y, ch.to_string(), Style::default().fg(color));
    }
}
