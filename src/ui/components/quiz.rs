use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::quiz::QuizFlow;
use crate::ui::theme::Theme;

const OPTION_KEYS: [char; 4] = ['1', '2', '3', '4'];

pub struct QuizView<'a> {
    pub flow: &'a QuizFlow,
    pub theme: &'a Theme,
}

impl<'a> QuizView<'a> {
    pub fn new(flow: &'a QuizFlow, theme: &'a Theme) -> Self {
        Self { flow, theme }
    }
}

impl Widget for QuizView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let topic = &self.flow.session().topic;
        let block = Block::bordered()
            .title(Line::from(Span::styled(
                format!(" Quiz: {topic} "),
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
            )))
            .border_style(Style::default().fg(colors.accent()));
        let inner = block.inner(area);
        block.render(area, buf);

        let muted = Style::default().fg(colors.text_muted());

        if self.flow.is_loading() {
            Paragraph::new(Line::from(Span::styled(
                format!("Generating questions about {topic}..."),
                muted,
            )))
            .render(inner, buf);
            return;
        }
        if self.flow.is_empty() {
            Paragraph::new(vec![
                Line::from(Span::styled(
                    "No questions could be generated for this session.",
                    Style::default().fg(colors.warning()),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Press [Enter] to save the session without a score.",
                    muted,
                )),
            ])
            .render(inner, buf);
            return;
        }
        let Some(question) = self.flow.current_question() else {
            return;
        };

        let mut lines = vec![
            Line::from(Span::styled(
                format!(
                    "Question {} of {}    Score: {}",
                    self.flow.current_index() + 1,
                    self.flow.question_count(),
                    self.flow.score()
                ),
                muted,
            )),
            Line::from(""),
            Line::from(Span::styled(
                question.question.clone(),
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];

        let selected = self.flow.selected();
        for (i, option) in question.options.iter().enumerate() {
            let key = OPTION_KEYS.get(i).copied().unwrap_or(' ');
            let style = match selected {
                Some(_) if i == question.correct_answer_index => {
                    Style::default().fg(colors.success()).add_modifier(Modifier::BOLD)
                }
                Some(s) if s == i => Style::default().fg(colors.error()).add_modifier(Modifier::CROSSED_OUT),
                Some(_) => muted,
                None => Style::default().fg(colors.fg()),
            };
            lines.push(Line::from(vec![
                Span::styled(format!("  [{key}] "), Style::default().fg(colors.accent())),
                Span::styled(option.clone(), style),
            ]));
        }

        if let Some(choice) = selected {
            lines.push(Line::from(""));
            let verdict = if choice == question.correct_answer_index {
                Span::styled("Correct!", Style::default().fg(colors.success()))
            } else {
                Span::styled("Not quite.", Style::default().fg(colors.error()))
            };
            let next = if self.flow.is_last_question() {
                "  [Enter] Finish quiz"
            } else {
                "  [Enter] Next question"
            };
            lines.push(Line::from(vec![verdict, Span::styled(next, muted)]));
        }

        Paragraph::new(lines).wrap(Wrap { trim: false }).render(inner, buf);
    }
}
