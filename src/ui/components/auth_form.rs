use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::auth::form::{AuthForm, AuthMode};
use crate::ui::theme::Theme;

pub struct AuthFormView<'a> {
    pub form: &'a AuthForm,
    pub theme: &'a Theme,
}

impl<'a> AuthFormView<'a> {
    pub fn new(form: &'a AuthForm, theme: &'a Theme) -> Self {
        Self { form, theme }
    }
}

impl Widget for AuthFormView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let title = match self.form.mode {
            AuthMode::Login => " Welcome back ",
            AuthMode::Register => " Create your account ",
        };
        let block = Block::bordered()
            .title(Line::from(Span::styled(
                title,
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
            )))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines: Vec<Line> = vec![Line::from("")];
        let focused = self.form.focused();
        for &field in self.form.fields() {
            let is_focused = field == focused;
            let label_style = if is_focused {
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.text_muted())
            };
            lines.push(Line::from(Span::styled(format!("  {}", field.label()), label_style)));

            let (before, at, after) = self.form.input(field).render_parts();
            let text_style = Style::default().fg(colors.fg());
            let mut spans = vec![Span::styled("  > ", label_style), Span::styled(before, text_style)];
            if is_focused {
                let cursor = at.map(String::from).unwrap_or_else(|| " ".to_string());
                spans.push(Span::styled(
                    cursor,
                    Style::default().fg(colors.bg()).bg(colors.fg()),
                ));
            } else if let Some(ch) = at {
                spans.push(Span::styled(ch.to_string(), text_style));
            }
            spans.push(Span::styled(after, text_style));
            lines.push(Line::from(spans));
            lines.push(Line::from(""));
        }

        if let Some(ref err) = self.form.error {
            lines.push(Line::from(Span::styled(
                format!("  {err}"),
                Style::default().fg(colors.error()),
            )));
            lines.push(Line::from(""));
        }

        let toggle = match self.form.mode {
            AuthMode::Login => "No account yet? [Ctrl+R] Register",
            AuthMode::Register => "Already registered? [Ctrl+R] Log in",
        };
        lines.push(
            Line::from(Span::styled(toggle, Style::default().fg(colors.text_muted())))
                .alignment(Alignment::Center),
        );

        Paragraph::new(lines).render(inner, buf);
    }
}
