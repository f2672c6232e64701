use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::router::ViewState;
use crate::ui::theme::Theme;

/// Title bar with the navigation tabs and a greeting.
pub struct Header<'a> {
    pub first_name: &'a str,
    pub active: ViewState,
    pub quiz_open: bool,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(first_name: &'a str, active: ViewState, quiz_open: bool, theme: &'a Theme) -> Self {
        Self {
            first_name,
            active,
            quiz_open,
            theme,
        }
    }

    fn tabs(&self) -> Vec<ViewState> {
        let mut tabs = ViewState::TABS.to_vec();
        if self.quiz_open || self.active == ViewState::Quiz {
            tabs.insert(1, ViewState::Quiz);
        }
        tabs
    }
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let base = Style::default().fg(colors.header_fg()).bg(colors.header_bg());

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(base);
        let inner = block.inner(area);
        block.render(area, buf);

        let mut spans = vec![
            Span::styled(" COTES ", base.fg(colors.accent()).add_modifier(Modifier::BOLD)),
            Span::styled("│ ", base.fg(colors.border())),
        ];
        for view in self.tabs() {
            let label = format!(" {} ", view.title());
            let style = if view == self.active {
                base.fg(colors.bg())
                    .bg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                base.fg(colors.text_muted())
            };
            spans.push(Span::styled(label, style));
            spans.push(Span::styled(" ", base));
        }
        Paragraph::new(Line::from(spans)).render(inner, buf);

        let greeting = format!("Hi, {} ", self.first_name);
        let width = greeting.chars().count() as u16;
        if inner.width > width + 40 {
            buf.set_string(
                inner.x + inner.width - width,
                inner.y,
                &greeting,
                base.fg(colors.header_fg()),
            );
        }
    }
}
