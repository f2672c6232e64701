use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};

use cotes::app::{App, NoticeKind, Services};
use cotes::auth::form::FormAction;
use cotes::config::Config;
use cotes::event::{AppEvent, EventHandler};
use cotes::provider::build_provider;
use cotes::router::{Screen, ViewState};
use cotes::session::study::StudyPhase;
use cotes::session::timer::ThreadTicker;
use cotes::speech::build_speaker;
use cotes::store::kv::{FileKvStore, default_data_dir};
use cotes::ui;
use cotes::ui::components::auth_form::AuthFormView;
use cotes::ui::components::dashboard::Dashboard;
use cotes::ui::components::header::Header;
use cotes::ui::components::history::HistoryList;
use cotes::ui::components::hub::Hub;
use cotes::ui::components::quiz::QuizView;
use cotes::ui::layout::{AppLayout, pack_hint_lines};
use cotes::ui::line_input::InputResult;
use cotes::ui::theme::Theme;
use cotes::worker::ThreadRunner;

#[derive(Parser)]
#[command(name = "cotes", version, about = "Terminal study tracker with timed sessions and quizzes")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Directory for stored users, sessions and the log file")]
    data_dir: Option<PathBuf>,

    #[arg(long, help = "Do not contact the AI provider")]
    offline: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load().unwrap_or_default();
    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);
    if let Err(e) = cotes::logging::init(&data_dir, &config.log_filter) {
        eprintln!("warning: logging disabled: {e:#}");
    }
    tracing::info!(data_dir = %data_dir.display(), "starting cotes");

    let theme_name = cli.theme.as_deref().unwrap_or(&config.theme);
    let theme: &'static Theme = Box::leak(Box::new(Theme::load(theme_name).unwrap_or_default()));

    let events = EventHandler::new(Duration::from_millis(100));
    let services = Services {
        store: Box::new(FileKvStore::with_base_dir(data_dir)?),
        provider: build_provider(&config, cli.offline),
        scheduler: Box::new(ThreadTicker::new(events.sender(), Duration::from_secs(1))),
        runner: Box::new(ThreadRunner::new(events.sender())),
        speaker: build_speaker(config.speech_command.as_deref()),
    };
    let mut app = App::new(config, theme, services);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Stop the timer thread before exit.
    app.study.discard();

    if let Err(err) = result {
        tracing::error!(error = %err, "event loop failed");
        eprintln!("Error: {err:?}");
    }
    tracing::info!("bye");
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick | AppEvent::Resize(_, _) => {}
            other => app.handle_event(other),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if app.dismiss_notice() {
        return;
    }

    if app.screen() != Screen::Auth {
        match key.code {
            KeyCode::Tab => return app.next_tab(true),
            KeyCode::BackTab => return app.next_tab(false),
            KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return app.logout();
            }
            _ => {}
        }
    }

    match app.screen() {
        Screen::Auth => handle_auth_key(app, key),
        Screen::Hub => handle_hub_key(app, key),
        Screen::Quiz => handle_quiz_key(app, key),
        Screen::Dashboard => handle_dashboard_key(app, key),
        Screen::KnowledgeBase => handle_history_key(app, key),
        Screen::MissingSession => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                app.go_to(ViewState::Hub);
            }
        }
    }
}

fn handle_auth_key(app: &mut App, key: KeyEvent) {
    match app.auth_form.handle_key(key) {
        FormAction::Submit => app.submit_auth(),
        FormAction::Quit => app.should_quit = true,
        FormAction::None => {}
    }
}

fn handle_hub_key(app: &mut App, key: KeyEvent) {
    match app.study.phase() {
        StudyPhase::Idle => match app.topic_input.handle(key) {
            InputResult::Submit => app.start_study(),
            InputResult::Cancel => app.should_quit = true,
            _ => {}
        },
        phase => match key.code {
            KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Enter => {
                if phase == StudyPhase::Running {
                    app.pause_study();
                } else {
                    app.start_study();
                }
            }
            KeyCode::Char('s') => app.stop_study(),
            KeyCode::Char(ch @ '1'..='3') => {
                app.speak_resource(ch as usize - '1' as usize);
            }
            KeyCode::Esc => app.should_quit = true,
            _ => {}
        },
    }
}

fn handle_quiz_key(app: &mut App, key: KeyEvent) {
    let empty = app.quiz.as_ref().is_some_and(|q| q.is_empty());
    match key.code {
        KeyCode::Enter if empty => app.exit_empty_quiz(),
        KeyCode::Enter | KeyCode::Char('n') | KeyCode::Right => app.advance_quiz(),
        KeyCode::Char(ch @ '1'..='4') => {
            app.select_answer(ch as usize - '1' as usize);
        }
        KeyCode::Char(ch @ 'a'..='d') => {
            app.select_answer(ch as usize - 'a' as usize);
        }
        KeyCode::Char('r') => app.speak_question(),
        KeyCode::Esc => app.go_to(ViewState::Hub),
        _ => {}
    }
}

fn handle_dashboard_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to(ViewState::Hub),
        KeyCode::Char('h') => app.go_to(ViewState::KnowledgeBase),
        _ => {}
    }
}

fn handle_history_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to(ViewState::Hub),
        KeyCode::Up | KeyCode::Char('k') => app.history_up(),
        KeyCode::Down | KeyCode::Char('j') => app.history_down(),
        KeyCode::Char('d') => app.go_to(ViewState::Dashboard),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()).fg(colors.fg()));
    frame.render_widget(bg, area);

    let screen = app.screen();
    let layout = AppLayout::new(area, screen.shows_header());

    if screen.shows_header() {
        let first_name = app.user.as_ref().map(|u| u.first_name()).unwrap_or("");
        frame.render_widget(
            Header::new(first_name, app.view, app.quiz.is_some(), app.theme),
            layout.header,
        );
    }

    match screen {
        Screen::Auth => render_auth(frame, app, layout.main),
        Screen::Hub => frame.render_widget(
            Hub::new(&app.study, &app.topic_input, app.theme),
            layout.main,
        ),
        Screen::Quiz => {
            if let Some(ref flow) = app.quiz {
                frame.render_widget(QuizView::new(flow, app.theme), layout.main);
            }
        }
        Screen::Dashboard => frame.render_widget(
            Dashboard::new(app.history.sessions(), app.theme),
            layout.main,
        ),
        Screen::KnowledgeBase => frame.render_widget(
            HistoryList::new(
                app.history.newest_first(),
                app.history_selected,
                Utc::now(),
                app.theme,
            ),
            layout.main,
        ),
        Screen::MissingSession => render_missing_session(frame, app, layout.main),
    }

    render_footer(frame, app, screen, layout.footer);

    if let Some(ref notice) = app.notice {
        render_notice(frame, app, notice.kind, &notice.message, area);
    }
}

fn render_auth(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let popup = ui::layout::centered_rect(40, 60, area);
    frame.render_widget(AuthFormView::new(&app.auth_form, app.theme), popup);
}

fn render_missing_session(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let block = Block::bordered()
        .title(" Quiz ")
        .border_style(Style::default().fg(colors.error()));
    let msg = Paragraph::new(vec![
        Line::from(Span::styled(
            "There is no finished session to quiz on.",
            Style::default().fg(colors.error()).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Stop a study session first. [Enter] Back to Study",
            Style::default().fg(colors.text_muted()),
        )),
    ])
    .block(block);
    frame.render_widget(msg, area);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, screen: Screen, area: Rect) {
    let colors = &app.theme.colors;
    let hints: Vec<&str> = match screen {
        Screen::Auth => vec!["[Tab] Next field", "[Enter] Submit", "[Ctrl+R] Login/Register", "[Esc] Quit"],
        Screen::Hub => match app.study.phase() {
            StudyPhase::Idle => vec!["[Enter] Start", "[Tab] Next tab", "[Ctrl+L] Log out", "[Esc] Quit"],
            StudyPhase::Running => vec!["[Space] Pause", "[s] Stop", "[1-3] Read resource", "[Tab] Next tab"],
            StudyPhase::Paused => vec!["[Space] Resume", "[s] Stop", "[1-3] Read resource", "[Tab] Next tab"],
        },
        Screen::Quiz => vec!["[1-4] Answer", "[Enter] Next", "[r] Read aloud", "[Esc] Study"],
        Screen::Dashboard => vec!["[Tab] Next tab", "[h] History", "[Esc] Study", "[Ctrl+L] Log out"],
        Screen::KnowledgeBase => vec!["[j/k] Select", "[Tab] Next tab", "[Esc] Study", "[Ctrl+L] Log out"],
        Screen::MissingSession => vec!["[Enter] Study", "[Tab] Next tab"],
    };
    let lines: Vec<Line> = pack_hint_lines(&hints, area.width as usize)
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.text_muted()))))
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_notice(frame: &mut ratatui::Frame, app: &App, kind: NoticeKind, message: &str, area: Rect) {
    let colors = &app.theme.colors;
    let (title, color) = match kind {
        NoticeKind::Info => (" Notice ", colors.accent()),
        NoticeKind::Error => (" Oops ", colors.error()),
        NoticeKind::Celebration => (" Congratulations! ", colors.success()),
        NoticeKind::Blocking => (" Session not saved ", colors.warning()),
    };
    let popup = ui::layout::centered_rect(40, 20, area);
    frame.render_widget(Clear, popup);
    let block = Block::bordered()
        .title(title)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(colors.bg()));
    let body = Paragraph::new(vec![
        Line::from(Span::styled(message.to_string(), Style::default().fg(colors.fg()))),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to continue",
            Style::default().fg(colors.text_muted()),
        )),
    ])
    .wrap(Wrap { trim: true })
    .block(block);
    frame.render_widget(body, popup);
}
