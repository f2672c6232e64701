use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent};

use crate::session::quiz::QuizQuestion;
use crate::session::record::Resource;
use crate::session::study::DraftId;
use crate::session::timer::TimerId;

pub enum AppEvent {
    Key(KeyEvent),
    /// Redraw tick from the input thread.
    Tick,
    Resize(#[allow(dead_code)] u16, #[allow(dead_code)] u16),
    /// One second of study time from the timer identified by the id.
    StudyTick(TimerId),
    ResourcesLoaded {
        draft: DraftId,
        resources: Vec<Resource>,
    },
    QuizLoaded {
        session_id: String,
        questions: Vec<QuizQuestion>,
    },
}

pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let input_tx = tx.clone();

        thread::spawn(move || {
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    match event::read() {
                        Ok(Event::Key(key)) => {
                            if input_tx.send(AppEvent::Key(key)).is_err() {
                                return;
                            }
                        }
                        Ok(Event::Resize(w, h)) => {
                            if input_tx.send(AppEvent::Resize(w, h)).is_err() {
                                return;
                            }
                        }
                        _ => {}
                    }
                } else if input_tx.send(AppEvent::Tick).is_err() {
                    return;
                }
            }
        });

        Self { rx, tx }
    }

    /// Handle for timer and worker threads to post into the loop.
    pub fn sender(&self) -> mpsc::Sender<AppEvent> {
        self.tx.clone()
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}
