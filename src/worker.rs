use std::io;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread;

use crate::event::AppEvent;

/// A unit of blocking work whose outcome is posted back as an event.
pub type Task = Box<dyn FnOnce() -> AppEvent + Send + 'static>;

/// Runs provider calls away from the event loop.
pub trait TaskRunner {
    fn run(&self, task: Task);
}

/// One short-lived thread per task.
pub struct ThreadRunner {
    events: Sender<AppEvent>,
}

impl ThreadRunner {
    pub fn new(events: Sender<AppEvent>) -> Self {
        Self { events }
    }
}

impl ThreadRunner {
    /// Hand `task` to `spawn`. If no thread can be started the task runs
    /// here instead, so its event is always posted.
    fn dispatch<S>(&self, task: Task, spawn: S)
    where
        S: FnOnce(Box<dyn FnOnce() + Send>) -> io::Result<()>,
    {
        let slot = Arc::new(Mutex::new(Some(task)));
        let worker_slot = Arc::clone(&slot);
        let events = self.events.clone();
        let job = Box::new(move || {
            if let Some(task) = take_task(&worker_slot) {
                // The loop may already be gone on shutdown.
                let _ = events.send(task());
            }
        });
        if let Err(e) = spawn(job) {
            tracing::error!(error = %e, "failed to spawn worker thread, running inline");
            if let Some(task) = take_task(&slot) {
                let _ = self.events.send(task());
            }
        }
    }
}

fn take_task(slot: &Mutex<Option<Task>>) -> Option<Task> {
    slot.lock().ok().and_then(|mut task| task.take())
}

impl TaskRunner for ThreadRunner {
    fn run(&self, task: Task) {
        self.dispatch(task, |job| {
            thread::Builder::new()
                .name("cotes-worker".to_string())
                .spawn(job)
                .map(|_| ())
        });
    }
}

/// Runs the task on the calling thread and queues its event. Used headless
/// and in tests, where the caller drains the channel itself.
pub struct InlineRunner {
    events: Sender<AppEvent>,
}

impl InlineRunner {
    pub fn new(events: Sender<AppEvent>) -> Self {
        Self { events }
    }
}

impl TaskRunner for InlineRunner {
    fn run(&self, task: Task) {
        let _ = self.events.send(task());
    }
}
