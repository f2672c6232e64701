use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use crate::event::AppEvent;

/// Identifies one scheduled repeating tick. Every call to
/// [`TickScheduler::schedule`] gets a fresh id.
pub type TimerId = u64;

/// Keeps a scheduled tick alive. Dropping the guard cancels the tick.
pub struct TickGuard {
    _cancel: Sender<()>,
}

impl TickGuard {
    pub fn new(cancel: Sender<()>) -> Self {
        Self { _cancel: cancel }
    }
}

pub trait TickScheduler {
    /// Start a repeating tick tagged with `timer`. The tick runs until the
    /// returned guard is dropped.
    fn schedule(&self, timer: TimerId) -> TickGuard;
}

/// Posts `AppEvent::StudyTick` into the event channel at a fixed interval
/// from a background thread.
pub struct ThreadTicker {
    events: Sender<AppEvent>,
    interval: Duration,
}

impl ThreadTicker {
    pub fn new(events: Sender<AppEvent>, interval: Duration) -> Self {
        Self { events, interval }
    }
}

impl TickScheduler for ThreadTicker {
    fn schedule(&self, timer: TimerId) -> TickGuard {
        let (cancel_tx, cancel_rx) = mpsc::channel::<()>();
        let events = self.events.clone();
        let interval = self.interval;

        thread::spawn(move || {
            loop {
                match cancel_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        if events.send(AppEvent::StudyTick(timer)).is_err() {
                            return;
                        }
                    }
                    // Guard dropped (or an explicit cancel): stop ticking.
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
                }
            }
        });

        TickGuard::new(cancel_tx)
    }
}

/// Scheduler that never ticks on its own. Ticks are delivered by hand;
/// `live_timers` reports which scheduled timers still hold a guard.
/// Timers whose guard is gone are forgotten on the next `schedule`.
#[derive(Clone, Default)]
pub struct ManualTicker {
    scheduled: Rc<RefCell<Vec<(TimerId, Receiver<()>)>>>,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_timers(&self) -> Vec<TimerId> {
        self.scheduled
            .borrow()
            .iter()
            .filter(|(_, rx)| matches!(rx.try_recv(), Err(TryRecvError::Empty)))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn scheduled_count(&self) -> usize {
        self.scheduled.borrow().len()
    }
}

impl TickScheduler for ManualTicker {
    fn schedule(&self, timer: TimerId) -> TickGuard {
        let (tx, rx) = mpsc::channel();
        let mut scheduled = self.scheduled.borrow_mut();
        scheduled.retain(|(_, rx)| matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        scheduled.push((timer, rx));
        TickGuard::new(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_manual_ticker_tracks_guard_lifetime() {
        let ticker = ManualTicker::new();
        let a = ticker.schedule(1);
        let b = ticker.schedule(2);
        assert_eq!(ticker.live_timers(), vec![1, 2]);

        drop(a);
        assert_eq!(ticker.live_timers(), vec![2]);
        drop(b);
        assert!(ticker.live_timers().is_empty());
        assert_eq!(ticker.scheduled_count(), 2);
    }

    #[test]
    fn test_manual_ticker_forgets_dropped_timers() {
        let ticker = ManualTicker::new();
        for id in 0..10 {
            drop(ticker.schedule(id));
        }
        let live = ticker.schedule(10);
        assert_eq!(ticker.scheduled_count(), 1);
        assert_eq!(ticker.live_timers(), vec![10]);
        drop(live);
    }

    #[test]
    fn test_thread_ticker_sends_tagged_ticks() {
        let (tx, rx) = mpsc::channel();
        let ticker = ThreadTicker::new(tx, Duration::from_millis(5));
        let guard = ticker.schedule(7);

        let event = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(matches!(event, AppEvent::StudyTick(7)));
        drop(guard);
    }

    #[test]
    fn test_thread_ticker_stops_after_guard_drop() {
        let (tx, rx) = mpsc::channel();
        let ticker = ThreadTicker::new(tx, Duration::from_millis(5));
        let guard = ticker.schedule(1);
        let _ = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        drop(guard);
        drop(ticker);

        // At most one tick can already be in flight; after that the thread
        // has exited and dropped its sender.
        let deadline = Instant::now() + Duration::from_secs(2);
        let mut disconnected = false;
        while Instant::now() < deadline {
            match rx.recv_timeout(Duration::from_millis(50)) {
                Err(RecvTimeoutError::Disconnected) => {
                    disconnected = true;
                    break;
                }
                Ok(_) | Err(RecvTimeoutError::Timeout) => {}
            }
        }
        assert!(disconnected, "tick thread should exit once its guard is dropped");
    }
}
