use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StudyError;
use crate::session::record::{Resource, StudySession, dedup_resources};
use crate::session::timer::{TickGuard, TickScheduler, TimerId};

/// Sessions must run strictly longer than this to be recorded.
pub const MIN_SESSION_SECS: u64 = 10;

/// Identifies one draft. Bumped every time the controller returns to Idle,
/// so late provider answers for an abandoned draft can be told apart.
pub type DraftId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StudyPhase {
    Idle,
    Running,
    Paused,
}

/// Resource lookup progress for the current draft. Once requested it stays
/// requested for the rest of the draft, even if the answer was empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceFetch {
    NotRequested,
    Pending,
    Done,
}

/// A resource lookup the caller must run for the current draft.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceRequest {
    pub draft: DraftId,
    pub topic: String,
}

/// Owns the study timer and the in-progress draft.
pub struct StudyController {
    scheduler: Box<dyn TickScheduler>,
    phase: StudyPhase,
    topic: String,
    elapsed_secs: u64,
    started_at: Option<DateTime<Utc>>,
    resources: Vec<Resource>,
    fetch: ResourceFetch,
    draft: DraftId,
    timer: Option<(TimerId, TickGuard)>,
    next_timer: TimerId,
}

impl StudyController {
    pub fn new(scheduler: Box<dyn TickScheduler>) -> Self {
        Self {
            scheduler,
            phase: StudyPhase::Idle,
            topic: String::new(),
            elapsed_secs: 0,
            started_at: None,
            resources: Vec::new(),
            fetch: ResourceFetch::NotRequested,
            draft: 0,
            timer: None,
            next_timer: 0,
        }
    }

    pub fn phase(&self) -> StudyPhase {
        self.phase
    }

    /// Topic can no longer change once the draft has been started.
    pub fn topic_locked(&self) -> bool {
        self.phase != StudyPhase::Idle
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn resource_fetch(&self) -> ResourceFetch {
        self.fetch
    }

    pub fn draft(&self) -> DraftId {
        self.draft
    }

    pub fn live_timer(&self) -> Option<TimerId> {
        self.timer.as_ref().map(|(id, _)| *id)
    }

    /// Idle/Paused -> Running. A no-op while already running.
    ///
    /// Returns the resource lookup to issue, at most once per draft.
    pub fn start(&mut self, topic: &str) -> Result<Option<ResourceRequest>, StudyError> {
        match self.phase {
            StudyPhase::Running => return Ok(None),
            StudyPhase::Idle => {
                let topic = topic.trim();
                if topic.is_empty() {
                    return Err(StudyError::EmptyTopic);
                }
                self.topic = topic.to_string();
            }
            StudyPhase::Paused => {}
        }

        if self.started_at.is_none() {
            self.started_at = Some(Utc::now());
        }
        self.phase = StudyPhase::Running;
        self.arm_timer();
        tracing::info!(topic = %self.topic, draft = self.draft, "study timer running");

        if self.fetch == ResourceFetch::NotRequested && self.resources.is_empty() {
            self.fetch = ResourceFetch::Pending;
            return Ok(Some(ResourceRequest {
                draft: self.draft,
                topic: self.topic.clone(),
            }));
        }
        Ok(None)
    }

    /// Running -> Paused. Keeps the accumulated seconds.
    pub fn pause(&mut self) -> bool {
        if self.phase != StudyPhase::Running {
            return false;
        }
        self.timer = None;
        self.phase = StudyPhase::Paused;
        tracing::info!(elapsed = self.elapsed_secs, "study timer paused");
        true
    }

    /// Running/Paused -> Idle, producing the finished session for the quiz.
    ///
    /// The draft is reset whatever the outcome. Sessions of
    /// [`MIN_SESSION_SECS`] or less are rejected with `SessionTooShort`.
    pub fn stop(&mut self) -> Result<StudySession, StudyError> {
        if self.phase == StudyPhase::Idle {
            return Err(StudyError::NotStarted);
        }
        self.timer = None;

        let now = Utc::now();
        let seconds = self.elapsed_secs;
        let topic = std::mem::take(&mut self.topic);
        let resources = std::mem::take(&mut self.resources);
        let started_at = self.started_at.unwrap_or(now);
        self.reset();

        if seconds <= MIN_SESSION_SECS {
            tracing::info!(seconds, "study session discarded as too short");
            return Err(StudyError::SessionTooShort { seconds });
        }

        tracing::info!(topic = %topic, seconds, "study session stopped");
        Ok(StudySession {
            id: Uuid::new_v4().to_string(),
            topic,
            duration_seconds: seconds,
            start_time: started_at,
            end_time: now,
            resources,
            quiz_result: None,
        })
    }

    /// Abandon the draft without producing a session (logout, teardown).
    pub fn discard(&mut self) {
        self.timer = None;
        self.topic.clear();
        self.resources.clear();
        self.reset();
    }

    /// Advance the clock by one second if `timer` is the live timer.
    pub fn tick(&mut self, timer: TimerId) -> bool {
        if self.phase != StudyPhase::Running || self.live_timer() != Some(timer) {
            return false;
        }
        self.elapsed_secs += 1;
        true
    }

    /// Accept the answer to a resource lookup. Answers for another draft,
    /// or arriving when nothing is pending, are dropped.
    pub fn resources_loaded(&mut self, draft: DraftId, resources: Vec<Resource>) -> bool {
        if draft != self.draft || self.fetch != ResourceFetch::Pending {
            return false;
        }
        self.resources = dedup_resources(resources);
        self.fetch = ResourceFetch::Done;
        true
    }

    fn arm_timer(&mut self) {
        self.next_timer += 1;
        let id = self.next_timer;
        let guard = self.scheduler.schedule(id);
        self.timer = Some((id, guard));
    }

    fn reset(&mut self) {
        self.phase = StudyPhase::Idle;
        self.elapsed_secs = 0;
        self.started_at = None;
        self.fetch = ResourceFetch::NotRequested;
        self.draft += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::timer::ManualTicker;

    fn make_controller() -> (ManualTicker, StudyController) {
        let ticker = ManualTicker::new();
        let controller = StudyController::new(Box::new(ticker.clone()));
        (ticker, controller)
    }

    fn run_ticks(controller: &mut StudyController, n: u64) {
        for _ in 0..n {
            let id = controller.live_timer().unwrap();
            assert!(controller.tick(id));
        }
    }

    fn res(url: &str) -> Resource {
        Resource {
            title: url.to_string(),
            url: url.to_string(),
            summary: String::new(),
        }
    }

    #[test]
    fn test_start_requires_topic() {
        let (ticker, mut c) = make_controller();
        assert_eq!(c.start("   "), Err(StudyError::EmptyTopic));
        assert_eq!(c.phase(), StudyPhase::Idle);
        assert_eq!(ticker.scheduled_count(), 0);
    }

    #[test]
    fn test_first_start_requests_resources_once() {
        let (_ticker, mut c) = make_controller();
        let req = c.start("Calculus").unwrap();
        assert_eq!(
            req,
            Some(ResourceRequest {
                draft: c.draft(),
                topic: "Calculus".to_string()
            })
        );
        assert!(c.started_at().is_some());

        // Second start while running is a no-op.
        assert_eq!(c.start("Calculus").unwrap(), None);
        assert_eq!(c.resource_fetch(), ResourceFetch::Pending);
    }

    #[test]
    fn test_resume_after_pause_does_not_refetch() {
        let (_ticker, mut c) = make_controller();
        let req = c.start("Rust").unwrap().unwrap();
        assert!(c.pause());
        assert_eq!(c.start("ignored").unwrap(), None);
        assert_eq!(c.topic(), "Rust");

        assert!(c.resources_loaded(req.draft, Vec::new()));
        c.pause();
        // An empty answer still counts as "already attempted".
        assert_eq!(c.start("Rust").unwrap(), None);
        assert_eq!(c.resource_fetch(), ResourceFetch::Done);
    }

    #[test]
    fn test_start_time_kept_across_pause() {
        let (_ticker, mut c) = make_controller();
        c.start("Rust").unwrap();
        let first = c.started_at();
        c.pause();
        c.start("Rust").unwrap();
        assert_eq!(c.started_at(), first);
    }

    #[test]
    fn test_pause_cancels_timer_and_keeps_seconds() {
        let (ticker, mut c) = make_controller();
        c.start("Rust").unwrap();
        run_ticks(&mut c, 5);
        let id = c.live_timer().unwrap();

        assert!(c.pause());
        assert!(ticker.live_timers().is_empty());
        assert!(!c.tick(id), "stale tick after pause must not count");
        assert_eq!(c.elapsed_secs(), 5);
        assert!(!c.pause());
    }

    #[test]
    fn test_stale_timer_ignored_after_resume() {
        let (ticker, mut c) = make_controller();
        c.start("Rust").unwrap();
        let old = c.live_timer().unwrap();
        c.pause();
        c.start("Rust").unwrap();
        let new = c.live_timer().unwrap();
        assert_ne!(old, new);
        assert_eq!(ticker.live_timers(), vec![new]);

        assert!(!c.tick(old));
        assert!(c.tick(new));
        assert_eq!(c.elapsed_secs(), 1);
    }

    #[test]
    fn test_stop_short_session_is_discarded() {
        let (ticker, mut c) = make_controller();
        c.start("Rust").unwrap();
        run_ticks(&mut c, MIN_SESSION_SECS);

        assert_eq!(
            c.stop(),
            Err(StudyError::SessionTooShort {
                seconds: MIN_SESSION_SECS
            })
        );
        assert_eq!(c.phase(), StudyPhase::Idle);
        assert_eq!(c.elapsed_secs(), 0);
        assert_eq!(c.topic(), "");
        assert!(ticker.live_timers().is_empty());
    }

    #[test]
    fn test_stop_builds_session_and_resets() {
        let (ticker, mut c) = make_controller();
        let req = c.start("Calculus").unwrap().unwrap();
        c.resources_loaded(req.draft, vec![res("https://a"), res("https://a")]);
        run_ticks(&mut c, 15);

        let session = c.stop().unwrap();
        assert_eq!(session.topic, "Calculus");
        assert_eq!(session.duration_seconds, 15);
        assert_eq!(session.resources.len(), 1);
        assert!(session.quiz_result.is_none());
        assert!(session.end_time >= session.start_time);

        assert_eq!(c.phase(), StudyPhase::Idle);
        assert!(c.resources().is_empty());
        assert_eq!(c.resource_fetch(), ResourceFetch::NotRequested);
        assert!(ticker.live_timers().is_empty());
    }

    #[test]
    fn test_stop_from_paused() {
        let (_ticker, mut c) = make_controller();
        c.start("Rust").unwrap();
        run_ticks(&mut c, 11);
        c.pause();
        assert_eq!(c.stop().unwrap().duration_seconds, 11);
    }

    #[test]
    fn test_stop_when_idle_is_an_error() {
        let (_ticker, mut c) = make_controller();
        assert_eq!(c.stop(), Err(StudyError::NotStarted));
    }

    #[test]
    fn test_late_resources_for_old_draft_dropped() {
        let (_ticker, mut c) = make_controller();
        let req = c.start("Rust").unwrap().unwrap();
        c.discard();
        c.start("Go").unwrap();
        assert!(!c.resources_loaded(req.draft, vec![res("https://rust")]));
        assert!(c.resources().is_empty());
    }

    #[test]
    fn test_new_draft_fetches_again() {
        let (_ticker, mut c) = make_controller();
        c.start("Rust").unwrap().unwrap();
        run_ticks(&mut c, 12);
        c.stop().unwrap();
        assert!(c.start("Go").unwrap().is_some());
    }

    #[test]
    fn test_drop_cancels_timer() {
        let (ticker, mut c) = make_controller();
        c.start("Rust").unwrap();
        assert_eq!(ticker.live_timers().len(), 1);
        drop(c);
        assert!(ticker.live_timers().is_empty());
    }
}
