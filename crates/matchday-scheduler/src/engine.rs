use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use matchday_core::notice::ReminderNotice;

use crate::types::{JobKey, ReminderJob};

/// Queue entry, min-ordered by `(fire instant, key)` via `Reverse`. The key
/// tiebreak keeps pops deterministic for jobs due at the same instant.
#[derive(Debug, Clone)]
struct QueuedJob(ReminderJob);

impl PartialEq for QueuedJob {
    fn eq(&self, other: &Self) -> bool {
        self.0.fire_at == other.0.fire_at && self.0.key == other.0.key
    }
}

impl Eq for QueuedJob {}

impl PartialOrd for QueuedJob {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedJob {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.0.fire_at, self.0.key).cmp(&(other.0.fire_at, other.0.key))
    }
}

/// All mutable scheduler state, guarded by one mutex. The due-scan and the
/// cancel-then-install swap both take the lock, so a resync is atomic with
/// respect to firing.
struct EngineState {
    /// Monotonically advancing generation number, for logging.
    generation: u64,
    /// Pending jobs of the current generation.
    queue: BinaryHeap<Reverse<QueuedJob>>,
    /// Terminal firings, keyed by `(key, fire instant)`. Pruned on resync to
    /// the entries the incoming generation could duplicate; a rescheduled
    /// kickoff gets a new fire instant and may legitimately fire again.
    fired: HashSet<(JobKey, DateTime<Utc>)>,
}

impl EngineState {
    fn new() -> Self {
        Self {
            generation: 0,
            queue: BinaryHeap::new(),
            fired: HashSet::new(),
        }
    }

    /// Cancel the current generation and install `jobs` as the next one.
    /// Returns `(generation, installed, superseded)`.
    fn install(&mut self, jobs: Vec<ReminderJob>) -> (u64, usize, usize) {
        let superseded = self.queue.len();
        self.generation += 1;

        let incoming: HashSet<(JobKey, DateTime<Utc>)> =
            jobs.iter().map(|j| (j.key, j.fire_at)).collect();
        self.fired.retain(|entry| incoming.contains(entry));

        self.queue = jobs
            .into_iter()
            .filter(|j| !self.fired.contains(&(j.key, j.fire_at)))
            .map(|j| Reverse(QueuedJob(j)))
            .collect();

        (self.generation, self.queue.len(), superseded)
    }

    /// Drop every pending job. In-flight firings already handed to the
    /// delivery channel are unaffected.
    fn cancel(&mut self) -> usize {
        let dropped = self.queue.len();
        self.generation += 1;
        self.queue.clear();
        dropped
    }

    /// Pop every job due at `now`, in non-decreasing fire-instant order,
    /// recording each as fired.
    fn take_due(&mut self, now: DateTime<Utc>) -> Vec<ReminderJob> {
        let mut due = Vec::new();
        while let Some(Reverse(next)) = self.queue.peek() {
            if next.0.fire_at > now {
                break;
            }
            let Some(Reverse(QueuedJob(job))) = self.queue.pop() else {
                break;
            };
            if self.fired.insert((job.key, job.fire_at)) {
                due.push(job);
            }
        }
        due
    }
}

/// Cloneable management handle: resync, cancel, and status queries while the
/// engine loop runs. Shares the engine's state mutex.
#[derive(Clone)]
pub struct SchedulerHandle {
    state: Arc<Mutex<EngineState>>,
}

impl SchedulerHandle {
    /// Atomically replace the installed generation with `jobs`: one critical
    /// section covers the cancel and the install, so the firing path sees
    /// either the old complete generation or the new one, never a mix.
    pub fn resync_to(&self, jobs: Vec<ReminderJob>) {
        let (generation, installed, superseded) = self.state.lock().unwrap().install(jobs);
        info!(generation, installed, superseded, "schedule generation installed");
    }

    /// Mark the current generation superseded without installing a new one.
    /// Pending jobs will not fire; a firing already underway completes.
    pub fn cancel_generation(&self) {
        let dropped = self.state.lock().unwrap().cancel();
        info!(dropped, "schedule generation cancelled");
    }

    /// Number of pending jobs in the installed generation.
    pub fn pending_count(&self) -> usize {
        self.state.lock().unwrap().queue.len()
    }

    /// Fire instant of the next pending job, if any.
    pub fn next_fire_at(&self) -> Option<DateTime<Utc>> {
        self.state
            .lock()
            .unwrap()
            .queue
            .peek()
            .map(|Reverse(j)| j.0.fire_at)
    }
}

/// Drives job execution: polls the installed generation every second and
/// forwards due reminders to the delivery channel.
pub struct SchedulerEngine {
    state: Arc<Mutex<EngineState>>,
    fired_tx: mpsc::Sender<ReminderNotice>,
}

impl SchedulerEngine {
    /// Create an engine with an empty schedule. Fired reminders are forwarded
    /// over `fired_tx` with `try_send`, so the tick loop is never stalled by a
    /// slow consumer.
    pub fn new(fired_tx: mpsc::Sender<ReminderNotice>) -> Self {
        Self {
            state: Arc::new(Mutex::new(EngineState::new())),
            fired_tx,
        }
    }

    /// Management handle sharing this engine's state.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            state: Arc::clone(&self.state),
        }
    }

    /// Main event loop. Polls every second until `shutdown` broadcasts `true`.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("scheduler engine started");
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));
        loop {
            tokio::select! {
                _ = interval.tick() => self.tick(Utc::now()),
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("scheduler engine shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// One due-scan. The scan itself runs under the state lock; the handoff to
    /// the delivery channel happens after the lock is released, at which point
    /// the popped jobs count as in-flight firings.
    fn tick(&self, now: DateTime<Utc>) {
        let due = self.state.lock().unwrap().take_due(now);
        for job in due {
            info!(
                match_id = job.key.match_id,
                lead_hours = job.key.lead_hours,
                "reminder due — dispatching"
            );
            if self.fired_tx.try_send(job.notice).is_err() {
                warn!(
                    match_id = job.key.match_id,
                    lead_hours = job.key.lead_hours,
                    "delivery channel full or closed — reminder dropped"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use matchday_core::types::{CompetitionKind, Fixture};

    fn fixture(id: u64, kickoff: DateTime<Utc>) -> Fixture {
        Fixture {
            id,
            kickoff,
            opponent: "Sevilla".into(),
            competition: CompetitionKind::LaLiga,
        }
    }

    fn job(id: u64, kickoff: DateTime<Utc>, lead: u32) -> ReminderJob {
        ReminderJob::for_fixture(&fixture(id, kickoff), lead)
    }

    fn engine() -> (SchedulerEngine, mpsc::Receiver<ReminderNotice>) {
        let (tx, rx) = mpsc::channel(16);
        (SchedulerEngine::new(tx), rx)
    }

    #[test]
    fn due_jobs_fire_in_fire_instant_order() {
        let (engine, _rx) = engine();
        let handle = engine.handle();
        let now = Utc::now();
        let kickoff = now + Duration::hours(1);

        // 7h and 5h leads are already due; installed out of order.
        handle.resync_to(vec![job(1, kickoff, 5), job(1, kickoff, 7)]);
        let due = engine.state.lock().unwrap().take_due(now);

        let leads: Vec<_> = due.iter().map(|j| j.key.lead_hours).collect();
        assert_eq!(leads, vec![7, 5]);
    }

    #[test]
    fn future_jobs_do_not_fire_early() {
        let (engine, _rx) = engine();
        let handle = engine.handle();
        let now = Utc::now();

        handle.resync_to(vec![job(1, now + Duration::hours(12), 7)]);
        assert!(engine.state.lock().unwrap().take_due(now).is_empty());
        assert_eq!(handle.pending_count(), 1);
    }

    #[test]
    fn cancelled_before_due_never_fires() {
        let (engine, _rx) = engine();
        let handle = engine.handle();
        let now = Utc::now();
        let kickoff = now + Duration::hours(3);

        handle.resync_to(vec![job(1, kickoff, 2)]);
        handle.cancel_generation();

        // Well past the fire instant — nothing may fire.
        let later = now + Duration::hours(4);
        assert!(engine.state.lock().unwrap().take_due(later).is_empty());
        assert_eq!(handle.pending_count(), 0);
    }

    #[test]
    fn resync_replaces_the_pending_generation() {
        let (engine, _rx) = engine();
        let handle = engine.handle();
        let now = Utc::now();

        handle.resync_to(vec![job(1, now + Duration::hours(12), 7)]);
        handle.resync_to(vec![job(2, now + Duration::hours(12), 7)]);

        let due = engine
            .state
            .lock()
            .unwrap()
            .take_due(now + Duration::hours(6));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].key.match_id, 2);
    }

    #[test]
    fn resync_twice_with_same_jobs_is_stable() {
        let (engine, _rx) = engine();
        let handle = engine.handle();
        let now = Utc::now();
        let jobs = vec![
            job(1, now + Duration::hours(12), 7),
            job(1, now + Duration::hours(12), 5),
        ];

        handle.resync_to(jobs.clone());
        handle.resync_to(jobs);
        assert_eq!(handle.pending_count(), 2);

        // Each key fires exactly once.
        let due = engine
            .state
            .lock()
            .unwrap()
            .take_due(now + Duration::hours(11));
        assert_eq!(due.len(), 2);
    }

    #[test]
    fn fired_job_not_refired_across_resync() {
        let (engine, _rx) = engine();
        let handle = engine.handle();
        let now = Utc::now();
        let kickoff = now + Duration::hours(1);

        handle.resync_to(vec![job(1, kickoff, 2)]);
        let fired = engine.state.lock().unwrap().take_due(now);
        assert_eq!(fired.len(), 1);

        // Same (key, fire instant) reappears in the next generation — the old
        // firing is terminal, the job must not be installed again.
        handle.resync_to(vec![job(1, kickoff, 2)]);
        assert_eq!(handle.pending_count(), 0);
        assert!(engine.state.lock().unwrap().take_due(now).is_empty());
    }

    #[test]
    fn moved_kickoff_fires_again() {
        let (engine, _rx) = engine();
        let handle = engine.handle();
        let now = Utc::now();

        handle.resync_to(vec![job(1, now + Duration::hours(1), 2)]);
        assert_eq!(engine.state.lock().unwrap().take_due(now).len(), 1);

        // The match was postponed: same key, new fire instant — a fresh
        // reminder is due.
        let moved = job(1, now + Duration::hours(9), 2);
        handle.resync_to(vec![moved]);
        assert_eq!(handle.pending_count(), 1);
        let due = engine
            .state
            .lock()
            .unwrap()
            .take_due(now + Duration::hours(8));
        assert_eq!(due.len(), 1);
    }

    #[test]
    fn cancellation_does_not_abort_an_in_flight_firing() {
        let (engine, mut rx) = engine();
        let handle = engine.handle();
        let now = Utc::now();
        let kickoff = now + Duration::hours(1);

        handle.resync_to(vec![job(1, kickoff, 2)]);
        // The due job is popped and handed to the delivery channel, then the
        // generation is cancelled while that firing is still in flight.
        engine.tick(now);
        handle.cancel_generation();

        // Cancellation suppresses future firings only — the in-flight one
        // still reaches the delivery channel.
        let notice = rx.try_recv().unwrap();
        assert_eq!(notice.match_id, 1);
        assert_eq!(notice.lead_hours, 2);
        assert_eq!(handle.pending_count(), 0);
    }

    #[test]
    fn tick_forwards_due_notices() {
        let (engine, mut rx) = engine();
        let handle = engine.handle();
        let now = Utc::now();
        let kickoff = now + Duration::hours(3);

        handle.resync_to(vec![job(1, kickoff, 5), job(1, kickoff, 2)]);
        engine.tick(now);

        let first = rx.try_recv().unwrap();
        assert_eq!(first.lead_hours, 5);
        assert!(rx.try_recv().is_err());
        // The 2h reminder is still pending for later.
        assert_eq!(handle.pending_count(), 1);
    }

    #[test]
    fn next_fire_at_reports_head_of_queue() {
        let (engine, _rx) = engine();
        let handle = engine.handle();
        let now = Utc::now();
        let kickoff = now + Duration::hours(12);

        assert!(handle.next_fire_at().is_none());
        handle.resync_to(vec![job(1, kickoff, 2), job(1, kickoff, 7)]);
        assert_eq!(handle.next_fire_at(), Some(kickoff - Duration::hours(7)));
    }
}
