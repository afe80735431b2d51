//! Deferred deadline actions
//!
//! A task with an explicit time of day gets a background timer that fires
//! at the exact deadline, notifies, and marks the task overdue. Timers are
//! never cancelled: at fire time the task is looked up again by id and
//! nothing happens if it is gone, done, or its deadline moved. A timer
//! that wakes before its deadline (wall clock adjusted) sleeps again.
//!
//! At most one timer is pending per (task id, deadline instant), so the
//! per-iteration rescheduling of the whole collection does not stack
//! duplicate alerts.

use chrono::{DateTime, Local};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use tugas_core::deadline;
use tugas_core::task::find_mut;
use tugas_core::{ExactInstantOverdueCheck, OverduePolicy, Task};

use crate::activity::ActivityLog;
use crate::notify::Notify;
use crate::storage::TaskStore;

type PendingKey = (u32, i64);

pub struct CountdownScheduler {
    handle: Handle,
    context: FireContext,
    pending: Arc<Mutex<HashSet<PendingKey>>>,
}

impl CountdownScheduler {
    pub fn new(
        handle: Handle,
        store: TaskStore,
        notifier: Arc<dyn Notify>,
        activity: ActivityLog,
    ) -> Self {
        Self {
            handle,
            context: FireContext {
                store,
                notifier,
                activity,
            },
            pending: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Schedule a deadline timer if the task has an explicit, future time
    ///
    /// Returns whether a new timer was started.
    pub fn schedule_if_timed(&self, task: &Task) -> bool {
        if task.is_done() {
            return false;
        }

        let Ok(resolved) = task.resolved_deadline() else {
            return false;
        };

        if !deadline::has_explicit_time(&resolved) {
            return false;
        }

        let Ok(wait) = (resolved - Local::now()).to_std() else {
            return false;
        };

        let key = (task.id, resolved.timestamp());
        if !lock(&self.pending).insert(key) {
            return false;
        }

        let context = self.context.clone();
        let pending = Arc::clone(&self.pending);
        let (id, expected) = key;

        self.handle.spawn(async move {
            let mut wait = wait;
            loop {
                tokio::time::sleep(wait).await;

                let context = context.clone();
                let outcome =
                    tokio::task::spawn_blocking(move || context.fire(id, expected, Local::now())).await;
                match outcome {
                    Ok(FireOutcome::Early(rest)) => {
                        debug!(task = id, rest_ms = rest.as_millis() as u64, "woke before deadline");
                        wait = rest;
                    }
                    Ok(FireOutcome::Fired | FireOutcome::Skipped) => break,
                    Err(e) => {
                        warn!(task = id, error = %e, "deadline action failed");
                        break;
                    }
                }
            }

            lock(&pending).remove(&key);
        });

        debug!(task = task.id, wait_secs = wait.as_secs(), "deadline timer scheduled");
        true
    }

    /// Schedule timers for every qualifying task; returns how many started
    pub fn schedule_if_timed_all(&self, tasks: &[Task]) -> usize {
        tasks.iter().filter(|task| self.schedule_if_timed(task)).count()
    }

    /// Number of timers still waiting
    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }
}

fn lock(pending: &Mutex<HashSet<PendingKey>>) -> MutexGuard<'_, HashSet<PendingKey>> {
    pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Everything a timer needs once it wakes up
#[derive(Clone)]
struct FireContext {
    store: TaskStore,
    notifier: Arc<dyn Notify>,
    activity: ActivityLog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FireOutcome {
    Fired,
    /// Task gone, done, or its deadline no longer the one scheduled
    Skipped,
    /// Deadline not reached yet; wait this much longer
    Early(Duration),
}

impl FireContext {
    /// Re-read the task and act on it if its deadline `expected` has come
    fn fire(&self, id: u32, expected: i64, now: DateTime<Local>) -> FireOutcome {
        let mut outcome = FireOutcome::Skipped;
        let mut reached: Option<(Task, bool)> = None;

        self.store.update(|tasks| {
            let Some(task) = find_mut(tasks, id) else {
                return false;
            };

            let Ok(resolved) = ExactInstantOverdueCheck.resolve(&task.deadline) else {
                return false;
            };

            if task.is_done() || resolved.timestamp() != expected {
                return false;
            }

            if !matches!(ExactInstantOverdueCheck.is_overdue(&task.deadline, now), Ok(true)) {
                let rest = (resolved - now).to_std().unwrap_or(Duration::ZERO);
                outcome = FireOutcome::Early(rest);
                return false;
            }

            let changed = task.mark_overdue();
            reached = Some((task.clone(), changed));
            outcome = FireOutcome::Fired;
            changed
        });

        let Some((task, changed)) = reached else {
            debug!(task = id, ?outcome, "deadline action not taken");
            return outcome;
        };

        info!(task = id, "deadline reached");
        if changed {
            self.activity.record(format!(
                "Tugas #{} '{}' mencapai deadline {}: TERLAMBAT",
                task.id, task.name, task.deadline
            ));
        }

        self.notifier.notify(
            &format!("Deadline: {}", task.name),
            &format!(
                "Waktu pengerjaan '{}' ({}) sudah habis ({})",
                task.name, task.subject, task.deadline
            ),
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::testing::RecordingNotifier;
    use chrono::Duration;
    use std::fs;
    use tempfile::TempDir;
    use tokio::runtime::Runtime;
    use tugas_core::TaskStatus;
    use tugas_core::deadline::DATE_TIME_SECONDS_FORMAT;

    struct Fixture {
        dir: TempDir,
        runtime: Runtime,
        store: TaskStore,
        notifier: Arc<RecordingNotifier>,
    }

    impl Fixture {
        fn new(tasks: &[Task]) -> Self {
            let dir = TempDir::new().unwrap();
            let store = TaskStore::new(dir.path().join("tasks.json"));
            store.save(tasks);
            Self {
                dir,
                runtime: Runtime::new().unwrap(),
                store,
                notifier: Arc::new(RecordingNotifier::default()),
            }
        }

        fn activity(&self) -> ActivityLog {
            ActivityLog::new(self.dir.path().join("activity.log"))
        }

        fn scheduler(&self) -> CountdownScheduler {
            CountdownScheduler::new(
                self.runtime.handle().clone(),
                self.store.clone(),
                self.notifier.clone(),
                self.activity(),
            )
        }

        fn context(&self) -> FireContext {
            FireContext {
                store: self.store.clone(),
                notifier: self.notifier.clone(),
                activity: self.activity(),
            }
        }
    }

    fn at(offset: Duration) -> String {
        (Local::now() + offset).format(DATE_TIME_SECONDS_FORMAT).to_string()
    }

    fn instant_of(deadline: &str) -> i64 {
        deadline::parse(deadline).unwrap().timestamp()
    }

    #[test]
    fn test_only_future_explicit_times_are_scheduled() {
        let fx = Fixture::new(&[]);
        let scheduler = fx.scheduler();

        let date_only = Task::new(1, "A", "X", "01-01-2099");
        let past = Task::new(2, "B", "X", at(Duration::hours(-1)));
        let done = Task::new(3, "C", "X", at(Duration::hours(1))).with_status(TaskStatus::Done);
        let invalid = Task::new(4, "D", "X", "besok");

        assert_eq!(scheduler.schedule_if_timed_all(&[date_only, past, done, invalid]), 0);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_same_task_is_scheduled_once() {
        let fx = Fixture::new(&[]);
        let scheduler = fx.scheduler();
        let task = Task::new(1, "Ujian", "Fisika", at(Duration::hours(2)));

        assert!(scheduler.schedule_if_timed(&task));
        assert!(!scheduler.schedule_if_timed(&task));
        assert_eq!(scheduler.schedule_if_timed_all(&[task.clone(), task]), 0);
        assert_eq!(scheduler.pending_count(), 1);
    }

    #[test]
    fn test_moved_deadline_gets_its_own_timer() {
        let fx = Fixture::new(&[]);
        let scheduler = fx.scheduler();
        let mut task = Task::new(1, "Ujian", "Fisika", at(Duration::hours(2)));

        assert!(scheduler.schedule_if_timed(&task));
        task.deadline = at(Duration::hours(3));
        assert!(scheduler.schedule_if_timed(&task));
        assert_eq!(scheduler.pending_count(), 2);
    }

    #[test]
    fn test_fire_marks_overdue_and_notifies() {
        let deadline = at(Duration::minutes(-1));
        let expected = instant_of(&deadline);
        let fx = Fixture::new(&[Task::new(1, "Laporan", "Kimia", deadline)]);

        assert_eq!(fx.context().fire(1, expected, Local::now()), FireOutcome::Fired);

        assert_eq!(fx.store.load()[0].status, TaskStatus::Overdue);
        assert_eq!(fx.notifier.count(), 1);
        let log = fs::read_to_string(fx.dir.path().join("activity.log")).unwrap();
        assert!(log.contains("Laporan"));
    }

    #[test]
    fn test_fire_on_deleted_or_done_task_is_a_no_op() {
        let deadline = at(Duration::minutes(-1));
        let expected = instant_of(&deadline);
        let fx = Fixture::new(&[Task::new(2, "Selesai", "Kimia", deadline).with_status(TaskStatus::Done)]);
        let context = fx.context();

        assert_eq!(context.fire(1, expected, Local::now()), FireOutcome::Skipped);
        assert_eq!(context.fire(2, expected, Local::now()), FireOutcome::Skipped);

        assert_eq!(fx.store.load()[0].status, TaskStatus::Done);
        assert_eq!(fx.notifier.count(), 0);
    }

    #[test]
    fn test_fire_for_moved_deadline_is_a_no_op() {
        let original = instant_of(&at(Duration::minutes(-1)));
        let fx = Fixture::new(&[Task::new(1, "Laporan", "Kimia", at(Duration::hours(1)))]);

        assert_eq!(fx.context().fire(1, original, Local::now()), FireOutcome::Skipped);
        assert_eq!(fx.store.load()[0].status, TaskStatus::Pending);
        assert_eq!(fx.notifier.count(), 0);
    }

    #[test]
    fn test_fire_before_deadline_asks_to_wait_longer() {
        let deadline = at(Duration::minutes(10));
        let expected = instant_of(&deadline);
        let fx = Fixture::new(&[Task::new(1, "Laporan", "Kimia", deadline)]);

        // A timer that woke early, as after a wall clock jump
        let outcome = fx.context().fire(1, expected, Local::now());

        let FireOutcome::Early(rest) = outcome else {
            panic!("expected to wait longer, got {:?}", outcome);
        };
        assert!(rest > std::time::Duration::from_secs(8 * 60));
        assert!(rest <= std::time::Duration::from_secs(10 * 60));
        assert_eq!(fx.store.load()[0].status, TaskStatus::Pending);
        assert_eq!(fx.notifier.count(), 0);
    }

    #[test]
    fn test_timer_fires_at_deadline() {
        let mut offset = Duration::seconds(2);
        // 23:59:59 reads as a date-only deadline
        if !deadline::has_explicit_time(&deadline::parse(&at(offset)).unwrap()) {
            offset = Duration::seconds(3);
        }
        let task = Task::new(1, "Kuis", "Matematika", at(offset));
        let fx = Fixture::new(std::slice::from_ref(&task));
        let scheduler = fx.scheduler();

        assert!(scheduler.schedule_if_timed(&task));
        std::thread::sleep(std::time::Duration::from_millis(4500));

        assert_eq!(fx.store.load()[0].status, TaskStatus::Overdue);
        assert_eq!(fx.notifier.count(), 1);
        assert_eq!(scheduler.pending_count(), 0);
    }
}
