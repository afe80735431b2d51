//! Periodic status reconciliation
//!
//! Run once per menu iteration: moves past-due tasks to overdue (end of
//! day rule) and fires the one-day and one-hour reminders. The task file
//! is written only when something changed.

use chrono::{DateTime, Local};
use std::sync::Arc;
use tracing::info;

use tugas_core::EndOfDayOverdueCheck;
use tugas_core::reconcile::{due_reminders, mark_overdue};

use crate::activity::ActivityLog;
use crate::notify::Notify;
use crate::storage::TaskStore;

pub struct StatusReconciler {
    store: TaskStore,
    notifier: Arc<dyn Notify>,
    activity: ActivityLog,
}

impl StatusReconciler {
    pub fn new(store: TaskStore, notifier: Arc<dyn Notify>, activity: ActivityLog) -> Self {
        Self {
            store,
            notifier,
            activity,
        }
    }

    /// Mark pending tasks past the end of their deadline day as overdue
    pub fn reconcile_overdue(&self) -> bool {
        self.reconcile_overdue_at(Local::now())
    }

    pub fn reconcile_overdue_at(&self, now: DateTime<Local>) -> bool {
        let mut transitions = Vec::new();
        self.store.update(|tasks| {
            transitions = mark_overdue(tasks, now, &EndOfDayOverdueCheck);
            !transitions.is_empty()
        });

        for transition in &transitions {
            self.activity.record(format!(
                "Tugas #{} '{}' melewati deadline {}: BELUM -> TERLAMBAT",
                transition.id, transition.name, transition.deadline
            ));
        }

        !transitions.is_empty()
    }

    /// Fire reminders for tasks entering the one-day or one-hour window
    pub fn fire_time_based_reminders(&self) -> bool {
        self.fire_time_based_reminders_at(Local::now())
    }

    pub fn fire_time_based_reminders_at(&self, now: DateTime<Local>) -> bool {
        let mut reminders = Vec::new();
        self.store.update(|tasks| {
            reminders = due_reminders(tasks, now);
            !reminders.is_empty()
        });

        // Notify outside the writer lock
        for reminder in &reminders {
            info!(task = reminder.task_id, window = reminder.kind.label(), "reminder fired");
            self.notifier.notify(&reminder.title(), &reminder.message());
        }

        !reminders.is_empty()
    }
}
