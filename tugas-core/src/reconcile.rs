//! Reconciliation rules
//!
//! Pure functions that mutate tasks in place and report what changed.
//! Callers decide how to notify, log and persist.

use chrono::{DateTime, Duration, Local};

use crate::deadline;
use crate::overdue::OverduePolicy;
use crate::task::{Task, TaskStatus};

/// A task that just moved from pending to overdue
#[derive(Debug, Clone, PartialEq)]
pub struct OverdueTransition {
    pub id: u32,
    pub name: String,
    pub deadline: String,
}

/// Reminder thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderKind {
    OneDay,
    OneHour,
}

impl ReminderKind {
    /// Remaining time at or below which the reminder is due
    pub fn threshold(&self) -> Duration {
        match self {
            ReminderKind::OneDay => Duration::seconds(86_400),
            ReminderKind::OneHour => Duration::seconds(3_600),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReminderKind::OneDay => "1 hari",
            ReminderKind::OneHour => "1 jam",
        }
    }
}

/// A reminder that became due during this pass
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub task_id: u32,
    pub name: String,
    pub subject: String,
    pub kind: ReminderKind,
    pub remaining: Duration,
}

impl Reminder {
    pub fn title(&self) -> String {
        format!("Pengingat {}: {}", self.kind.label(), self.name)
    }

    pub fn message(&self) -> String {
        format!(
            "Tugas '{}' ({}) jatuh tempo dalam {}",
            self.name,
            self.subject,
            deadline::format_remaining(self.remaining)
        )
    }
}

/// Move pending tasks whose deadline has passed under `policy` to overdue
///
/// Tasks with an empty or unparseable deadline are skipped, as are done
/// and already overdue tasks.
pub fn mark_overdue(
    tasks: &mut [Task],
    now: DateTime<Local>,
    policy: &impl OverduePolicy,
) -> Vec<OverdueTransition> {
    let mut transitions = Vec::new();

    for task in tasks.iter_mut() {
        if task.deadline.trim().is_empty() || task.status != TaskStatus::Pending {
            continue;
        }

        if matches!(policy.is_overdue(&task.deadline, now), Ok(true)) && task.mark_overdue() {
            transitions.push(OverdueTransition {
                id: task.id,
                name: task.name.clone(),
                deadline: task.deadline.clone(),
            });
        }
    }

    transitions
}

/// Latch one-day and one-hour reminder flags for tasks entering those windows
///
/// Both windows are checked on every call, so a task first seen with less
/// than an hour left yields both reminders at once. Done tasks never fire.
pub fn due_reminders(tasks: &mut [Task], now: DateTime<Local>) -> Vec<Reminder> {
    let mut reminders = Vec::new();

    for task in tasks.iter_mut() {
        if task.is_done() {
            continue;
        }

        let Ok(resolved) = deadline::parse(&task.deadline) else {
            continue;
        };

        let remaining = resolved - now;
        if remaining <= Duration::zero() {
            continue;
        }

        for kind in [ReminderKind::OneDay, ReminderKind::OneHour] {
            let flag = match kind {
                ReminderKind::OneDay => &mut task.notified_1d,
                ReminderKind::OneHour => &mut task.notified_1h,
            };

            if remaining <= kind.threshold() && !*flag {
                *flag = true;
                reminders.push(Reminder {
                    task_id: task.id,
                    name: task.name.clone(),
                    subject: task.subject.clone(),
                    kind,
                    remaining,
                });
            }
        }
    }

    reminders
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deadline::DATE_TIME_SECONDS_FORMAT;
    use crate::overdue::{EndOfDayOverdueCheck, ExactInstantOverdueCheck};

    fn task_due(id: u32, deadline: &str) -> Task {
        Task::new(id, format!("Tugas {}", id), "Biologi", deadline)
    }

    fn in_from(now: DateTime<Local>, offset: Duration) -> String {
        (now + offset).format(DATE_TIME_SECONDS_FORMAT).to_string()
    }

    #[test]
    fn test_past_date_becomes_overdue() {
        let mut tasks = vec![task_due(1, "01-01-2020")];

        let transitions = mark_overdue(&mut tasks, Local::now(), &EndOfDayOverdueCheck);

        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].id, 1);
        assert_eq!(tasks[0].status, TaskStatus::Overdue);
    }

    #[test]
    fn test_done_and_overdue_tasks_are_left_alone() {
        let mut tasks = vec![
            task_due(1, "01-01-2020").with_status(TaskStatus::Done),
            task_due(2, "01-01-2020").with_status(TaskStatus::Overdue),
            task_due(3, ""),
            task_due(4, "bukan tanggal"),
        ];

        let transitions = mark_overdue(&mut tasks, Local::now(), &EndOfDayOverdueCheck);

        assert!(transitions.is_empty());
        assert_eq!(tasks[0].status, TaskStatus::Done);
        assert_eq!(tasks[1].status, TaskStatus::Overdue);
        assert_eq!(tasks[2].status, TaskStatus::Pending);
    }

    #[test]
    fn test_end_of_day_ignores_time_of_day() {
        let now = deadline::parse("15-06-2024 18:00").unwrap();
        let mut tasks = vec![task_due(1, "15-06-2024 09:00")];

        assert!(mark_overdue(&mut tasks, now, &EndOfDayOverdueCheck).is_empty());
        assert_eq!(mark_overdue(&mut tasks, now, &ExactInstantOverdueCheck).len(), 1);
    }

    #[test]
    fn test_overdue_is_reported_once() {
        let mut tasks = vec![task_due(1, "01-01-2020")];
        let now = Local::now();

        assert_eq!(mark_overdue(&mut tasks, now, &EndOfDayOverdueCheck).len(), 1);
        assert!(mark_overdue(&mut tasks, now, &EndOfDayOverdueCheck).is_empty());
    }

    #[test]
    fn test_thirty_minutes_left_fires_both_reminders() {
        let now = Local::now();
        let mut tasks = vec![task_due(1, &in_from(now, Duration::minutes(30)))];

        let reminders = due_reminders(&mut tasks, now);

        assert_eq!(reminders.len(), 2);
        assert_eq!(reminders[0].kind, ReminderKind::OneDay);
        assert_eq!(reminders[1].kind, ReminderKind::OneHour);
        assert!(tasks[0].notified_1d);
        assert!(tasks[0].notified_1h);
    }

    #[test]
    fn test_reminders_latch() {
        let now = Local::now();
        let mut tasks = vec![task_due(1, &in_from(now, Duration::hours(5)))];

        assert_eq!(due_reminders(&mut tasks, now).len(), 1);
        assert!(tasks[0].notified_1d);
        assert!(!tasks[0].notified_1h);

        // Same window again: nothing new
        assert!(due_reminders(&mut tasks, now).is_empty());

        // Entering the hour window fires only the hourly reminder
        let later = now + Duration::hours(4) + Duration::minutes(30);
        let reminders = due_reminders(&mut tasks, later);
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].kind, ReminderKind::OneHour);

        assert!(due_reminders(&mut tasks, later).is_empty());
        assert!(tasks[0].notified_1d && tasks[0].notified_1h);
    }

    #[test]
    fn test_no_reminder_outside_window_or_when_done() {
        let now = Local::now();
        let mut tasks = vec![
            task_due(1, &in_from(now, Duration::days(3))),
            task_due(2, &in_from(now, Duration::minutes(10))).with_status(TaskStatus::Done),
            task_due(3, &in_from(now, Duration::minutes(-10))),
        ];

        assert!(due_reminders(&mut tasks, now).is_empty());
        assert!(tasks.iter().all(|t| !t.notified_1d && !t.notified_1h));
    }

    #[test]
    fn test_reminder_message_mentions_task() {
        let reminder = Reminder {
            task_id: 7,
            name: "Laporan".to_string(),
            subject: "Kimia".to_string(),
            kind: ReminderKind::OneHour,
            remaining: Duration::minutes(45),
        };

        assert_eq!(reminder.title(), "Pengingat 1 jam: Laporan");
        assert_eq!(
            reminder.message(),
            "Tugas 'Laporan' (Kimia) jatuh tempo dalam 45 menit"
        );
    }
}
