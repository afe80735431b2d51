//! Task domain model
//!
//! Pure domain logic for task management with no I/O operations.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::deadline;
use crate::error::{CoreError, Result};

/// Format of the informational `created_at` timestamp
pub const CREATED_AT_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    #[serde(alias = "low", alias = "rendah", alias = "RENDAH")]
    Low,
    #[default]
    #[serde(alias = "medium", alias = "sedang", alias = "SEDANG")]
    Medium,
    #[serde(alias = "high", alias = "tinggi", alias = "TINGGI")]
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    /// Label shown to the user
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Rendah",
            Priority::Medium => "Sedang",
            Priority::High => "Tinggi",
        }
    }

    /// Parse a menu answer: `1`/`2`/`3` or a name in either language
    ///
    /// Blank input yields the default priority.
    pub fn from_input(input: &str) -> Result<Self> {
        match input.trim().to_lowercase().as_str() {
            "" => Ok(Priority::default()),
            "1" | "low" | "rendah" => Ok(Priority::Low),
            "2" | "medium" | "sedang" => Ok(Priority::Medium),
            "3" | "high" | "tinggi" => Ok(Priority::High),
            other => Err(CoreError::validation(
                "priority",
                format!("'{}' bukan 1 (rendah), 2 (sedang) atau 3 (tinggi)", other),
            )),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
        };
        write!(f, "{}", name)
    }
}

/// Tri-state task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "BELUM", alias = "PENDING")]
    Pending,
    #[serde(rename = "SELESAI", alias = "DONE")]
    Done,
    #[serde(rename = "TERLAMBAT", alias = "OVERDUE")]
    Overdue,
}

impl TaskStatus {
    /// Legacy boolean mirror of the status
    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }

    /// Derive a status from the legacy `completed` flag
    pub fn from_completed(completed: bool) -> Self {
        if completed {
            TaskStatus::Done
        } else {
            TaskStatus::Pending
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Belum",
            TaskStatus::Done => "Selesai",
            TaskStatus::Overdue => "Terlambat",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TaskStatus::Pending => "BELUM",
            TaskStatus::Done => "SELESAI",
            TaskStatus::Overdue => "TERLAMBAT",
        };
        write!(f, "{}", name)
    }
}

/// A single task
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: u32,
    pub name: String,
    pub subject: String,
    /// Deadline text in one of the forms accepted by [`deadline::parse`]
    pub deadline: String,
    pub priority: Priority,
    pub status: TaskStatus,
    /// Latched once the one-day reminder fired
    pub notified_1d: bool,
    /// Latched once the one-hour reminder fired
    pub notified_1h: bool,
    pub created_at: String,
}

impl Task {
    /// Create a pending task with both reminder flags cleared
    pub fn new(
        id: u32,
        name: impl Into<String>,
        subject: impl Into<String>,
        deadline: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            subject: subject.into(),
            deadline: deadline.into(),
            priority: Priority::default(),
            status: TaskStatus::Pending,
            notified_1d: false,
            notified_1h: false,
            created_at: Local::now().format(CREATED_AT_FORMAT).to_string(),
        }
    }

    /// Validate user input and build a new task for the given collection
    ///
    /// The deadline is stored in its canonical form. Nothing is created
    /// when any field is invalid.
    pub fn create(
        existing: &[Task],
        name: &str,
        subject: &str,
        deadline_input: &str,
        priority: Priority,
    ) -> Result<Self> {
        let name = required("nama", name)?;
        let subject = required("mata_pelajaran", subject)?;
        let resolved = deadline::parse(deadline_input)?;

        Ok(Task::new(next_id(existing)?, name, subject, deadline::format_deadline(&resolved))
            .with_priority(priority))
    }

    /// Builder method to set priority
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Builder method to set status
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Builder method to set the creation timestamp
    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = created_at.into();
        self
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    /// Resolve the deadline to an exact instant
    pub fn resolved_deadline(&self) -> Result<DateTime<Local>> {
        deadline::parse(&self.deadline)
    }

    /// Toggle between done and not done
    ///
    /// A pending or overdue task becomes done; a done task goes back to
    /// pending and is re-evaluated by the next reconciliation.
    pub fn toggle_done(&mut self) -> TaskStatus {
        self.status = match self.status {
            TaskStatus::Done => TaskStatus::Pending,
            TaskStatus::Pending | TaskStatus::Overdue => TaskStatus::Done,
        };
        self.status
    }

    /// Move a pending task to overdue. Returns whether the status changed.
    pub fn mark_overdue(&mut self) -> bool {
        if self.status == TaskStatus::Pending {
            self.status = TaskStatus::Overdue;
            true
        } else {
            false
        }
    }
}

/// Field changes requested by the edit operation; `None` keeps the field
#[derive(Debug, Clone, Default)]
pub struct TaskEdit {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub deadline: Option<String>,
    pub priority: Option<Priority>,
}

impl TaskEdit {
    /// Build an edit from raw answers, treating blank answers as "keep"
    pub fn from_input(name: &str, subject: &str, deadline: &str, priority: &str) -> Result<Self> {
        let priority = if priority.trim().is_empty() {
            None
        } else {
            Some(Priority::from_input(priority)?)
        };

        Ok(Self {
            name: non_blank(name),
            subject: non_blank(subject),
            deadline: non_blank(deadline),
            priority,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.subject.is_none()
            && self.deadline.is_none()
            && self.priority.is_none()
    }

    /// Apply the edit; the task is untouched when the new deadline is invalid
    ///
    /// Reminder flags stay latched and an overdue task stays overdue.
    pub fn apply(&self, task: &mut Task) -> Result<()> {
        let deadline = match &self.deadline {
            Some(input) => Some(deadline::format_deadline(&deadline::parse(input)?)),
            None => None,
        };

        if let Some(name) = &self.name {
            task.name = name.clone();
        }
        if let Some(subject) = &self.subject {
            task.subject = subject.clone();
        }
        if let Some(deadline) = deadline {
            task.deadline = deadline;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        Ok(())
    }
}

/// Next id for a new task: one past the highest id in use
pub fn next_id(tasks: &[Task]) -> Result<u32> {
    tasks
        .iter()
        .map(|t| t.id)
        .max()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or_else(|| CoreError::validation("id", format!("id {} sudah maksimum", u32::MAX)))
}

/// An id changed by [`ensure_unique_ids`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdChange {
    pub from: u32,
    pub to: u32,
}

/// Give every repeated (or zero) id a fresh one, keeping the first holder
///
/// Older files numbered tasks by count, so ids can repeat after deletes.
/// Fresh ids continue past the highest id in use.
pub fn ensure_unique_ids(tasks: &mut [Task]) -> Vec<IdChange> {
    let mut seen = HashSet::new();
    let mut changes = Vec::new();
    let mut candidate = tasks.iter().map(|t| t.id).max().unwrap_or(0).wrapping_add(1).max(1);
    let taken: HashSet<u32> = tasks.iter().map(|t| t.id).collect();

    for task in tasks.iter_mut() {
        if task.id != 0 && seen.insert(task.id) {
            continue;
        }

        while candidate == 0 || taken.contains(&candidate) || seen.contains(&candidate) {
            candidate = candidate.wrapping_add(1);
        }

        changes.push(IdChange {
            from: task.id,
            to: candidate,
        });
        task.id = candidate;
        seen.insert(candidate);
    }

    changes
}

/// Find a mutable task by id (first match)
pub fn find_mut(tasks: &mut [Task], id: u32) -> Option<&mut Task> {
    tasks.iter_mut().find(|t| t.id == id)
}

/// Remove a task by id (first match)
pub fn remove(tasks: &mut Vec<Task>, id: u32) -> Option<Task> {
    let pos = tasks.iter().position(|t| t.id == id)?;
    Some(tasks.remove(pos))
}

/// Parse a 1-based list number into a 0-based index
pub fn parse_selection(input: &str, len: usize) -> Result<usize> {
    let input = input.trim();
    match input.parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Ok(n - 1),
        _ => Err(CoreError::invalid_selection(input, len)),
    }
}

fn required(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CoreError::validation(field, "tidak boleh kosong"));
    }
    Ok(value.to_string())
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: u32) -> Task {
        Task::new(id, format!("Tugas {}", id), "Matematika", "15-06-2030")
    }

    #[test]
    fn test_task_creation_defaults() {
        let task = Task::create(&[], "PR Aljabar", " Matematika ", "15-06-2030 14:30", Priority::High)
            .unwrap();

        assert_eq!(task.id, 1);
        assert_eq!(task.subject, "Matematika");
        assert_eq!(task.deadline, "15-06-2030 14:30");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(!task.notified_1d);
        assert!(!task.notified_1h);
    }

    #[test]
    fn test_create_rejects_malformed_deadline() {
        let result = Task::create(&[], "PR", "Fisika", "2024/06/15", Priority::Medium);
        assert!(matches!(result, Err(CoreError::InvalidDeadlineFormat(_))));
    }

    #[test]
    fn test_create_rejects_blank_fields() {
        assert!(Task::create(&[], "  ", "Fisika", "15-06-2030", Priority::Medium).is_err());
        assert!(Task::create(&[], "PR", "", "15-06-2030", Priority::Medium).is_err());
    }

    #[test]
    fn test_next_id_skips_past_deleted_ids() {
        let mut tasks = vec![sample(1), sample(2), sample(3)];
        remove(&mut tasks, 1);

        // count+1 would collide with task 3
        assert_eq!(next_id(&tasks).unwrap(), 4);
        assert_eq!(next_id(&[]).unwrap(), 1);
    }

    #[test]
    fn test_next_id_at_the_top_of_the_range() {
        let tasks = vec![sample(u32::MAX)];

        assert!(matches!(next_id(&tasks), Err(CoreError::Validation { .. })));
        assert!(Task::create(&tasks, "PR", "Fisika", "15-06-2030", Priority::Medium).is_err());
    }

    #[test]
    fn test_ensure_unique_ids_renumbers_repeats() {
        let mut tasks = vec![sample(2), sample(2), sample(0), sample(3)];

        let changes = ensure_unique_ids(&mut tasks);

        let ids: Vec<u32> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 4, 5, 3]);
        assert_eq!(changes, vec![IdChange { from: 2, to: 4 }, IdChange { from: 0, to: 5 }]);
        assert!(ensure_unique_ids(&mut tasks).is_empty());
    }

    #[test]
    fn test_row_selection_after_renumbering_hits_that_row() {
        let mut tasks = vec![
            Task::new(2, "B", "X", "01-01-2098"),
            Task::new(2, "C", "X", "01-01-2099"),
        ];
        ensure_unique_ids(&mut tasks);

        let picked = crate::filter::display_order(&tasks)[parse_selection("2", 2).unwrap()].id;
        let removed = remove(&mut tasks, picked).unwrap();

        assert_eq!(removed.name, "C");
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].name, "B");
    }

    #[test]
    fn test_ensure_unique_ids_wraps_past_the_maximum() {
        let mut tasks = vec![sample(u32::MAX), sample(u32::MAX), sample(1)];

        ensure_unique_ids(&mut tasks);

        assert_eq!(tasks[1].id, 2);
    }

    #[test]
    fn test_toggle_done() {
        let mut task = sample(1);
        assert_eq!(task.toggle_done(), TaskStatus::Done);
        assert_eq!(task.toggle_done(), TaskStatus::Pending);

        task.status = TaskStatus::Overdue;
        assert_eq!(task.toggle_done(), TaskStatus::Done);
    }

    #[test]
    fn test_mark_overdue_only_from_pending() {
        let mut task = sample(1);
        assert!(task.mark_overdue());
        assert!(!task.mark_overdue());

        let mut done = sample(2).with_status(TaskStatus::Done);
        assert!(!done.mark_overdue());
        assert_eq!(done.status, TaskStatus::Done);
    }

    #[test]
    fn test_edit_keeps_blank_fields() {
        let mut task = sample(1);
        let edit = TaskEdit::from_input("Baru", "", "", "").unwrap();
        edit.apply(&mut task).unwrap();

        assert_eq!(task.name, "Baru");
        assert_eq!(task.subject, "Matematika");
        assert_eq!(task.deadline, "15-06-2030");
    }

    #[test]
    fn test_edit_with_invalid_deadline_changes_nothing() {
        let mut task = sample(1);
        let before = task.clone();
        let edit = TaskEdit::from_input("Baru", "Kimia", "besok", "3").unwrap();

        assert!(edit.apply(&mut task).is_err());
        assert_eq!(task, before);
    }

    #[test]
    fn test_priority_from_input() {
        assert_eq!(Priority::from_input("").unwrap(), Priority::Medium);
        assert_eq!(Priority::from_input("3").unwrap(), Priority::High);
        assert_eq!(Priority::from_input("Rendah").unwrap(), Priority::Low);
        assert!(Priority::from_input("urgent").is_err());
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("1", 3).unwrap(), 0);
        assert_eq!(parse_selection(" 3 ", 3).unwrap(), 2);
        assert!(matches!(
            parse_selection("4", 3),
            Err(CoreError::InvalidSelection { max: 3, .. })
        ));
        assert!(parse_selection("0", 3).is_err());
        assert!(parse_selection("abc", 3).is_err());
    }
}
