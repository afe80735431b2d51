//! Task filtering, ordering and statistics
//!
//! Display order is derived here and never persisted.

use std::cmp::Ordering;

use crate::task::{Priority, Task, TaskStatus};

/// Builder for filtering tasks
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Case-insensitive search term matched against name and subject
    pub search: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
}

impl TaskFilter {
    /// Create a new filter that matches everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by search term
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into().trim().to_lowercase());
        self
    }

    /// Filter by status
    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Filter by priority
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Check whether a task passes every configured criterion
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(term) = &self.search
            && !task.name.to_lowercase().contains(term.as_str())
            && !task.subject.to_lowercase().contains(term.as_str())
        {
            return false;
        }

        if let Some(status) = self.status
            && task.status != status
        {
            return false;
        }

        if let Some(priority) = self.priority
            && task.priority != priority
        {
            return false;
        }

        true
    }

    /// Matching tasks in display order
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        let matching: Vec<&Task> = tasks.iter().filter(|t| self.matches(t)).collect();
        sort_by_deadline(matching)
    }
}

/// Sort tasks by resolved deadline, earliest first
///
/// Tasks whose deadline cannot be resolved go last; ties keep storage order.
pub fn sort_by_deadline(mut tasks: Vec<&Task>) -> Vec<&Task> {
    tasks.sort_by(|a, b| match (a.resolved_deadline(), b.resolved_deadline()) {
        (Ok(a_dt), Ok(b_dt)) => a_dt.cmp(&b_dt),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => Ordering::Equal,
    });
    tasks
}

/// All tasks in display order
pub fn display_order(tasks: &[Task]) -> Vec<&Task> {
    sort_by_deadline(tasks.iter().collect())
}

/// Summary counts over a task collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub pending: usize,
    pub done: usize,
    pub overdue: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut stats = TaskStats {
            total: tasks.len(),
            ..Default::default()
        };

        for task in tasks {
            match task.status {
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::Done => stats.done += 1,
                TaskStatus::Overdue => stats.overdue += 1,
            }
            match task.priority {
                Priority::Low => stats.low += 1,
                Priority::Medium => stats.medium += 1,
                Priority::High => stats.high += 1,
            }
        }

        stats
    }

    /// Share of done tasks in percent (0 for an empty collection)
    pub fn completion_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.done as f64 * 100.0 / self.total as f64
        }
    }
}
