//! Tugas Core - Pure domain logic for deadline tracking
//!
//! This crate contains no I/O operations. Persistence, notification
//! and scheduling are handled by the `tugas` binary.

pub mod deadline;
pub mod error;
pub mod filter;
pub mod overdue;
pub mod reconcile;
pub mod task;

pub use error::{CoreError, Result};
pub use filter::{TaskFilter, TaskStats};
pub use overdue::{EndOfDayOverdueCheck, ExactInstantOverdueCheck, OverduePolicy};
pub use reconcile::{OverdueTransition, Reminder, ReminderKind};
pub use task::{Priority, Task, TaskStatus};
