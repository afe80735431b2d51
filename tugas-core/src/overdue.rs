//! Overdue detection policies
//!
//! Two rules coexist. Periodic reconciliation only looks at the date and
//! treats a deadline as due at 23:59:59 of that day. The countdown worker
//! compares against the exact instant, including an explicit time.

use chrono::{DateTime, Local};

use crate::deadline;
use crate::error::Result;

/// Decides whether a deadline has passed at a given instant
pub trait OverduePolicy {
    /// Resolve the deadline text to the instant this policy compares against
    fn resolve(&self, deadline: &str) -> Result<DateTime<Local>>;

    /// Whether `now` is past the resolved deadline
    fn is_overdue(&self, deadline: &str, now: DateTime<Local>) -> Result<bool> {
        Ok(now > self.resolve(deadline)?)
    }
}

/// Date-only rule: due at the end of the deadline's day
#[derive(Debug, Clone, Copy, Default)]
pub struct EndOfDayOverdueCheck;

impl OverduePolicy for EndOfDayOverdueCheck {
    fn resolve(&self, deadline: &str) -> Result<DateTime<Local>> {
        deadline::resolve_end_of_day(deadline)
    }
}

/// Date-and-time rule: due at the exact resolved instant
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactInstantOverdueCheck;

impl OverduePolicy for ExactInstantOverdueCheck {
    fn resolve(&self, deadline: &str) -> Result<DateTime<Local>> {
        deadline::parse(deadline)
    }

    /// Reaching the instant counts, so a timer firing on time sees it as due
    fn is_overdue(&self, deadline: &str, now: DateTime<Local>) -> Result<bool> {
        Ok(now >= self.resolve(deadline)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policies_disagree_within_the_day() {
        let now = deadline::parse("15-06-2024 15:00").unwrap();

        assert!(ExactInstantOverdueCheck.is_overdue("15-06-2024 14:30", now).unwrap());
        assert!(!EndOfDayOverdueCheck.is_overdue("15-06-2024 14:30", now).unwrap());
    }

    #[test]
    fn test_end_of_day_after_midnight() {
        let now = deadline::parse("16-06-2024 00:00:01").unwrap();
        assert!(EndOfDayOverdueCheck.is_overdue("15-06-2024", now).unwrap());
    }

    #[test]
    fn test_exact_instant_counts_the_instant_itself() {
        let now = deadline::parse("15-06-2024 14:30").unwrap();
        assert!(ExactInstantOverdueCheck.is_overdue("15-06-2024 14:30", now).unwrap());
        assert!(!EndOfDayOverdueCheck.is_overdue("15-06-2024 14:30", now).unwrap());
    }

    #[test]
    fn test_invalid_deadline_is_an_error() {
        let now = Local::now();
        assert!(EndOfDayOverdueCheck.is_overdue("kemarin", now).is_err());
        assert!(ExactInstantOverdueCheck.is_overdue("kemarin", now).is_err());
    }
}
