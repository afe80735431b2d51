//! Foreground timers: deadline countdown, alarm and focus cycles
//!
//! Every wait can be aborted with Ctrl-C, which ends only that wait.

use std::io::{self, Write};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::{self, Instant};
use tracing::warn;

use crate::error::{AppError, Result};
use crate::notify::Notify;

/// Validation ranges for timer arguments
const MIN_MINUTES: u64 = 1;
const MAX_ALARM_MINUTES: u64 = 1440; // 24 hours
const MAX_FOCUS_MINUTES: u64 = 480; // 8 hours
const MAX_BREAK_MINUTES: u64 = 120; // 2 hours
const MIN_CYCLES: u32 = 1;
const MAX_CYCLES: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Completed,
    Interrupted,
}

/// Wait for `total`, calling `on_tick` once per second with the time left
pub fn wait_with_ticks(
    handle: &Handle,
    total: Duration,
    mut on_tick: impl FnMut(Duration),
) -> WaitOutcome {
    handle.block_on(async move {
        let end = Instant::now() + total;
        let mut ticker = time::interval(Duration::from_secs(1));
        let finished = time::sleep_until(end);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(finished, ctrl_c);
        let mut listening = true;

        loop {
            tokio::select! {
                result = &mut ctrl_c, if listening => match result {
                    Ok(()) => return WaitOutcome::Interrupted,
                    Err(e) => {
                        warn!(error = %e, "cannot listen for Ctrl-C");
                        listening = false;
                    }
                },
                _ = &mut finished => {
                    on_tick(Duration::ZERO);
                    return WaitOutcome::Completed;
                }
                _ = ticker.tick() => on_tick(end.saturating_duration_since(Instant::now())),
            }
        }
    })
}

/// Wait with a live `label HH:MM:SS` line on the terminal
pub fn countdown(handle: &Handle, total: Duration, label: &str) -> WaitOutcome {
    let outcome = wait_with_ticks(handle, total, |remaining| {
        print!("\r{} {}   ", label, format_clock(remaining));
        let _ = io::stdout().flush();
    });
    println!();
    outcome
}

/// `HH:MM:SS`, prefixed with days when a day or more is left
pub fn format_clock(remaining: Duration) -> String {
    let total = remaining.as_secs();
    let days = total / 86_400;
    let clock = format!(
        "{:02}:{:02}:{:02}",
        (total % 86_400) / 3_600,
        (total % 3_600) / 60,
        total % 60
    );

    if days > 0 {
        format!("{} hari {}", days, clock)
    } else {
        clock
    }
}

/// Validate a minute count against an inclusive range
fn minutes_in_range(field: &str, value: u64, max: u64) -> Result<Duration> {
    if !(MIN_MINUTES..=max).contains(&value) {
        return Err(AppError::validation(
            field,
            format!("{} di luar rentang {}-{} menit", value, MIN_MINUTES, max),
        ));
    }
    Ok(Duration::from_secs(value * 60))
}

/// Alarm after a number of minutes
pub fn alarm_duration(minutes: u64) -> Result<Duration> {
    minutes_in_range("alarm", minutes, MAX_ALARM_MINUTES)
}

/// Run the alarm countdown and ring at the end
pub fn run_alarm(handle: &Handle, total: Duration, message: &str, notifier: &dyn Notify) -> WaitOutcome {
    let outcome = countdown(handle, total, "Alarm");
    if outcome == WaitOutcome::Completed {
        notifier.notify("Alarm", message);
    }
    outcome
}

/// Work/break cycle lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusPlan {
    pub focus: Duration,
    pub rest: Duration,
    pub cycles: u32,
}

impl FocusPlan {
    pub fn from_minutes(focus_minutes: u64, break_minutes: u64, cycles: u32) -> Result<Self> {
        if !(MIN_CYCLES..=MAX_CYCLES).contains(&cycles) {
            return Err(AppError::validation(
                "jumlah sesi",
                format!("{} di luar rentang {}-{}", cycles, MIN_CYCLES, MAX_CYCLES),
            ));
        }

        Ok(Self {
            focus: minutes_in_range("menit fokus", focus_minutes, MAX_FOCUS_MINUTES)?,
            rest: minutes_in_range("menit istirahat", break_minutes, MAX_BREAK_MINUTES)?,
            cycles,
        })
    }
}

/// Run focus sessions separated by breaks; no break after the last session
pub fn run_focus(handle: &Handle, plan: &FocusPlan, notifier: &dyn Notify) -> WaitOutcome {
    for cycle in 1..=plan.cycles {
        println!("Sesi fokus {}/{}", cycle, plan.cycles);
        if countdown(handle, plan.focus, "Fokus") == WaitOutcome::Interrupted {
            return WaitOutcome::Interrupted;
        }

        if cycle == plan.cycles {
            notifier.notify(
                "Timer fokus",
                &format!("Semua {} sesi selesai. Kerja bagus!", plan.cycles),
            );
            break;
        }

        notifier.notify(
            "Timer fokus",
            &format!("Sesi {} selesai, istirahat {}.", cycle, format_clock(plan.rest)),
        );
        if countdown(handle, plan.rest, "Istirahat") == WaitOutcome::Interrupted {
            return WaitOutcome::Interrupted;
        }
        notifier.notify("Timer fokus", "Istirahat selesai, kembali fokus!");
    }

    WaitOutcome::Completed
}
