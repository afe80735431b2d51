//! Notification engine
//!
//! Best-effort: the message is always printed, a desktop notification is
//! attempted when enabled, and an alarm tone plays when sound is on.
//! No failure here ever reaches the caller.

use colored::Colorize;
use notify_rust::Notification;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

use crate::audio;
use crate::config::AlarmSettings;

/// Sink for user-facing alerts
pub trait Notify: Send + Sync {
    fn notify(&self, title: &str, message: &str);
}

/// Shared on/off switch for alarm sounds
#[derive(Debug, Clone)]
pub struct SoundToggle(Arc<AtomicBool>);

impl SoundToggle {
    pub fn new(enabled: bool) -> Self {
        Self(Arc::new(AtomicBool::new(enabled)))
    }

    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Flip the switch and return the new state
    pub fn toggle(&self) -> bool {
        !self.0.fetch_xor(true, Ordering::Relaxed)
    }
}

/// Console + desktop + alarm notifier
pub struct DesktopNotifier {
    sound: SoundToggle,
    desktop: bool,
    alarm: AlarmSettings,
}

impl DesktopNotifier {
    pub fn new(sound: SoundToggle, desktop: bool, alarm: AlarmSettings) -> Self {
        Self {
            sound,
            desktop,
            alarm,
        }
    }

    fn show_desktop(&self, title: &str, message: &str) {
        let shown = Notification::new()
            .appname("tugas")
            .summary(title)
            .body(message)
            .show()
            .map(|_| ());

        if let Err(e) = shown {
            debug!(error = %e, "desktop notification unavailable");
        }
    }
}

impl Notify for DesktopNotifier {
    fn notify(&self, title: &str, message: &str) {
        println!("\n{} {}", format!("[{}]", title).yellow().bold(), message);

        if self.desktop {
            self.show_desktop(title, message);
        }

        if self.sound.is_enabled() {
            audio::play_alarm(&self.alarm);
        }
    }
}
