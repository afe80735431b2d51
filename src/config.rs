//! User configuration, loaded with confy
//!
//! Stored under the platform config directory as `tugas/default-config.toml`.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the task file, activity log and export
    pub data_directory: String,
    pub task_filename: String,
    pub activity_log_filename: String,
    pub export_filename: String,
    /// Initial state of the alarm sound toggle
    pub sound_enabled: bool,
    /// Show desktop notifications when a notifier is available
    pub desktop_notifications: bool,
    /// Focus timer defaults
    pub focus: FocusSettings,
    /// Alarm tone pattern
    pub alarm: AlarmSettings,
}

impl Default for Config {
    fn default() -> Self {
        let data_directory = ProjectDirs::from("", "", "tugas")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            data_directory: data_directory.to_string_lossy().to_string(),
            task_filename: "tasks.json".to_string(),
            activity_log_filename: "activity.log".to_string(),
            export_filename: "tasks_export.csv".to_string(),
            sound_enabled: true,
            desktop_notifications: true,
            focus: FocusSettings::default(),
            alarm: AlarmSettings::default(),
        }
    }
}

impl Config {
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_directory)
    }

    pub fn task_path(&self) -> PathBuf {
        self.data_dir().join(&self.task_filename)
    }

    pub fn activity_log_path(&self) -> PathBuf {
        self.data_dir().join(&self.activity_log_filename)
    }

    pub fn export_path(&self) -> PathBuf {
        self.data_dir().join(&self.export_filename)
    }
}

/// Focus timer defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusSettings {
    /// Work session length in minutes
    pub focus_minutes: u64,
    /// Break length in minutes
    pub break_minutes: u64,
    /// Number of work sessions
    pub cycles: u32,
}

impl Default for FocusSettings {
    fn default() -> Self {
        Self {
            focus_minutes: 25,
            break_minutes: 5,
            cycles: 4,
        }
    }
}

/// Alarm tone pattern
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmSettings {
    /// Volume (0.0 - 1.0)
    pub volume: f32,
    /// Beep frequency in Hz
    pub frequency: f32,
    /// Number of beeps per alarm
    pub beeps: u32,
    /// Duration of each beep in milliseconds
    pub beep_duration_ms: u64,
    /// Pause between beeps in milliseconds
    pub beep_pause_ms: u64,
    /// Sample rate for silence generation
    pub sample_rate: u32,
}

impl Default for AlarmSettings {
    fn default() -> Self {
        Self {
            volume: 0.3,
            frequency: 880.0, // A5
            beeps: 3,
            beep_duration_ms: 250,
            beep_pause_ms: 150,
            sample_rate: 44100,
        }
    }
}
