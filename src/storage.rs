//! JSON file storage for the task collection
//!
//! Loading and saving never fail the caller: errors are logged and the
//! collection falls back to empty (load) or stays unwritten (save).
//! Every access goes through one writer lock shared by all clones of a
//! [`TaskStore`], so background countdowns and the menu cannot interleave
//! a read-modify-write.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

use tugas_core::task::ensure_unique_ids;
use tugas_core::{Priority, Task, TaskStatus};

use crate::error::{AppError, Result};

/// Record as found on disk; every field may be missing in older files
///
/// A field holding a value of the wrong shape counts as missing.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StoredTask {
    #[serde(deserialize_with = "lenient")]
    id: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    nama: Option<String>,
    #[serde(deserialize_with = "lenient")]
    mata_pelajaran: Option<String>,
    #[serde(deserialize_with = "lenient")]
    deadline: Option<String>,
    #[serde(deserialize_with = "lenient")]
    completed: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    status: Option<TaskStatus>,
    #[serde(deserialize_with = "lenient")]
    priority: Option<Priority>,
    #[serde(deserialize_with = "lenient")]
    notified_1d: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    notified_1h: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    created_at: Option<String>,
}

fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }

    match serde_json::from_value(value.clone()) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            warn!(%value, error = %e, "ignoring unrecognized task field value");
            Ok(None)
        }
    }
}

impl StoredTask {
    /// Fill in missing fields; `position` is the 0-based index in the file
    fn into_task(self, position: usize) -> Task {
        // An explicit status wins over the legacy flag
        let status = self
            .status
            .unwrap_or_else(|| TaskStatus::from_completed(self.completed.unwrap_or(false)));

        Task {
            id: self.id.unwrap_or(position as u32 + 1),
            name: self.nama.unwrap_or_default(),
            subject: self.mata_pelajaran.unwrap_or_default(),
            deadline: self.deadline.unwrap_or_default(),
            priority: self.priority.unwrap_or_default(),
            status,
            notified_1d: self.notified_1d.unwrap_or(false),
            notified_1h: self.notified_1h.unwrap_or(false),
            created_at: self.created_at.unwrap_or_default(),
        }
    }
}

/// Record as written to disk, with `completed` mirroring the status
#[derive(Serialize)]
struct TaskRecord<'a> {
    id: u32,
    nama: &'a str,
    mata_pelajaran: &'a str,
    deadline: &'a str,
    completed: bool,
    status: TaskStatus,
    priority: Priority,
    notified_1d: bool,
    notified_1h: bool,
    created_at: &'a str,
}

impl<'a> From<&'a Task> for TaskRecord<'a> {
    fn from(task: &'a Task) -> Self {
        Self {
            id: task.id,
            nama: &task.name,
            mata_pelajaran: &task.subject,
            deadline: &task.deadline,
            completed: task.status.is_completed(),
            status: task.status,
            priority: task.priority,
            notified_1d: task.notified_1d,
            notified_1h: task.notified_1h,
            created_at: &task.created_at,
        }
    }
}

/// JSON storage adapter
#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl TaskStore {
    /// Create a new store for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Get the storage path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the collection in storage order
    pub fn load(&self) -> Vec<Task> {
        let _guard = self.acquire();
        self.read()
    }

    /// Replace the stored collection
    pub fn save(&self, tasks: &[Task]) {
        let _guard = self.acquire();
        self.write(tasks);
    }

    /// Load, mutate and save while holding the writer lock
    ///
    /// `mutate` returns whether it changed anything; nothing is written
    /// otherwise. Returns the collection as it stands afterwards.
    pub fn update<F>(&self, mutate: F) -> Vec<Task>
    where
        F: FnOnce(&mut Vec<Task>) -> bool,
    {
        let _guard = self.acquire();
        let mut tasks = self.read();
        if mutate(&mut tasks) {
            self.write(&tasks);
        }
        tasks
    }

    /// Like [`TaskStore::update`] for mutations that can fail
    ///
    /// The collection is saved only when `mutate` succeeds.
    pub fn try_update<T, F>(&self, mutate: F) -> Result<T>
    where
        F: FnOnce(&mut Vec<Task>) -> Result<T>,
    {
        let _guard = self.acquire();
        let mut tasks = self.read();
        let value = mutate(&mut tasks)?;
        self.write(&tasks);
        Ok(value)
    }

    fn acquire(&self) -> MutexGuard<'_, ()> {
        // The guarded data is (), so a panic elsewhere leaves nothing inconsistent
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read(&self) -> Vec<Task> {
        let mut tasks = match self.try_read() {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to load tasks, starting empty");
                return Vec::new();
            }
        };

        // Menu rows are addressed by id, so repeated ids are fixed on disk
        let changes = ensure_unique_ids(&mut tasks);
        if !changes.is_empty() {
            for change in &changes {
                warn!(from = change.from, to = change.to, "renumbered repeated task id");
            }
            self.write(&tasks);
        }
        tasks
    }

    fn try_read(&self) -> Result<Vec<Task>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| AppError::io(format!("gagal membaca {}", self.path.display()), e))?;

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Vec<StoredTask>>(&content) {
            Ok(records) => Ok(records
                .into_iter()
                .enumerate()
                .map(|(position, record)| record.into_task(position))
                .collect()),
            Err(e) => {
                self.quarantine();
                Err(AppError::storage_with_source("file tugas bukan daftar tugas yang valid", e))
            }
        }
    }

    /// Move an unreadable file aside so a later save cannot overwrite it
    fn quarantine(&self) {
        let target = with_suffix(&self.path, ".corrupt");
        match fs::rename(&self.path, &target) {
            Ok(()) => warn!(path = %target.display(), "moved unreadable task file aside"),
            Err(e) => warn!(error = %e, "failed to move unreadable task file aside"),
        }
    }

    fn write(&self, tasks: &[Task]) {
        match self.try_write(tasks) {
            Ok(()) => debug!(count = tasks.len(), "tasks saved"),
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to save tasks"),
        }
    }

    fn try_write(&self, tasks: &[Task]) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let records: Vec<TaskRecord<'_>> = tasks.iter().map(TaskRecord::from).collect();
        let mut json = serde_json::to_string_pretty(&records)?;
        json.push('\n');

        // Write next to the target, flush to disk, then swap it in
        let tmp = with_suffix(&self.path, ".tmp");
        let mut file =
            File::create(&tmp).map_err(|e| AppError::io(format!("gagal membuat {}", tmp.display()), e))?;
        file.write_all(json.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| AppError::io(format!("gagal menulis {}", tmp.display()), e))?;
        drop(file);

        fs::rename(&tmp, &self.path)
            .map_err(|e| AppError::io(format!("gagal mengganti {}", self.path.display()), e))?;

        Ok(())
    }
}

/// Write a CSV snapshot of `id, nama, status, priority, deadline`
///
/// Overwrites any previous export.
pub fn export_csv(path: &Path, tasks: &[Task]) -> Result<()> {
    let mut out = String::from("id,nama,status,priority,deadline\n");
    for task in tasks {
        let row = [
            task.id.to_string(),
            csv_field(&task.name),
            task.status.to_string(),
            task.priority.to_string(),
            csv_field(&task.deadline),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, out).map_err(|e| AppError::io(format!("gagal menulis {}", path.display()), e))
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
