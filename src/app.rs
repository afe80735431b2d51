//! Interactive menu loop
//!
//! Each iteration reconciles statuses, fires due reminders and schedules
//! deadline timers before the menu is shown. Operation errors are printed
//! and the loop continues; only closed input or the exit entry end it.

use chrono::Local;
use colored::*;
use std::io::BufRead;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::{debug, info};

use tugas_core::deadline;
use tugas_core::filter::display_order;
use tugas_core::task::{self, TaskEdit};
use tugas_core::{Priority, Task, TaskFilter, TaskStats, TaskStatus};

use crate::activity::ActivityLog;
use crate::cli::{self, MenuChoice};
use crate::config::Config;
use crate::countdown::CountdownScheduler;
use crate::display;
use crate::error::{AppError, Result};
use crate::notify::{Notify, SoundToggle};
use crate::reconciler::StatusReconciler;
use crate::storage::{self, TaskStore};
use crate::timer::{self, FocusPlan, WaitOutcome};

const DEFAULT_ALARM_MESSAGE: &str = "Waktu habis!";

pub struct App<R> {
    config: Config,
    input: R,
    store: TaskStore,
    activity: ActivityLog,
    notifier: Arc<dyn Notify>,
    sound: SoundToggle,
    reconciler: StatusReconciler,
    scheduler: CountdownScheduler,
    use_color: bool,
    // Keep last: dropped after the scheduler holding its handle
    runtime: Runtime,
}

impl<R: BufRead> App<R> {
    pub fn new(config: Config, notifier: Arc<dyn Notify>, sound: SoundToggle, input: R) -> Result<Self> {
        let runtime =
            Runtime::new().map_err(|e| AppError::io("gagal menjalankan runtime timer", e))?;

        let store = TaskStore::new(config.task_path());
        let activity = ActivityLog::new(config.activity_log_path());
        let reconciler = StatusReconciler::new(store.clone(), notifier.clone(), activity.clone());
        let scheduler = CountdownScheduler::new(
            runtime.handle().clone(),
            store.clone(),
            notifier.clone(),
            activity.clone(),
        );

        Ok(Self {
            config,
            input,
            store,
            activity,
            notifier,
            sound,
            reconciler,
            scheduler,
            use_color: display::supports_color(),
            runtime,
        })
    }

    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    /// Run the menu until the user exits or input ends
    pub fn run(&mut self) -> Result<()> {
        info!(path = %self.store.path().display(), "menu started");

        loop {
            self.refresh();
            println!("\n{}", cli::format_menu(self.sound.is_enabled()));

            let answer = match cli::prompt(&mut self.input, "Pilih menu: ") {
                Ok(answer) => answer,
                Err(AppError::InputClosed) => break,
                Err(e) => return Err(e),
            };

            let choice = match MenuChoice::from_input(&answer) {
                Ok(choice) => choice,
                Err(e) => {
                    self.print_error(&e);
                    continue;
                }
            };

            if choice == MenuChoice::Exit {
                break;
            }

            match self.dispatch(choice) {
                Ok(()) => {}
                Err(AppError::InputClosed) => break,
                Err(e) => self.print_error(&e),
            }
        }

        println!("Sampai jumpa!");
        Ok(())
    }

    /// Status upkeep done before every menu
    fn refresh(&self) {
        self.reconciler.reconcile_overdue();
        self.reconciler.fire_time_based_reminders();
        let scheduled = self.scheduler.schedule_if_timed_all(&self.store.load());
        if scheduled > 0 {
            debug!(scheduled, pending = self.scheduler.pending_count(), "deadline timers");
        }
    }

    fn dispatch(&mut self, choice: MenuChoice) -> Result<()> {
        match choice {
            MenuChoice::ShowAll => self.show_all(),
            MenuChoice::Add => self.add(),
            MenuChoice::Delete => self.delete(),
            MenuChoice::ToggleDone => self.toggle_done(),
            MenuChoice::Edit => self.edit(),
            MenuChoice::Search => self.search(),
            MenuChoice::Filter => self.filter(),
            MenuChoice::Statistics => self.statistics(),
            MenuChoice::DeadlineCountdown => self.deadline_countdown(),
            MenuChoice::Alarm => self.alarm(),
            MenuChoice::FocusTimer => self.focus_timer(),
            MenuChoice::ToggleSound => self.toggle_sound(),
            MenuChoice::Exit => Ok(()),
        }
    }

    fn print_error(&self, err: &AppError) {
        if self.use_color {
            println!("{} {}", "Kesalahan:".red().bold(), err);
        } else {
            println!("Kesalahan: {}", err);
        }
    }

    fn print_tasks(&self, tasks: &[&Task]) {
        println!("{}", display::format_table(tasks, self.use_color));
    }

    fn ask(&mut self, label: &str) -> Result<String> {
        cli::prompt(&mut self.input, label)
    }

    /// Show the table and ask for a list number; `None` when there are no tasks
    fn select_task(&mut self, action: &str) -> Result<Option<Task>> {
        let tasks = self.store.load();
        let ordered = display_order(&tasks);
        if ordered.is_empty() {
            println!("Belum ada tugas.");
            return Ok(None);
        }

        self.print_tasks(&ordered);
        let answer = self.ask(&format!("Nomor tugas yang akan {}: ", action))?;
        let index = task::parse_selection(&answer, ordered.len())?;
        Ok(Some(ordered[index].clone()))
    }

    fn show_all(&mut self) -> Result<()> {
        let tasks = self.store.load();
        self.print_tasks(&display_order(&tasks));
        Ok(())
    }

    fn add(&mut self) -> Result<()> {
        let name = self.ask("Nama tugas: ")?;
        let subject = self.ask("Mata pelajaran: ")?;
        let deadline_input = self.ask("Deadline (DD-MM-YYYY [HH:MM[:SS]]): ")?;
        deadline::parse(&deadline_input)?;
        let priority =
            Priority::from_input(&self.ask("Prioritas (1=Rendah 2=Sedang 3=Tinggi) [2]: ")?)?;

        let created = self.store.try_update(|tasks| {
            let task = Task::create(tasks, &name, &subject, &deadline_input, priority)?;
            tasks.push(task.clone());
            Ok(task)
        })?;

        self.activity.record(format!(
            "Tugas #{} '{}' ({}) ditambahkan, deadline {}, prioritas {}",
            created.id, created.name, created.subject, created.deadline, created.priority
        ));
        self.scheduler.schedule_if_timed(&created);
        println!("Tugas '{}' ditambahkan.", created.name);
        Ok(())
    }

    fn delete(&mut self) -> Result<()> {
        let Some(selected) = self.select_task("dihapus")? else {
            return Ok(());
        };

        let removed = self.store.try_update(|tasks| {
            task::remove(tasks, selected.id).ok_or_else(|| gone(&selected))
        })?;

        self.activity.record(format!("Tugas #{} '{}' dihapus", removed.id, removed.name));
        println!("Tugas '{}' dihapus.", removed.name);
        Ok(())
    }

    fn toggle_done(&mut self) -> Result<()> {
        let Some(selected) = self.select_task("diubah statusnya")? else {
            return Ok(());
        };

        let (before, after) = self.store.try_update(|tasks| {
            let task = task::find_mut(tasks, selected.id).ok_or_else(|| gone(&selected))?;
            let before = task.status;
            Ok((before, task.toggle_done()))
        })?;

        self.activity.record(format!(
            "Tugas #{} '{}' status {} -> {}",
            selected.id, selected.name, before, after
        ));
        println!("Status '{}' sekarang {}.", selected.name, after);
        Ok(())
    }

    fn edit(&mut self) -> Result<()> {
        let Some(selected) = self.select_task("diedit")? else {
            return Ok(());
        };

        println!("Kosongkan isian untuk mempertahankan nilai lama.");
        let name = self.ask(&format!("Nama [{}]: ", selected.name))?;
        let subject = self.ask(&format!("Mata pelajaran [{}]: ", selected.subject))?;
        let deadline_input = self.ask(&format!("Deadline [{}]: ", selected.deadline))?;
        let priority = self.ask(&format!(
            "Prioritas 1=Rendah 2=Sedang 3=Tinggi [{}]: ",
            selected.priority.label()
        ))?;

        let edit = TaskEdit::from_input(&name, &subject, &deadline_input, &priority)?;
        if edit.is_empty() {
            println!("Tidak ada perubahan.");
            return Ok(());
        }

        let updated = self.store.try_update(|tasks| {
            let task = task::find_mut(tasks, selected.id).ok_or_else(|| gone(&selected))?;
            edit.apply(task)?;
            Ok(task.clone())
        })?;

        self.activity.record(format!(
            "Tugas #{} diedit: '{}' ({}), deadline {}, prioritas {}",
            updated.id, updated.name, updated.subject, updated.deadline, updated.priority
        ));
        if updated.deadline != selected.deadline {
            self.scheduler.schedule_if_timed(&updated);
        }
        println!("Tugas '{}' diperbarui.", updated.name);
        Ok(())
    }

    fn search(&mut self) -> Result<()> {
        let term = self.ask("Kata kunci: ")?;
        if term.trim().is_empty() {
            return Err(AppError::validation("kata kunci", "tidak boleh kosong"));
        }

        let tasks = self.store.load();
        let found = TaskFilter::new().search(term).apply(&tasks);
        println!("{} tugas ditemukan.", found.len());
        if !found.is_empty() {
            self.print_tasks(&found);
        }
        Ok(())
    }

    fn filter(&mut self) -> Result<()> {
        let by = self.ask("Filter berdasarkan 1=Status 2=Prioritas: ")?;
        let filter = match by.trim() {
            "1" => {
                let answer = self.ask("Status 1=Belum 2=Selesai 3=Terlambat: ")?;
                TaskFilter::new().status(status_from_input(&answer)?)
            }
            "2" => {
                let options: Vec<String> = Priority::ALL
                    .iter()
                    .enumerate()
                    .map(|(i, p)| format!("{}={}", i + 1, p.label()))
                    .collect();
                let answer = self.ask(&format!("Prioritas {}: ", options.join(" ")))?;
                if answer.trim().is_empty() {
                    return Err(AppError::validation("prioritas", "tidak boleh kosong"));
                }
                TaskFilter::new().priority(Priority::from_input(&answer)?)
            }
            other => return Err(AppError::invalid_selection(other, 2)),
        };

        let tasks = self.store.load();
        let matching = filter.apply(&tasks);
        println!("{} tugas cocok.", matching.len());
        if !matching.is_empty() {
            self.print_tasks(&matching);
        }
        Ok(())
    }

    fn statistics(&mut self) -> Result<()> {
        let tasks = self.store.load();
        println!("{}", display::format_stats(&TaskStats::from_tasks(&tasks), self.use_color));

        let path = self.config.export_path();
        storage::export_csv(&path, &tasks)?;
        println!("Data diekspor ke {}", path.display());
        Ok(())
    }

    fn deadline_countdown(&mut self) -> Result<()> {
        let Some(selected) = self.select_task("dihitung mundur")? else {
            return Ok(());
        };

        if selected.is_done() {
            println!("Tugas '{}' sudah selesai.", selected.name);
            return Ok(());
        }

        let resolved = selected.resolved_deadline()?;
        let remaining = resolved - Local::now();
        let Ok(wait) = remaining.to_std() else {
            println!("Deadline '{}' {}.", selected.name, deadline::format_remaining(remaining));
            return Ok(());
        };

        println!(
            "Sisa waktu {} (Ctrl-C untuk berhenti)",
            deadline::format_remaining(remaining)
        );
        match timer::countdown(self.runtime.handle(), wait, &selected.name) {
            WaitOutcome::Completed => println!("Deadline '{}' tercapai!", selected.name),
            WaitOutcome::Interrupted => println!("Hitung mundur dihentikan."),
        }
        Ok(())
    }

    fn alarm(&mut self) -> Result<()> {
        let minutes = self.ask("Alarm dalam berapa menit? ")?;
        let minutes = parse_number::<u64>("menit", &minutes)?;
        let total = timer::alarm_duration(minutes)?;

        let message = self.ask("Pesan alarm (opsional): ")?;
        let message = match message.trim() {
            "" => DEFAULT_ALARM_MESSAGE,
            text => text,
        };

        println!("Alarm berjalan (Ctrl-C untuk membatalkan)");
        if timer::run_alarm(self.runtime.handle(), total, message, self.notifier.as_ref())
            == WaitOutcome::Interrupted
        {
            println!("Alarm dibatalkan.");
        }
        Ok(())
    }

    fn focus_timer(&mut self) -> Result<()> {
        let defaults = self.config.focus.clone();

        let focus = self.ask(&format!("Menit fokus [{}]: ", defaults.focus_minutes))?;
        let rest = self.ask(&format!("Menit istirahat [{}]: ", defaults.break_minutes))?;
        let cycles = self.ask(&format!("Jumlah sesi [{}]: ", defaults.cycles))?;

        let plan = FocusPlan::from_minutes(
            number_or("menit fokus", &focus, defaults.focus_minutes)?,
            number_or("menit istirahat", &rest, defaults.break_minutes)?,
            number_or("jumlah sesi", &cycles, defaults.cycles)?,
        )?;

        println!("Timer fokus berjalan (Ctrl-C untuk berhenti)");
        if timer::run_focus(self.runtime.handle(), &plan, self.notifier.as_ref())
            == WaitOutcome::Interrupted
        {
            println!("Timer fokus dihentikan.");
        }
        Ok(())
    }

    fn toggle_sound(&mut self) -> Result<()> {
        let enabled = self.sound.toggle();
        let state = if enabled { "ON" } else { "OFF" };
        self.activity.record(format!("Suara alarm {}", state));
        println!("Suara alarm {}.", state);
        Ok(())
    }
}

/// The selected task was removed before the change could be applied
fn gone(task: &Task) -> AppError {
    AppError::validation("tugas", format!("'{}' sudah tidak ada", task.name))
}

fn status_from_input(input: &str) -> Result<TaskStatus> {
    match input.trim().to_lowercase().as_str() {
        "1" | "belum" => Ok(TaskStatus::Pending),
        "2" | "selesai" => Ok(TaskStatus::Done),
        "3" | "terlambat" => Ok(TaskStatus::Overdue),
        other => Err(AppError::invalid_selection(other, 3)),
    }
}

fn parse_number<T: std::str::FromStr>(field: &str, input: &str) -> Result<T> {
    input
        .trim()
        .parse()
        .map_err(|_| AppError::validation(field, format!("'{}' bukan angka", input.trim())))
}

/// Parse a number, using `default` for blank input
fn number_or<T: std::str::FromStr>(field: &str, input: &str, default: T) -> Result<T> {
    if input.trim().is_empty() {
        Ok(default)
    } else {
        parse_number(field, input)
    }
}
