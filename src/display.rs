//! Task display formatting module
//!
//! Renders the task table, statistics and status colors.

use colored::*;

use tugas_core::{Priority, Task, TaskStats, TaskStatus};

const HEADERS: [&str; 6] = ["NO", "TUGAS", "MATA PELAJARAN", "DEADLINE", "PRIORITAS", "STATUS"];

/// Check if terminal supports colors
pub fn supports_color() -> bool {
    atty::is(atty::Stream::Stdout)
}

fn color_status(text: String, status: TaskStatus, use_color: bool) -> String {
    if !use_color {
        return text;
    }
    match status {
        TaskStatus::Pending => text.yellow().to_string(),
        TaskStatus::Done => text.green().to_string(),
        TaskStatus::Overdue => text.red().bold().to_string(),
    }
}

fn color_priority(text: String, priority: Priority, use_color: bool) -> String {
    if !use_color {
        return text;
    }
    match priority {
        Priority::Low => text.normal().to_string(),
        Priority::Medium => text.cyan().to_string(),
        Priority::High => text.magenta().bold().to_string(),
    }
}

/// Format tasks as a numbered table; numbers follow the given order
pub fn format_table(tasks: &[&Task], use_color: bool) -> String {
    if tasks.is_empty() {
        return "Belum ada tugas.".to_string();
    }

    let rows: Vec<[String; 6]> = tasks
        .iter()
        .enumerate()
        .map(|(i, task)| {
            [
                (i + 1).to_string(),
                task.name.clone(),
                task.subject.clone(),
                task.deadline.clone(),
                task.priority.label().to_string(),
                task.status.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header: Vec<String> = HEADERS
        .iter()
        .zip(widths)
        .map(|(h, w)| format!("{:<w$}", h, w = w))
        .collect();
    let header = header.join(" | ");
    let rule = "-".repeat(header.chars().count());
    let header = if use_color {
        header.bold().to_string()
    } else {
        header
    };

    let mut lines = vec![header, rule];
    for (task, row) in tasks.iter().zip(rows) {
        // Pad first so escape codes do not break the alignment
        let mut cells: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(cell, w)| format!("{:<w$}", cell, w = w))
            .collect();
        cells[4] = color_priority(cells[4].clone(), task.priority, use_color);
        cells[5] = color_status(cells[5].clone(), task.status, use_color);
        lines.push(cells.join(" | "));
    }

    lines.join("\n")
}

/// Format the statistics block
pub fn format_stats(stats: &TaskStats, use_color: bool) -> String {
    let status_line = |status: TaskStatus, count: usize| {
        color_status(format!("  {:<10} {}", status.label(), count), status, use_color)
    };
    let priority_line = |priority: Priority, count: usize| {
        color_priority(format!("  {:<10} {}", priority.label(), count), priority, use_color)
    };

    [
        format!("Total tugas: {}", stats.total),
        "Status:".to_string(),
        status_line(TaskStatus::Pending, stats.pending),
        status_line(TaskStatus::Done, stats.done),
        status_line(TaskStatus::Overdue, stats.overdue),
        "Prioritas:".to_string(),
        priority_line(Priority::Low, stats.low),
        priority_line(Priority::Medium, stats.medium),
        priority_line(Priority::High, stats.high),
        format!("Penyelesaian: {:.1}%", stats.completion_percent()),
    ]
    .join("\n")
}
