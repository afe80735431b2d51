use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::error::{AppError, Result};

#[derive(Parser)]
#[command(name = "tugas")]
#[command(about = concat!(
    ">>================================<<\n",
    "||  T U G A S                     ||\n",
    "||  pengelola tugas sekolah       ||\n",
    ">>================================<<\n",
    "~Catat tugas, kejar deadline, jangan sampai terlambat~"
))]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Directory for the task file, activity log and CSV export
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Start with alarm sounds turned off
    #[arg(long)]
    pub mute: bool,
}

/// Entries of the main menu, numbered as shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    ShowAll,
    Add,
    Delete,
    ToggleDone,
    Edit,
    Search,
    Filter,
    Statistics,
    DeadlineCountdown,
    Alarm,
    FocusTimer,
    ToggleSound,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 13] = [
        MenuChoice::ShowAll,
        MenuChoice::Add,
        MenuChoice::Delete,
        MenuChoice::ToggleDone,
        MenuChoice::Edit,
        MenuChoice::Search,
        MenuChoice::Filter,
        MenuChoice::Statistics,
        MenuChoice::DeadlineCountdown,
        MenuChoice::Alarm,
        MenuChoice::FocusTimer,
        MenuChoice::ToggleSound,
        MenuChoice::Exit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuChoice::ShowAll => "Lihat semua tugas",
            MenuChoice::Add => "Tambah tugas",
            MenuChoice::Delete => "Hapus tugas",
            MenuChoice::ToggleDone => "Tandai selesai / belum",
            MenuChoice::Edit => "Edit tugas",
            MenuChoice::Search => "Cari tugas",
            MenuChoice::Filter => "Filter tugas",
            MenuChoice::Statistics => "Statistik & ekspor CSV",
            MenuChoice::DeadlineCountdown => "Hitung mundur deadline",
            MenuChoice::Alarm => "Alarm",
            MenuChoice::FocusTimer => "Timer fokus",
            MenuChoice::ToggleSound => "Suara on/off",
            MenuChoice::Exit => "Keluar",
        }
    }

    /// Parse the menu answer `1`..`13`
    pub fn from_input(input: &str) -> Result<Self> {
        let input = input.trim();
        match input.parse::<usize>() {
            Ok(n) if (1..=Self::ALL.len()).contains(&n) => Ok(Self::ALL[n - 1]),
            _ => Err(AppError::invalid_selection(input, Self::ALL.len())),
        }
    }
}

/// Render the numbered menu
pub fn format_menu(sound_enabled: bool) -> String {
    let mut lines = vec!["=== MENU TUGAS ===".to_string()];
    for (i, choice) in MenuChoice::ALL.iter().enumerate() {
        let suffix = match choice {
            MenuChoice::ToggleSound if sound_enabled => " [ON]",
            MenuChoice::ToggleSound => " [OFF]",
            _ => "",
        };
        lines.push(format!("{:>2}. {}{}", i + 1, choice.label(), suffix));
    }
    lines.join("\n")
}

/// Read one line without its line ending; end of input is an error
pub fn read_line(input: &mut impl BufRead) -> Result<String> {
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(|e| AppError::io("gagal membaca input", e))?;

    if read == 0 {
        return Err(AppError::InputClosed);
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Print a label and read the answer
pub fn prompt(input: &mut impl BufRead, label: &str) -> Result<String> {
    print!("{}", label);
    std::io::stdout()
        .flush()
        .map_err(|e| AppError::io("gagal menulis prompt", e))?;
    read_line(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_menu_choice_from_input() {
        assert_eq!(MenuChoice::from_input("1").unwrap(), MenuChoice::ShowAll);
        assert_eq!(MenuChoice::from_input(" 13 ").unwrap(), MenuChoice::Exit);
        assert!(matches!(
            MenuChoice::from_input("14"),
            Err(AppError::InvalidSelection { max: 13, .. })
        ));
        assert!(MenuChoice::from_input("satu").is_err());
        assert!(MenuChoice::from_input("0").is_err());
    }

    #[test]
    fn test_format_menu_shows_sound_state() {
        assert!(format_menu(true).contains("12. Suara on/off [ON]"));
        assert!(format_menu(false).contains("12. Suara on/off [OFF]"));
        assert!(format_menu(true).contains(" 1. Lihat semua tugas"));
    }

    #[test]
    fn test_read_line_strips_line_ending_and_detects_eof() {
        let mut input = Cursor::new("Matematika\r\n\n");

        assert_eq!(read_line(&mut input).unwrap(), "Matematika");
        assert_eq!(read_line(&mut input).unwrap(), "");
        assert!(matches!(read_line(&mut input), Err(AppError::InputClosed)));
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["tugas", "--data-dir", "/tmp/tugas", "--mute"]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/tugas")));
        assert!(cli.mute);

        let cli = Cli::parse_from(["tugas"]);
        assert!(cli.data_dir.is_none());
        assert!(!cli.mute);
    }
}
