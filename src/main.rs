use clap::Parser;
use std::io;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::cli::Cli;
use crate::error::Result;
use crate::notify::{DesktopNotifier, SoundToggle};

mod activity;
mod app;
mod audio;
mod cli;
mod config;
mod countdown;
mod display;
mod error;
mod notify;
mod reconciler;
mod storage;
mod timer;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tugas=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut cfg: config::Config = confy::load("tugas", None)?;
    if let Some(dir) = cli.data_dir {
        cfg.data_directory = dir.to_string_lossy().to_string();
    }

    let sound = SoundToggle::new(cfg.sound_enabled && !cli.mute);
    let notifier = Arc::new(DesktopNotifier::new(
        sound.clone(),
        cfg.desktop_notifications,
        cfg.alarm.clone(),
    ));

    let stdin = io::stdin();
    let mut app = App::new(cfg, notifier, sound, stdin.lock())?;
    app.run()
}
