mod cli;
mod config;
mod launcher;
mod session;
mod time_utils;

use std::process::ExitCode;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use config::{Config, FileSettings};
use diary_core::EntryStore;
use launcher::ProcessLauncher;
use session::{Outcome, Session};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Load environment variables from .env.diary
    dotenvy::from_filename(".env.diary").ok();

    // Must run while the process is still single-threaded.
    let offset = time_utils::local_offset();

    let filter = EnvFilter::try_from_env("DIARY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match run(cli, offset) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli, offset: time::UtcOffset) -> Result<()> {
    if let Some(Commands::ConfigPath) = cli.command {
        let path = Config::config_path()?;
        if !path.exists() {
            FileSettings::default().save(&path)?;
        }
        println!("{}", path.display());
        return Ok(());
    }

    let config = Config::load()?;
    debug!(
        diary = %config.diary_path.display(),
        backend = %config.tasks.backend,
        "loaded config"
    );

    let now = time_utils::local_now(offset);
    let mode = cli
        .into_mode(now)
        .unwrap_or_else(|e| Cli::command().error(ErrorKind::ValueValidation, e).exit());

    let store = EntryStore::new(&config.diary_path);
    let mut session = Session::new(
        &store,
        config.tasks.source(offset),
        ProcessLauncher::new(&config.editor, &config.pager),
        rand::thread_rng(),
        now.date(),
    );

    match session.run(mode)? {
        Outcome::Discarded => println!("Empty entry: deleted"),
        Outcome::Saved {
            path,
            reviewed: None,
        } => println!("Saved {}; no earlier day to look back on yet", path.display()),
        Outcome::Saved { .. } => {}
        Outcome::Shown(None) => println!("No day to show"),
        Outcome::Shown(Some(_)) => {}
    }
    Ok(())
}
