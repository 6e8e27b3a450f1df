pub mod cell;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod form;
pub mod io_utils;
pub mod profile;
pub mod session;
pub mod source;
pub mod table;

mod append;
mod columns;
mod preview;

use std::{env, path::Path, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug};

use crate::{
    cli::{Cli, Commands},
    config::SessionConfig,
    session::{Session, SessionEvent},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sheet_managed", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Preview(args) => preview::execute(&args),
        Commands::Columns(args) => columns::execute(&args),
        Commands::Append(args) => append::execute(&args),
        Commands::Filter(args) => filter::execute(&args),
    }
}

pub(crate) fn load_config(path: Option<&Path>) -> Result<SessionConfig> {
    match path {
        Some(path) => {
            SessionConfig::load(path).with_context(|| format!("Loading config from {path:?}"))
        }
        None => Ok(SessionConfig::default()),
    }
}

pub(crate) fn upload_from_path(session: &mut Session, path: &Path) -> Result<SessionEvent> {
    let bytes = io_utils::read_source_bytes(path)?;
    let options = session.config().source_options(path)?;
    let event = session
        .upload(&bytes, &options)
        .with_context(|| format!("Loading {path:?}"))?;
    debug!("Upload of {:?} produced {:?}", path, event);
    Ok(event)
}
