use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use camino::Utf8PathBuf;
use clap::Parser;
use miette::IntoDiagnostic;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::{FilterExt, LevelFilter, filter_fn};
use tracing_subscriber::prelude::*;

use loop_epg::app::App;
use loop_epg::config::{ConfigLoader, Paths, Settings, TitleLists};
use loop_epg::console::{Console, Operator};
use loop_epg::domain::RunMode;
use loop_epg::error::EpgError;
use loop_epg::output::{self, OutputMode};
use loop_epg::store::CacheStore;
use loop_epg::tmdb::TmdbHttpClient;

/// Target of the fatal error record; kept off stderr, where `main` prints the report.
const FATAL_TARGET: &str = "loop_epg::fatal";

const MODE_PROMPT: &str = "Enter 1 for TV shows, 2 for movies, 3 for both, 4 to delete cache, or 5 to delete specific item from cache (default: 3 for both): ";

#[derive(Parser)]
#[command(name = "loop-epg")]
#[command(about = "Generate looping XMLTV guides for a curated list of shows and movies")]
#[command(version, author)]
struct Cli {
    /// Directory holding api_info.json, the title lists, the cache and the generated guides
    #[arg(long, env = "LOOP_EPG_HOME")]
    base_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<EpgError>() {
            return ExitCode::from(map_exit_code(err));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &EpgError) -> u8 {
    if error.is_configuration() { 2 } else { 1 }
}

fn run() -> miette::Result<()> {
    let cli = Cli::parse();
    let base_dir = match cli.base_dir {
        Some(dir) => dir,
        None => std::env::current_dir().into_diagnostic()?,
    };
    let base_dir = Utf8PathBuf::from_path_buf(base_dir)
        .map_err(|path| EpgError::Filesystem(format!("non UTF-8 path: {}", path.display())))?;
    let paths = Paths::new(base_dir);

    init_logging(&paths);

    execute(paths).inspect_err(|err| error!(target: FATAL_TARGET, "{err}"))?;
    Ok(())
}

fn init_logging(paths: &Paths) {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn"))
                .and(filter_fn(|meta| meta.target() != FATAL_TARGET)),
        );

    let log_path = paths.log_file();
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path.as_std_path());
    let (file_layer, open_error) = match log_file {
        Ok(file) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(LevelFilter::INFO),
            ),
            None,
        ),
        Err(err) => (None, Some(err)),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some(err) = open_error {
        warn!("operational log {log_path} unavailable: {err}");
    }
}

fn execute(paths: Paths) -> Result<(), EpgError> {
    let settings = ConfigLoader::resolve(paths)?;
    let store = CacheStore::open(&settings.paths.cache_db())?;
    let lists = TitleLists::load(&settings.paths)?;

    let mut console = Console::stdin();
    let mode = select_mode(&mut console, &settings);
    let output_mode = OutputMode::detect(console.is_interactive());

    let provider = TmdbHttpClient::new(&settings)?;
    let app = App::new(store, provider, settings);
    let result = app.run(mode, &lists, &mut console, chrono::Utc::now())?;

    output::print_run(&result, output_mode).map_err(|err| EpgError::Console(err.to_string()))?;
    Ok(())
}

fn select_mode(console: &mut Console, settings: &Settings) -> RunMode {
    let choice = console.timed_choice(
        MODE_PROMPT,
        settings.prompt_timeout,
        RunMode::DEFAULT_CHOICE,
    );
    match choice.parse::<RunMode>() {
        Ok(mode) => mode,
        Err(_) => {
            warn!("unrecognized mode {:?}, running default", choice.trim());
            RunMode::default()
        }
    }
}
