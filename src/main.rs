use std::fs::File;
use std::io;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use skycast::app::{run_app, App};
use skycast::cli::Args;
use skycast::display::render_text;
use skycast::{FetchResult, WeatherFetcher};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// The dashboard owns the terminal, so logs only go to stderr in plain mode.
fn init_logging(log_file: Option<&Path>, plain: bool) -> Result<()> {
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("cannot open log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if plain {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

fn run_plain(args: &Args, fetcher: &WeatherFetcher) -> Result<ExitCode> {
    let city = args.city.as_deref().unwrap_or_default();
    match fetcher.fetch(city) {
        FetchResult::Success(report) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_text(&report, &args.display_options()));
            }
            Ok(ExitCode::SUCCESS)
        }
        FetchResult::Failure { message } => {
            eprintln!("{message}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_dashboard(args: &Args, fetcher: &WeatherFetcher) -> Result<()> {
    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // create app and run it
    let app = App::new(args.display_options(), args.city.clone());
    let res = run_app(&mut terminal, fetcher, app);

    // restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(res?)
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref(), args.plain)?;

    let fetcher = WeatherFetcher::new(args.fetcher_config())?;

    if args.plain {
        run_plain(&args, &fetcher)
    } else {
        run_dashboard(&args, &fetcher)?;
        Ok(ExitCode::SUCCESS)
    }
}
