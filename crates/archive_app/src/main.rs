mod cli;
mod commands;
mod config;
mod console;

use std::env;
use std::process::ExitCode;

use anyhow::Context;
use archive_engine::HttpPageSession;
use archive_logging::{archive_error, LogDestination};
use log::LevelFilter;

use crate::cli::{parse_args, Cli, Command, USAGE};
use crate::config::{resolve_config_path, ArchiverConfig, CONFIG_PATH_ENV};
use crate::console::{render_summary, ConsoleProgress};

fn main() -> ExitCode {
    let cli = match parse_args(env::args().skip(1)) {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("Error: {err}");
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };
    if cli.command == Command::Help {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let destination = if cli.log_file {
        LogDestination::terminal_and_default_file()
    } else {
        LogDestination::Terminal
    };
    archive_logging::initialize(destination, level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // The terminal logger sends errors to stderr.
            archive_error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("starting the async runtime")?;
    runtime.block_on(execute(cli))
}

async fn execute(cli: Cli) -> anyhow::Result<()> {
    let config_path =
        resolve_config_path(cli.config_path.as_deref(), env::var(CONFIG_PATH_ENV).ok());
    let sink = ConsoleProgress;

    match cli.command {
        Command::Archive { authors } => {
            let config = ArchiverConfig::load(&config_path)?;
            let mut session = HttpPageSession::new(config.fetch_settings())?;
            commands::archive_authors(&mut session, &config, &authors, &sink).await?;
        }
        Command::Links {
            listing_url,
            authors,
        } => {
            let config = ArchiverConfig::load_optional(&config_path)?;
            let mut session = session_for(config.as_ref())?;
            let references =
                commands::list_links(&mut session, config.as_ref(), &listing_url, &authors, &sink)
                    .await?;
            println!("{}", serde_json::to_string_pretty(&references)?);
        }
        Command::Discover { listing_url } => {
            let config = ArchiverConfig::load_optional(&config_path)?;
            let mut session = session_for(config.as_ref())?;
            let authors =
                commands::discover(&mut session, config.as_ref(), &listing_url, &sink).await?;
            println!("{}", serde_json::to_string_pretty(&authors)?);
        }
        Command::Follow { post_url } => {
            let mut config = ArchiverConfig::load(&config_path)?;
            let mut session = HttpPageSession::new(config.fetch_settings())?;
            let outcome =
                commands::follow(&mut session, &mut config, &config_path, &post_url, &sink).await?;
            match (outcome.newly_followed, outcome.run) {
                (true, Some(summary)) => println!(
                    "Now following {}; {} new posts archived.",
                    outcome.author, summary.created
                ),
                _ => println!("Already following {}; nothing to do.", outcome.author),
            }
        }
        Command::Update => {
            let config = ArchiverConfig::load(&config_path)?;
            let mut session = HttpPageSession::new(config.fetch_settings())?;
            if commands::update(&mut session, &config, &sink).await?.is_none() {
                println!("{}", render_summary(&Default::default()));
            }
        }
        Command::Help => println!("{USAGE}"),
    }
    Ok(())
}

fn session_for(config: Option<&ArchiverConfig>) -> anyhow::Result<HttpPageSession> {
    let settings = config
        .map(ArchiverConfig::fetch_settings)
        .unwrap_or_default();
    Ok(HttpPageSession::new(settings)?)
}
