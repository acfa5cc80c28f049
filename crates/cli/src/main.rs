// FILE: crates/cli/src/main.rs

use anyhow::{Context, Result};
use castrelay_config::{AppConfig, ConfigManager, LoadedConfig};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::fs::OpenOptions;
use std::path::PathBuf;

mod commands;
mod relay;

fn build_cli() -> Command {
    Command::new("castrelay")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Relays new podcast episodes from an RSS feed to a webhook")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to the config file")
                .global(true),
        )
        .arg(
            Arg::new("state")
                .short('s')
                .long("state")
                .value_name("FILE")
                .help("Path to the marker file, overrides the config")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("check")
                .about("Check the feed once and relay anything new")
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .help("Only report new episodes; no scrape, webhook or marker write")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("require-delivery")
                        .long("require-delivery")
                        .help("Only advance the marker when the webhook delivery succeeded")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the run report as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("status").about("Show the last processed episode"))
        .subcommand(
            Command::new("reset")
                .about("Delete the stored marker so the next check is a first run")
                .arg(Arg::new("force").short('f').long("force").help("Skip confirmation prompt").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("mark")
                .about("Record an episode as already processed")
                .arg(Arg::new("guid").required(true).value_name("GUID").help("Entry identifier to store")),
        )
        .subcommand(
            Command::new("scrape")
                .about("Print the newest episode link on the channel page")
                .arg(Arg::new("channel").long("channel").value_name("URL").help("Channel page URL (defaults to the config)"))
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .value_name("MODE")
                        .value_parser(["browser", "static"])
                        .help("How to load the page (defaults to scraper.mode)"),
                ),
        )
        .subcommand(
            Command::new("webhook")
                .about("Send a single episode link to the webhook")
                .arg(Arg::new("episode-url").long("episode-url").required(true).value_name("URL").help("Episode URL to send"))
                .arg(Arg::new("url").long("url").value_name("WEBHOOK").help("Webhook URL (defaults to the config)")),
        )
        .subcommand(
            Command::new("config")
                .about("Manage the config file")
                .subcommand_required(true)
                .subcommand(Command::new("init").about("Write a default config file"))
                .subcommand(Command::new("show").about("Print the effective config"))
                .subcommand(Command::new("validate").about("Check the config for invalid values")),
        )
}

fn config_manager(matches: &ArgMatches) -> Result<ConfigManager> {
    let manager = match matches.get_one::<String>("config") {
        Some(path) => ConfigManager::with_file(PathBuf::from(path)),
        None => ConfigManager::new(),
    };
    manager.context("Failed to locate config file")
}

fn load_config(manager: &ConfigManager, matches: &ArgMatches) -> Result<LoadedConfig> {
    let mut loaded = manager
        .load_with_env_overrides()
        .with_context(|| format!("Failed to load config from {}", manager.config_path().display()))?;

    if let Some(state) = matches.get_one::<String>("state") {
        loaded.config.state.marker_path = PathBuf::from(state);
    }
    Ok(loaded)
}

fn init_logging(app: &AppConfig, verbose: bool) {
    let level = if verbose {
        "debug".to_string()
    } else {
        app.log_level.to_string()
    };

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));

    if let Some(path) = &app.log_file {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!(
                "Cannot open log file {}: {}. Logging to stderr",
                path.display(),
                e
            ),
        }
    }

    builder.init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();
    let verbose = matches.get_flag("verbose");
    let manager = config_manager(&matches)?;

    if let Some(("config", sub_matches)) = matches.subcommand() {
        let app = manager.load_or_default().app;
        init_logging(&app, verbose);

        return match sub_matches.subcommand() {
            Some(("init", _)) => commands::config_init(&manager),
            Some(("show", _)) => {
                let loaded = load_config(&manager, &matches)?;
                loaded.log_summary(manager.config_path());
                commands::config_show(&manager, &loaded)
            }
            Some(("validate", _)) => commands::config_validate(&manager),
            _ => Ok(()),
        };
    }

    let loaded = load_config(&manager, &matches)?;
    init_logging(&loaded.config.app, verbose);
    loaded.log_summary(manager.config_path());
    let config = loaded.config;

    match matches.subcommand() {
        Some(("check", sub_matches)) => commands::check(&config, sub_matches).await,
        Some(("status", _)) => commands::status(&config),
        Some(("reset", sub_matches)) => commands::reset(&config, sub_matches),
        Some(("mark", sub_matches)) => commands::mark(&config, sub_matches),
        Some(("scrape", sub_matches)) => commands::scrape(&config, sub_matches).await,
        Some(("webhook", sub_matches)) => commands::webhook(&config, sub_matches).await,
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}
