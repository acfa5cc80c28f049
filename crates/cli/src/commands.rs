// FILE: crates/cli/src/commands.rs

use crate::relay::{DeliveryOutcome, Relay, RelayOptions, RunReport};
use anyhow::{bail, Context, Result};
use castrelay_config::{Config, ConfigManager, LoadedConfig, ScrapeMode, ScraperConfig};
use castrelay_diff_engine::{
    EpisodeDiffEngine, JsonMarkerStore, Marker, MarkerRecord, MarkerStore, MemoryMarkerStore,
};
#[cfg(feature = "browser")]
use castrelay_network::BrowserScraper;
use castrelay_network::{
    Client, ClientConfig, EpisodeLinkScraper, EpisodePageScraper, FeedFetcher, WebhookSender,
};
use clap::ArgMatches;
use console::style;
use std::sync::Arc;

/// Run the relay once
pub async fn check(config: &Config, matches: &ArgMatches) -> Result<()> {
    let options = RelayOptions {
        dry_run: matches.get_flag("dry-run"),
        require_delivery: matches.get_flag("require-delivery") || config.state.require_delivery,
    };
    let as_json = matches.get_flag("json");

    if let Err(errors) = config.validate() {
        for error in errors {
            log::warn!("{}", error);
        }
    }

    if !config.feed.is_configured() {
        bail!("No feed URL configured. Set feed.rss_url in the config file or STANDFM_RSS_URL");
    }

    let store = JsonMarkerStore::new(&config.state.marker_path);
    let report = if options.dry_run {
        // Work on a copy so a dry run can never touch the marker file
        let snapshot = MemoryMarkerStore::snapshot_of(&store);
        build_relay(config, snapshot)?.run(options).await?
    } else {
        build_relay(config, store)?.run(options).await?
    };

    if as_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize run report")?
        );
    } else {
        print_report(&report);
    }

    Ok(())
}

fn build_relay<S: MarkerStore>(config: &Config, store: S) -> Result<Relay<S>> {
    let feed_client = Client::new().context("Failed to create HTTP client")?;
    let fetcher = FeedFetcher::new(feed_client, config.feed.rss_url.trim());
    let mut relay = Relay::new(Arc::new(fetcher), EpisodeDiffEngine::new(store));

    if config.scraper.is_configured() {
        let scraper = build_scraper(
            &config.scraper,
            config.scraper.channel_url.trim(),
            config.scraper.mode,
        )?;
        relay = relay.with_scraper(scraper);
    }

    if config.webhook.is_configured() {
        let sender = WebhookSender::new(
            client_with_timeout(config.webhook.timeout_secs)?,
            config.webhook.url.trim(),
        );
        relay = relay.with_sink(Arc::new(sender));
    }

    Ok(relay)
}

/// Picks the channel page scraper for `mode`
///
/// Without the `browser` feature, browser mode falls back to a static fetch.
fn build_scraper(
    settings: &ScraperConfig,
    channel_url: &str,
    mode: ScrapeMode,
) -> Result<Arc<dyn EpisodeLinkScraper>> {
    match mode {
        #[cfg(feature = "browser")]
        ScrapeMode::Browser => {
            let mut scraper = BrowserScraper::new(
                channel_url,
                settings.episode_selector.as_str(),
                std::time::Duration::from_secs(settings.timeout_secs),
            )
            .context("Invalid scraper settings")?;
            if let Some(path) = &settings.chrome_executable {
                scraper = scraper.with_chrome_executable(path);
            }
            Ok(Arc::new(scraper))
        }
        #[cfg(not(feature = "browser"))]
        ScrapeMode::Browser => {
            log::warn!("Built without browser support, fetching {} as static HTML", channel_url);
            static_scraper(settings, channel_url)
        }
        ScrapeMode::Static => static_scraper(settings, channel_url),
    }
}

fn static_scraper(settings: &ScraperConfig, channel_url: &str) -> Result<Arc<dyn EpisodeLinkScraper>> {
    let scraper = EpisodePageScraper::new(
        client_with_timeout(settings.timeout_secs)?,
        channel_url,
        settings.episode_selector.as_str(),
    )
    .context("Invalid scraper settings")?;
    Ok(Arc::new(scraper))
}

fn client_with_timeout(secs: u64) -> Result<Client> {
    Client::with_config(ClientConfig::with_timeout_secs(secs)).context("Failed to create HTTP client")
}

/// Show the stored marker
pub fn status(config: &Config) -> Result<()> {
    let store = JsonMarkerStore::new(&config.state.marker_path);
    println!("Marker file: {}", store.path().display());

    match store.read_record() {
        Ok(Some(record)) => print_record(&record),
        Ok(None) => println!("{} No marker stored; the next check is a first run", style("•").cyan()),
        Err(e) => println!(
            "{} {}\n  The next check will treat this as a first run",
            style("!").yellow().bold(),
            e
        ),
    }

    Ok(())
}

/// Delete the stored marker
pub fn reset(config: &Config, matches: &ArgMatches) -> Result<()> {
    let store = JsonMarkerStore::new(&config.state.marker_path);

    if !matches.get_flag("force") {
        println!(
            "Delete the marker at {}? The next check will only report the newest episode. (y/N)",
            store.path().display()
        );
        let mut input = String::new();
        std::io::stdin()
            .read_line(&mut input)
            .context("Failed to read input")?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Reset cancelled");
            return Ok(());
        }
    }

    if store.clear().context("Failed to delete marker")? {
        println!("{} Marker deleted", style("✓").green().bold());
    } else {
        println!("No marker to delete");
    }

    Ok(())
}

/// Store a marker by hand
pub fn mark(config: &Config, matches: &ArgMatches) -> Result<()> {
    let guid = matches
        .get_one::<String>("guid")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow::anyhow!("GUID is required"))?;

    let store = JsonMarkerStore::new(&config.state.marker_path);
    let record = MarkerRecord::new(&Marker::new(guid));
    store.write_record(&record).context("Failed to save marker")?;

    println!("{} Marker set to {}", style("✓").green().bold(), style(guid).bold());
    Ok(())
}

/// Run only the channel page scraper
pub async fn scrape(config: &Config, matches: &ArgMatches) -> Result<()> {
    let channel_url = matches
        .get_one::<String>("channel")
        .cloned()
        .unwrap_or_else(|| config.scraper.channel_url.clone());

    if channel_url.trim().is_empty() {
        bail!("No channel URL configured. Pass --channel, set scraper.channel_url or VOICY_CHANNEL_URL");
    }

    let mode = match matches.get_one::<String>("mode") {
        Some(mode) => mode.parse::<ScrapeMode>().map_err(anyhow::Error::msg)?,
        None => config.scraper.mode,
    };
    let scraper = build_scraper(&config.scraper, channel_url.trim(), mode)?;

    match scraper
        .latest_episode_link()
        .await
        .context("Failed to scrape channel page")?
    {
        Some(link) => println!("{}", link),
        None => println!(
            "No element matching '{}' on {}",
            config.scraper.episode_selector, channel_url
        ),
    }

    Ok(())
}

/// Send one webhook by hand
pub async fn webhook(config: &Config, matches: &ArgMatches) -> Result<()> {
    let episode_url = matches
        .get_one::<String>("episode-url")
        .ok_or_else(|| anyhow::anyhow!("Episode URL is required"))?;
    let url = matches
        .get_one::<String>("url")
        .cloned()
        .unwrap_or_else(|| config.webhook.url.clone());

    let sender = WebhookSender::new(client_with_timeout(config.webhook.timeout_secs)?, url);
    sender
        .send(episode_url)
        .await
        .context("Webhook delivery failed")?;

    println!("{} Sent {}", style("✓").green().bold(), episode_url);
    Ok(())
}

/// Write a default config file
pub fn config_init(manager: &ConfigManager) -> Result<()> {
    if manager.initialize().context("Failed to write config file")? {
        println!(
            "{} Created {}",
            style("✓").green().bold(),
            manager.config_path().display()
        );
    } else {
        println!(
            "Config file already exists at {}",
            manager.config_path().display()
        );
    }
    Ok(())
}

/// Print the effective config
pub fn config_show(manager: &ConfigManager, loaded: &LoadedConfig) -> Result<()> {
    println!("# {}", manager.config_path().display());
    if !loaded.env_overrides.is_empty() {
        println!("# environment overrides: {}", loaded.env_overrides.join(", "));
    }
    println!(
        "{}",
        toml::to_string_pretty(&loaded.config).context("Failed to render config")?
    );
    Ok(())
}

/// Validate the config file plus environment overrides
pub fn config_validate(manager: &ConfigManager) -> Result<()> {
    let errors = manager.validate().context("Failed to load config")?;

    if errors.is_empty() {
        println!("{} Config is valid", style("✓").green().bold());
        return Ok(());
    }

    for error in &errors {
        println!("{} {}", style("✗").red().bold(), error);
    }
    bail!("{} invalid config value(s)", errors.len())
}

fn print_record(record: &MarkerRecord) {
    match record.marker() {
        Some(marker) => println!("Last processed: {}", style(marker).bold()),
        None => println!("Last processed: {}", style("(blank)").dim()),
    }
    match record.last_checked_timestamp {
        Some(at) => println!("Saved at:       {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => println!("Saved at:       {}", style("unknown").dim()),
    }
}

fn print_report(report: &RunReport) {
    println!(
        "\n{}: {} entries scanned",
        style(&report.feed_title).bold(),
        report.entries_scanned
    );

    if !report.has_new_episodes() {
        println!("No new episodes");
        return;
    }

    println!(
        "{} new episode(s):",
        style(report.new_episodes.len()).bold().cyan()
    );
    for episode in &report.new_episodes {
        println!("  • {} ({})", truncate(&episode.title, 60), episode.guid);
    }

    if report.dry_run {
        println!("{}", style("Dry run: nothing delivered, marker unchanged").dim());
        return;
    }

    if let Some(delivery) = &report.delivery {
        println!("{}", describe_delivery(delivery));
    }

    if report.marker_saved {
        if let Some(marker) = &report.next_marker {
            println!("Marker saved: {}", marker);
        }
    } else if report.marker_deferred {
        println!(
            "{} Marker not advanced; the next check retries",
            style("!").yellow().bold()
        );
    }
}

fn describe_delivery(delivery: &DeliveryOutcome) -> String {
    match delivery {
        DeliveryOutcome::Delivered { episode_url } => {
            format!("{} Delivered {}", style("✓").green().bold(), episode_url)
        }
        DeliveryOutcome::NoLinkFound => format!(
            "{} No episode link found on the channel page",
            style("!").yellow().bold()
        ),
        DeliveryOutcome::Failed { reason } => {
            format!("{} Delivery failed: {}", style("✗").red().bold(), reason)
        }
        DeliveryOutcome::Skipped {
            reason,
            episode_url,
        } => match episode_url {
            Some(url) => format!("{} Skipped ({}): {}", style("•").cyan(), reason, url),
            None => format!("{} Skipped ({})", style("•").cyan(), reason),
        },
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
