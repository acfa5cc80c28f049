// crates/network/examples/scrape_channel.rs
//! Prints the newest episode link of a channel page
//!
//! Usage: cargo run -p castrelay-network --example scrape_channel -- <CHANNEL_URL> [SELECTOR]

use castrelay_network::{Client, EpisodePageScraper};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(channel_url) = args.next() else {
        eprintln!("usage: scrape_channel <CHANNEL_URL> [SELECTOR]");
        std::process::exit(2);
    };
    let selector = args
        .next()
        .unwrap_or_else(|| "a.story-item-content".to_string());

    let scraper = EpisodePageScraper::new(Client::new()?, channel_url, selector)?;

    match scraper.latest_link().await? {
        Some(link) => println!("{}", link),
        None => println!("No episode link found"),
    }

    Ok(())
}
