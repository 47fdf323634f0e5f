//! # metascrape CLI
//!
//! - `scrape <URL>`: scrape one page and print the record as JSON
//! - `serve`: run the HTTP API on `--addr`
//!
//! Provider credentials come from flags or the environment, and a `.env`
//! file in the working directory is loaded first when present.

mod telemetry;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use metascrape::{Config, MetaScraper};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::instrument;

#[derive(Parser)]
#[command(author, version, about = "Scrape structured metadata from web pages", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Timeout for page fetches and provider API calls, in seconds
    #[arg(long, global = true, env = "METASCRAPE_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// User agent sent with every request
    #[arg(long, global = true, env = "METASCRAPE_USER_AGENT")]
    user_agent: Option<String>,

    /// Export traces and metrics over OTLP
    #[arg(long, global = true)]
    otlp: bool,

    /// YouTube Data API key
    #[arg(long, global = true, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    youtube_api_key: Option<String>,

    /// SoundCloud client id
    #[arg(long, global = true, env = "SOUNDCLOUD_CLIENT_ID", hide_env_values = true)]
    soundcloud_client_id: Option<String>,

    /// Twitter app-only bearer token
    #[arg(long, global = true, env = "TWITTER_BEARER_TOKEN", hide_env_values = true)]
    twitter_bearer_token: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scrape a single URL and print its metadata
    Scrape(ScrapeArgs),

    /// Serve the HTTP API
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct ScrapeArgs {
    /// URL to scrape
    #[arg(required = true)]
    url: String,

    /// Pretty-print the JSON output
    #[arg(short, long)]
    pretty: bool,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to listen on
    #[arg(short, long, default_value = "0.0.0.0:4000")]
    addr: SocketAddr,
}

impl GlobalArgs {
    /// Environment configuration with command line overrides applied
    fn to_config(&self) -> Config {
        let mut config = Config::from_env();

        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout_secs(secs);
        }
        if let Some(agent) = &self.user_agent {
            config = config.with_user_agent(agent);
        }
        if let Some(key) = &self.youtube_api_key {
            config = config.with_youtube_api_key(key);
        }
        if let Some(id) = &self.soundcloud_client_id {
            config = config.with_soundcloud_client_id(id);
        }
        if let Some(token) = &self.twitter_bearer_token {
            config = config.with_twitter_bearer_token(token);
        }

        config
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let _otel = telemetry::init_tracing_subscriber(cli.global.otlp)?;

    let config = cli.global.to_config();
    let scraper = MetaScraper::standard(&config).context("Failed to create HTTP clients")?;

    match cli.command {
        Commands::Scrape(args) => scrape_command(&scraper, args),
        Commands::Serve(args) => serve_command(scraper, args),
    }
}

#[instrument(skip(scraper))]
fn scrape_command(scraper: &MetaScraper, args: ScrapeArgs) -> anyhow::Result<()> {
    let metadata = scraper.scrape(&args.url)?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&metadata)?
    } else {
        serde_json::to_string(&metadata)?
    };
    println!("{}", json);

    Ok(())
}

fn serve_command(scraper: MetaScraper, args: ServeArgs) -> anyhow::Result<()> {
    // The blocking HTTP clients inside the scraper must be dropped outside
    // the runtime, so keep one handle alive out here.
    let scraper = Arc::new(scraper);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(metascrape::server::serve(args.addr, Arc::clone(&scraper)))?;
    drop(runtime);

    Ok(())
}
