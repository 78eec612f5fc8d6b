//! ip-whitelist: serve country-based IPv4 CIDR lists over HTTP.

use clap::{Parser, Subcommand};
use ip_whitelist::server::{self, AppState};
use ip_whitelist::{validate_cidr, Config, FeedFetcher, HttpTransport, Processor};
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "ip-whitelist")]
#[command(author = "Kaitu.io")]
#[command(version)]
#[command(
    about = "IP Whitelist by Country - A service that provides IP network lists filtered by country",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Download the feed and print the CIDR blocks of one country
    Lookup {
        /// 2-letter country code
        country: String,
    },

    /// Check CIDR notation
    Validate {
        /// CIDR block, e.g. 192.168.0.0/24
        cidr: String,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(&cli.config),
        Commands::Lookup { country } => lookup(&cli.config, &country),
        Commands::Validate { cidr } => validate(&cidr),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn build_processor(config: &Config) -> Result<Processor, Box<dyn std::error::Error>> {
    let fetcher = FeedFetcher::with_url(HttpTransport::new()?, &config.feed_url);
    Ok(Processor::with_fetcher(fetcher, config.cache_ttl()))
}

fn run_server(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "Starting IP Whitelist by Country server ({})...",
        env!("CARGO_PKG_VERSION")
    );

    // The blocking HTTP client must be created and dropped outside the runtime
    let processor = Arc::new(build_processor(config)?);
    let state = AppState::new(processor.clone(), config.auth_token().map(str::to_string));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        log::info!("Server started on {}", addr);
        server::serve(listener, state).await
    })?;

    drop(runtime);
    drop(processor);
    Ok(())
}

fn lookup(config: &Config, country: &str) -> Result<(), Box<dyn std::error::Error>> {
    let processor = build_processor(config)?;
    for cidr in processor.lookup(country)? {
        println!("{}", cidr);
    }
    Ok(())
}

fn validate(cidr: &str) -> Result<(), Box<dyn std::error::Error>> {
    validate_cidr(cidr)?;
    println!("{} is valid", cidr);
    Ok(())
}
