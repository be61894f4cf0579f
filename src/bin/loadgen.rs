//! Load generator for the kvcache HTTP API.

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kvcache::loadgen::{self, LoadConfig, Workload};

#[derive(Parser, Debug)]
#[command(
    name = "loadgen",
    version = env!("CARGO_PKG_VERSION"),
    about = "Issue concurrent GET/PUT traffic against a kvcache server",
    long_about = None
)]
struct Args {
    #[arg(long, default_value_t = 10, help = "Number of concurrent clients")]
    clients: usize,

    #[arg(long, default_value_t = 30, help = "Test duration in seconds")]
    duration: u64,

    #[arg(long, value_enum, default_value_t = Workload::GetPopular)]
    workload: Workload,

    #[arg(long, default_value = "http://localhost:8080", help = "Server base URL")]
    base_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kvcache=info,loadgen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = LoadConfig {
        base_url: args.base_url,
        clients: args.clients,
        duration: Duration::from_secs(args.duration),
        workload: args.workload,
    };

    println!(
        "Starting load test with {} clients for {} seconds...",
        config.clients, args.duration
    );

    let report = loadgen::run(&config).await?;

    println!();
    println!("{}", report.summary(config.workload, config.duration));
    Ok(())
}
