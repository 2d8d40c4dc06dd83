use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use temple_admin_rs::{
    cli::{Cli, Command, CommandArguments},
    error::ServiceResult,
    metadata::{PKG_DESCRIPTION, PKG_NAME, PKG_VERSION},
    seed, server,
    store::{Latency, TempleStore},
};

#[tokio::main]
async fn main() -> ServiceResult<()> {
    // stdout carries the stdio transport, so logs go to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match Cli::parse().command {
        Command::Start(args) => server::start_server(args).await,
        Command::Analytics => {
            let analytics = TempleStore::seeded(Latency::none()).get_analytics().await;
            println!("{}", serde_json::to_string_pretty(&analytics)?);
            Ok(())
        }
        Command::Seed => {
            println!("{}", serde_json::to_string_pretty(&seed::seed_data())?);
            Ok(())
        }
        Command::Status(args) => {
            print_status(&args);
            Ok(())
        }
        Command::Version => {
            println!("{PKG_NAME} {PKG_VERSION}");
            Ok(())
        }
    }
}

fn print_status(args: &CommandArguments) {
    let flag = |on: bool| if on { "on".green() } else { "off".red() };

    println!("{} {}", PKG_NAME.bold(), PKG_VERSION);
    println!("{}", PKG_DESCRIPTION.dimmed());
    println!("  stdio:     {}", flag(args.enable_stdio));
    println!(
        "  http:      {} ({})",
        flag(args.enable_http),
        args.http_addr
    );
    println!("  latency:   {}", flag(args.simulate_latency));
    println!(
        "  records:   {}",
        if args.empty { "empty" } else { "demo seed" }
    );
    match args.auth_config() {
        Some(auth) => println!(
            "  auth:      {} (timeout {}s, token {})",
            auth.api_url.cyan(),
            auth.timeout.as_secs(),
            if auth.token.is_some() { "set" } else { "unset" }
        ),
        None => println!("  auth:      {}", "not configured".yellow()),
    }
    if let Err(err) = args.validate() {
        println!("  {} {err}", "invalid:".red().bold());
    }
}
