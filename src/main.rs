use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod display;
mod lookup;
mod scrape;
#[cfg(test)]
mod tests;
mod web;

use config::Config;
use lookup::Dispatcher;
use scrape::{Http, ReqwestTransport};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("stalk=info,tower_http=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();
    let config = Config::load_with(&args.config)?;

    // built outside of the runtime, the blocking client owns one of its own
    let http = Http::new(Arc::new(ReqwestTransport::new(&config)?));
    let dispatcher = Arc::new(Dispatcher::new(http, config.default_platform));

    match args.command {
        cli::Command::Serve {} => web::start_daemon(&config, dispatcher.clone()),

        cli::Command::Lookup {
            platform,
            username,
            json,
        } => {
            let found = dispatcher.lookup(Some(&username), platform.as_deref())?;

            if json {
                let resp = web::StalkResponse::from(found);
                println!("{}", serde_json::to_string_pretty(&resp)?);
            } else {
                print!("{}", display::render_card(found.platform, &found.profile));
            }

            Ok(())
        }
    }
}
