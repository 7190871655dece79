//! x-radar - read-only X (Twitter) research CLI with a local response cache

use clap::Parser;
use clap::error::ErrorKind as ClapErrorKind;

mod cache;
mod cli;
mod client;
mod config;
mod cost;
mod error;
mod models;
mod orchestrator;
mod output;

use cli::{CacheCommands, Cli, Commands, GlobalOptions};
use config::Config;
use error::{Error, Result};

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => exit_on_parse_error(err),
    };

    let opts = GlobalOptions::from_cli(&cli);
    init_logging(opts.debug);

    if let Err(err) = run(cli, &opts).await {
        log::debug!("Command failed: {:?}", err);
        output::print_error(&err);
        std::process::exit(err.exit_code());
    }
}

/// Help and version go through clap; every other parse failure becomes a
/// structured `invalid_argument` error.
fn exit_on_parse_error(err: clap::Error) -> ! {
    match err.kind() {
        ClapErrorKind::DisplayHelp
        | ClapErrorKind::DisplayVersion
        | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => err.exit(),
        _ => {
            let err = Error::InvalidArgument(first_line(&err.to_string()));
            output::print_error(&err);
            std::process::exit(err.exit_code());
        }
    }
}

fn first_line(rendered: &str) -> String {
    rendered
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("error: ")
        .to_string()
}

/// Logs go to stderr. `RUST_LOG` wins over `--debug`.
fn init_logging(debug: bool) {
    let default_filter = if debug { "x_radar=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

async fn run(cli: Cli, opts: &GlobalOptions) -> Result<()> {
    let config = Config::from_env().with_api_host(opts.api_host_ref());
    log::debug!("Cache directory: {:?}", config.cache_dir);

    match cli.command {
        Commands::Search(args) => cli::query::search(args, &config, opts).await,
        Commands::UserTweets(args) => cli::query::user_tweets(args, &config, opts).await,
        Commands::Tweet { id } => cli::query::tweet(&id, &config, opts).await,
        Commands::Cache(cmd) => match cmd {
            CacheCommands::Status => cli::cache::status(&config),
            CacheCommands::Clear => cli::cache::clear(&config),
            CacheCommands::Prune => cli::cache::prune(&config),
            CacheCommands::Path => cli::cache::path(&config),
        },
    }
}
