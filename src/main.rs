use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use ratecache::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Serve the rate lookup and warm endpoints over HTTP
    Serve,
    /// Look up a rate, fetching it if the cached one is missing or stale
    Get {
        from_denom: String,
        to_denom: String,
        /// TTL for a freshly fetched rate, in seconds
        #[arg(long)]
        ttl: Option<u64>,
    },
    /// Refresh every active registered pair once
    Warm,
    /// Show cached rates
    List,
    /// Manage the pairs kept warm
    #[command(subcommand)]
    Pairs(PairCommands),
}

#[derive(Subcommand)]
enum PairCommands {
    /// Register a pair as active
    Add { from_denom: String, to_denom: String },
}

impl From<Commands> for ratecache::AppCommand {
    fn from(cmd: Commands) -> ratecache::AppCommand {
        match cmd {
            Commands::Serve => ratecache::AppCommand::Serve,
            Commands::Get {
                from_denom,
                to_denom,
                ttl,
            } => ratecache::AppCommand::Get {
                from_denom,
                to_denom,
                ttl_seconds: ttl,
            },
            Commands::Warm => ratecache::AppCommand::Warm,
            Commands::List => ratecache::AppCommand::List,
            Commands::Pairs(PairCommands::Add {
                from_denom,
                to_denom,
            }) => ratecache::AppCommand::AddPair {
                from_denom,
                to_denom,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => ratecache::cli::setup::setup_at_path(path),
            None => ratecache::cli::setup::setup(),
        },
        Some(cmd) => ratecache::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
