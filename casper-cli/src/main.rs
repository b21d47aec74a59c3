//! Casper CLI
//!
//! Command-line interface for signing requests, issuing claim tokens and
//! calling the platform through the Casper signing service.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod ui;

use commands::SchemeArg;

#[derive(Parser)]
#[command(name = "casper")]
#[command(about = "Casper CLI - sign requests and call the platform through the Casper signing service", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Route requests through this proxy (overrides CASPER_PROXY)
    #[arg(long, global = true)]
    proxy: Option<String>,

    /// Project tag appended to the user-agent (overrides CASPER_PROJECT)
    #[arg(long, global = true)]
    project: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the v1 signature of a parameter set
    Sign {
        /// Parameters as key=value
        #[arg(value_parser = commands::parse_pair)]
        params: Vec<(String, String)>,

        /// Which fields are signed
        #[arg(short, long, value_enum, default_value = "full")]
        scheme: SchemeArg,
    },

    /// Issue an HS256 claim token
    Token {
        /// Claims as key=value
        #[arg(value_parser = commands::parse_pair)]
        claims: Vec<(String, String)>,

        /// Issued-at time in epoch seconds (defaults to now)
        #[arg(long)]
        iat: Option<i64>,
    },

    /// Log in and show the session
    Login,

    /// Log in and fetch the account state
    Updates,

    /// Log in and apply a friend action
    Friend {
        /// add, delete, block, unblock or display
        action: String,

        /// Target username
        friend: String,

        /// Display name (required for the display action)
        #[arg(long)]
        display: Option<String>,
    },

    /// Log in and call any endpoint from the table
    Call {
        /// Endpoint name, see `casper endpoints`
        endpoint: String,

        /// Extra parameters as key=value
        #[arg(value_parser = commands::parse_pair)]
        params: Vec<(String, String)>,

        /// Abort after this many seconds
        #[arg(long)]
        deadline: Option<u64>,
    },

    /// List the endpoint table
    Endpoints,

    /// Validate a proxy URL without connecting
    CheckProxy {
        /// Proxy URL, e.g. http://192.168.2.3:8080
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; --verbose wins over RUST_LOG
    let filter = if cli.verbose {
        EnvFilter::new("casper_cli=debug,casper_lib=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("casper_cli=info,casper_lib=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let overrides = commands::Overrides {
        proxy: cli.proxy,
        project: cli.project,
    };

    let outcome = match cli.command {
        Commands::Sign { params, scheme } => commands::sign::run(&overrides, params, scheme),
        Commands::Token { claims, iat } => commands::token::run(&overrides, claims, iat),
        Commands::Login => commands::session::login(&overrides, cli.verbose).await,
        Commands::Updates => commands::session::updates(&overrides, cli.verbose).await,
        Commands::Friend {
            action,
            friend,
            display,
        } => {
            commands::session::friend(&overrides, &action, &friend, display.as_deref(), cli.verbose)
                .await
        }
        Commands::Call {
            endpoint,
            params,
            deadline,
        } => commands::session::call(&overrides, &endpoint, params, deadline, cli.verbose).await,
        Commands::Endpoints => {
            commands::endpoints::run();
            Ok(())
        }
        Commands::CheckProxy { url } => commands::proxy::run(&url),
    };

    if let Err(err) = &outcome {
        ui::failure(err);
    }
    outcome
}
