mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use vnode_core::{Environment, ProjectConfig, logging};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = "vnode", author, version, about = "Network configuration and deployment plans for the vnode contracts", long_about = None)]
pub struct Cli {
    /// Log level for vnode crates; `RUST_LOG` takes precedence when set.
    #[arg(long, env = "VNODE_LOG", default_value = "info", global = true)]
    pub log_level: String,

    /// Also write logs to ~/.vnode/logs.
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List configured networks with chain IDs and endpoints.
    Networks,
    /// Print the resolved configuration with secrets masked.
    Config {
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// List deployment modules and their constructor arguments.
    Modules,
    /// Print the deployment plan for a module.
    Plan {
        /// Module id or contract name, e.g. `ReferralModule` or `ReferralSystem`.
        module: String,
        #[arg(long)]
        network: Option<String>,
        /// Also write the plan to `<DIR>/chain-<id>/<module>.plan.json`.
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Compare the endpoint's `eth_chainId` with the configured chain ID.
    Check {
        #[arg(long)]
        network: Option<String>,
    },
    /// List the HD derivation paths used on a network.
    Accounts {
        #[arg(long)]
        network: Option<String>,
    },
    /// Print the deployment id used for explorer verification.
    VerifyId {
        #[arg(long)]
        network: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Toml,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let log_guard = match init_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("warning: {e}");
            None
        }
    };
    info!("Starting vnode v{VERSION}");

    let env = Environment::from_process();
    let mut stdout = std::io::stdout().lock();
    let code = match commands::run(cli.command, &env, &mut stdout).await {
        Ok(()) => 0,
        Err(e) => {
            error!(category = ?e.category(), "{e}");
            eprintln!("error: {}", e.user_message());
            e.exit_code()
        }
    };

    // Flush the file appender before exiting.
    drop(log_guard);
    std::process::exit(code);
}

fn init_logging(cli: &Cli) -> anyhow::Result<Option<logging::WorkerGuard>> {
    if cli.log_file {
        let dir = ProjectConfig::logs_dir()?;
        let guard = logging::init_logging_to_dir(&dir, &cli.log_level)?;
        return Ok(Some(guard));
    }
    logging::init_logging(&cli.log_level)?;
    Ok(None)
}
