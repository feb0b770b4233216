use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use tracing_subscriber::EnvFilter;

mod client;
mod commands;
mod constants;
mod domain;
mod state;

#[cfg(test)]
mod test_utils;

use crate::commands::CommandContext;
use crate::domain::InstructorLookup;
use crate::state::{AppConfig, TransferForm};

// ethdash version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// ethdash - Ethereum subgraph browser and wallet companion
#[derive(Parser, Debug)]
#[command(version = VERSION, about, long_about = None)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Subgraph serving blocks, transactions and accounts
    #[arg(long, global = true)]
    subgraph_url: Option<String>,

    /// Subgraph serving instructor records
    #[arg(long, global = true)]
    instructor_subgraph_url: Option<String>,

    /// JSON-RPC endpoint used as the wallet provider
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Chain served by the RPC endpoint
    #[arg(long, global = true)]
    chain: Option<u64>,

    /// Page index for list commands
    #[arg(long, global = true, default_value_t = 0, allow_negative_numbers = true)]
    page: i64,

    /// Records per page for list commands, overriding the config file
    #[arg(long, global = true)]
    page_size: Option<usize>,

    /// Keep refreshing until Ctrl-C
    #[arg(short, long, global = true)]
    watch: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List recent blocks
    Blocks,
    /// List recent transactions
    Transactions {
        /// Only transactions sent from or to this address
        #[arg(long)]
        account: Option<String>,
    },
    /// Show aggregated statistics for an address
    Account {
        /// Account address
        address: String,
    },
    /// List registered instructors
    Instructors {
        /// Look up one instructor id
        #[arg(long, conflicts_with_all = ["age", "min_age", "max_age"])]
        id: Option<String>,
        /// Exact age
        #[arg(long, conflicts_with_all = ["min_age", "max_age"])]
        age: Option<String>,
        /// Lower bound of an age range
        #[arg(long, requires = "max_age")]
        min_age: Option<String>,
        /// Upper bound of an age range
        #[arg(long, requires = "min_age")]
        max_age: Option<String>,
    },
    /// Show one block read from the node
    Block {
        /// Block number
        number: u64,
        /// Only transactions sent from or to this address
        #[arg(long)]
        account: Option<String>,
    },
    /// Read an instructor from the contract
    Instructor {
        /// Instructor id
        #[arg(required_unless_present = "latest")]
        id: Option<String>,
        /// Read the most recently registered instructor
        #[arg(long, conflicts_with = "id")]
        latest: bool,
    },
    /// List supported networks
    Networks,
    /// Connect the wallet and show its state
    Wallet {
        /// Switch to this chain id after connecting
        #[arg(long)]
        switch: Option<u64>,
    },
    /// Send native currency
    Transfer {
        /// Decimal amount, e.g. 0.5
        #[arg(long)]
        amount: String,
        /// Recipient address; repeat to send the same amount to several
        #[arg(long, required = true)]
        to: Vec<String>,
        /// Note attached as call data
        #[arg(long, default_value = "")]
        message: String,
    },
    /// Register an instructor on the info contract
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: String,
    },
    /// Display version
    Version,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded configuration.
    fn apply_overrides(&self, mut config: AppConfig) -> AppConfig {
        if let Some(url) = &self.subgraph_url {
            config.subgraph_url.clone_from(url);
        }
        if let Some(url) = &self.instructor_subgraph_url {
            config.instructor_subgraph_url.clone_from(url);
        }
        if let Some(url) = &self.rpc_url {
            config.rpc_url.clone_from(url);
        }
        if let Some(chain) = self.chain {
            config.default_chain_id = chain;
        }
        config
    }
}

fn instructor_lookup(
    id: Option<String>,
    age: Option<String>,
    min_age: Option<String>,
    max_age: Option<String>,
) -> InstructorLookup {
    match (id, age, min_age, max_age) {
        (Some(id), ..) => InstructorLookup::ById(id),
        (None, Some(age), ..) => InstructorLookup::ByAge(age),
        (None, None, Some(min), Some(max)) => InstructorLookup::ByAgeRange { min, max },
        _ => InstructorLookup::All,
    }
}

/// Application entry point
#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = CommandContext {
        config: cli.apply_overrides(AppConfig::load()),
        page: cli.page,
        page_size: cli.page_size,
        watch: cli.watch,
    };
    tracing::debug!("Running {:?} with {:?}", cli.command, ctx.config);

    match cli.command {
        Commands::Blocks => commands::blocks(&ctx).await,
        Commands::Transactions { account } => commands::transactions(&ctx, account).await,
        Commands::Account { address } => commands::account(&ctx, &address).await,
        Commands::Instructors {
            id,
            age,
            min_age,
            max_age,
        } => commands::instructors(&ctx, instructor_lookup(id, age, min_age, max_age)).await,
        Commands::Block { number, account } => commands::block(&ctx, number, account).await,
        Commands::Instructor { id, latest } => {
            commands::instructor(&ctx, id.filter(|_| !latest)).await
        }
        Commands::Networks => {
            commands::networks(&ctx);
            Ok(())
        }
        Commands::Wallet { switch } => commands::wallet(&ctx, switch).await,
        Commands::Transfer {
            amount,
            to,
            message,
        } => {
            let mut recipients = to.into_iter();
            let form = TransferForm {
                amount,
                recipient: recipients.next().unwrap_or_default(),
                message,
            };
            commands::transfer(&ctx, form, recipients.collect()).await
        }
        Commands::Register { name, age } => commands::register(&ctx, &name, &age).await,
        Commands::Version => {
            println!("ethdash v{VERSION}");
            println!("Browse Ethereum subgraph data and submit wallet transactions");
            Ok(())
        }
    }
}
