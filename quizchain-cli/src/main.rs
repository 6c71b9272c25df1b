mod commands;

use clap::{Parser, Subcommand};
use quizchain_core::QuizNode;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "quizchain")]
#[command(about = "Commit-reveal quiz games on a simulated ledger")]
#[command(version)]
struct Cli {
    /// Data directory for node storage
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deployment commands
    #[command(subcommand)]
    Deploy(commands::DeployCommands),

    /// Commit an answer digest and fund an instance
    Init {
        /// Instance handle
        instance: u64,
        /// Account paying the deposit
        #[arg(long)]
        from: String,
        /// Deposit in wei
        #[arg(long)]
        value: u64,
        /// Plaintext answer, hashed locally before submission
        #[arg(long, conflicts_with = "digest")]
        answer: Option<String>,
        /// Pre-computed answer digest (hex)
        #[arg(long)]
        digest: Option<String>,
    },
    /// Submit a guess against an instance
    Guess {
        /// Instance handle
        instance: u64,
        /// Guessing account
        #[arg(long)]
        from: String,
        /// Candidate answer text
        candidate: String,
    },
    /// Send an unsolicited deposit to an unsolved instance
    Send {
        /// Instance handle
        instance: u64,
        /// Sending account
        #[arg(long)]
        from: String,
        /// Amount in wei
        amount: u64,
    },
    /// Show one instance's state
    Status {
        /// Instance handle
        instance: u64,
    },
    /// List all deployed instances
    List,
    /// Credit an account from the faucet
    Fund {
        /// Account name
        account: String,
        /// Amount in wei
        amount: u64,
    },
    /// Show an account balance
    Balance {
        /// Account name
        account: String,
    },
    /// Hash a plaintext answer the way instances store it
    Hash {
        /// Plaintext answer
        text: String,
    },
    /// Show the node event log
    Events,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "quizchain={},quizchain_core={}",
            log_level, log_level
        )))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Get data directory
    let data_dir = cli.data_dir.unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quizchain")
    });

    tokio::fs::create_dir_all(&data_dir).await?;

    let node = QuizNode::new(&data_dir).await?;

    let result = match cli.command {
        Commands::Deploy(cmd) => commands::handle_deploy_command(cmd, &node).await,
        Commands::Init {
            instance,
            from,
            value,
            answer,
            digest,
        } => commands::init_instance(&node, instance, &from, value, answer, digest).await,
        Commands::Guess {
            instance,
            from,
            candidate,
        } => commands::submit_guess(&node, instance, &from, &candidate).await,
        Commands::Send {
            instance,
            from,
            amount,
        } => commands::send_deposit(&node, instance, &from, amount).await,
        Commands::Status { instance } => commands::show_status(&node, instance),
        Commands::List => commands::list_instances(&node),
        Commands::Fund { account, amount } => commands::fund_account(&node, &account, amount).await,
        Commands::Balance { account } => commands::show_balance(&node, &account),
        Commands::Hash { text } => commands::show_hash(&text),
        Commands::Events => commands::show_events(&node),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
