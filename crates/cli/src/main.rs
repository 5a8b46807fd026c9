use anyhow::Result;
use clap::{Parser, Subcommand};
use pixelpost_core::{EmailStatus, DEFAULT_LIST_LIMIT};
use pixelpost_storage::StorageBackend;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "pixelpost")]
#[command(about = "Queued email delivery with open tracking", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API, the tracking endpoint and the delivery worker
    Serve {
        #[arg(short, long, default_value = "8080")]
        port: u16,
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Queue one message for delivery
    Enqueue {
        #[arg(long)]
        to: String,
        #[arg(short, long)]
        subject: String,
        /// HTML body; the tracking pixel is appended automatically
        #[arg(short, long)]
        body: String,
    },
    /// Print one message as JSON
    Show { id: i64 },
    /// List messages, newest first
    List {
        #[arg(short, long)]
        status: Option<EmailStatus>,
        #[arg(short, long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: usize,
    },
    /// Per-status message counts
    Stats,
    /// Create or upgrade the PostgreSQL schema
    Migrate,
}

fn get_database_url() -> Result<String> {
    std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable must be set"))
}

async fn open_storage() -> Result<StorageBackend> {
    Ok(StorageBackend::new_postgres(&get_database_url()?).await?)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, host } => commands::serve::run(port, host).await?,
        Commands::Enqueue { to, subject, body } => {
            commands::queue::enqueue(&to, &subject, &body).await?;
        },
        Commands::Show { id } => commands::queue::show(id).await?,
        Commands::List { status, limit } => commands::queue::list(status, limit).await?,
        Commands::Stats => commands::queue::stats().await?,
        Commands::Migrate => commands::migrate::run().await?,
    }

    Ok(())
}
