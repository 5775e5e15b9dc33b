use anyhow::Result;
use clap::{Parser, Subcommand};
use recap_common::{logger, AppConfig};
use std::path::PathBuf;

/// Find project root by looking for .git directory
fn find_project_root() -> Option<PathBuf> {
    let mut current_dir = std::env::current_dir().ok()?;

    loop {
        if current_dir.join(".git").exists() {
            return Some(current_dir);
        }

        if !current_dir.pop() {
            break;
        }
    }

    None
}

/// Load .env file from project root
fn load_dotenv_from_project_root() {
    match find_project_root().map(|root| root.join(".env")) {
        Some(env_path) if env_path.exists() => {
            dotenv::from_path(&env_path).ok();
        }
        _ => {
            dotenv::dotenv().ok();
        }
    }
}

#[derive(Parser)]
#[command(name = "recap")]
#[command(about = "Recap - summarize documents and YouTube transcripts with an LLM", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long)]
        port: Option<u16>,

        /// Directory for request-scoped upload files
        #[arg(long)]
        upload_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env before reading any configuration
    load_dotenv_from_project_root();

    let mut config = AppConfig::from_env()?;

    if let Some(Commands::Serve {
        host,
        port,
        upload_dir,
    }) = cli.command
    {
        // CLI arguments override the environment
        if let Some(host) = host {
            config.server_host = host;
        }
        if let Some(port) = port {
            config.server_port = port;
        }
        if let Some(dir) = upload_dir {
            config.upload_dir = dir;
        }
        config.validate()?;
        config.ensure_directories()?;
    }

    logger::setup_logging(&config.log_dir, &config.log_level)?;

    tracing::info!("Recap starting...");
    tracing::info!("  Listen: {}", config.server_bind_address());
    tracing::info!("  Model API: {}", config.api_base_url);
    tracing::info!("  Upload dir: {}", config.upload_dir.display());

    println!("Server listening on http://{}", config.server_bind_address());

    recap_server::start_server(config).await?;

    Ok(())
}
