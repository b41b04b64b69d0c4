use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use boodai::auth::hash_password;
use boodai::config::{resolve_pool_max_connections, Config};
use boodai::server::{seed_admin, start_server};
use boodai::BoodaiDb;

#[derive(Parser)]
#[command(name = "boodai")]
#[command(about = "Booday Pizza storefront and admin API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to config file (default: .boodai/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply the schema, seed the admin account and serve HTTP (default)
    Serve,

    /// Apply the schema and seed the admin account, then exit
    InitDb,

    /// Print a bcrypt hash for the given password
    HashPassword {
        /// Plain-text password
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let config = Config::load(cli.config)
                .await
                .context("Failed to load configuration")?;
            start_server(config).await.context("Server failed")?;
        }

        Commands::InitDb => {
            let config = Config::load(cli.config)
                .await
                .context("Failed to load configuration")?;
            let db = BoodaiDb::new(&config.database_url, resolve_pool_max_connections()).await?;
            db.initialize_schema().await?;
            let seeded = seed_admin(&db, &config.admin).await?;
            info!(seeded, "Database initialized");
            println!("✅ Database initialized");
        }

        Commands::HashPassword { password } => {
            println!("{}", hash_password(&password).await?);
        }
    }

    Ok(())
}
