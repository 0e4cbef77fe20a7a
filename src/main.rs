use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use docvault::api::server::serve;
use docvault::api::types::{generate_token, hash_token, ApiContext};
use docvault::audit::TracingAudit;
use docvault::config;
use docvault::db::{open_database, repository};
use docvault::pipeline::extraction::default_engine;

#[derive(Parser)]
#[command(name = config::APP_NAME, version = config::APP_VERSION, about)]
struct Cli {
    /// Data directory (defaults to ~/.docvault, or $DOCVAULT_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
    /// Create an account and print its bearer token
    CreateUser { username: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    docvault::init_tracing();

    let cli = Cli::parse();
    let data_dir = cli.data_dir.unwrap_or_else(config::app_data_dir);
    std::fs::create_dir_all(&data_dir)?;
    let db_path = config::database_path(&data_dir);

    match cli.command {
        Command::Serve { host, port } => {
            // Fail fast on an unopenable store before accepting traffic
            open_database(&db_path)?;

            let ctx = ApiContext::new(
                db_path,
                Arc::new(default_engine()),
                Arc::new(TracingAudit),
            );
            serve(ctx, SocketAddr::new(host, port)).await?;
        }
        Command::CreateUser { username } => {
            let conn = open_database(&db_path)?;
            let token = generate_token();
            let user = repository::create_user(&conn, &username, &hash_token(&token))?;
            println!("user: {} ({})", user.username, user.id);
            println!("token: {token}");
        }
    }

    Ok(())
}
