mod load_ingredients;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "larder")]
#[command(about = "Larder admin CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bulk-load ingredients from a two-column CSV (name, measurement unit)
    LoadIngredients {
        /// Server URL (default: http://localhost:3000)
        #[arg(long, default_value = "http://localhost:3000")]
        server: String,
        /// Bearer token of an authenticated user
        #[arg(long)]
        token: String,
        /// Path to the CSV file
        #[arg(long)]
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::LoadIngredients {
            server,
            token,
            path,
        } => {
            load_ingredients::load_ingredients(&server, &token, &path).await?;
        }
    }

    Ok(())
}
