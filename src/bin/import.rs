use anyhow::{Context, Result};
use clap::Parser;

use collision_backend::config::Config;
use collision_backend::db::{self, PgBuildingStore};
use collision_backend::importer::{self, IngestionReport};

#[derive(Parser, Debug)]
#[command(name = "import")]
#[command(about = "Import building footprints from a <WKT>,<height> text file", long_about = None)]
struct Args {
    /// Path to the building file (one MULTIPOLYGON WKT and height per line)
    #[arg(short, long)]
    input: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = Config::load();

    tracing::info!("Starting import process");
    tracing::info!("Input file: {}", args.input);

    tracing::info!("Connecting to database {}...", config.db);
    let pool = db::create_pool(&config.db, &config.pool)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Database connection established");

    let store = PgBuildingStore::new(pool);

    match importer::ingest_file(&store, &args.input).await {
        IngestionReport::Completed(summary) => {
            println!(
                "inserted {} / {} lines ({} failed, {:.1}% success)",
                summary.success_count,
                summary.total_count,
                summary.error_count,
                summary.success_rate
            );
            Ok(())
        }
        IngestionReport::Failed { message } => {
            anyhow::bail!("Import of {} failed: {}", args.input, message)
        }
    }
}
