use clap::Parser;
use cookbook::{
    cli::{commands, Cli, Commands},
    config::Settings,
    RecipeLibrary, Result,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,cookbook=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let mut settings = Settings::from_env()?;
    if let Some(recipes) = cli.recipes {
        settings.library.recipes_path = recipes;
    }
    settings.validate()?;

    let library = Arc::new(RecipeLibrary::open(&settings)?);
    let report = library.load_all()?;
    if report.failed > 0 {
        warn!("{} recipe files could not be loaded", report.failed);
    }

    match cli.command {
        Commands::Watch => watch(library).await?,
        Commands::Tags { json } => commands::tags(&library, json)?,
        Commands::Search { query, json } => commands::search(&library, &query, json)?,
        Commands::Show { webpath } => commands::show(&library, &webpath)?,
    }

    Ok(())
}

async fn watch(library: Arc<RecipeLibrary>) -> Result<()> {
    let _watcher = library.watch()?;

    info!(
        "Watching {:?} ({} recipes indexed), press Ctrl+C to stop",
        library.recipes_path(),
        library.index().num_docs()
    );

    tokio::signal::ctrl_c().await?;

    info!("Shutting down...");
    Ok(())
}
