use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use nutrisense_core::walking::{SystemClock, TokioTicker};
use nutrisense_core::{
    Engine, FileStorage, HttpGateway, LocalPersistence, StateStore, StaticToken, WalkTracker,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{
    ConfigCommand, IngredientCommand, PrefCommand, ProfileCommand, RecipesCommand, Session,
    ShopCommand, StoresCommand, SyncCommand, TrendCommand, WalkCommand,
};
use config::Config;

#[derive(Parser)]
#[command(name = "nutri")]
#[command(version)]
#[command(about = "Fridge-aware nutrition and walking tracker", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or edit your profile
    Profile(ProfileCommand),

    /// Manage dietary preferences
    Pref(PrefCommand),

    /// Scan, confirm and edit fridge ingredients
    Ingredient(IngredientCommand),

    /// Nutrition recommendations and nearby stores
    Shop(ShopCommand),

    /// Recipe recommendations
    Recipes(RecipesCommand),

    /// List recommended stores
    Stores(StoresCommand),

    /// Walk to a store and track calories
    Walk(WalkCommand),

    /// Walking calorie trend
    Trend(TrendCommand),

    /// Reload profile from the server
    Sync(SyncCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nutrisense_core=warn,nutri=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load(cli.config)?;

    let command = match cli.command {
        Some(Commands::Config(cmd)) => return cmd.run(&config),
        Some(command) => command,
        None => {
            println!("Use --help to see available commands");
            return Ok(());
        }
    };

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let mut session = open_session(&config, &rt)?;

        // `sync` reconciles on its own and reports the result.
        if !matches!(command, Commands::Sync(_)) {
            let reconciled = session.reconcile().await;
            tracing::info!("{}", reconciled);
        }

        execute_command(&command, &mut session).await
    })
}

fn open_session(
    config: &Config,
    rt: &tokio::runtime::Runtime,
) -> Result<Session, Box<dyn std::error::Error>> {
    let storage = FileStorage::new(config.data_dir.value.clone());
    let state = StateStore::open(LocalPersistence::new(storage));

    let gateway = HttpGateway::new(
        config.remote.backend_url.value.clone(),
        Duration::from_secs(config.remote.timeout_secs.value),
    )?;
    let walks = WalkTracker::new(
        Arc::new(SystemClock),
        Arc::new(TokioTicker::new(rt.handle().clone())),
    );

    Ok(Engine::new(
        state,
        gateway,
        StaticToken::new(config.remote.token()),
        walks,
    )
    .with_location(config.location.value))
}

async fn execute_command(
    command: &Commands,
    session: &mut Session,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Profile(cmd) => cmd.run(session).await,
        Commands::Pref(cmd) => cmd.run(session).await,
        Commands::Ingredient(cmd) => cmd.run(session).await,
        Commands::Shop(cmd) => cmd.run(session).await,
        Commands::Recipes(cmd) => cmd.run(session).await,
        Commands::Stores(cmd) => {
            cmd.run(session);
            Ok(())
        }
        Commands::Walk(cmd) => cmd.run(session).await,
        Commands::Trend(cmd) => cmd.run(session).await,
        Commands::Sync(cmd) => cmd.run(session).await,
        // Handled before the session opens
        Commands::Config(_) => Ok(()),
    }
}
