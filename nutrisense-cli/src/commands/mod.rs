mod config_cmd;
mod ingredient;
mod pref;
mod profile;
mod recipes;
mod shop;
mod stores;
mod sync_cmd;
mod trend;
mod walk;

pub use config_cmd::ConfigCommand;
pub use ingredient::IngredientCommand;
pub use pref::PrefCommand;
pub use profile::ProfileCommand;
pub use recipes::RecipesCommand;
pub use shop::ShopCommand;
pub use stores::StoresCommand;
pub use sync_cmd::SyncCommand;
pub use trend::TrendCommand;
pub use walk::WalkCommand;

use clap::ValueEnum;
use nutrisense_core::{Engine, GatewayError, HttpGateway, RemoteWrite};

/// The engine every command runs against.
pub type Session = Engine<HttpGateway>;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Converts a 1-based position from the command line to an index.
pub fn index_from(position: usize, what: &str) -> Result<usize, String> {
    position
        .checked_sub(1)
        .ok_or_else(|| format!("{} numbers start at 1", what))
}

/// Prints how a best-effort profile push went.
pub fn report_push(result: &Result<RemoteWrite, GatewayError>) {
    match result {
        Ok(RemoteWrite::Synced) => println!("Synced with server."),
        Ok(RemoteWrite::Skipped) => println!("Saved locally (not signed in)."),
        Err(e) => println!("Saved locally only: {}", e),
    }
}
