//! Re-runs profile reconciliation and reports the result.

use clap::Args;
use nutrisense_core::{Command, Outcome, Reconciled};

use super::Session;

/// Reload the profile and preferences from the server
#[derive(Debug, Args)]
pub struct SyncCommand;

impl SyncCommand {
    pub async fn run(&self, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
        println!("Syncing with server...");
        println!();

        if let Outcome::Reconciled(reconciled) = session.dispatch(Command::Reconcile).await? {
            let mark = if reconciled.is_remote() { "✓" } else { "✗" };
            println!("  {} {}", mark, reconciled);
            if let Reconciled::SignedOut = reconciled {
                println!();
                println!("To sign in, add to your config file:");
                println!();
                println!("  remote:");
                println!("    token: \"<your token>\"");
                println!();
                println!("Or set environment variable:");
                println!("  NUTRI_TOKEN");
            }
        }
        Ok(())
    }
}
