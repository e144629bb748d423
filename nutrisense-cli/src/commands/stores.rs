use clap::Args;

use super::shop::print_stores;
use super::Session;

/// List the stores from the last recommendation
#[derive(Args)]
pub struct StoresCommand;

impl StoresCommand {
    pub fn run(&self, session: &Session) {
        print_stores(session);
    }
}
