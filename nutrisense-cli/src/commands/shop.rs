use clap::Args;
use nutrisense_core::{Command, Outcome};

use super::Session;

/// Analyze the fridge for nutrition gaps and find stores for the shopping list
#[derive(Args)]
pub struct ShopCommand;

impl ShopCommand {
    pub async fn run(&self, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
        let analysis = match session.dispatch(Command::Analyze).await? {
            Outcome::Analyzed(analysis) => analysis,
            _ => {
                println!("Scan fridge first!");
                return Ok(());
            }
        };

        let state = session.state();
        println!("Recommendations");
        println!("===============");
        if analysis.suggestions == 0 {
            println!("Your fridge looks balanced.");
        }
        for suggestion in state.suggestions() {
            println!("{}", suggestion);
        }
        println!();

        match analysis.stores {
            None => println!("No shopping items needed right now."),
            Some(Err(e)) => println!("Could not load stores: {}", e),
            Some(Ok(_)) => {
                println!("Shopping list: {}", state.shopping_list().join(", "));
                println!();
                print_stores(session);
            }
        }
        Ok(())
    }
}

pub(super) fn print_stores(session: &Session) {
    let stores = session.state().stores();
    if stores.is_empty() {
        println!("No stores found");
        return;
    }
    let weight_kg = session.state().profile().effective_weight_kg();
    println!("Nearby stores");
    println!("-------------");
    for (i, store) in stores.iter().enumerate() {
        let walking = if session.walks().is_running(i) {
            " (walking)"
        } else {
            ""
        };
        println!(
            "{:3}. {} - ~{} kcal round trip{}",
            i + 1,
            store,
            store.estimated_calories(weight_kg),
            walking
        );
    }
    println!("\nStart a walk with `nutri walk <number>`.");
}
