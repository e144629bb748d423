use clap::Args;
use nutrisense_core::{Command, Outcome};

use super::Session;

/// Recommend recipes from the fridge contents and diet type
#[derive(Args)]
pub struct RecipesCommand {
    /// Show the last recommended recipes without asking the server
    #[arg(long)]
    cached: bool,
}

impl RecipesCommand {
    pub async fn run(&self, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
        if !self.cached {
            if let Outcome::NeedsIngredients =
                session.dispatch(Command::RecommendRecipes).await?
            {
                println!("Scan fridge first!");
                return Ok(());
            }
        }

        let recipes = session.state().recipes();
        if recipes.is_empty() {
            println!("No recipes found");
            return Ok(());
        }
        for (i, recipe) in recipes.iter().enumerate() {
            if i > 0 {
                println!();
            }
            println!("{}", recipe);
        }
        Ok(())
    }
}
