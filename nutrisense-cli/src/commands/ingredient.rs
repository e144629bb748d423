use clap::{Args, Subcommand};
use nutrisense_core::{Command, Freshness, IngredientPatch, Outcome};
use std::path::PathBuf;

use super::{index_from, OutputFormat, Session};

#[derive(Args)]
pub struct IngredientCommand {
    #[command(subcommand)]
    pub command: IngredientSubcommand,
}

#[derive(Subcommand)]
pub enum IngredientSubcommand {
    /// List detected ingredients
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Confirm an ingredient by its number in `ingredient list`
    Confirm { number: usize },

    /// Confirm every ingredient
    ConfirmAll,

    /// Remove an ingredient (later numbers shift down)
    Remove { number: usize },

    /// Edit an ingredient; editing also confirms it
    Edit {
        number: usize,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        quantity: Option<f64>,

        #[arg(long)]
        unit: Option<String>,

        /// fresh, aging, expiring or expired
        #[arg(long)]
        freshness: Option<Freshness>,
    },

    /// Scan a fridge photo and replace the ingredient list
    Scan { image: PathBuf },
}

impl IngredientCommand {
    pub async fn run(&self, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            IngredientSubcommand::List { format } => {
                let ingredients = session.state().ingredients();
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(ingredients)?);
                    }
                    OutputFormat::Text => {
                        if ingredients.is_empty() {
                            println!("No ingredients yet. Scan your fridge first!");
                            return Ok(());
                        }
                        for (i, ingredient) in ingredients.iter().enumerate() {
                            let mark = if ingredient.confirmed { "✓" } else { " " };
                            println!("{:3}. [{}] {}", i + 1, mark, ingredient);
                        }
                        println!("\n{} item(s)", ingredients.len());
                    }
                }
                Ok(())
            }

            IngredientSubcommand::Confirm { number } => {
                let index = index_from(*number, "Ingredient")?;
                expect_updated(
                    session.dispatch(Command::ConfirmIngredient(index)).await?,
                    *number,
                )?;
                println!("Confirmed {}", describe(session, index));
                Ok(())
            }

            IngredientSubcommand::ConfirmAll => {
                session.dispatch(Command::ConfirmAll).await?;
                println!(
                    "Confirmed {} ingredient(s)",
                    session.state().ingredients().len()
                );
                Ok(())
            }

            IngredientSubcommand::Remove { number } => {
                let index = index_from(*number, "Ingredient")?;
                let name = describe(session, index);
                expect_updated(
                    session.dispatch(Command::RemoveIngredient(index)).await?,
                    *number,
                )?;
                println!("Removed {}", name);
                Ok(())
            }

            IngredientSubcommand::Edit {
                number,
                name,
                quantity,
                unit,
                freshness,
            } => {
                let index = index_from(*number, "Ingredient")?;
                let patch = IngredientPatch {
                    name: name.clone(),
                    quantity: *quantity,
                    unit: unit.clone(),
                    freshness: *freshness,
                };
                expect_updated(
                    session
                        .dispatch(Command::EditIngredient(index, patch))
                        .await?,
                    *number,
                )?;
                println!("Updated {}", describe(session, index));
                Ok(())
            }

            IngredientSubcommand::Scan { image } => {
                let bytes = std::fs::read(image)
                    .map_err(|e| format!("Failed to read '{}': {}", image.display(), e))?;
                let filename = image
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "fridge.jpg".to_string());

                println!("Scanning {}...", image.display());
                let outcome = session
                    .dispatch(Command::ScanFridge {
                        image: bytes,
                        filename,
                    })
                    .await?;
                if let Outcome::Scanned(count) = outcome {
                    println!("Ingredients detected! ({} item(s))", count);
                    for (i, ingredient) in session.state().ingredients().iter().enumerate() {
                        println!("{:3}. {}", i + 1, ingredient);
                    }
                }
                Ok(())
            }
        }
    }
}

fn expect_updated(outcome: Outcome, number: usize) -> Result<(), String> {
    match outcome {
        Outcome::Unchanged => Err(format!("No ingredient #{}", number)),
        _ => Ok(()),
    }
}

fn describe(session: &Session, index: usize) -> String {
    session
        .state()
        .ingredient(index)
        .map(|i| format!("'{}'", i.name))
        .unwrap_or_else(|| format!("#{}", index + 1))
}
