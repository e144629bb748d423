use clap::{Args, Subcommand};
use nutrisense_core::{Command, Gender, Outcome, Profile};

use super::{report_push, OutputFormat, Session};

#[derive(Args)]
pub struct ProfileCommand {
    #[command(subcommand)]
    pub command: ProfileSubcommand,
}

#[derive(Subcommand)]
pub enum ProfileSubcommand {
    /// Show the current profile
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Update profile fields (others are kept)
    Set {
        #[arg(long)]
        age: Option<u32>,

        /// male, female or unspecified
        #[arg(long)]
        gender: Option<Gender>,

        /// Weight in kg
        #[arg(long)]
        weight: Option<f64>,

        /// Height in cm
        #[arg(long)]
        height: Option<f64>,

        /// Health goal (e.g. lose, maintain, gain)
        #[arg(long)]
        goal: Option<String>,

        /// Diet type (e.g. balanced, keto, vegan)
        #[arg(long)]
        diet: Option<String>,
    },
}

impl ProfileCommand {
    pub async fn run(&self, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ProfileSubcommand::Show { format } => {
                let profile = session.state().profile();
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(profile)?);
                    }
                    OutputFormat::Text => {
                        println!("{}", profile);
                        let preferences = session.state().preferences();
                        if !preferences.is_empty() {
                            println!("Preferences: {}", preferences.join(", "));
                        }
                    }
                }
                Ok(())
            }

            ProfileSubcommand::Set {
                age,
                gender,
                weight,
                height,
                goal,
                diet,
            } => {
                let mut profile: Profile = session.state().profile().clone();
                if let Some(age) = age {
                    profile.age = Some(*age);
                }
                if let Some(gender) = gender {
                    profile.gender = *gender;
                }
                if let Some(weight) = weight {
                    if !weight.is_finite() || *weight <= 0.0 {
                        return Err(format!("Invalid weight: {}", weight).into());
                    }
                    profile.weight_kg = Some(*weight);
                }
                if let Some(height) = height {
                    profile.height_cm = Some(*height);
                }
                if let Some(goal) = goal {
                    profile.goal = goal.trim().to_string();
                }
                if let Some(diet) = diet {
                    profile.diet_type = diet.trim().to_string();
                }

                if let Outcome::ProfileSaved(result) =
                    session.dispatch(Command::SaveProfile(profile)).await?
                {
                    println!("Profile saved!");
                    report_push(&result);
                }
                println!();
                println!("{}", session.state().profile());
                Ok(())
            }
        }
    }
}
