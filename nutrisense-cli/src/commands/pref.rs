use clap::{Args, Subcommand};
use nutrisense_core::{Command, Outcome};

use super::{index_from, report_push, Session};

#[derive(Args)]
pub struct PrefCommand {
    #[command(subcommand)]
    pub command: PrefSubcommand,
}

#[derive(Subcommand)]
pub enum PrefSubcommand {
    /// List dietary preferences
    List,

    /// Add a preference (e.g. "nut-free")
    Add { text: String },

    /// Remove a preference by its number in `pref list`
    Remove { number: usize },
}

impl PrefCommand {
    pub async fn run(&self, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            PrefSubcommand::List => {
                let preferences = session.state().preferences();
                if preferences.is_empty() {
                    println!("No preferences set");
                    return Ok(());
                }
                for (i, preference) in preferences.iter().enumerate() {
                    println!("{:3}. {}", i + 1, preference);
                }
                Ok(())
            }

            PrefSubcommand::Add { text } => {
                let outcome = session.dispatch(Command::AddPreference(text.clone())).await?;
                if outcome == Outcome::Unchanged {
                    println!("Preference '{}' already set", text.trim());
                    return Ok(());
                }
                println!("Added preference '{}'", text.trim());
                push(session).await
            }

            PrefSubcommand::Remove { number } => {
                let index = index_from(*number, "Preference")?;
                let Some(removed) = session.state().preferences().get(index).cloned() else {
                    return Err(format!("No preference #{}", number).into());
                };
                session.dispatch(Command::RemovePreference(index)).await?;
                println!("Removed preference '{}'", removed);
                push(session).await
            }
        }
    }
}

// The next startup replaces local preferences with the server's, so send
// the edit now.
async fn push(session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
    if let Outcome::ProfileSaved(result) = session.dispatch(Command::PushProfile).await? {
        report_push(&result);
    }
    Ok(())
}
