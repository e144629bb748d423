use clap::{Args, Subcommand};
use std::fs;
use std::io::Write;

use super::OutputFormat;
use crate::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Initialize configuration file
    Init,
}

const DEFAULT_CONFIG: &str = r#"# nutri configuration

# Directory for local state (default: platform data dir + nutrisense)
# data_dir: ~/.local/share/nutrisense

remote:
  backend_url: http://localhost:8000
  # Bearer token; leave unset to work offline
  # token: ""
  timeout_secs: 10

# Where store distances are measured from
location:
  lat: 40.7128
  lng: -74.0060
"#;

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        println!("data_dir: {}", config.data_dir.value.display());
                        println!("  source: {}", config.data_dir.source);
                        println!();

                        let remote = &config.remote;
                        println!("remote.backend_url: {}", remote.backend_url.value);
                        println!("  source: {}", remote.backend_url.source);
                        match &remote.token {
                            Some(token) => {
                                println!("remote.token: ****");
                                println!("  source: {}", token.source);
                            }
                            None => println!("remote.token: (not set, offline)"),
                        }
                        println!("remote.timeout_secs: {}", remote.timeout_secs.value);
                        println!("  source: {}", remote.timeout_secs.source);
                        println!();

                        println!(
                            "location: {}, {}",
                            config.location.value.lat, config.location.value.lng
                        );
                        println!("  source: {}", config.location.source);
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Init => {
                let config_path = Config::default_config_path();

                if config_path.exists() {
                    println!("Config file already exists: {}", config_path.display());
                    println!("Use 'nutri config show' to view current configuration.");
                    return Ok(());
                }

                if let Some(parent) = config_path.parent() {
                    fs::create_dir_all(parent)?;
                }

                let mut file = fs::File::create(&config_path)?;
                file.write_all(DEFAULT_CONFIG.as_bytes())?;

                println!("Created config file: {}", config_path.display());
                println!("\nEdit this file to customize your settings.");
                Ok(())
            }
        }
    }
}
