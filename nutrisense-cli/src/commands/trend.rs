use clap::Args;
use nutrisense_core::{Command, Outcome, DEFAULT_TREND_DAYS};

use super::{OutputFormat, Session};

/// Show calories burned walking per day
#[derive(Args)]
pub struct TrendCommand {
    /// Number of days to show
    #[arg(long, short, default_value_t = DEFAULT_TREND_DAYS)]
    days: u32,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl TrendCommand {
    pub async fn run(&self, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
        let outcome = session
            .dispatch(Command::WalkTrend { days: self.days })
            .await?;
        let Outcome::Trend(trend) = outcome else {
            return Ok(());
        };
        let Some(series) = trend else {
            println!("Sign in to see your walking trend.");
            return Ok(());
        };

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&series)?),
            OutputFormat::Text => {
                if series.is_empty() {
                    println!("No walks logged in the last {} day(s)", self.days);
                    return Ok(());
                }
                let max = series.iter().map(|p| p.calories).fold(0.0, f64::max);
                for point in &series {
                    println!(
                        "{:<12} {:>6.0} kcal {}",
                        point.date,
                        point.calories,
                        bar(point.calories, max)
                    );
                }
                let total: f64 = series.iter().map(|p| p.calories).sum();
                println!("\nTotal: {:.0} kcal", total);
            }
        }
        Ok(())
    }
}

const BAR_WIDTH: f64 = 30.0;

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || !value.is_finite() || value <= 0.0 {
        return String::new();
    }
    "#".repeat(((value / max) * BAR_WIDTH).round() as usize)
}
