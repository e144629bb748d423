//! Live walking session: ticks until the user presses Enter.

use clap::Args;
use nutrisense_core::{Command, GatewayError, LiveWalk, Outcome, RemoteWrite};
use std::future::Future;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use super::{index_from, Session};

/// Walk to a store and track the calories burned
#[derive(Args)]
pub struct WalkCommand {
    /// Store number from `nutri stores`
    store: usize,
}

impl WalkCommand {
    pub async fn run(&self, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
        let index = index_from(self.store, "Store")?;
        let Some(store) = session.state().store(index).cloned() else {
            return Err(format!("No store #{}. Run `nutri shop` to find stores.", self.store).into());
        };

        session.dispatch(Command::StartWalking(index)).await?;
        let mut live = session
            .walks()
            .subscribe(index)
            .ok_or("Walking session did not start")?;

        println!(
            "Walking to {} ({} km round trip). Press Enter to stop.",
            store.name,
            store.round_trip_km()
        );

        let mut stdin = BufReader::new(tokio::io::stdin()).lines();
        let stop = async {
            tokio::select! {
                _ = stdin.next_line() => {}
                _ = tokio::signal::ctrl_c() => {}
            }
        };
        follow(&mut live, stop, |walk| {
            print!("\r  {}   ", walk);
            io::stdout().flush()
        })
        .await?;
        println!();

        if let Outcome::WalkStopped(stopped) =
            session.dispatch(Command::StopWalking(index)).await?
        {
            println!("{}", stopped.summary);
            match stopped.logged {
                Ok(RemoteWrite::Synced) => println!("Walk logged!"),
                Ok(RemoteWrite::Skipped) => println!("Not signed in; walk not logged."),
                Err(GatewayError::AuthMissing) => println!("Please log in to log walks."),
                Err(e) => println!("Failed to log walk: {}", e),
            }
        }
        Ok(())
    }
}

/// Shows live updates until `stop` resolves or the walk ends.
async fn follow<F>(
    live: &mut watch::Receiver<LiveWalk>,
    stop: F,
    mut show: impl FnMut(&LiveWalk) -> io::Result<()>,
) -> io::Result<()>
where
    F: Future,
{
    tokio::pin!(stop);
    loop {
        tokio::select! {
            changed = live.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let walk = *live.borrow_and_update();
                show(&walk)?;
            }
            _ = &mut stop => return Ok(()),
        }
    }
}
