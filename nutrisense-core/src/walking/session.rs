//! Walking session state machine.
//!
//! Each store index has at most one session. A session is idle until
//! [`WalkTracker::start`], then running with a one-second tick that publishes
//! live elapsed time and calories, then idle again after [`WalkTracker::stop`],
//! which cancels the tick and produces a [`WalkSummary`] ready to be logged.
//!
//! Sessions for different store indices are fully independent. Starting a
//! running session and stopping an idle one are both ignored.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use super::ticker::{Clock, TickHandle, Ticker};
use crate::metrics::{
    calorie_rate_per_second, calories_burned, estimate_steps, format_elapsed, WALKING_MET,
};
use crate::models::{Profile, Store, WalkLogEntry};

/// Interval between live updates.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Live view of a session, refreshed on every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveWalk {
    pub store_index: usize,
    pub running: bool,
    pub elapsed_ms: u64,
    pub calories: f64,
}

impl LiveWalk {
    fn started(store_index: usize) -> Self {
        Self {
            store_index,
            running: true,
            elapsed_ms: 0,
            calories: 0.0,
        }
    }

    pub fn elapsed_display(&self) -> String {
        format_elapsed(self.elapsed_ms)
    }
}

impl fmt::Display for LiveWalk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {:.1} kcal", self.elapsed_display(), self.calories)
    }
}

/// One store's walking session.
#[derive(Debug)]
pub struct WalkSession {
    pub running: bool,
    /// Epoch milliseconds
    pub start_ts: i64,
    pub met: f64,
    pub weight_kg: f64,
    tick: Option<TickHandle>,
    live: Arc<watch::Sender<LiveWalk>>,
}

/// Result of stopping a session.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkSummary {
    pub store_index: usize,
    pub elapsed_ms: u64,
    pub entry: WalkLogEntry,
}

impl WalkSummary {
    pub fn calories(&self) -> u64 {
        self.entry.calories
    }

    pub fn steps(&self) -> u64 {
        self.entry.steps
    }
}

impl fmt::Display for WalkSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Walk to {} complete", self.entry.store_name)?;
        writeln!(f, "  Time:     {}", format_elapsed(self.elapsed_ms))?;
        writeln!(f, "  Distance: {} km (round trip)", self.entry.distance_km)?;
        writeln!(f, "  Steps:    {}", self.entry.steps)?;
        write!(f, "  Calories: {} kcal", self.entry.calories)
    }
}

/// Owns every walking session and their tick tasks.
pub struct WalkTracker {
    sessions: HashMap<usize, WalkSession>,
    clock: Arc<dyn Clock>,
    ticker: Arc<dyn Ticker>,
    tick_interval: Duration,
}

impl WalkTracker {
    pub fn new(clock: Arc<dyn Clock>, ticker: Arc<dyn Ticker>) -> Self {
        Self {
            sessions: HashMap::new(),
            clock,
            ticker,
            tick_interval: TICK_INTERVAL,
        }
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn is_running(&self, store_index: usize) -> bool {
        self.sessions
            .get(&store_index)
            .is_some_and(|session| session.running)
    }

    pub fn running(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .sessions
            .iter()
            .filter(|(_, session)| session.running)
            .map(|(index, _)| *index)
            .collect();
        indices.sort_unstable();
        indices
    }

    pub fn session(&self, store_index: usize) -> Option<&WalkSession> {
        self.sessions.get(&store_index)
    }

    /// Receiver for live updates of a session, whether running or finished.
    pub fn subscribe(&self, store_index: usize) -> Option<watch::Receiver<LiveWalk>> {
        self.sessions
            .get(&store_index)
            .map(|session| session.live.subscribe())
    }

    /// Starts a session for `store_index`. Returns false if one is already
    /// running there.
    pub fn start(&mut self, store_index: usize, profile: &Profile) -> bool {
        if self.is_running(store_index) {
            tracing::debug!("Walk to store {} already running", store_index);
            return false;
        }

        let start_ts = self.clock.now_ms();
        let weight_kg = profile.effective_weight_kg();
        let met = WALKING_MET;
        let rate = calorie_rate_per_second(met, weight_kg);

        let (live, _) = watch::channel(LiveWalk::started(store_index));
        let live = Arc::new(live);

        let tick = {
            let clock = Arc::clone(&self.clock);
            let live = Arc::clone(&live);
            let mut last = LiveWalk::started(store_index);
            Box::new(move || {
                let elapsed_ms = (clock.now_ms() - start_ts).max(0) as u64;
                // Never let a clock step backwards show as lost progress.
                let elapsed_ms = elapsed_ms.max(last.elapsed_ms);
                last = LiveWalk {
                    store_index,
                    running: true,
                    elapsed_ms,
                    calories: rate * elapsed_ms as f64 / 1000.0,
                };
                // A tick racing with stop must not overwrite the final snapshot.
                live.send_if_modified(|current| {
                    if !current.running {
                        return false;
                    }
                    *current = last;
                    true
                });
            })
        };
        let handle = self.ticker.every(self.tick_interval, tick);

        tracing::info!(
            "Started walk to store {} (weight {} kg, MET {})",
            store_index,
            weight_kg,
            met
        );

        self.sessions.insert(
            store_index,
            WalkSession {
                running: true,
                start_ts,
                met,
                weight_kg,
                tick: Some(handle),
                live,
            },
        );
        true
    }

    /// Stops the session for `store_index` and summarizes it. Returns `None`
    /// if nothing is running there.
    ///
    /// The store is looked up by the same index at stop time; if the store
    /// list no longer has it, a zero-distance placeholder is used.
    pub fn stop(
        &mut self,
        store_index: usize,
        profile: &Profile,
        stores: &[Store],
    ) -> Option<WalkSummary> {
        let end_ts = self.clock.now_ms();
        let session = self
            .sessions
            .get_mut(&store_index)
            .filter(|session| session.running)?;

        if let Some(tick) = session.tick.take() {
            tick.cancel();
        }
        session.running = false;

        let elapsed_ms = (end_ts - session.start_ts).max(0) as u64;
        let calories = calories_burned(session.met, session.weight_kg, elapsed_ms / 1000);

        session.live.send_replace(LiveWalk {
            store_index,
            running: false,
            elapsed_ms,
            calories: calories as f64,
        });

        let store = stores.get(store_index).cloned().unwrap_or_else(|| {
            tracing::warn!(
                "Store {} no longer listed; logging walk against placeholder",
                store_index
            );
            Store::placeholder()
        });
        let round_trip_km = store.round_trip_km();

        let summary = WalkSummary {
            store_index,
            elapsed_ms,
            entry: WalkLogEntry {
                start_ts: session.start_ts,
                end_ts,
                calories,
                store_name: store.name,
                distance_km: round_trip_km,
                steps: estimate_steps(round_trip_km, profile.gender),
            },
        };

        tracing::info!(
            "Stopped walk to store {}: {} kcal in {}",
            store_index,
            summary.entry.calories,
            format_elapsed(elapsed_ms)
        );

        Some(summary)
    }

    /// Stops every running session, e.g. when the host shuts down.
    pub fn stop_all(&mut self, profile: &Profile, stores: &[Store]) -> Vec<WalkSummary> {
        self.running()
            .into_iter()
            .filter_map(|index| self.stop(index, profile, stores))
            .collect()
    }
}

impl fmt::Debug for WalkTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalkTracker")
            .field("sessions", &self.sessions)
            .field("tick_interval", &self.tick_interval)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;
    use crate::walking::{ManualClock, ManualTicker};

    struct Harness {
        clock: ManualClock,
        ticker: ManualTicker,
        tracker: WalkTracker,
    }

    fn harness() -> Harness {
        let clock = ManualClock::new(1_700_000_000_000);
        let ticker = ManualTicker::new();
        let tracker = WalkTracker::new(Arc::new(clock.clone()), Arc::new(ticker.clone()));
        Harness {
            clock,
            ticker,
            tracker,
        }
    }

    fn male_70() -> Profile {
        Profile::default()
            .with_gender(Gender::Male)
            .with_weight_kg(70.0)
    }

    fn stores() -> Vec<Store> {
        vec![Store::new("Corner Mart", 1.0, 12.0), Store::new("Fresh Co", 0.5, 20.0)]
    }

    #[test]
    fn test_hour_long_walk_summary() {
        let mut h = harness();
        assert!(h.tracker.start(0, &male_70()));

        h.clock.advance(Duration::from_secs(3600));
        let summary = h.tracker.stop(0, &male_70(), &stores()).unwrap();

        assert_eq!(summary.calories(), 245);
        assert_eq!(summary.steps(), 2564);
        assert_eq!(summary.entry.distance_km, 2.0);
        assert_eq!(summary.entry.store_name, "Corner Mart");
        assert_eq!(summary.entry.end_ts - summary.entry.start_ts, 3_600_000);
        assert_eq!(summary.elapsed_ms, 3_600_000);
    }

    #[test]
    fn test_start_twice_is_ignored() {
        let mut h = harness();
        assert!(h.tracker.start(0, &male_70()));
        let start_ts = h.tracker.session(0).unwrap().start_ts;

        h.clock.advance(Duration::from_secs(30));
        assert!(!h.tracker.start(0, &male_70()));

        assert_eq!(h.ticker.active(), 1);
        assert_eq!(h.tracker.session(0).unwrap().start_ts, start_ts);
    }

    #[test]
    fn test_stop_without_start_is_noop() {
        let mut h = harness();
        assert!(h.tracker.stop(3, &male_70(), &stores()).is_none());
        assert!(h.tracker.session(3).is_none());
    }

    #[test]
    fn test_stop_twice_yields_one_summary() {
        let mut h = harness();
        h.tracker.start(1, &male_70());
        h.clock.advance(Duration::from_secs(60));

        assert!(h.tracker.stop(1, &male_70(), &stores()).is_some());
        assert!(h.tracker.stop(1, &male_70(), &stores()).is_none());
        assert!(!h.tracker.is_running(1));
        assert!(h.tracker.session(1).is_some());
    }

    #[test]
    fn test_ticks_publish_monotonic_live_metrics() {
        let mut h = harness();
        h.tracker.start(0, &male_70());
        let rx = h.tracker.subscribe(0).unwrap();

        let mut previous = 0.0;
        for _ in 0..5 {
            h.clock.advance(Duration::from_secs(1));
            h.ticker.fire();
            let live = *rx.borrow();
            assert!(live.running);
            assert!(live.calories > previous);
            previous = live.calories;
        }

        let live = *rx.borrow();
        assert_eq!(live.elapsed_ms, 5_000);
        assert!((live.calories - 3.5 * 70.0 / 3600.0 * 5.0).abs() < 1e-9);
        assert_eq!(live.elapsed_display(), "00:05");

        // A clock stepping backwards does not undo progress.
        h.clock.set(h.clock.now_ms() - 3_000);
        h.ticker.fire();
        assert_eq!(rx.borrow().elapsed_ms, 5_000);
    }

    #[test]
    fn test_stop_cancels_tick() {
        let mut h = harness();
        h.tracker.start(0, &male_70());
        let rx = h.tracker.subscribe(0).unwrap();

        h.clock.advance(Duration::from_secs(10));
        h.tracker.stop(0, &male_70(), &stores());
        assert_eq!(h.ticker.active(), 0);

        let after_stop = *rx.borrow();
        assert!(!after_stop.running);

        h.clock.advance(Duration::from_secs(10));
        h.ticker.fire();
        assert_eq!(*rx.borrow(), after_stop);
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut h = harness();
        h.tracker.start(0, &male_70());
        h.clock.advance(Duration::from_secs(600));
        h.tracker.start(1, &male_70());
        assert_eq!(h.tracker.running(), vec![0, 1]);
        assert_eq!(h.ticker.active(), 2);

        h.clock.advance(Duration::from_secs(600));
        let second = h.tracker.stop(1, &male_70(), &stores()).unwrap();
        assert_eq!(second.elapsed_ms, 600_000);
        assert_eq!(second.entry.store_name, "Fresh Co");
        assert!(h.tracker.is_running(0));
        assert_eq!(h.ticker.active(), 1);

        let first = h.tracker.stop(0, &male_70(), &stores()).unwrap();
        assert_eq!(first.elapsed_ms, 1_200_000);
    }

    #[test]
    fn test_missing_store_uses_placeholder() {
        let mut h = harness();
        h.tracker.start(5, &male_70());
        h.clock.advance(Duration::from_secs(120));

        let summary = h.tracker.stop(5, &male_70(), &stores()).unwrap();
        assert_eq!(summary.entry.store_name, "Store");
        assert_eq!(summary.entry.distance_km, 0.0);
        assert_eq!(summary.steps(), 0);
    }

    #[test]
    fn test_weight_defaults_and_is_fixed_at_start() {
        let mut h = harness();
        h.tracker.start(0, &Profile::default());
        assert_eq!(h.tracker.session(0).unwrap().weight_kg, 70.0);
        assert_eq!(h.tracker.session(0).unwrap().met, 3.5);

        h.clock.advance(Duration::from_secs(3600));
        let heavier = Profile::default().with_weight_kg(140.0);
        let summary = h.tracker.stop(0, &heavier, &stores()).unwrap();
        assert_eq!(summary.calories(), 245);
    }

    #[test]
    fn test_partial_seconds_are_floored() {
        let mut h = harness();
        h.tracker.start(0, &male_70());
        // 1 h minus half a second counts as 3599 s.
        h.clock.advance(Duration::from_millis(3_599_500));
        let summary = h.tracker.stop(0, &male_70(), &stores()).unwrap();
        assert_eq!(summary.calories(), (3.5_f64 * 70.0 * 3599.0 / 3600.0).round() as u64);
    }

    #[test]
    fn test_restart_after_stop() {
        let mut h = harness();
        h.tracker.start(0, &male_70());
        h.clock.advance(Duration::from_secs(60));
        h.tracker.stop(0, &male_70(), &stores());

        assert!(h.tracker.start(0, &male_70()));
        assert!(h.tracker.is_running(0));
        assert_eq!(h.ticker.active(), 1);
    }

    #[test]
    fn test_stop_all() {
        let mut h = harness();
        h.tracker.start(0, &male_70());
        h.tracker.start(1, &male_70());
        h.clock.advance(Duration::from_secs(5));

        let summaries = h.tracker.stop_all(&male_70(), &stores());
        assert_eq!(summaries.len(), 2);
        assert!(h.tracker.running().is_empty());
    }

    #[test]
    fn test_summary_display() {
        let mut h = harness();
        h.tracker.start(0, &male_70());
        h.clock.advance(Duration::from_secs(125));
        let summary = h.tracker.stop(0, &male_70(), &stores()).unwrap();

        let output = format!("{}", summary);
        assert!(output.contains("Walk to Corner Mart complete"));
        assert!(output.contains("Time:     02:05"));
        assert!(output.contains("Steps:    2564"));
    }
}
