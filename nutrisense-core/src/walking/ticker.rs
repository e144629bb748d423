//! Host-supplied time sources for walking sessions.
//!
//! A session needs two things from its host: the current time and a way to
//! run a callback every N milliseconds until told to stop. [`SystemClock`] and
//! [`TokioTicker`] are the production implementations; [`ManualClock`] and
//! [`ManualTicker`] let tests (or a simulator) drive time by hand.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::runtime::Handle;
use tokio::time::{self, MissedTickBehavior};

pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Arc<AtomicI64>);

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self(Arc::new(AtomicI64::new(start_ms)))
    }

    pub fn set(&self, ms: i64) {
        self.0.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.0.fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

pub type TickFn = Box<dyn FnMut() + Send + 'static>;

/// Runs a callback periodically until the returned handle is cancelled.
pub trait Ticker: Send + Sync {
    fn every(&self, period: Duration, tick: TickFn) -> TickHandle;
}

/// Cancels its periodic task when cancelled or dropped.
pub struct TickHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TickHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for TickHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickHandle")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// [`Ticker`] backed by a tokio interval task per registration.
#[derive(Debug, Clone)]
pub struct TokioTicker {
    handle: Handle,
}

impl TokioTicker {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Uses the runtime the caller is running on, if any.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl Ticker for TokioTicker {
    fn every(&self, period: Duration, mut tick: TickFn) -> TickHandle {
        let task = self.handle.spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; ticks start one period in.
            interval.tick().await;
            loop {
                interval.tick().await;
                tick();
            }
        });

        TickHandle::new(move || task.abort())
    }
}

/// [`Ticker`] that only fires when [`ManualTicker::fire`] is called.
#[derive(Clone, Default)]
pub struct ManualTicker {
    slots: Arc<Mutex<Vec<Option<TickFn>>>>,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every registered, uncancelled callback once.
    pub fn fire(&self) {
        if let Ok(mut slots) = self.slots.lock() {
            for tick in slots.iter_mut().flatten() {
                tick();
            }
        }
    }

    pub fn active(&self) -> usize {
        self.slots
            .lock()
            .map(|slots| slots.iter().filter(|s| s.is_some()).count())
            .unwrap_or(0)
    }
}

impl Ticker for ManualTicker {
    fn every(&self, _period: Duration, tick: TickFn) -> TickHandle {
        let index = match self.slots.lock() {
            Ok(mut slots) => {
                slots.push(Some(tick));
                slots.len() - 1
            }
            Err(_) => return TickHandle::new(|| {}),
        };

        let slots = Arc::clone(&self.slots);
        TickHandle::new(move || {
            if let Ok(mut slots) = slots.lock() {
                slots[index] = None;
            }
        })
    }
}

impl std::fmt::Debug for ManualTicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualTicker")
            .field("active", &self.active())
            .finish()
    }
}
