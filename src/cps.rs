use std::{
    collections::VecDeque,
    io,
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use crate::{
    clock::{Clock, SystemClock},
    constants::{CPS_INTERVAL_MS, CPS_WINDOW},
    ticker::PeriodicTask,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionState {
    Idle,
    Running,
}

/// the click window, shared between the ui thread and the sampler.
#[derive(Default)]
struct Window {
    clicks: VecDeque<Instant>,
    /// last sampled rate; `None` outside a session.
    rate: Option<usize>,
}

struct Shared<C> {
    clock: C,
    window: Mutex<Window>,
}

/// measures clicks per second over a trailing one second window.
///
/// while a session runs, a background task prunes the window and publishes
/// its length every sampling interval. the ui thread appends clicks and reads
/// the published rate; both go through the same lock.
pub struct ClickRateEstimator<C = SystemClock> {
    shared: Arc<Shared<C>>,
    interval: Duration,
    sampler: Option<PeriodicTask>,
}

impl ClickRateEstimator<SystemClock> {
    pub fn new(interval: Duration) -> Self {
        Self::with_clock(SystemClock, interval)
    }
}

impl Default for ClickRateEstimator<SystemClock> {
    fn default() -> Self {
        Self::new(Duration::from_millis(CPS_INTERVAL_MS))
    }
}

impl<C> ClickRateEstimator<C>
where
    C: Clock + Send + Sync + 'static,
{
    pub fn with_clock(clock: C, interval: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                clock,
                window: Mutex::new(Window::default()),
            }),
            interval,
            sampler: None,
        }
    }

    pub fn state(&self) -> SessionState {
        match self.sampler {
            Some(_) => SessionState::Running,
            None => SessionState::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == SessionState::Running
    }

    /// begins a session with an empty window. no-op while already running.
    pub fn start_session(&mut self) -> io::Result<()> {
        if self.is_running() {
            return Ok(());
        }

        {
            let mut window = self.shared.lock();
            window.clicks.clear();
            window.rate = Some(0);
        }

        let shared = Arc::clone(&self.shared);
        let sampler = PeriodicTask::spawn("cps-sampler", self.interval, move || {
            shared.sample();
        })?;
        self.sampler = Some(sampler);

        log::info!("cps session started");
        Ok(())
    }

    /// ends the session. no-op while idle.
    ///
    /// the sampler is joined before this returns, so the published rate stays
    /// unavailable until the next session.
    pub fn stop_session(&mut self) {
        let Some(mut sampler) = self.sampler.take() else {
            return;
        };
        sampler.stop();

        let mut window = self.shared.lock();
        window.clicks.clear();
        window.rate = None;

        log::info!("cps session stopped");
    }

    /// counts a pointer press. dropped unless a session is running.
    pub fn record_click(&self) {
        if !self.is_running() {
            return;
        }
        let mut window = self.shared.lock();
        let now = self.shared.clock.now();
        window.clicks.push_back(now);
    }

    /// runs one sampling step now, returning the fresh rate.
    #[allow(dead_code)]
    pub fn sample(&self) -> usize {
        self.shared.sample()
    }

    /// the rate published by the last sampling step.
    pub fn current_cps(&self) -> Option<usize> {
        self.shared.lock().rate
    }

    #[allow(dead_code)]
    pub fn history_len(&self) -> usize {
        self.shared.lock().clicks.len()
    }
}

impl<C> Drop for ClickRateEstimator<C> {
    fn drop(&mut self) {
        if let Some(mut sampler) = self.sampler.take() {
            sampler.stop();
        }
    }
}

impl<C: Clock> Shared<C> {
    fn lock(&self) -> MutexGuard<'_, Window> {
        self.window.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// drops clicks strictly older than the window and publishes the count.
    ///
    /// clicks are appended in arrival order, so pruning from the front is
    /// enough.
    fn sample(&self) -> usize {
        let mut window = self.lock();
        let now = self.clock.now();

        while window
            .clicks
            .front()
            .is_some_and(|t| now.saturating_duration_since(*t) > CPS_WINDOW)
        {
            window.clicks.pop_front();
        }

        let rate = window.clicks.len();
        window.rate = Some(rate);
        rate
    }
}
