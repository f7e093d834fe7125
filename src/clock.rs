use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

/// a source of monotonic time.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// a clock that only moves when told to.
///
/// clones share the same time, so a test can hand one copy to an estimator
/// (and its sampling thread) and advance another.
#[derive(Clone, Debug)]
#[allow(dead_code, reason = "this is a testing utility.")]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

#[allow(dead_code, reason = "this is a testing utility.")]
impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
