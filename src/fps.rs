use std::{collections::VecDeque, time::Instant};

use crate::{
    clock::{Clock, SystemClock},
    constants::FPS_CAPACITY,
};

/// estimates frames per second over the last [`FPS_CAPACITY`] frames.
///
/// the window is a fixed number of samples rather than a fixed span of time,
/// so memory stays bounded no matter how fast frames arrive.
pub struct FrameRateEstimator<C = SystemClock> {
    clock: C,
    frames: VecDeque<Instant>,
}

impl FrameRateEstimator<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> FrameRateEstimator<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            frames: VecDeque::with_capacity(FPS_CAPACITY),
        }
    }

    /// records one animation frame.
    pub fn tick(&mut self) {
        self.frames.push_back(self.clock.now());
        if self.frames.len() > FPS_CAPACITY {
            self.frames.pop_front();
        }
    }

    /// returns `0.0` until two frames with distinct timestamps exist.
    pub fn current_fps(&self) -> f64 {
        let (Some(first), Some(last)) = (self.frames.front(), self.frames.back()) else {
            return 0.0;
        };

        let span = last.duration_since(*first).as_secs_f64();
        if self.frames.len() < 2 || span <= 0.0 {
            0.0
        } else {
            (self.frames.len() - 1) as f64 / span
        }
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

impl Default for FrameRateEstimator<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}
