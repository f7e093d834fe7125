use std::{
    io,
    sync::mpsc::{self, RecvTimeoutError, Sender},
    thread::{self, JoinHandle},
    time::Duration,
};

/// a background thread that runs a step at a fixed cadence until stopped.
///
/// stopping wakes the thread through a channel rather than waiting out the
/// current sleep, then joins it: once [`PeriodicTask::stop`] returns, the step
/// will not run again.
pub struct PeriodicTask {
    name: String,
    cancel: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    /// runs `step` right away, then every `interval`.
    pub fn spawn<F>(name: &str, interval: Duration, step: F) -> io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        Self::start(name, interval, false, step)
    }

    /// like [`PeriodicTask::spawn`], but the first step waits one interval.
    pub fn spawn_after<F>(name: &str, interval: Duration, step: F) -> io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        Self::start(name, interval, true, step)
    }

    fn start<F>(name: &str, interval: Duration, mut wait_first: bool, mut step: F) -> io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let (cancel, cancelled) = mpsc::channel::<()>();

        let handle = thread::Builder::new().name(name.to_string()).spawn(move || loop {
            if !std::mem::take(&mut wait_first) {
                step();
            }
            match cancelled.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                // either an explicit stop, or the owner went away.
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        })?;

        log::debug!("started periodic task {name} every {interval:?}");
        Ok(Self {
            name: name.to_string(),
            cancel: Some(cancel),
            handle: Some(handle),
        })
    }

    pub fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("periodic task {} panicked", self.name);
            } else {
                log::debug!("stopped periodic task {}", self.name);
            }
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.stop();
    }
}
