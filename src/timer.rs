// SPDX-License-Identifier: GPL-3.0-only
//! Debounced auto-dismiss timers
//!
//! Runs a small tokio runtime on a dedicated thread. Each [`TimerKind`] has at
//! most one armed timer: arming again cancels the previous one first, so a
//! burst of interactions yields a single fire timed from the last one.
//!
//! When a timer fires, the fire callback runs on the timer thread and the loop
//! waits for it to finish before handling further commands. The callback is
//! expected to marshal its work onto the render thread and wait for it, so at
//! most one hand-off is in flight at a time.

use crate::constants::TIMER_THREAD_NAME;
use crate::errors::{HudError, HudResult};
use std::collections::HashMap;
use std::future::Future;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The two independent auto-dismiss timers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Hides the popup window
    HidePopupWindow,
    /// Clears the indicator bar highlight
    DeactivateIndicatorBar,
}

#[derive(Debug)]
enum TimerCommand {
    Arm(TimerKind, Duration),
    Cancel(TimerKind),
}

struct ArmedTimer {
    generation: u64,
    sleeper: tokio::task::JoinHandle<()>,
}

/// Owner of the timer thread
pub struct DismissTimers {
    commands: Option<mpsc::UnboundedSender<TimerCommand>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl DismissTimers {
    /// Start the timer thread.
    ///
    /// `on_fire` is invoked on the timer thread each time a timer elapses
    /// without being re-armed or cancelled.
    pub fn start<F, Fut>(on_fire: F) -> HudResult<Self>
    where
        F: Fn(TimerKind) -> Fut + Send + 'static,
        Fut: Future<Output = ()>,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| HudError::Timer(format!("Failed to build timer runtime: {}", e)))?;

        let (commands_tx, commands_rx) = mpsc::unbounded_channel();

        let thread_handle = thread::Builder::new()
            .name(TIMER_THREAD_NAME.to_string())
            .spawn(move || {
                debug!("Timer thread started");
                runtime.block_on(run_timer_loop(commands_rx, on_fire));
                info!("Timer thread exiting");
            })
            .map_err(|e| HudError::Timer(format!("Failed to spawn timer thread: {}", e)))?;

        Ok(Self {
            commands: Some(commands_tx),
            thread_handle: Some(thread_handle),
        })
    }

    /// Cancel any pending timer of this kind and arm a new one
    pub fn arm(&self, kind: TimerKind, delay: Duration) -> HudResult<()> {
        self.send(TimerCommand::Arm(kind, delay))
    }

    /// Cancel the pending timer of this kind, if any
    pub fn cancel(&self, kind: TimerKind) -> HudResult<()> {
        self.send(TimerCommand::Cancel(kind))
    }

    /// Check if the timer thread is still running
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Stop the timer thread and wait for it to finish.
    ///
    /// Pending timers are dropped without firing. If a fire callback is
    /// currently waiting on the render thread, this waits for it too, so the
    /// render queue must be closed (or drained) first.
    pub fn stop(&mut self) {
        self.commands.take();
        if let Some(handle) = self.thread_handle.take() {
            debug!("Waiting for timer thread to finish");
            if let Err(e) = handle.join() {
                warn!("Timer thread panicked: {:?}", e);
            }
        }
    }

    fn send(&self, command: TimerCommand) -> HudResult<()> {
        let Some(commands) = self.commands.as_ref() else {
            return Err(HudError::Timer("timer thread stopped".to_string()));
        };
        commands
            .send(command)
            .map_err(|_| HudError::Timer("timer thread stopped".to_string()))
    }
}

impl Drop for DismissTimers {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            debug!("DismissTimers dropped, stopping timer thread");
            self.stop();
        }
    }
}

async fn run_timer_loop<F, Fut>(mut commands: mpsc::UnboundedReceiver<TimerCommand>, on_fire: F)
where
    F: Fn(TimerKind) -> Fut,
    Fut: Future<Output = ()>,
{
    let (fired_tx, mut fired_rx) = mpsc::unbounded_channel::<(TimerKind, u64)>();
    let mut armed: HashMap<TimerKind, ArmedTimer> = HashMap::new();
    let mut next_generation = 0u64;

    loop {
        tokio::select! {
            // Commands first so a queued re-arm supersedes an older wakeup
            biased;

            command = commands.recv() => {
                let Some(command) = command else {
                    break;
                };
                match command {
                    TimerCommand::Arm(kind, delay) => {
                        if let Some(previous) = armed.remove(&kind) {
                            previous.sleeper.abort();
                        }
                        next_generation += 1;
                        let generation = next_generation;
                        let fired_tx = fired_tx.clone();
                        let sleeper = tokio::spawn(async move {
                            tokio::time::sleep(delay).await;
                            let _ = fired_tx.send((kind, generation));
                        });
                        armed.insert(kind, ArmedTimer { generation, sleeper });
                    }
                    TimerCommand::Cancel(kind) => {
                        if let Some(previous) = armed.remove(&kind) {
                            previous.sleeper.abort();
                        }
                    }
                }
            }
            Some((kind, generation)) = fired_rx.recv() => {
                // A re-arm may have raced with the old sleeper's wakeup
                let current = armed.get(&kind).map(|t| t.generation);
                if current != Some(generation) {
                    debug!(?kind, generation, "Ignoring superseded timer");
                    continue;
                }
                armed.remove(&kind);
                debug!(?kind, "Timer fired");
                on_fire(kind).await;
            }
        }
    }

    for (_, timer) in armed.drain() {
        timer.sleeper.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;

    type FireLog = Arc<Mutex<Vec<(TimerKind, Instant)>>>;

    fn recording_timers() -> (DismissTimers, FireLog) {
        let log: FireLog = Arc::new(Mutex::new(Vec::new()));
        let log_clone = Arc::clone(&log);
        let timers = DismissTimers::start(move |kind| {
            log_clone.lock().unwrap().push((kind, Instant::now()));
            async {}
        })
        .unwrap();
        (timers, log)
    }

    fn fires_of(log: &FireLog, kind: TimerKind) -> Vec<Instant> {
        log.lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, at)| *at)
            .collect()
    }

    #[test]
    fn test_single_fire() {
        let (timers, log) = recording_timers();
        timers
            .arm(TimerKind::HidePopupWindow, Duration::from_millis(30))
            .unwrap();
        thread::sleep(Duration::from_millis(200));
        assert_eq!(fires_of(&log, TimerKind::HidePopupWindow).len(), 1);
        assert!(fires_of(&log, TimerKind::DeactivateIndicatorBar).is_empty());
    }

    #[test]
    fn test_rearm_debounces() {
        let (timers, log) = recording_timers();
        let start = Instant::now();
        timers
            .arm(TimerKind::HidePopupWindow, Duration::from_millis(200))
            .unwrap();
        thread::sleep(Duration::from_millis(100));
        let rearmed_at = Instant::now();
        timers
            .arm(TimerKind::HidePopupWindow, Duration::from_millis(200))
            .unwrap();

        // The first arm would have fired at ~200ms
        let check_at = start + Duration::from_millis(250);
        thread::sleep(check_at.saturating_duration_since(Instant::now()));
        assert!(fires_of(&log, TimerKind::HidePopupWindow).is_empty());

        thread::sleep(Duration::from_millis(300));
        let fires = fires_of(&log, TimerKind::HidePopupWindow);
        assert_eq!(fires.len(), 1);
        assert!(fires[0].duration_since(rearmed_at) >= Duration::from_millis(200));
    }

    #[test]
    fn test_kinds_are_independent() {
        let (timers, log) = recording_timers();
        timers
            .arm(TimerKind::HidePopupWindow, Duration::from_millis(40))
            .unwrap();
        timers
            .arm(TimerKind::DeactivateIndicatorBar, Duration::from_millis(60))
            .unwrap();
        timers
            .arm(TimerKind::DeactivateIndicatorBar, Duration::from_millis(60))
            .unwrap();
        thread::sleep(Duration::from_millis(300));
        assert_eq!(fires_of(&log, TimerKind::HidePopupWindow).len(), 1);
        assert_eq!(fires_of(&log, TimerKind::DeactivateIndicatorBar).len(), 1);
    }

    #[test]
    fn test_rearm_during_slow_fire_suppresses_older_wakeup() {
        for _ in 0..10 {
            let log: FireLog = Arc::new(Mutex::new(Vec::new()));
            let log_clone = Arc::clone(&log);
            let release = Arc::new(tokio::sync::Notify::new());
            let release_clone = Arc::clone(&release);
            let timers = DismissTimers::start(move |kind| {
                let log = Arc::clone(&log_clone);
                let release = Arc::clone(&release_clone);
                async move {
                    // A slow hand-off; sleepers keep running meanwhile
                    if kind == TimerKind::HidePopupWindow {
                        release.notified().await;
                    }
                    log.lock().unwrap().push((kind, Instant::now()));
                }
            })
            .unwrap();

            timers
                .arm(TimerKind::HidePopupWindow, Duration::from_millis(10))
                .unwrap();
            timers
                .arm(TimerKind::DeactivateIndicatorBar, Duration::from_millis(40))
                .unwrap();
            // Deactivate's sleeper wakes while the Hide callback is held
            thread::sleep(Duration::from_millis(100));
            timers
                .arm(TimerKind::DeactivateIndicatorBar, Duration::from_millis(1000))
                .unwrap();
            release.notify_one();

            thread::sleep(Duration::from_millis(200));
            assert_eq!(fires_of(&log, TimerKind::HidePopupWindow).len(), 1);
            assert!(fires_of(&log, TimerKind::DeactivateIndicatorBar).is_empty());
        }
    }

    #[test]
    fn test_cancel_prevents_fire() {
        let (timers, log) = recording_timers();
        timers
            .arm(TimerKind::DeactivateIndicatorBar, Duration::from_millis(50))
            .unwrap();
        timers.cancel(TimerKind::DeactivateIndicatorBar).unwrap();
        thread::sleep(Duration::from_millis(200));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_stop_joins_thread_and_rejects_commands() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = Arc::clone(&counter);
        let mut timers = DismissTimers::start(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
            async {}
        })
        .unwrap();
        assert!(timers.is_running());

        timers
            .arm(TimerKind::HidePopupWindow, Duration::from_secs(10))
            .unwrap();
        timers.stop();

        assert!(!timers.is_running());
        assert!(timers.arm(TimerKind::HidePopupWindow, Duration::ZERO).is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
