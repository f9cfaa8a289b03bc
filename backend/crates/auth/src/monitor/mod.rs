//! Inactivity Monitor
//!
//! Watches for user inactivity while the dashboard is open. Two phases:
//!
//! 1. **Idle**: any activity signal resets the clock. After
//!    `timeout - warning` of silence the warning phase begins.
//! 2. **Warning**: a countdown ticks once per second. Ordinary activity
//!    is ignored here; only an explicit [`InactivityMonitor::stay_signed_in`]
//!    returns to the idle phase. When the countdown reaches zero the
//!    session is expired.
//!
//! The monitor is a single tokio task owned by its handle. Dropping the
//! handle stops the task; [`InactivityMonitor::stop`] additionally waits
//! for it to finish.

use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

/// Default inactivity timeout (15 minutes)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Default warning window before expiry
pub const DEFAULT_WARNING: Duration = Duration::from_secs(60);

/// Monitor configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonitorError {
    /// Warning window must fit inside the timeout
    #[error("Warning window ({warning:?}) must be shorter than the timeout ({timeout:?})")]
    WarningTooLong {
        timeout: Duration,
        warning: Duration,
    },

    /// Zero durations make no sense
    #[error("Timeout and warning must be non-zero")]
    ZeroDuration,
}

/// Inactivity timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Total silence before the session expires
    pub timeout: Duration,
    /// Countdown window at the end of the timeout
    pub warning: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            warning: DEFAULT_WARNING,
        }
    }
}

impl MonitorConfig {
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.timeout.is_zero() || self.warning.is_zero() {
            return Err(MonitorError::ZeroDuration);
        }
        if self.warning >= self.timeout {
            return Err(MonitorError::WarningTooLong {
                timeout: self.timeout,
                warning: self.warning,
            });
        }
        Ok(())
    }
}

/// Kinds of user activity the UI forwards
///
/// The monitor treats them all the same; the kind only shows up in trace
/// logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivitySignal {
    PointerMove,
    PointerDown,
    KeyPress,
    Click,
    Scroll,
    Touch,
}

/// Events emitted while the monitor runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorEvent {
    /// Warning phase began; countdown starts at `remaining_secs`
    Warning { remaining_secs: u64 },
    /// One countdown second elapsed
    Tick { remaining_secs: u64 },
    /// The full timeout elapsed without rescue; the monitor has stopped
    Expired,
}

enum Command {
    Activity(ActivitySignal),
    StaySignedIn,
    Stop,
}

/// Handle to a running inactivity watch
pub struct InactivityMonitor {
    commands: mpsc::UnboundedSender<Command>,
    task: JoinHandle<()>,
}

impl InactivityMonitor {
    /// Validate the config and spawn the watch task
    ///
    /// Events are delivered on the given channel until the monitor stops
    /// or expires.
    pub fn start(
        config: MonitorConfig,
        events: mpsc::UnboundedSender<MonitorEvent>,
    ) -> Result<Self, MonitorError> {
        config.validate()?;
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(config, rx, events));
        tracing::debug!(?config, "Inactivity monitor started");
        Ok(Self { commands: tx, task })
    }

    /// Forward a user activity signal
    ///
    /// Resets the idle clock; ignored during the warning phase.
    pub fn record_activity(&self, signal: ActivitySignal) {
        let _ = self.commands.send(Command::Activity(signal));
    }

    /// Dismiss the warning and restart the idle clock
    pub fn stay_signed_in(&self) {
        let _ = self.commands.send(Command::StaySignedIn);
    }

    /// Stop the watch and wait for the task to finish
    pub async fn stop(self) {
        let _ = self.commands.send(Command::Stop);
        let _ = self.task.await;
    }
}

async fn run(
    config: MonitorConfig,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<MonitorEvent>,
) {
    let idle = config.timeout - config.warning;

    'session: loop {
        // Idle phase: wait out the quiet period, restarting on activity
        let idle_deadline = Instant::now() + idle;
        loop {
            tokio::select! {
                _ = time::sleep_until(idle_deadline) => break,
                command = commands.recv() => match command {
                    Some(Command::Activity(signal)) => {
                        tracing::trace!(?signal, "Activity, idle clock reset");
                        continue 'session;
                    }
                    Some(Command::StaySignedIn) => continue 'session,
                    Some(Command::Stop) | None => return,
                },
            }
        }

        // Warning phase: expiry is pinned to the original deadline, ticks
        // are best-effort at one per second
        let warn_deadline = Instant::now() + config.warning;
        let _ = events.send(MonitorEvent::Warning {
            remaining_secs: remaining_secs(warn_deadline),
        });
        tracing::info!("Inactivity warning shown");

        let mut next_tick = Instant::now() + Duration::from_secs(1);
        loop {
            tokio::select! {
                _ = time::sleep_until(warn_deadline) => {
                    let _ = events.send(MonitorEvent::Expired);
                    tracing::info!("Inactivity timeout expired");
                    return;
                }
                _ = time::sleep_until(next_tick), if next_tick < warn_deadline => {
                    let _ = events.send(MonitorEvent::Tick {
                        remaining_secs: remaining_secs(warn_deadline),
                    });
                    next_tick += Duration::from_secs(1);
                }
                command = commands.recv() => match command {
                    Some(Command::Activity(signal)) => {
                        // Deliberate: closing the laptop lid on the warning
                        // must not be defeated by a stray mouse move
                        tracing::trace!(?signal, "Activity ignored during warning");
                    }
                    Some(Command::StaySignedIn) => {
                        tracing::info!("Warning dismissed, session extended");
                        continue 'session;
                    }
                    Some(Command::Stop) | None => return,
                },
            }
        }
    }
}

fn remaining_secs(deadline: Instant) -> u64 {
    let left = deadline.saturating_duration_since(Instant::now());
    left.as_millis().div_ceil(1000) as u64
}
