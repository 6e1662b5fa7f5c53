// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the head-up display

use std::fmt;

/// Result type alias using HudError
pub type HudResult<T> = Result<T, HudError>;

/// Main error type for the overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HudError {
    /// A caller passed malformed arguments (e.g. an odd-length override list)
    InvalidArgument(String),
    /// Orientation was not a multiple of 90 degrees
    InvalidOrientation(i32),
    /// Operation needs the indicator bar, but `initialize` has not run yet
    NotInitialized,
    /// The render queue was closed before the task could run
    QueueClosed,
    /// A marshalled task panicked on the render thread
    TaskPanicked(String),
    /// Waiting for the render thread took longer than the configured timeout
    HandoffTimeout(u64),
    /// The timer thread could not be started or has stopped
    Timer(String),
    /// Configuration errors
    Config(String),
    /// Preference group could not be read
    Preferences(String),
    /// Filesystem errors
    Io(String),
}

impl fmt::Display for HudError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HudError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            HudError::InvalidOrientation(degrees) => {
                write!(f, "Invalid orientation: {} degrees", degrees)
            }
            HudError::NotInitialized => write!(f, "Head-up display is not initialized"),
            HudError::QueueClosed => write!(f, "Render queue is closed"),
            HudError::TaskPanicked(msg) => write!(f, "Render task panicked: {}", msg),
            HudError::HandoffTimeout(ms) => {
                write!(f, "Render thread did not run task within {} ms", ms)
            }
            HudError::Timer(msg) => write!(f, "Timer error: {}", msg),
            HudError::Config(msg) => write!(f, "Configuration error: {}", msg),
            HudError::Preferences(msg) => write!(f, "Preference error: {}", msg),
            HudError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for HudError {}

impl From<std::io::Error> for HudError {
    fn from(err: std::io::Error) -> Self {
        HudError::Io(err.to_string())
    }
}
