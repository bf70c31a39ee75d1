// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wall-clock abstraction for testable timestamping

use std::sync::{Arc, Mutex};

/// A clock that provides the current wall-clock time, for timestamps that
/// leave the process (execution records, history entries).
pub trait WallClock: Clone + Send + Sync {
    fn now_utc(&self) -> chrono::DateTime<chrono::Utc>;
}

/// Real wall clock backed by the OS.
#[derive(Clone, Default)]
pub struct SystemWallClock;

impl WallClock for SystemWallClock {
    fn now_utc(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::Utc::now()
    }
}

/// Fake wall clock for testing with controllable time.
#[derive(Clone)]
pub struct FakeWallClock {
    current: Arc<Mutex<chrono::DateTime<chrono::Utc>>>,
}

impl FakeWallClock {
    pub fn new(start: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Advance the clock by the given duration.
    pub fn advance(&self, duration: chrono::Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current += duration;
    }
}

impl WallClock for FakeWallClock {
    fn now_utc(&self) -> chrono::DateTime<chrono::Utc> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
