// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

/// Watcher strategy. The only path is `Uninitialized` to `Subscription` to
/// `Polling`; there is no transition back to `Subscription`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchMode {
    Uninitialized,
    Subscription,
    Polling,
}

/// Runtime state of the watcher. `last_nonce_seen` is owned and mutated only
/// by the polling branch; no other component touches it.
#[derive(Debug)]
pub struct WatchSession {
    mode: WatchMode,
    last_nonce_seen: u64,
}

impl WatchSession {
    pub fn new() -> Self {
        Self {
            mode: WatchMode::Uninitialized,
            last_nonce_seen: 0,
        }
    }

    pub fn mode(&self) -> WatchMode {
        self.mode
    }

    pub fn begin_subscription(&mut self) {
        debug_assert_eq!(self.mode, WatchMode::Uninitialized);
        self.mode = WatchMode::Subscription;
    }

    /// One-way downgrade. Once polling, subscription is never re-attempted
    /// for the remainder of the process lifetime.
    pub fn downgrade(&mut self, reason: &str) {
        if self.mode == WatchMode::Polling {
            return;
        }
        self.mode = WatchMode::Polling;
        tracing::warn!(
            target: "watch",
            %reason,
            "Subscription unavailable; polling pending nonce for the rest of the process"
        );
    }

    pub fn last_nonce_seen(&self) -> u64 {
        self.last_nonce_seen
    }

    /// Monotonically non-decreasing; a stale observation never rolls it back.
    pub fn record_nonce(&mut self, nonce: u64) {
        self.last_nonce_seen = self.last_nonce_seen.max(nonce);
    }
}

impl Default for WatchSession {
    fn default() -> Self {
        Self::new()
    }
}
