// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

// =============================================================================
// SWEEP CONSTANTS (Wei math stays in integer space)
// =============================================================================

/// Native-unit margin left behind for gas when sweeping (0.001 ETH).
pub const DEFAULT_SWEEP_MARGIN_WEI: u64 = 1_000_000_000_000_000;

/// Plain value-transfer gas limit.
pub const SWEEP_GAS_LIMIT: u64 = 21_000;

/// Gas limit for the startup `updateNonce()` bookkeeping call.
pub const UPDATE_NONCE_GAS_LIMIT: u64 = 100_000;

/// Minimum accepted gas-price multiplier for the sweep. Anything below this
/// cannot reliably outbid the transaction it is racing.
pub const MIN_GAS_PRICE_MULTIPLIER: u64 = 2;

// =============================================================================
// WATCH LOOP TIMING
// =============================================================================

/// Interval between pending-nonce polls in fallback mode.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Idle delay when the subscription channel has nothing to drain.
pub const DEFAULT_IDLE_DELAY_MS: u64 = 1_000;

/// Upper bound applied to every upstream RPC call.
pub const DEFAULT_RPC_TIMEOUT_MS: u64 = 10_000;

// =============================================================================
// LOGGING DEFAULTS
// =============================================================================

pub const DEFAULT_LOG_LEVEL: &str = "info";
