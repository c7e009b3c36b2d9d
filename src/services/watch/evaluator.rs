// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::error::AppError;
use crate::network::trap::TrapOracle;
use alloy::primitives::Bytes;
use std::sync::Arc;

/// Verdict from the protective contract, produced fresh per evaluation and
/// never cached.
#[derive(Clone, Debug)]
pub struct TrapVerdict {
    pub should_respond: bool,
    pub response_payload: Bytes,
}

pub struct TrapEvaluator {
    trap: Arc<dyn TrapOracle>,
}

impl TrapEvaluator {
    pub fn new(trap: Arc<dyn TrapOracle>) -> Self {
        Self { trap }
    }

    /// Two sequential read-only calls: `collect()`, then `analyze(observation)`.
    /// Any failure comes back as `Err`; the caller logs it and forfeits the
    /// trigger instead of crashing the watch loop.
    pub async fn evaluate(&self) -> Result<TrapVerdict, AppError> {
        let observation = self.trap.collect().await?;
        tracing::debug!(target: "trap", observation = %observation, "Collected trap state");

        let (should_respond, response_payload) = self.trap.analyze(observation).await?;
        Ok(TrapVerdict {
            should_respond,
            response_payload,
        })
    }
}
