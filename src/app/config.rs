// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::domain::constants;
use crate::domain::error::AppError;
use alloy::primitives::Address;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct GlobalSettings {
    // General
    #[serde(default = "default_debug")]
    pub debug: bool,
    #[serde(default = "default_log_json")]
    pub log_json: bool,

    // Endpoints
    pub http_provider: String,
    pub websocket_provider: Option<String>,

    // Identity
    pub wallet_key: String,
    pub trap_address: Address,

    // Watch loop
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_idle_delay_ms")]
    pub idle_delay_ms: u64,
    #[serde(default = "default_rpc_timeout_ms")]
    pub rpc_timeout_ms: u64,

    // Sweep
    #[serde(default = "default_sweep_margin_wei")]
    pub sweep_margin_wei: u64,
    #[serde(default = "default_sweep_gas_limit")]
    pub sweep_gas_limit: u64,
    #[serde(default = "default_gas_price_multiplier")]
    pub gas_price_multiplier: u64,
}

// Defaults
fn default_debug() -> bool {
    false
}
fn default_log_json() -> bool {
    false
}
fn default_poll_interval_secs() -> u64 {
    constants::DEFAULT_POLL_INTERVAL_SECS
}
fn default_idle_delay_ms() -> u64 {
    constants::DEFAULT_IDLE_DELAY_MS
}
fn default_rpc_timeout_ms() -> u64 {
    constants::DEFAULT_RPC_TIMEOUT_MS
}
fn default_sweep_margin_wei() -> u64 {
    constants::DEFAULT_SWEEP_MARGIN_WEI
}
fn default_sweep_gas_limit() -> u64 {
    constants::SWEEP_GAS_LIMIT
}
fn default_gas_price_multiplier() -> u64 {
    constants::MIN_GAS_PRICE_MULTIPLIER
}

impl GlobalSettings {
    pub fn load_with_path(path: Option<&str>) -> Result<Self, AppError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let mut builder = Config::builder();
        if let Some(selected) = path {
            builder = builder.add_source(File::from(Path::new(selected)).required(true));
        } else {
            builder = builder.add_source(File::with_name("config").required(false));
        }
        // Deterministic precedence: CLI (in main) > env/.env > config file.
        builder = builder.add_source(Environment::default());

        let settings: GlobalSettings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load() -> Result<Self, AppError> {
        Self::load_with_path(None)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.wallet_key.trim().is_empty() {
            return Err(AppError::Config("WALLET_KEY is missing".to_string()));
        }
        if self.http_provider.trim().is_empty() {
            return Err(AppError::Config("HTTP_PROVIDER is missing".to_string()));
        }
        if self.gas_price_multiplier < constants::MIN_GAS_PRICE_MULTIPLIER {
            return Err(AppError::Config(format!(
                "gas_price_multiplier {} cannot outbid a racing transaction; minimum is {}",
                self.gas_price_multiplier,
                constants::MIN_GAS_PRICE_MULTIPLIER
            )));
        }
        if self.poll_interval_secs == 0 {
            return Err(AppError::Config(
                "poll_interval_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn idle_delay(&self) -> Duration {
        Duration::from_millis(self.idle_delay_ms)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }

    pub fn log_level(&self) -> &'static str {
        if self.debug { "debug" } else { constants::DEFAULT_LOG_LEVEL }
    }
}
