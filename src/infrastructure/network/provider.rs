// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use crate::common::error::AppError;
use alloy::network::Ethereum;
use alloy::providers::RootProvider;
use url::Url;

pub type HttpProvider = RootProvider<Ethereum>;
pub type WsProvider = RootProvider<Ethereum>;

pub struct ConnectionFactory;

impl ConnectionFactory {
    pub fn http(rpc_url: &str) -> Result<HttpProvider, AppError> {
        let url =
            Url::parse(rpc_url).map_err(|e| AppError::Config(format!("Invalid RPC URL: {}", e)))?;

        let provider = RootProvider::new_http(url);
        Ok(provider)
    }

    pub async fn ws(ws_url: &str) -> Result<WsProvider, AppError> {
        let provider = RootProvider::connect(ws_url)
            .await
            .map_err(|e| AppError::Connection(format!("WS Connection failed: {}", e)))?;

        Ok(provider)
    }

    /// WS is preferred for streaming, HTTP always serves unary calls. A missing
    /// or unreachable WS endpoint degrades streaming onto the HTTP handle,
    /// where subscription establishment fails fast into the polling fallback.
    pub async fn preferred(
        ws_url: Option<&str>,
        http_url: &str,
    ) -> Result<(WsProvider, HttpProvider), AppError> {
        let http = Self::http(http_url)?;
        let stream = match ws_url {
            Some(url) => match Self::ws(url).await {
                Ok(ws) => ws,
                Err(e) => {
                    tracing::warn!(target: "rpc", error = %e, "WS unavailable, streaming over HTTP");
                    http.clone()
                }
            },
            None => http.clone(),
        };
        Ok((stream, http))
    }
}
