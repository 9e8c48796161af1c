// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the client. Configuration is loaded from the environment at
//! startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `LIT_NETWORK` | Encryption network (`datil-dev`, `datil-test`, `datil`) | `datil-dev` |
//! | `LIT_CHAIN` | Chain used for sessions and decryption | `ethereum` |
//! | `LIT_SESSION_URI` | Domain presented in the SIWE challenge | `localhost` |
//! | `LIT_SESSION_TTL_SECS` | Requested session lifetime | `86400` |
//! | `VAULT_CONTRACT_ADDRESS` | Deployed `VaultStorage` contract | Optional |
//! | `VAULT_RPC_URL` | RPC endpoint of the vault chain | Optional |
//! | `LIT_NETWORK_SECRET` | Hex secret of the in-process network | Random per run |
//! | `LIT_CONDITION_RPC_URL` | RPC endpoint used to evaluate conditions | Static balances |
//! | `LIT_WALLET_PRIVATE_KEY` | Hex key for the local wallet | Random key |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |
//!
//! `VAULT_CONTRACT_ADDRESS` and `VAULT_RPC_URL` must be set together.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::Address;
use url::Url;

use crate::logging::LogFormat;
use crate::network::LitNetwork;
use crate::policy::Chain;

/// Environment variable selecting the Lit network.
pub const LIT_NETWORK_ENV: &str = "LIT_NETWORK";

/// Environment variable selecting the session/decryption chain.
pub const LIT_CHAIN_ENV: &str = "LIT_CHAIN";

/// Environment variable for the SIWE domain.
pub const LIT_SESSION_URI_ENV: &str = "LIT_SESSION_URI";

/// Environment variable for the session lifetime in seconds.
pub const LIT_SESSION_TTL_ENV: &str = "LIT_SESSION_TTL_SECS";

/// Environment variable holding the `VaultStorage` contract address.
pub const VAULT_CONTRACT_ENV: &str = "VAULT_CONTRACT_ADDRESS";

/// Environment variable holding the vault chain RPC endpoint.
pub const VAULT_RPC_URL_ENV: &str = "VAULT_RPC_URL";

/// Environment variable holding the in-process network secret (32 bytes, hex).
pub const LIT_NETWORK_SECRET_ENV: &str = "LIT_NETWORK_SECRET";

/// Environment variable holding the RPC endpoint for condition evaluation.
pub const LIT_CONDITION_RPC_URL_ENV: &str = "LIT_CONDITION_RPC_URL";

/// Environment variable holding the local wallet key (hex). Read by the
/// binary only; never stored in [`ClientConfig`].
pub const LIT_WALLET_KEY_ENV: &str = "LIT_WALLET_PRIVATE_KEY";

/// Environment variable selecting the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default SIWE domain.
pub const DEFAULT_SESSION_DOMAIN: &str = "localhost";

/// Default session lifetime (24 hours).
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Key material of the in-process network. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct NetworkSecret([u8; 32]);

impl NetworkSecret {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }
}

impl fmt::Debug for NetworkSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NetworkSecret(<redacted>)")
    }
}

impl FromStr for NetworkSecret {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = alloy::hex::decode(s.trim()).map_err(|e| e.to_string())?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| format!("expected 32 bytes, got {}", b.len()))?;
        Ok(Self(bytes))
    }
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub lit_network: LitNetwork,
    pub chain: Chain,
    pub session_domain: String,
    pub session_ttl: Duration,
    pub vault_contract: Option<Address>,
    pub vault_rpc_url: Option<Url>,
    pub network_secret: Option<NetworkSecret>,
    pub condition_rpc_url: Option<Url>,
    pub log_format: LogFormat,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            lit_network: LitNetwork::DatilDev,
            chain: Chain::Ethereum,
            session_domain: DEFAULT_SESSION_DOMAIN.to_string(),
            session_ttl: DEFAULT_SESSION_TTL,
            vault_contract: None,
            vault_rpc_url: None,
            network_secret: None,
            condition_rpc_url: None,
            log_format: LogFormat::Pretty,
        }
    }
}

impl ClientConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let lit_network = match get(LIT_NETWORK_ENV) {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::Invalid {
                var: LIT_NETWORK_ENV,
                reason,
            })?,
            None => defaults.lit_network,
        };

        let chain = match get(LIT_CHAIN_ENV) {
            Some(raw) => Chain::from_str(&raw).map_err(|e| ConfigError::Invalid {
                var: LIT_CHAIN_ENV,
                reason: e.to_string(),
            })?,
            None => defaults.chain,
        };

        let session_domain = get(LIT_SESSION_URI_ENV).unwrap_or(defaults.session_domain);

        let session_ttl = match get(LIT_SESSION_TTL_ENV) {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                    ConfigError::Invalid {
                        var: LIT_SESSION_TTL_ENV,
                        reason: e.to_string(),
                    }
                })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        var: LIT_SESSION_TTL_ENV,
                        reason: "must be greater than zero".to_string(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => defaults.session_ttl,
        };

        let vault_contract = get(VAULT_CONTRACT_ENV)
            .map(|raw| {
                Address::from_str(raw.trim()).map_err(|e| ConfigError::Invalid {
                    var: VAULT_CONTRACT_ENV,
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let vault_rpc_url = get(VAULT_RPC_URL_ENV)
            .map(|raw| parse_url(VAULT_RPC_URL_ENV, &raw))
            .transpose()?;

        match (&vault_contract, &vault_rpc_url) {
            (Some(_), None) => {
                return Err(ConfigError::Invalid {
                    var: VAULT_RPC_URL_ENV,
                    reason: format!("required when {VAULT_CONTRACT_ENV} is set"),
                });
            }
            (None, Some(_)) => {
                return Err(ConfigError::Invalid {
                    var: VAULT_CONTRACT_ENV,
                    reason: format!("required when {VAULT_RPC_URL_ENV} is set"),
                });
            }
            _ => {}
        }

        let network_secret = get(LIT_NETWORK_SECRET_ENV)
            .map(|raw| {
                raw.parse().map_err(|reason| ConfigError::Invalid {
                    var: LIT_NETWORK_SECRET_ENV,
                    reason,
                })
            })
            .transpose()?;

        let condition_rpc_url = get(LIT_CONDITION_RPC_URL_ENV)
            .map(|raw| parse_url(LIT_CONDITION_RPC_URL_ENV, &raw))
            .transpose()?;

        let log_format = match get(LOG_FORMAT_ENV) {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::Invalid {
                var: LOG_FORMAT_ENV,
                reason,
            })?,
            None => defaults.log_format,
        };

        Ok(Self {
            lit_network,
            chain,
            session_domain,
            session_ttl,
            vault_contract,
            vault_rpc_url,
            network_secret,
            condition_rpc_url,
            log_format,
        })
    }

    /// Whether payloads go to the `VaultStorage` contract.
    pub fn uses_contract_vault(&self) -> bool {
        self.vault_contract.is_some() && self.vault_rpc_url.is_some()
    }

    /// Session lifetime as a chrono duration.
    pub fn session_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.session_ttl).unwrap_or_else(|_| chrono::Duration::hours(24))
    }
}

fn parse_url(var: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
        var,
        reason: e.to_string(),
    })
}
