// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request/response types of the encryption network boundary.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::policy::{AccessControlPolicy, Chain};

/// Resource scheme for access-control-condition decryption.
pub const ACC_RESOURCE_PREFIX: &str = "lit-accesscontrolcondition://";

/// Wildcard resource id (any condition set).
pub const WILDCARD_RESOURCE: &str = "*";

/// Lit network a client points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LitNetwork {
    #[default]
    DatilDev,
    DatilTest,
    Datil,
}

impl LitNetwork {
    pub fn as_str(&self) -> &'static str {
        match self {
            LitNetwork::DatilDev => "datil-dev",
            LitNetwork::DatilTest => "datil-test",
            LitNetwork::Datil => "datil",
        }
    }
}

impl fmt::Display for LitNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LitNetwork {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "datil-dev" | "datildev" => Ok(LitNetwork::DatilDev),
            "datil-test" | "datiltest" => Ok(LitNetwork::DatilTest),
            "datil" | "datilmain" => Ok(LitNetwork::Datil),
            other => Err(format!("unknown Lit network `{other}`")),
        }
    }
}

/// Capability the session asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LitAbility {
    #[serde(rename = "access-control-condition-decryption")]
    AccessControlConditionDecryption,
    #[serde(rename = "access-control-condition-signing")]
    AccessControlConditionSigning,
}

impl LitAbility {
    pub fn as_str(&self) -> &'static str {
        match self {
            LitAbility::AccessControlConditionDecryption => "access-control-condition-decryption",
            LitAbility::AccessControlConditionSigning => "access-control-condition-signing",
        }
    }

    /// ReCap `namespace/name` pair for this ability.
    pub fn recap_ability(&self) -> (&'static str, &'static str) {
        match self {
            LitAbility::AccessControlConditionDecryption => ("Threshold", "Decryption"),
            LitAbility::AccessControlConditionSigning => ("Threshold", "Signing"),
        }
    }
}

/// `(resource, ability)` pair requested for a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceAbilityRequest {
    /// Access-control resource id (`*` or a hash of conditions).
    pub resource: String,
    pub ability: LitAbility,
}

impl ResourceAbilityRequest {
    /// The single pair this client uses: decrypt anything.
    pub fn wildcard_decryption() -> Self {
        Self {
            resource: WILDCARD_RESOURCE.to_string(),
            ability: LitAbility::AccessControlConditionDecryption,
        }
    }

    /// Full resource key, e.g. `lit-accesscontrolcondition://*`.
    pub fn resource_key(&self) -> String {
        format!("{ACC_RESOURCE_PREFIX}{}", self.resource)
    }

    /// Whether this grant covers the given condition-set resource id.
    pub fn covers(&self, resource_id: &str, ability: LitAbility) -> bool {
        self.ability == ability && (self.resource == WILDCARD_RESOURCE || self.resource == resource_id)
    }
}

/// Wallet signature over a challenge message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSig {
    pub sig: String,
    pub derived_via: String,
    pub signed_message: String,
    pub address: String,
}

/// Parameters handed to the auth callback when the network needs a fresh
/// wallet signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCallbackParams {
    pub uri: String,
    pub expiration: DateTime<Utc>,
    pub resource_ability_requests: Vec<ResourceAbilityRequest>,
}

/// Request to obtain session credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSigsRequest {
    pub chain: Chain,
    pub expiration: DateTime<Utc>,
    pub resource_ability_requests: Vec<ResourceAbilityRequest>,
}

/// Capability issued by the network for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSigs {
    /// Identifier of the ephemeral session key.
    pub session_key: String,
    pub address: Address,
    pub capabilities: Vec<ResourceAbilityRequest>,
    pub expiration: DateTime<Utc>,
    pub auth_sig: AuthSig,
    /// Per-node signatures over the session grant, keyed by node url.
    pub node_signatures: BTreeMap<String, String>,
}

impl SessionSigs {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiration
    }
}

/// Request to encrypt a string under a policy.
#[derive(Debug, Clone)]
pub struct EncryptRequest<'a> {
    pub policy: &'a AccessControlPolicy,
    pub plaintext: &'a str,
}

/// Network output of an encryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptResponse {
    pub ciphertext: String,
    pub data_to_encrypt_hash: String,
}

/// Request to decrypt a ciphertext with a session.
#[derive(Debug, Clone)]
pub struct DecryptRequest<'a> {
    pub policy: &'a AccessControlPolicy,
    pub ciphertext: &'a str,
    pub data_to_encrypt_hash: &'a str,
    pub chain: Chain,
    pub session: &'a SessionSigs,
}

/// Errors raised by an encryption network backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("client not connected")]
    NotConnected,

    #[error("latest blockhash unavailable")]
    BlockhashUnavailable,

    #[error("auth callback failed: {0}")]
    AuthCallback(#[from] AuthCallbackError),

    #[error("session rejected: {0}")]
    SessionRejected(String),

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("integrity check failed")]
    IntegrityMismatch,

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("decryption failed: {0}")]
    Decryption(String),
}

/// Errors raised by the auth callback while producing an [`AuthSig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthCallbackError {
    #[error("missing required parameter `{0}`")]
    MissingParameter(&'static str),

    #[error("signature rejected by the user: {0}")]
    UserRejected(String),

    #[error("wallet unavailable: {0}")]
    WalletUnavailable(String),

    #[error("could not build challenge: {0}")]
    Challenge(String),
}
