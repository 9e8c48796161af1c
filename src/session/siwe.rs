// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sign-In with Ethereum (EIP-4361) challenges carrying ReCap capabilities.
//!
//! The wallet signs a SIWE message whose last resource is a
//! `urn:recap:<base64url(json)>` object listing the abilities being
//! delegated, e.g. `Threshold/Decryption` on
//! `lit-accesscontrolcondition://*`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use alloy::primitives::Address;
use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::network::{LitAbility, ResourceAbilityRequest, ACC_RESOURCE_PREFIX};

const HEADER_SUFFIX: &str = " wants you to sign in with your Ethereum account:";
const RECAP_PREFIX: &str = "urn:recap:";
const SIWE_VERSION: &str = "1";

/// Errors parsing or building a SIWE challenge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SiweError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("invalid recap: {0}")]
    InvalidRecap(String),
}

/// ReCap capability object (`att` = attenuations, `prf` = proofs).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recap {
    pub att: BTreeMap<String, BTreeMap<String, Vec<serde_json::Value>>>,
    pub prf: Vec<String>,
}

impl Recap {
    pub fn from_requests(requests: &[ResourceAbilityRequest]) -> Self {
        let mut recap = Recap::default();
        for request in requests {
            let (namespace, name) = request.ability.recap_ability();
            recap
                .att
                .entry(request.resource_key())
                .or_default()
                .insert(format!("{namespace}/{name}"), vec![serde_json::json!({})]);
        }
        recap
    }

    /// Abilities granted by this recap that this client understands.
    pub fn abilities(&self) -> Vec<ResourceAbilityRequest> {
        let mut granted = Vec::new();
        for (resource_key, abilities) in &self.att {
            let Some(resource) = resource_key.strip_prefix(ACC_RESOURCE_PREFIX) else {
                continue;
            };
            for ability_key in abilities.keys() {
                let ability = match ability_key.as_str() {
                    "Threshold/Decryption" => LitAbility::AccessControlConditionDecryption,
                    "Threshold/Signing" => LitAbility::AccessControlConditionSigning,
                    _ => continue,
                };
                granted.push(ResourceAbilityRequest {
                    resource: resource.to_string(),
                    ability,
                });
            }
        }
        granted
    }

    /// Human-readable statement describing the delegated abilities.
    pub fn statement(&self) -> String {
        let mut parts = Vec::new();
        for (resource_key, abilities) in &self.att {
            for ability_key in abilities.keys() {
                let (namespace, name) = ability_key
                    .split_once('/')
                    .unwrap_or((ability_key.as_str(), ""));
                parts.push(format!(
                    "({}) '{namespace}': '{name}' for '{resource_key}'.",
                    parts.len() + 1
                ));
            }
        }
        format!(
            "I further authorize the stated URI to perform the following actions on my behalf: {}",
            parts.join(" ")
        )
    }

    pub fn to_resource(&self) -> Result<String, SiweError> {
        let json = serde_json::to_vec(self).map_err(|e| SiweError::InvalidRecap(e.to_string()))?;
        Ok(format!("{RECAP_PREFIX}{}", Base64UrlUnpadded::encode_string(&json)))
    }

    pub fn from_resource(resource: &str) -> Result<Self, SiweError> {
        let encoded = resource
            .strip_prefix(RECAP_PREFIX)
            .ok_or_else(|| SiweError::InvalidRecap("not a recap uri".to_string()))?;
        let json = Base64UrlUnpadded::decode_vec(encoded)
            .map_err(|e| SiweError::InvalidRecap(e.to_string()))?;
        serde_json::from_slice(&json).map_err(|e| SiweError::InvalidRecap(e.to_string()))
    }
}

/// An EIP-4361 message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiweMessage {
    pub domain: String,
    pub address: Address,
    pub statement: Option<String>,
    pub uri: String,
    pub version: String,
    pub chain_id: u64,
    pub nonce: String,
    pub issued_at: DateTime<Utc>,
    pub expiration_time: Option<DateTime<Utc>>,
    pub resources: Vec<String>,
}

impl SiweMessage {
    /// Build the session challenge: SIWE + recap for `requests`.
    pub fn with_recaps(
        domain: impl Into<String>,
        uri: impl Into<String>,
        address: Address,
        chain_id: u64,
        nonce: impl Into<String>,
        expiration: DateTime<Utc>,
        requests: &[ResourceAbilityRequest],
    ) -> Result<Self, SiweError> {
        let recap = Recap::from_requests(requests);
        Ok(Self {
            domain: domain.into(),
            address,
            statement: Some(recap.statement()),
            uri: uri.into(),
            version: SIWE_VERSION.to_string(),
            chain_id,
            nonce: nonce.into(),
            issued_at: Utc::now(),
            expiration_time: Some(expiration),
            resources: vec![recap.to_resource()?],
        })
    }

    /// Recap carried in the resources list, if any.
    pub fn recap(&self) -> Result<Option<Recap>, SiweError> {
        self.resources
            .iter()
            .rev()
            .find(|r| r.starts_with(RECAP_PREFIX))
            .map(|r| Recap::from_resource(r))
            .transpose()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration_time.is_some_and(|exp| now >= exp)
    }
}

fn rfc3339(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl fmt::Display for SiweMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}{HEADER_SUFFIX}", self.domain)?;
        writeln!(f, "{}", self.address.to_checksum(None))?;
        writeln!(f)?;
        if let Some(statement) = &self.statement {
            writeln!(f, "{statement}")?;
            writeln!(f)?;
        }
        writeln!(f, "URI: {}", self.uri)?;
        writeln!(f, "Version: {}", self.version)?;
        writeln!(f, "Chain ID: {}", self.chain_id)?;
        writeln!(f, "Nonce: {}", self.nonce)?;
        write!(f, "Issued At: {}", rfc3339(&self.issued_at))?;
        if let Some(expiration) = &self.expiration_time {
            write!(f, "\nExpiration Time: {}", rfc3339(expiration))?;
        }
        if !self.resources.is_empty() {
            write!(f, "\nResources:")?;
            for resource in &self.resources {
                write!(f, "\n- {resource}")?;
            }
        }
        Ok(())
    }
}

fn parse_time(field: &'static str, value: &str) -> Result<DateTime<Utc>, SiweError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| SiweError::InvalidField {
            field,
            reason: e.to_string(),
        })
}

impl FromStr for SiweMessage {
    type Err = SiweError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s.lines();

        let domain = lines
            .next()
            .and_then(|line| line.strip_suffix(HEADER_SUFFIX))
            .ok_or(SiweError::MissingField("domain"))?
            .to_string();

        let address_line = lines.next().ok_or(SiweError::MissingField("address"))?;
        let address = Address::from_str(address_line.trim()).map_err(|e| SiweError::InvalidField {
            field: "address",
            reason: e.to_string(),
        })?;

        let mut statement = None;
        let mut uri = None;
        let mut version = None;
        let mut chain_id = None;
        let mut nonce = None;
        let mut issued_at = None;
        let mut expiration_time = None;
        let mut resources = Vec::new();
        let mut in_resources = false;

        for line in lines {
            if line.is_empty() {
                continue;
            }
            if in_resources {
                if let Some(resource) = line.strip_prefix("- ") {
                    resources.push(resource.to_string());
                    continue;
                }
                in_resources = false;
            }

            if let Some(v) = line.strip_prefix("URI: ") {
                uri = Some(v.to_string());
            } else if let Some(v) = line.strip_prefix("Version: ") {
                version = Some(v.to_string());
            } else if let Some(v) = line.strip_prefix("Chain ID: ") {
                chain_id = Some(v.parse::<u64>().map_err(|e| SiweError::InvalidField {
                    field: "chain_id",
                    reason: e.to_string(),
                })?);
            } else if let Some(v) = line.strip_prefix("Nonce: ") {
                nonce = Some(v.to_string());
            } else if let Some(v) = line.strip_prefix("Issued At: ") {
                issued_at = Some(parse_time("issued_at", v)?);
            } else if let Some(v) = line.strip_prefix("Expiration Time: ") {
                expiration_time = Some(parse_time("expiration_time", v)?);
            } else if line == "Resources:" {
                in_resources = true;
            } else if statement.is_none() && uri.is_none() {
                statement = Some(line.to_string());
            } else {
                return Err(SiweError::InvalidField {
                    field: "message",
                    reason: format!("unexpected line `{line}`"),
                });
            }
        }

        Ok(Self {
            domain,
            address,
            statement,
            uri: uri.ok_or(SiweError::MissingField("uri"))?,
            version: version.ok_or(SiweError::MissingField("version"))?,
            chain_id: chain_id.ok_or(SiweError::MissingField("chain_id"))?,
            nonce: nonce.ok_or(SiweError::MissingField("nonce"))?,
            issued_at: issued_at.ok_or(SiweError::MissingField("issued_at"))?,
            expiration_time,
            resources,
        })
    }
}
