// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Access-Control Policies
//!
//! A policy is the declarative predicate under which the encryption network
//! releases a decryption key. The client only builds and validates policies;
//! whether a wallet satisfies one is decided by the network, never locally.
//!
//! ## Wire Format
//!
//! Policies serialize to the network's JSON shape:
//!
//! ```json
//! [{
//!   "contractAddress": "",
//!   "standardContractType": "",
//!   "chain": "ethereum",
//!   "method": "eth_getBalance",
//!   "parameters": [":userAddress", "latest"],
//!   "returnValueTest": { "comparator": ">=", "value": "1000000000000" }
//! }]
//! ```

pub mod chain;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::VaultError;

pub use chain::{Chain, Comparator, StandardContractType};

/// Parameter placeholder the network substitutes with the requesting wallet.
pub const USER_ADDRESS_PLACEHOLDER: &str = ":userAddress";

/// Minimal native balance (wei) required by the default policy (0.000001 ETH).
pub const DEFAULT_MIN_BALANCE_WEI: &str = "1000000000000";

/// Expected result of the condition's RPC/contract call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReturnValueTest {
    pub comparator: Comparator,
    pub value: String,
}

/// One EVM basic access-control condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessControlCondition {
    pub contract_address: String,
    pub standard_contract_type: StandardContractType,
    pub chain: Chain,
    pub method: String,
    pub parameters: Vec<String>,
    pub return_value_test: ReturnValueTest,
}

impl AccessControlCondition {
    /// Native-asset balance of the requesting wallet, compared with `value`.
    pub fn native_balance(chain: Chain, comparator: Comparator, value: impl Into<String>) -> Self {
        Self {
            contract_address: String::new(),
            standard_contract_type: StandardContractType::Native,
            chain,
            method: "eth_getBalance".to_string(),
            parameters: vec![USER_ADDRESS_PLACEHOLDER.to_string(), "latest".to_string()],
            return_value_test: ReturnValueTest {
                comparator,
                value: value.into(),
            },
        }
    }

    /// Build a condition from textual chain/contract-type/comparator fields,
    /// rejecting any symbol outside the supported vocabularies.
    pub fn parse(
        contract_address: &str,
        standard_contract_type: &str,
        chain: &str,
        method: &str,
        parameters: &[&str],
        comparator: &str,
        value: &str,
    ) -> Result<Self, VaultError> {
        Ok(Self {
            contract_address: contract_address.to_string(),
            standard_contract_type: standard_contract_type.parse()?,
            chain: chain.parse()?,
            method: method.to_string(),
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
            return_value_test: ReturnValueTest {
                comparator: comparator.parse()?,
                value: value.to_string(),
            },
        })
    }

    /// Whether the condition refers to the requesting wallet.
    pub fn references_user(&self) -> bool {
        self.parameters.iter().any(|p| p == USER_ADDRESS_PLACEHOLDER)
    }
}

/// Non-empty, immutable sequence of conditions (conjunction).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AccessControlPolicy {
    conditions: Vec<AccessControlCondition>,
}

impl AccessControlPolicy {
    /// Create a policy. Fails with `InvalidPolicy` on an empty sequence.
    pub fn new(conditions: Vec<AccessControlCondition>) -> Result<Self, VaultError> {
        if conditions.is_empty() {
            return Err(VaultError::InvalidPolicy(
                "policy must contain at least one condition".to_string(),
            ));
        }
        Ok(Self { conditions })
    }

    /// Parse a policy from its JSON wire form.
    pub fn from_json(json: &str) -> Result<Self, VaultError> {
        let conditions: Vec<AccessControlCondition> = serde_json::from_str(json)
            .map_err(|e| VaultError::InvalidPolicy(format!("malformed policy: {e}")))?;
        Self::new(conditions)
    }

    /// Serialize to the JSON wire form.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.conditions).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn conditions(&self) -> &[AccessControlCondition] {
        &self.conditions
    }

    /// Re-check the invariants. Policies built through `new`/`from_json`
    /// always pass; this guards values assembled by deserialization elsewhere.
    pub fn validate(&self) -> Result<(), VaultError> {
        if self.conditions.is_empty() {
            return Err(VaultError::InvalidPolicy(
                "policy must contain at least one condition".to_string(),
            ));
        }
        Ok(())
    }

    /// Hex SHA-256 of the canonical JSON form. The network binds ciphertext
    /// to this value.
    pub fn hash_of_conditions(&self) -> String {
        let digest = Sha256::digest(self.to_json().as_bytes());
        alloy::hex::encode(digest)
    }

    /// Chain of the first condition, used for session and decrypt requests.
    pub fn primary_chain(&self) -> Chain {
        self.conditions[0].chain
    }
}

impl<'de> Deserialize<'de> for AccessControlPolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let conditions = Vec::<AccessControlCondition>::deserialize(deserializer)?;
        AccessControlPolicy::new(conditions).map_err(serde::de::Error::custom)
    }
}

/// Native balance of at least 0.000001 ETH on Ethereum mainnet.
pub fn default_policy() -> AccessControlPolicy {
    AccessControlPolicy {
        conditions: vec![AccessControlCondition::native_balance(
            Chain::Ethereum,
            Comparator::Gte,
            DEFAULT_MIN_BALANCE_WEI,
        )],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_wire_format() {
        let json = default_policy().to_json();
        assert_eq!(
            json,
            r#"[{"contractAddress":"","standardContractType":"","chain":"ethereum","method":"eth_getBalance","parameters":[":userAddress","latest"],"returnValueTest":{"comparator":">=","value":"1000000000000"}}]"#
        );
        assert!(default_policy().validate().is_ok());
        assert!(default_policy().conditions()[0].references_user());
    }

    #[test]
    fn empty_policy_is_rejected() {
        assert!(matches!(
            AccessControlPolicy::new(vec![]),
            Err(VaultError::InvalidPolicy(_))
        ));
        assert!(matches!(
            AccessControlPolicy::from_json("[]"),
            Err(VaultError::InvalidPolicy(_))
        ));
    }

    #[test]
    fn unknown_comparator_or_chain_is_rejected() {
        let bad_comparator = r#"[{"contractAddress":"","standardContractType":"","chain":"ethereum","method":"eth_getBalance","parameters":[":userAddress","latest"],"returnValueTest":{"comparator":"!=","value":"1"}}]"#;
        assert!(matches!(
            AccessControlPolicy::from_json(bad_comparator),
            Err(VaultError::InvalidPolicy(_))
        ));

        let err = AccessControlCondition::parse(
            "",
            "",
            "solana",
            "eth_getBalance",
            &[":userAddress", "latest"],
            ">=",
            "1",
        )
        .unwrap_err();
        assert!(matches!(err, VaultError::InvalidPolicy(_)));
    }

    #[test]
    fn chain_case_is_normalized_on_both_paths() {
        let json = r#"[{"contractAddress":"","standardContractType":"","chain":"Ethereum","method":"eth_getBalance","parameters":[":userAddress","latest"],"returnValueTest":{"comparator":">=","value":"1000000000000"}}]"#;
        let from_json = AccessControlPolicy::from_json(json).unwrap();
        let parsed = AccessControlCondition::parse(
            "",
            "",
            "Ethereum",
            "eth_getBalance",
            &[":userAddress", "latest"],
            ">=",
            "1000000000000",
        )
        .unwrap();
        assert_eq!(from_json.conditions()[0], parsed);
        assert_eq!(from_json, default_policy());
    }

    #[test]
    fn policies_compare_structurally() {
        let parsed = AccessControlPolicy::from_json(&default_policy().to_json()).unwrap();
        assert_eq!(parsed, default_policy());
        assert_eq!(parsed.hash_of_conditions(), default_policy().hash_of_conditions());

        let stricter = AccessControlPolicy::new(vec![AccessControlCondition::native_balance(
            Chain::Ethereum,
            Comparator::Gte,
            "2000000000000",
        )])
        .unwrap();
        assert_ne!(stricter, default_policy());
        assert_ne!(stricter.hash_of_conditions(), default_policy().hash_of_conditions());
    }
}
