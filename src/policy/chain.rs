// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain, contract type and comparator vocabularies used by access-control
//! conditions.
//!
//! All three enums serialize to the exact strings the encryption network
//! expects and reject anything else on parse.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VaultError;

/// EVM chains accepted in access-control conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Chain {
    Ethereum,
    Polygon,
    Fantom,
    Xdai,
    Bsc,
    Arbitrum,
    Avalanche,
    Fuji,
    Harmony,
    Mumbai,
    Goerli,
    Cronos,
    Optimism,
    Celo,
}

impl Chain {
    /// Every supported chain, in declaration order.
    pub const ALL: [Chain; 14] = [
        Chain::Ethereum,
        Chain::Polygon,
        Chain::Fantom,
        Chain::Xdai,
        Chain::Bsc,
        Chain::Arbitrum,
        Chain::Avalanche,
        Chain::Fuji,
        Chain::Harmony,
        Chain::Mumbai,
        Chain::Goerli,
        Chain::Cronos,
        Chain::Optimism,
        Chain::Celo,
    ];

    /// Wire name of the chain.
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Ethereum => "ethereum",
            Chain::Polygon => "polygon",
            Chain::Fantom => "fantom",
            Chain::Xdai => "xdai",
            Chain::Bsc => "bsc",
            Chain::Arbitrum => "arbitrum",
            Chain::Avalanche => "avalanche",
            Chain::Fuji => "fuji",
            Chain::Harmony => "harmony",
            Chain::Mumbai => "mumbai",
            Chain::Goerli => "goerli",
            Chain::Cronos => "cronos",
            Chain::Optimism => "optimism",
            Chain::Celo => "celo",
        }
    }

    /// EIP-155 chain id.
    pub fn chain_id(&self) -> u64 {
        match self {
            Chain::Ethereum => 1,
            Chain::Polygon => 137,
            Chain::Fantom => 250,
            Chain::Xdai => 100,
            Chain::Bsc => 56,
            Chain::Arbitrum => 42161,
            Chain::Avalanche => 43114,
            Chain::Fuji => 43113,
            Chain::Harmony => 1_666_600_000,
            Chain::Mumbai => 80001,
            Chain::Goerli => 5,
            Chain::Cronos => 25,
            Chain::Optimism => 10,
            Chain::Celo => 42220,
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chain {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_ascii_lowercase();
        Chain::ALL
            .into_iter()
            .find(|chain| chain.as_str() == value)
            .ok_or_else(|| VaultError::InvalidPolicy(format!("unsupported chain `{s}`")))
    }
}

impl TryFrom<String> for Chain {
    type Error = VaultError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Standard contract type of a condition. The empty string means the
/// chain's native asset (or a raw RPC method).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StandardContractType {
    #[default]
    #[serde(rename = "")]
    Native,
    #[serde(rename = "ERC20")]
    Erc20,
    #[serde(rename = "ERC721")]
    Erc721,
    #[serde(rename = "ERC721MetadataName")]
    Erc721MetadataName,
    #[serde(rename = "ERC1155")]
    Erc1155,
    #[serde(rename = "CASK")]
    Cask,
    #[serde(rename = "Creaton")]
    Creaton,
    #[serde(rename = "POAP")]
    Poap,
    #[serde(rename = "timestamp")]
    Timestamp,
    #[serde(rename = "MolochDAOv2.1")]
    MolochDaoV21,
    #[serde(rename = "ProofOfHumanity")]
    ProofOfHumanity,
    #[serde(rename = "SIWE")]
    Siwe,
    #[serde(rename = "PKPPermissions")]
    PkpPermissions,
    #[serde(rename = "LitAction")]
    LitAction,
}

impl StandardContractType {
    const ALL: [StandardContractType; 14] = [
        StandardContractType::Native,
        StandardContractType::Erc20,
        StandardContractType::Erc721,
        StandardContractType::Erc721MetadataName,
        StandardContractType::Erc1155,
        StandardContractType::Cask,
        StandardContractType::Creaton,
        StandardContractType::Poap,
        StandardContractType::Timestamp,
        StandardContractType::MolochDaoV21,
        StandardContractType::ProofOfHumanity,
        StandardContractType::Siwe,
        StandardContractType::PkpPermissions,
        StandardContractType::LitAction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StandardContractType::Native => "",
            StandardContractType::Erc20 => "ERC20",
            StandardContractType::Erc721 => "ERC721",
            StandardContractType::Erc721MetadataName => "ERC721MetadataName",
            StandardContractType::Erc1155 => "ERC1155",
            StandardContractType::Cask => "CASK",
            StandardContractType::Creaton => "Creaton",
            StandardContractType::Poap => "POAP",
            StandardContractType::Timestamp => "timestamp",
            StandardContractType::MolochDaoV21 => "MolochDAOv2.1",
            StandardContractType::ProofOfHumanity => "ProofOfHumanity",
            StandardContractType::Siwe => "SIWE",
            StandardContractType::PkpPermissions => "PKPPermissions",
            StandardContractType::LitAction => "LitAction",
        }
    }
}

impl FromStr for StandardContractType {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StandardContractType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| VaultError::InvalidPolicy(format!("unknown contract type `{s}`")))
    }
}

/// Comparator of a `returnValueTest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
}

impl Comparator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparator::Contains => "contains",
            Comparator::Eq => "=",
            Comparator::Gt => ">",
            Comparator::Gte => ">=",
            Comparator::Lt => "<",
            Comparator::Lte => "<=",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Comparator {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "contains" => Ok(Comparator::Contains),
            "=" => Ok(Comparator::Eq),
            ">" => Ok(Comparator::Gt),
            ">=" => Ok(Comparator::Gte),
            "<" => Ok(Comparator::Lt),
            "<=" => Ok(Comparator::Lte),
            other => Err(VaultError::InvalidPolicy(format!(
                "unrecognized comparator `{other}`"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_parse_is_case_insensitive() {
        assert_eq!("Ethereum".parse::<Chain>().unwrap(), Chain::Ethereum);
        assert_eq!(" fuji ".parse::<Chain>().unwrap(), Chain::Fuji);
        assert!(matches!(
            "solana".parse::<Chain>(),
            Err(VaultError::InvalidPolicy(_))
        ));
    }

    #[test]
    fn chain_json_accepts_what_from_str_accepts() {
        let parsed: Chain = serde_json::from_str(r#""Ethereum""#).unwrap();
        assert_eq!(parsed, Chain::Ethereum);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), r#""ethereum""#);
        assert!(serde_json::from_str::<Chain>(r#""solana""#).is_err());
    }

    #[test]
    fn chain_ids_are_distinct() {
        let mut ids: Vec<u64> = Chain::ALL.iter().map(Chain::chain_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), Chain::ALL.len());
    }

    #[test]
    fn comparator_rejects_unknown_symbols() {
        assert_eq!(">=".parse::<Comparator>().unwrap(), Comparator::Gte);
        assert!("!=".parse::<Comparator>().is_err());
        assert!("==".parse::<Comparator>().is_err());
    }

    #[test]
    fn native_contract_type_serializes_as_empty_string() {
        let json = serde_json::to_string(&StandardContractType::Native).unwrap();
        assert_eq!(json, r#""""#);
        let parsed: StandardContractType = serde_json::from_str(r#""MolochDAOv2.1""#).unwrap();
        assert_eq!(parsed, StandardContractType::MolochDaoV21);
        assert_eq!("".parse::<StandardContractType>().unwrap(), StandardContractType::Native);
    }
}
