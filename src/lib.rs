// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Litvault - Threshold-Encrypted Credential Vault Client
//!
//! Encrypts secrets under on-chain access-control conditions through a
//! Lit-style encryption network. Decryption requires a short-lived session
//! signed by the user's wallet; ciphertext is persisted in a vault store.
//!
//! ## Modules
//!
//! - `policy` - Access-control conditions and the default balance policy
//! - `network` - Encryption network boundary, connection lifecycle, local network
//! - `session` - SIWE/ReCap session issuance
//! - `crypto` - Encrypt/decrypt façade
//! - `vault` - Encrypted payload storage (in-memory and `VaultStorage` contract)
//! - `service` - Credential store/view built on the above
//! - `wallet` - Wallet signer boundary and local key wallet

pub mod config;
pub mod crypto;
pub mod error;
pub mod logging;
pub mod network;
pub mod policy;
pub mod service;
pub mod session;
pub mod vault;
pub mod wallet;

#[cfg(test)]
mod testing;

pub use config::ClientConfig;
pub use crypto::{EncryptedPayload, LitCrypto};
pub use error::{VaultError, VaultResult};
pub use network::{ConnectionState, LocalNetwork, NetworkClient};
pub use policy::{default_policy, AccessControlCondition, AccessControlPolicy};
pub use service::{Credential, VaultService};
pub use session::{Session, SessionManager};
pub use vault::{ContractVault, InMemoryVault, VaultStore};
pub use wallet::{LocalWallet, WalletSigner};
