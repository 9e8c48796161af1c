// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Provider Boundary
//!
//! The session flow needs two things from a wallet: its address and a
//! personal-sign (EIP-191) signature over a challenge. Both may suspend for
//! user approval and both may be rejected.
//!
//! Browser wallets, hardware wallets and local keys all plug in through
//! [`WalletSigner`]. [`LocalWallet`] is the key-in-process implementation.

pub mod local;

use alloy::primitives::Address;
use async_trait::async_trait;

pub use local::LocalWallet;

/// Errors a wallet can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    /// The user declined the request (closed the prompt, clicked reject).
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The wallet is gone or cannot serve requests.
    #[error("wallet unavailable: {0}")]
    Unavailable(String),

    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("signing failed: {0}")]
    Signing(String),
}

/// Injected wallet capability.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Address of the active account.
    async fn address(&self) -> Result<Address, WalletError>;

    /// EIP-191 signature over `message`, as 0x-prefixed 65-byte hex.
    async fn sign_message(&self, message: &str) -> Result<String, WalletError>;
}
