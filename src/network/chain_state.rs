// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! On-chain state lookups used when a network node evaluates conditions.

use std::collections::HashMap;
use std::sync::RwLock;

use alloy::{
    network::Ethereum,
    primitives::{Address, U256},
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    sol,
};
use async_trait::async_trait;

use crate::policy::Chain;

sol! {
    #[sol(rpc)]
    interface IBalanceOf {
        function balanceOf(address account) external view returns (uint256);
    }
}

/// HTTP provider type (with the recommended fillers).
type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// Errors from chain state lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainStateError {
    #[error("no RPC endpoint configured for chain {0}")]
    UnsupportedChain(Chain),

    #[error("invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("RPC error: {0}")]
    Rpc(String),
}

/// Read-only view of chain state.
#[async_trait]
pub trait ChainStateReader: Send + Sync {
    /// Native asset balance in the chain's smallest unit.
    async fn native_balance(&self, chain: Chain, account: Address) -> Result<U256, ChainStateError>;

    /// `balanceOf(account)` on an ERC-20 or ERC-721 contract.
    async fn token_balance(
        &self,
        chain: Chain,
        contract: Address,
        account: Address,
    ) -> Result<U256, ChainStateError>;
}

/// In-memory chain state. Unknown accounts hold zero.
#[derive(Debug, Default)]
pub struct StaticChainState {
    native: RwLock<HashMap<(Chain, Address), U256>>,
    tokens: RwLock<HashMap<(Chain, Address, Address), U256>>,
}

impl StaticChainState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_native_balance(self, chain: Chain, account: Address, amount: U256) -> Self {
        self.set_native_balance(chain, account, amount);
        self
    }

    pub fn set_native_balance(&self, chain: Chain, account: Address, amount: U256) {
        if let Ok(mut native) = self.native.write() {
            native.insert((chain, account), amount);
        }
    }

    pub fn set_token_balance(&self, chain: Chain, contract: Address, account: Address, amount: U256) {
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.insert((chain, contract, account), amount);
        }
    }
}

#[async_trait]
impl ChainStateReader for StaticChainState {
    async fn native_balance(&self, chain: Chain, account: Address) -> Result<U256, ChainStateError> {
        let native = self
            .native
            .read()
            .map_err(|e| ChainStateError::Rpc(e.to_string()))?;
        Ok(native.get(&(chain, account)).copied().unwrap_or(U256::ZERO))
    }

    async fn token_balance(
        &self,
        chain: Chain,
        contract: Address,
        account: Address,
    ) -> Result<U256, ChainStateError> {
        let tokens = self
            .tokens
            .read()
            .map_err(|e| ChainStateError::Rpc(e.to_string()))?;
        Ok(tokens
            .get(&(chain, contract, account))
            .copied()
            .unwrap_or(U256::ZERO))
    }
}

/// Chain state read over JSON-RPC, one HTTP provider per configured chain.
pub struct RpcChainState {
    providers: HashMap<Chain, HttpProvider>,
}

impl RpcChainState {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Register an RPC endpoint for a chain.
    pub fn with_endpoint(self, chain: Chain, rpc_url: &str) -> Result<Self, ChainStateError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainStateError::InvalidRpcUrl(e.to_string()))?;

        Ok(self.with_provider(chain, ProviderBuilder::new().connect_http(url)))
    }

    fn with_provider(mut self, chain: Chain, provider: HttpProvider) -> Self {
        self.providers.insert(chain, provider);
        self
    }

    fn provider(&self, chain: Chain) -> Result<&HttpProvider, ChainStateError> {
        self.providers
            .get(&chain)
            .ok_or(ChainStateError::UnsupportedChain(chain))
    }
}

impl Default for RpcChainState {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChainStateReader for RpcChainState {
    async fn native_balance(&self, chain: Chain, account: Address) -> Result<U256, ChainStateError> {
        self.provider(chain)?
            .get_balance(account)
            .await
            .map_err(|e| ChainStateError::Rpc(e.to_string()))
    }

    async fn token_balance(
        &self,
        chain: Chain,
        contract: Address,
        account: Address,
    ) -> Result<U256, ChainStateError> {
        let provider = self.provider(chain)?;
        let instance = IBalanceOf::new(contract, provider.clone());
        instance
            .balanceOf(account)
            .call()
            .await
            .map_err(|e| ChainStateError::Rpc(e.to_string()))
    }
}
