// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process encryption network.
//!
//! Emulates a single-node `datil-dev` deployment entirely in memory:
//!
//! - **Blockhash nonces**: issued per request and remembered so a challenge
//!   can only be signed over a nonce this network handed out.
//! - **Sessions**: the SIWE challenge is verified by signer recovery, nonce,
//!   URI, chain id, expiration and ReCap abilities; the grant is then bound to
//!   the node with HMAC-SHA256.
//! - **Encryption**: AES-256-GCM under `HMAC-SHA256(secret, identity)` with
//!   `identity = lit-accesscontrolcondition://{hashOfConditions}/{dataHash}`
//!   used as associated data. A tampered hash or policy therefore fails
//!   authentication instead of yielding plaintext.
//! - **Conditions**: evaluated against a [`ChainStateReader`] before any key
//!   is derived for decryption.

use std::collections::{BTreeMap, VecDeque};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, Signature, U256};
use async_trait::async_trait;
use base64ct::{Base64, Encoding};
use chrono::Utc;
use hmac::{Hmac, Mac};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::chain_state::ChainStateReader;
use super::types::*;
use super::{AuthNeededCallback, EncryptionNetwork};
use crate::config::{
    ClientConfig, ConfigError, LIT_NETWORK_ENV, LIT_NETWORK_SECRET_ENV, VAULT_CONTRACT_ENV,
};
use crate::crypto::data_to_encrypt_hash;
use crate::policy::{
    AccessControlCondition, AccessControlPolicy, Comparator, StandardContractType,
    USER_ADDRESS_PLACEHOLDER,
};
use crate::session::siwe::SiweMessage;

type HmacSha256 = Hmac<Sha256>;

/// Identifier of the single emulated node.
pub const LOCAL_NODE_URL: &str = "local://node-0";

/// How many issued nonces stay valid for signing.
const NONCE_WINDOW: usize = 32;

/// AES-GCM tag length.
const TAG_LEN: usize = 16;

/// Single-node network emulation.
pub struct LocalNetwork {
    network: LitNetwork,
    chain_state: Arc<dyn ChainStateReader>,
    secret: [u8; 32],
    rng: SystemRandom,
    reachable: AtomicBool,
    blockhash_available: AtomicBool,
    connected: AtomicBool,
    handshakes: AtomicUsize,
    block_counter: AtomicU64,
    issued_nonces: Mutex<VecDeque<String>>,
}

impl LocalNetwork {
    /// Create a network with a freshly generated secret.
    pub fn new(chain_state: Arc<dyn ChainStateReader>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(Uuid::new_v4().as_bytes());
        hasher.update(Uuid::new_v4().as_bytes());
        Self::with_secret(chain_state, hasher.finalize().into())
    }

    /// Create a network with a fixed secret. Two instances with the same
    /// secret decrypt each other's ciphertext.
    pub fn with_secret(chain_state: Arc<dyn ChainStateReader>, secret: [u8; 32]) -> Self {
        Self {
            network: LitNetwork::DatilDev,
            chain_state,
            secret,
            rng: SystemRandom::new(),
            reachable: AtomicBool::new(true),
            blockhash_available: AtomicBool::new(true),
            connected: AtomicBool::new(false),
            handshakes: AtomicUsize::new(0),
            block_counter: AtomicU64::new(0),
            issued_nonces: Mutex::new(VecDeque::with_capacity(NONCE_WINDOW)),
        }
    }

    /// Network for `config`. Only `datil-dev` runs in process, and a
    /// contract-backed vault requires `LIT_NETWORK_SECRET`.
    pub fn from_config(
        chain_state: Arc<dyn ChainStateReader>,
        config: &ClientConfig,
    ) -> Result<Self, ConfigError> {
        if config.lit_network != LitNetwork::DatilDev {
            return Err(ConfigError::Invalid {
                var: LIT_NETWORK_ENV,
                reason: format!(
                    "`{}` is not available in process, only `{}`",
                    config.lit_network,
                    LitNetwork::DatilDev
                ),
            });
        }

        match &config.network_secret {
            Some(secret) => Ok(Self::with_secret(chain_state, secret.to_bytes())),
            None if config.uses_contract_vault() => Err(ConfigError::Invalid {
                var: LIT_NETWORK_SECRET_ENV,
                reason: format!("required when {VAULT_CONTRACT_ENV} is set"),
            }),
            None => Ok(Self::new(chain_state)),
        }
    }

    /// Simulate the nodes going offline (or coming back).
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
        if !reachable {
            self.connected.store(false, Ordering::SeqCst);
        }
    }

    /// Simulate the blockhash endpoint failing.
    pub fn set_blockhash_available(&self, available: bool) {
        self.blockhash_available.store(available, Ordering::SeqCst);
    }

    /// Number of successful handshakes performed.
    pub fn handshake_count(&self) -> usize {
        self.handshakes.load(Ordering::SeqCst)
    }

    fn ensure_connected(&self) -> Result<(), NetworkError> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(NetworkError::NotConnected)
        }
    }

    fn mac(&self, key: &[u8], parts: &[&[u8]]) -> Result<HmacSha256, NetworkError> {
        let mut mac = HmacSha256::new_from_slice(key)
            .map_err(|e| NetworkError::Encryption(e.to_string()))?;
        for part in parts {
            mac.update(part);
        }
        Ok(mac)
    }

    fn node_key(&self) -> Result<Vec<u8>, NetworkError> {
        Ok(self
            .mac(&self.secret, &[b"session-grant"])?
            .finalize()
            .into_bytes()
            .to_vec())
    }

    fn symmetric_key(&self, identity: &str) -> Result<LessSafeKey, NetworkError> {
        let key_bytes = self
            .mac(&self.secret, &[b"decryption-key", identity.as_bytes()])?
            .finalize()
            .into_bytes();
        let unbound = UnboundKey::new(&AES_256_GCM, &key_bytes)
            .map_err(|_| NetworkError::Encryption("key derivation failed".to_string()))?;
        Ok(LessSafeKey::new(unbound))
    }

    fn grant_bytes(session: &SessionSigsGrant<'_>) -> Result<Vec<u8>, NetworkError> {
        serde_json::to_vec(&(
            session.session_key,
            session.address,
            session.capabilities,
            session.expiration,
        ))
        .map_err(|e| NetworkError::SessionRejected(e.to_string()))
    }

    fn sign_grant(&self, grant: &SessionSigsGrant<'_>) -> Result<String, NetworkError> {
        let bytes = Self::grant_bytes(grant)?;
        let tag = self.mac(&self.node_key()?, &[&bytes])?.finalize().into_bytes();
        Ok(alloy::hex::encode(tag))
    }

    fn verify_grant(&self, session: &SessionSigs) -> Result<(), NetworkError> {
        let signature = session
            .node_signatures
            .get(LOCAL_NODE_URL)
            .ok_or_else(|| NetworkError::SessionRejected("missing node signature".to_string()))?;
        let tag = alloy::hex::decode(signature)
            .map_err(|_| NetworkError::SessionRejected("malformed node signature".to_string()))?;

        let grant = SessionSigsGrant {
            session_key: &session.session_key,
            address: &session.address,
            capabilities: &session.capabilities,
            expiration: &session.expiration,
        };
        let bytes = Self::grant_bytes(&grant)?;
        self.mac(&self.node_key()?, &[&bytes])?
            .verify_slice(&tag)
            .map_err(|_| NetworkError::SessionRejected("invalid node signature".to_string()))
    }

    fn remember_nonce(&self, nonce: &str) {
        if let Ok(mut nonces) = self.issued_nonces.lock() {
            if nonces.len() == NONCE_WINDOW {
                nonces.pop_front();
            }
            nonces.push_back(nonce.to_string());
        }
    }

    fn nonce_was_issued(&self, nonce: &str) -> bool {
        self.issued_nonces
            .lock()
            .map(|nonces| nonces.iter().any(|n| n == nonce))
            .unwrap_or(false)
    }

    fn verify_auth_sig(
        &self,
        auth_sig: &AuthSig,
        request: &SessionSigsRequest,
        uri: &str,
    ) -> Result<Address, NetworkError> {
        let rejected = |reason: &str| NetworkError::SessionRejected(reason.to_string());

        let message = SiweMessage::from_str(&auth_sig.signed_message)
            .map_err(|e| NetworkError::SessionRejected(format!("malformed challenge: {e}")))?;

        let sig_bytes = alloy::hex::decode(&auth_sig.sig).map_err(|_| rejected("malformed signature"))?;
        let signature =
            Signature::try_from(sig_bytes.as_slice()).map_err(|_| rejected("malformed signature"))?;
        let recovered = signature
            .recover_address_from_msg(auth_sig.signed_message.as_bytes())
            .map_err(|_| rejected("signature recovery failed"))?;

        let claimed = Address::from_str(&auth_sig.address).map_err(|_| rejected("malformed address"))?;
        if recovered != message.address || recovered != claimed {
            return Err(rejected("signature does not match the signing address"));
        }
        if message.uri != uri {
            return Err(rejected("challenge uri mismatch"));
        }
        if message.chain_id != request.chain.chain_id() {
            return Err(rejected("challenge chain id mismatch"));
        }
        if message.is_expired(Utc::now()) {
            return Err(rejected("challenge expired"));
        }
        if !self.nonce_was_issued(&message.nonce) {
            return Err(rejected("unknown or stale nonce"));
        }

        let recap = message
            .recap()
            .map_err(|e| NetworkError::SessionRejected(e.to_string()))?
            .ok_or_else(|| rejected("challenge carries no capabilities"))?;
        let granted = recap.abilities();
        let all_granted = request
            .resource_ability_requests
            .iter()
            .all(|requested| granted.contains(requested));
        if !all_granted {
            return Err(rejected("challenge does not delegate the requested abilities"));
        }

        Ok(recovered)
    }

    async fn evaluate_policy(
        &self,
        policy: &AccessControlPolicy,
        user: Address,
    ) -> Result<(), NetworkError> {
        for condition in policy.conditions() {
            if !self.evaluate_condition(condition, user).await? {
                return Err(NetworkError::AccessDenied(format!(
                    "condition `{} {} {}` on {} not satisfied",
                    condition.method,
                    condition.return_value_test.comparator,
                    condition.return_value_test.value,
                    condition.chain
                )));
            }
        }
        Ok(())
    }

    async fn evaluate_condition(
        &self,
        condition: &AccessControlCondition,
        user: Address,
    ) -> Result<bool, NetworkError> {
        let user_hex = user.to_checksum(None);
        let params: Vec<String> = condition
            .parameters
            .iter()
            .map(|p| {
                if p == USER_ADDRESS_PLACEHOLDER {
                    user_hex.clone()
                } else {
                    p.clone()
                }
            })
            .collect();
        let first_param_address = || {
            params
                .first()
                .and_then(|p| Address::from_str(p).ok())
                .ok_or_else(|| NetworkError::AccessDenied("condition parameter is not an address".to_string()))
        };
        let chain_error = |e: super::ChainStateError| NetworkError::Transport(e.to_string());

        let actual = match (condition.standard_contract_type, condition.method.as_str()) {
            (StandardContractType::Native, "eth_getBalance") => self
                .chain_state
                .native_balance(condition.chain, first_param_address()?)
                .await
                .map_err(chain_error)?
                .to_string(),
            (StandardContractType::Native, "") => params.first().cloned().unwrap_or_default(),
            (StandardContractType::Erc20 | StandardContractType::Erc721, "balanceOf") => {
                let contract = Address::from_str(&condition.contract_address).map_err(|_| {
                    NetworkError::AccessDenied("invalid contract address".to_string())
                })?;
                self.chain_state
                    .token_balance(condition.chain, contract, first_param_address()?)
                    .await
                    .map_err(chain_error)?
                    .to_string()
            }
            (StandardContractType::Timestamp, "eth_getBlockByNumber") => {
                Utc::now().timestamp().to_string()
            }
            (kind, method) => {
                return Err(NetworkError::AccessDenied(format!(
                    "unsupported condition `{}`/`{method}`",
                    kind.as_str()
                )))
            }
        };

        Ok(compare(
            condition.return_value_test.comparator,
            &actual,
            &condition.return_value_test.value,
        ))
    }
}

/// Fields of a session grant covered by the node signature.
struct SessionSigsGrant<'a> {
    session_key: &'a str,
    address: &'a Address,
    capabilities: &'a [ResourceAbilityRequest],
    expiration: &'a chrono::DateTime<Utc>,
}

fn parse_uint(value: &str) -> Option<U256> {
    U256::from_str(value.trim()).ok()
}

/// Apply a return-value comparator. Numeric when both sides parse as
/// unsigned integers, string otherwise (only `=` and `contains`).
fn compare(comparator: Comparator, actual: &str, expected: &str) -> bool {
    let numeric = parse_uint(actual)
        .zip(parse_uint(expected))
        .map(|(a, b)| a.cmp(&b));

    match comparator {
        Comparator::Contains => actual.contains(expected),
        Comparator::Eq => numeric.map_or_else(|| actual.eq_ignore_ascii_case(expected), |o| o.is_eq()),
        Comparator::Gt => numeric.is_some_and(|o| o.is_gt()),
        Comparator::Gte => numeric.is_some_and(|o| o.is_ge()),
        Comparator::Lt => numeric.is_some_and(|o| o.is_lt()),
        Comparator::Lte => numeric.is_some_and(|o| o.is_le()),
    }
}

fn identity(policy: &AccessControlPolicy, data_to_encrypt_hash: &str) -> String {
    format!(
        "{ACC_RESOURCE_PREFIX}{}/{}",
        policy.hash_of_conditions(),
        data_to_encrypt_hash
    )
}

#[async_trait]
impl EncryptionNetwork for LocalNetwork {
    fn network(&self) -> LitNetwork {
        self.network
    }

    async fn connect(&self) -> Result<(), NetworkError> {
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(NetworkError::Transport("nodes unreachable".to_string()));
        }
        self.connected.store(true, Ordering::SeqCst);
        self.handshakes.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(node = LOCAL_NODE_URL, "Handshake complete");
        Ok(())
    }

    async fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    async fn latest_blockhash(&self) -> Result<String, NetworkError> {
        self.ensure_connected()?;
        if !self.blockhash_available.load(Ordering::SeqCst) {
            return Err(NetworkError::BlockhashUnavailable);
        }

        let height = self.block_counter.fetch_add(1, Ordering::SeqCst);
        let mut hasher = Sha256::new();
        hasher.update(self.secret);
        hasher.update(height.to_be_bytes());
        hasher.update(Utc::now().timestamp_millis().to_be_bytes());
        let blockhash = alloy::hex::encode_prefixed(hasher.finalize());

        self.remember_nonce(&blockhash);
        Ok(blockhash)
    }

    async fn encrypt_string(
        &self,
        request: EncryptRequest<'_>,
    ) -> Result<EncryptResponse, NetworkError> {
        self.ensure_connected()?;

        let data_to_encrypt_hash = data_to_encrypt_hash(request.plaintext);
        let identity = identity(request.policy, &data_to_encrypt_hash);
        let key = self.symmetric_key(&identity)?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| NetworkError::Encryption("randomness unavailable".to_string()))?;

        let mut in_out = request.plaintext.as_bytes().to_vec();
        key.seal_in_place_append_tag(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::from(identity.as_bytes()),
            &mut in_out,
        )
        .map_err(|_| NetworkError::Encryption("seal failed".to_string()))?;

        let mut framed = Vec::with_capacity(NONCE_LEN + in_out.len());
        framed.extend_from_slice(&nonce_bytes);
        framed.extend_from_slice(&in_out);

        Ok(EncryptResponse {
            ciphertext: Base64::encode_string(&framed),
            data_to_encrypt_hash,
        })
    }

    async fn decrypt_to_string(&self, request: DecryptRequest<'_>) -> Result<String, NetworkError> {
        self.ensure_connected()?;

        let session = request.session;
        self.verify_grant(session)?;
        if session.is_expired(Utc::now()) {
            return Err(NetworkError::SessionRejected("session expired".to_string()));
        }

        let resource_id = request.policy.hash_of_conditions();
        let covered = session
            .capabilities
            .iter()
            .any(|grant| grant.covers(&resource_id, LitAbility::AccessControlConditionDecryption));
        if !covered {
            return Err(NetworkError::AccessDenied(
                "session does not grant decryption for this policy".to_string(),
            ));
        }

        self.evaluate_policy(request.policy, session.address).await?;

        let framed = Base64::decode_vec(request.ciphertext.trim())
            .map_err(|_| NetworkError::IntegrityMismatch)?;
        if framed.len() < NONCE_LEN + TAG_LEN {
            return Err(NetworkError::IntegrityMismatch);
        }
        let (nonce_bytes, sealed) = framed.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| NetworkError::IntegrityMismatch)?;

        let identity = identity(request.policy, request.data_to_encrypt_hash);
        let key = self.symmetric_key(&identity)?;
        let mut in_out = sealed.to_vec();
        let plaintext = key
            .open_in_place(nonce, Aad::from(identity.as_bytes()), &mut in_out)
            .map_err(|_| NetworkError::IntegrityMismatch)?;

        String::from_utf8(plaintext.to_vec()).map_err(|_| NetworkError::IntegrityMismatch)
    }

    async fn get_session_sigs(
        &self,
        request: SessionSigsRequest,
        callback: &dyn AuthNeededCallback,
    ) -> Result<SessionSigs, NetworkError> {
        self.ensure_connected()?;

        let session_key = Uuid::new_v4().to_string();
        let uri = format!("lit:session:{session_key}");
        let params = AuthCallbackParams {
            uri: uri.clone(),
            expiration: request.expiration,
            resource_ability_requests: request.resource_ability_requests.clone(),
        };

        let auth_sig = callback.authenticate(params).await?;
        let address = self.verify_auth_sig(&auth_sig, &request, &uri)?;

        let grant = SessionSigsGrant {
            session_key: &session_key,
            address: &address,
            capabilities: &request.resource_ability_requests,
            expiration: &request.expiration,
        };
        let node_signature = self.sign_grant(&grant)?;

        tracing::debug!(%address, "Session grant issued");

        Ok(SessionSigs {
            session_key,
            address,
            capabilities: request.resource_ability_requests,
            expiration: request.expiration,
            auth_sig,
            node_signatures: BTreeMap::from([(LOCAL_NODE_URL.to_string(), node_signature)]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkSecret;
    use crate::network::StaticChainState;
    use crate::policy::{default_policy, Chain};

    #[test]
    fn comparator_semantics() {
        assert!(compare(Comparator::Gte, "1000000000000", "1000000000000"));
        assert!(!compare(Comparator::Gte, "999999999999", "1000000000000"));
        assert!(compare(Comparator::Lt, "0x10", "17"));
        assert!(compare(Comparator::Eq, "0xAbC", "0xabc"));
        assert!(!compare(Comparator::Gt, "0xabc", "zzz"));
        assert!(compare(Comparator::Contains, "hello world", "world"));
    }

    #[tokio::test]
    async fn operations_require_connection() {
        let network = LocalNetwork::new(Arc::new(StaticChainState::new()));
        assert_eq!(
            network.latest_blockhash().await.unwrap_err(),
            NetworkError::NotConnected
        );

        let policy = default_policy();
        let err = network
            .encrypt_string(EncryptRequest {
                policy: &policy,
                plaintext: "secret",
            })
            .await
            .unwrap_err();
        assert_eq!(err, NetworkError::NotConnected);
    }

    #[test]
    fn from_config_serves_only_the_dev_network() {
        let state: Arc<dyn ChainStateReader> = Arc::new(StaticChainState::new());
        let config = ClientConfig {
            lit_network: LitNetwork::Datil,
            ..ClientConfig::default()
        };
        let err = LocalNetwork::from_config(state.clone(), &config).err();
        assert!(matches!(err, Some(ConfigError::Invalid { var: LIT_NETWORK_ENV, .. })));

        let network = LocalNetwork::from_config(state, &ClientConfig::default()).unwrap();
        assert_eq!(network.network(), LitNetwork::DatilDev);
    }

    #[test]
    fn contract_vault_requires_fixed_secret() {
        let state: Arc<dyn ChainStateReader> = Arc::new(StaticChainState::new());
        let mut config = ClientConfig {
            vault_contract: Some(Address::repeat_byte(0x55)),
            vault_rpc_url: Some("http://127.0.0.1:8545".parse().unwrap()),
            ..ClientConfig::default()
        };
        let err = LocalNetwork::from_config(state.clone(), &config).err();
        assert!(matches!(err, Some(ConfigError::Invalid { var: LIT_NETWORK_SECRET_ENV, .. })));

        config.network_secret = Some(NetworkSecret::new([0x11; 32]));
        assert!(LocalNetwork::from_config(state, &config).is_ok());
    }

    #[tokio::test]
    async fn encryption_uses_fresh_nonces() {
        let network = LocalNetwork::new(Arc::new(StaticChainState::new()));
        network.connect().await.unwrap();
        let policy = default_policy();

        let a = network
            .encrypt_string(EncryptRequest { policy: &policy, plaintext: "same" })
            .await
            .unwrap();
        let b = network
            .encrypt_string(EncryptRequest { policy: &policy, plaintext: "same" })
            .await
            .unwrap();

        assert_ne!(a.ciphertext, b.ciphertext);
        assert_eq!(a.data_to_encrypt_hash, b.data_to_encrypt_hash);
        assert_eq!(a.data_to_encrypt_hash, data_to_encrypt_hash("same"));
    }

    #[tokio::test]
    async fn blockhashes_are_unique_and_remembered() {
        let network = LocalNetwork::new(Arc::new(StaticChainState::new()));
        network.connect().await.unwrap();

        let first = network.latest_blockhash().await.unwrap();
        let second = network.latest_blockhash().await.unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with("0x") && first.len() == 66);
        assert!(network.nonce_was_issued(&first));
        assert!(!network.nonce_was_issued("0xfeed"));

        network.set_blockhash_available(false);
        assert_eq!(
            network.latest_blockhash().await.unwrap_err(),
            NetworkError::BlockhashUnavailable
        );
    }

    #[tokio::test]
    async fn balance_condition_uses_chain_state() {
        let rich = Address::repeat_byte(0x01);
        let poor = Address::repeat_byte(0x02);
        let state = StaticChainState::new()
            .with_native_balance(Chain::Ethereum, rich, U256::from(1_000_000_000_000u64))
            .with_native_balance(Chain::Ethereum, poor, U256::from(999_999_999_999u64));
        let network = LocalNetwork::new(Arc::new(state));
        let policy = default_policy();

        assert!(network.evaluate_policy(&policy, rich).await.is_ok());
        assert!(matches!(
            network.evaluate_policy(&policy, poor).await,
            Err(NetworkError::AccessDenied(_))
        ));
    }

    #[tokio::test]
    async fn address_and_token_conditions() {
        let user = Address::repeat_byte(0x0a);
        let token = Address::repeat_byte(0x0b);
        let state = StaticChainState::new();
        state.set_token_balance(Chain::Polygon, token, user, U256::from(5u64));
        let network = LocalNetwork::new(Arc::new(state));

        let owner_only = AccessControlPolicy::new(vec![AccessControlCondition::parse(
            "",
            "",
            "ethereum",
            "",
            &[":userAddress"],
            "=",
            &user.to_string(),
        )
        .unwrap()])
        .unwrap();
        assert!(network.evaluate_policy(&owner_only, user).await.is_ok());
        assert!(network
            .evaluate_policy(&owner_only, Address::repeat_byte(0x0c))
            .await
            .is_err());

        let holder = AccessControlPolicy::new(vec![AccessControlCondition::parse(
            &token.to_string(),
            "ERC20",
            "polygon",
            "balanceOf",
            &[":userAddress"],
            ">",
            "0",
        )
        .unwrap()])
        .unwrap();
        assert!(network.evaluate_policy(&holder, user).await.is_ok());
    }
}
