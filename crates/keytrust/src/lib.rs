//! Keytrust root library
//!
//! Wiring for the `keytrust` binary: configuration, selection of the crypto
//! back-end, and JSON entry points for key derivation and credential trust
//! verification.
//!
//! The back-end is chosen once, in `initialize_root`, and carried in
//! `RootState`; nothing in the process looks it up globally.

pub mod config;
pub mod error;

pub use config::{CryptoConfig, DerivationConfig, RootConfig};
pub use error::{RootError, RootResult};

use keytrust_sdk::{
    BatchData, BatchInclusion, CredentialData, KeyData, SignedCredential, TrustVerifier,
    VerificationResult,
};
use keytrust_vault::{CryptoContext, DerivationPath, KeyDerivation, MnemonicCode};
use serde::{Deserialize, Serialize};
use tracing::info;

// ---------------------------------------------------------------------------
// Root state
// ---------------------------------------------------------------------------

/// Runtime state built from a validated configuration.
#[derive(Debug, Clone)]
pub struct RootState {
    pub config: RootConfig,
    pub context: CryptoContext,
    pub verifier: TrustVerifier,
}

pub fn initialize_root(config: RootConfig) -> RootResult<RootState> {
    config.validate()?;

    info!(
        backend = %config.crypto.backend,
        default_path = %config.derivation.default_path,
        "initializing keytrust"
    );

    let context = CryptoContext::from_kind(config.crypto.backend);
    let verifier = TrustVerifier::new(context.clone());
    Ok(RootState {
        config,
        context,
        verifier,
    })
}

// ---------------------------------------------------------------------------
// Verification requests
// ---------------------------------------------------------------------------

/// Everything the ledger collaborator knows about one credential.
///
/// `batch` and `inclusion` are present only for batched credentials. An
/// inclusion without a batch lifecycle is checked against an unrevoked batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRequest {
    pub key: KeyData,
    pub credential_data: CredentialData,
    /// Canonical `content.signature` form.
    pub credential: SignedCredential,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<BatchData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclusion: Option<BatchInclusion>,
}

pub fn handle_verification(state: &RootState, request: &VerificationRequest) -> VerificationResult {
    match (&request.batch, &request.inclusion) {
        (None, None) => state
            .verifier
            .verify(&request.key, &request.credential_data, &request.credential),
        (batch, inclusion) => state.verifier.verify_batched(
            &request.key,
            &request.credential_data,
            &request.credential,
            &batch.unwrap_or_default(),
            inclusion.as_ref(),
        ),
    }
}

/// Parse a JSON `VerificationRequest` and verify it.
pub fn verify_request_json(state: &RootState, json: &str) -> RootResult<VerificationResult> {
    let request: VerificationRequest = serde_json::from_str(json)?;
    Ok(handle_verification(state, &request))
}

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

/// Public view of a derived key. Private material is never included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedKey {
    pub path: String,
    /// Compressed SEC1 public key, hex.
    pub public_key: String,
    pub chain_code: String,
}

/// Derive the key at `path` (or the configured default path) from a
/// mnemonic sentence and passphrase.
pub fn derive_from_mnemonic(
    state: &RootState,
    sentence: &str,
    passphrase: &str,
    path: Option<&str>,
) -> RootResult<DerivedKey> {
    let mnemonic = MnemonicCode::parse(sentence)?;
    let path = match path {
        Some(p) => DerivationPath::parse(p)?,
        None => state.config.derivation.path()?,
    };
    let seed = mnemonic.to_seed(passphrase);
    let key = KeyDerivation::derive(&*seed, &path)?;
    Ok(DerivedKey {
        path: key.path().to_string(),
        public_key: hex::encode(key.public_key().compressed()),
        chain_code: hex::encode(key.chain_code()),
    })
}
