use k256::ecdsa::signature::{RandomizedSigner, Signer, Verifier};
use k256::ecdsa::Signature;
use k256::SecretKey;
use keytrust_core::{CryptoBackend, EcKeyPair, EcPrivateKey, EcPublicKey, EcSignature};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Back-ends
//
// Both sign secp256k1 ECDSA over SHA-256 and emit DER. They differ only in
// nonce generation; signatures from either verify under either.
// ---------------------------------------------------------------------------

/// RFC 6979 nonces: the same key and message always give the same signature.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeterministicBackend;

/// RFC 6979 nonces mixed with OS randomness. Signatures differ per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct HedgedBackend;

impl CryptoBackend for DeterministicBackend {
    fn name(&self) -> &'static str {
        "deterministic"
    }

    fn generate_key_pair(&self) -> EcKeyPair {
        random_key_pair()
    }

    fn sign(&self, message: &[u8], private_key: &EcPrivateKey) -> EcSignature {
        let signature: Signature = private_key.signing_key().sign(message);
        EcSignature::from_bytes(signature.to_der().as_bytes())
    }

    fn verify(&self, message: &[u8], public_key: &EcPublicKey, signature: &EcSignature) -> bool {
        verify_der(message, public_key, signature)
    }
}

impl CryptoBackend for HedgedBackend {
    fn name(&self) -> &'static str {
        "hedged"
    }

    fn generate_key_pair(&self) -> EcKeyPair {
        random_key_pair()
    }

    fn sign(&self, message: &[u8], private_key: &EcPrivateKey) -> EcSignature {
        let signature: Signature = private_key
            .signing_key()
            .sign_with_rng(&mut rand::rngs::OsRng, message);
        EcSignature::from_bytes(signature.to_der().as_bytes())
    }

    fn verify(&self, message: &[u8], public_key: &EcPublicKey, signature: &EcSignature) -> bool {
        verify_der(message, public_key, signature)
    }
}

fn random_key_pair() -> EcKeyPair {
    let secret = SecretKey::random(&mut rand::rngs::OsRng);
    EcKeyPair::from_private_key(EcPrivateKey::from_secret_key(secret))
}

fn verify_der(message: &[u8], public_key: &EcPublicKey, signature: &EcSignature) -> bool {
    let sig = match Signature::from_der(signature.as_bytes()) {
        Ok(sig) => sig,
        Err(_) => {
            tracing::debug!(len = signature.as_bytes().len(), "signature is not valid DER");
            return false;
        }
    };
    // Other signers may emit high-S; k256 only accepts the low-S form.
    let sig = sig.normalize_s().unwrap_or(sig);
    public_key.verifying_key().verify(message, &sig).is_ok()
}

// ---------------------------------------------------------------------------
// BackendKind: configuration-facing selector
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Deterministic,
    Hedged,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Deterministic => write!(f, "deterministic"),
            BackendKind::Hedged => write!(f, "hedged"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deterministic" => Ok(BackendKind::Deterministic),
            "hedged" => Ok(BackendKind::Hedged),
            other => Err(format!("unknown crypto backend '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// CryptoContext: the one back-end every component is handed
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct CryptoContext {
    backend: Arc<dyn CryptoBackend>,
}

impl CryptoContext {
    pub fn new(backend: Arc<dyn CryptoBackend>) -> Self {
        Self { backend }
    }

    pub fn from_kind(kind: BackendKind) -> Self {
        tracing::debug!(backend = %kind, "selecting crypto backend");
        let backend: Arc<dyn CryptoBackend> = match kind {
            BackendKind::Deterministic => Arc::new(DeterministicBackend),
            BackendKind::Hedged => Arc::new(HedgedBackend),
        };
        Self { backend }
    }

    pub fn backend(&self) -> &dyn CryptoBackend {
        self.backend.as_ref()
    }

    pub fn name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn generate_key_pair(&self) -> EcKeyPair {
        self.backend.generate_key_pair()
    }

    pub fn sign(&self, message: &[u8], private_key: &EcPrivateKey) -> EcSignature {
        self.backend.sign(message, private_key)
    }

    pub fn verify(&self, message: &[u8], public_key: &EcPublicKey, signature: &EcSignature) -> bool {
        self.backend.verify(message, public_key, signature)
    }
}

impl Default for CryptoContext {
    fn default() -> Self {
        Self::from_kind(BackendKind::default())
    }
}

impl fmt::Debug for CryptoContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoContext")
            .field("backend", &self.backend.name())
            .finish()
    }
}
