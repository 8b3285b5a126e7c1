//! # Keytrust SDK
//!
//! Decides whether a ledger-anchored signed credential can be trusted.
//!
//! - [`SignedCredential`]: credential bytes plus signature, with a canonical
//!   string form and hash.
//! - [`CredentialBatches`]: anchor many credentials under one Merkle root.
//! - [`TrustVerifier`]: combine key, credential and batch lifecycles with
//!   signature and inclusion checks into a [`VerificationResult`].
//!
//! Verification never fails with an error: every reason a credential is
//! not trusted is collected in the result.
//!
//! # Example
//!
//! ```rust
//! use keytrust_core::TimestampInfo;
//! use keytrust_sdk::{CredentialData, KeyData, SignedCredential, TrustVerifier};
//! use keytrust_vault::CryptoContext;
//!
//! let ctx = CryptoContext::default();
//! let pair = ctx.generate_key_pair();
//! let credential = SignedCredential::sign(b"{\"name\":\"alice\"}".to_vec(), &pair.private_key, &ctx);
//!
//! let key = KeyData::new(pair.public_key, TimestampInfo::new(100, 1, 0));
//! let data = CredentialData::new(TimestampInfo::new(200, 4, 2));
//!
//! let result = TrustVerifier::new(ctx).verify(&key, &data, &credential);
//! assert!(result.is_valid());
//! ```

pub mod credential;
pub mod error;
pub mod types;
pub mod verify;

pub use credential::{CredentialBatch, CredentialBatches, SignedCredential};
pub use error::{SdkError, SdkResult};
pub use types::{
    BatchData, BatchInclusion, CredentialData, KeyData, VerificationError, VerificationErrorKind,
    VerificationResult,
};
pub use verify::TrustVerifier;

// Re-export the core value types callers need to build verification inputs.
pub use keytrust_core::{
    EcPublicKey, EcSignature, MerkleInclusionProof, MerkleRoot, Sha256Digest, TimestampInfo,
};
