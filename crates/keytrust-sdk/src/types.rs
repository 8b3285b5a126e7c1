use keytrust_core::{EcPublicKey, MerkleInclusionProof, MerkleRoot, TimestampInfo};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Lifecycle facts supplied by the ledger
// ---------------------------------------------------------------------------

/// A DID key and the ledger events that bound its validity.
///
/// The key is valid on `[added_on, revoked_on)`, or from `added_on` onward
/// when it was never revoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyData {
    pub public_key: EcPublicKey,
    pub added_on: TimestampInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_on: Option<TimestampInfo>,
}

impl KeyData {
    pub fn new(public_key: EcPublicKey, added_on: TimestampInfo) -> Self {
        Self {
            public_key,
            added_on,
            revoked_on: None,
        }
    }

    /// A copy of this key data with the revocation event recorded.
    pub fn revoked_at(&self, revoked_on: TimestampInfo) -> Self {
        Self {
            revoked_on: Some(revoked_on),
            ..self.clone()
        }
    }

    pub fn was_valid_at(&self, at: &TimestampInfo) -> bool {
        self.added_on <= *at && self.revoked_on.map_or(true, |r| *at < r)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialData {
    pub issued_on: TimestampInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_on: Option<TimestampInfo>,
}

impl CredentialData {
    pub fn new(issued_on: TimestampInfo) -> Self {
        Self {
            issued_on,
            revoked_on: None,
        }
    }

    pub fn revoked_at(&self, revoked_on: TimestampInfo) -> Self {
        Self {
            revoked_on: Some(revoked_on),
            ..*self
        }
    }
}

/// Lifecycle of the batch a credential was published in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_on: Option<TimestampInfo>,
}

impl BatchData {
    pub fn active() -> Self {
        Self { revoked_on: None }
    }

    pub fn revoked(revoked_on: TimestampInfo) -> Self {
        Self {
            revoked_on: Some(revoked_on),
        }
    }
}

/// Where a batched credential claims to sit: the published root and the
/// proof leading to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchInclusion {
    pub root: MerkleRoot,
    pub proof: MerkleInclusionProof,
}

// ---------------------------------------------------------------------------
// VerificationError: one reason a credential is not trusted
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum VerificationError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("key was added on {key_added_on}, after the credential was issued on {credential_issued_on}")]
    KeyWasNotValid {
        key_added_on: TimestampInfo,
        credential_issued_on: TimestampInfo,
    },

    #[error("key was revoked on {key_revoked_on}, before the credential was issued on {credential_issued_on}")]
    KeyWasRevoked {
        credential_issued_on: TimestampInfo,
        key_revoked_on: TimestampInfo,
    },

    #[error("credential was revoked on {revoked_on}")]
    Revoked { revoked_on: TimestampInfo },

    #[error("batch was revoked on {batch_revoked_on}")]
    BatchWasRevoked { batch_revoked_on: TimestampInfo },

    #[error("invalid merkle inclusion proof")]
    InvalidMerkleProof,
}

impl VerificationError {
    pub fn kind(&self) -> VerificationErrorKind {
        self.into()
    }
}

/// Payload-free tag of a `VerificationError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationErrorKind {
    InvalidSignature,
    KeyWasNotValid,
    KeyWasRevoked,
    Revoked,
    BatchWasRevoked,
    InvalidMerkleProof,
}

impl fmt::Display for VerificationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSignature => write!(f, "InvalidSignature"),
            Self::KeyWasNotValid => write!(f, "KeyWasNotValid"),
            Self::KeyWasRevoked => write!(f, "KeyWasRevoked"),
            Self::Revoked => write!(f, "Revoked"),
            Self::BatchWasRevoked => write!(f, "BatchWasRevoked"),
            Self::InvalidMerkleProof => write!(f, "InvalidMerkleProof"),
        }
    }
}

impl From<&VerificationError> for VerificationErrorKind {
    fn from(e: &VerificationError) -> Self {
        match e {
            VerificationError::InvalidSignature => Self::InvalidSignature,
            VerificationError::KeyWasNotValid { .. } => Self::KeyWasNotValid,
            VerificationError::KeyWasRevoked { .. } => Self::KeyWasRevoked,
            VerificationError::Revoked { .. } => Self::Revoked,
            VerificationError::BatchWasRevoked { .. } => Self::BatchWasRevoked,
            VerificationError::InvalidMerkleProof => Self::InvalidMerkleProof,
        }
    }
}

// ---------------------------------------------------------------------------
// VerificationResult: outcome of a trust verification
// ---------------------------------------------------------------------------

/// Every reason a credential failed trust, in check order.
///
/// `is_valid()` is derived from `errors` and cannot disagree with it; a
/// serialized result whose `valid` flag contradicts its errors is rejected
/// on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ResultRepr", try_from = "ResultRepr")]
pub struct VerificationResult {
    errors: Vec<VerificationError>,
}

#[derive(Serialize, Deserialize)]
struct ResultRepr {
    valid: bool,
    errors: Vec<VerificationError>,
}

impl VerificationResult {
    pub fn from_errors(errors: Vec<VerificationError>) -> Self {
        Self { errors }
    }

    pub fn success() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[VerificationError] {
        &self.errors
    }

    pub fn kinds(&self) -> Vec<VerificationErrorKind> {
        self.errors.iter().map(VerificationErrorKind::from).collect()
    }

    pub fn contains(&self, kind: VerificationErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind() == kind)
    }

    pub fn into_errors(self) -> Vec<VerificationError> {
        self.errors
    }
}

impl From<VerificationResult> for ResultRepr {
    fn from(r: VerificationResult) -> Self {
        Self {
            valid: r.is_valid(),
            errors: r.errors,
        }
    }
}

impl TryFrom<ResultRepr> for VerificationResult {
    type Error = String;

    fn try_from(repr: ResultRepr) -> Result<Self, Self::Error> {
        if repr.valid != repr.errors.is_empty() {
            return Err(format!(
                "valid = {} contradicts {} error(s)",
                repr.valid,
                repr.errors.len()
            ));
        }
        Ok(Self {
            errors: repr.errors,
        })
    }
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return write!(f, "valid");
        }
        write!(f, "invalid: ")?;
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", e)?;
        }
        Ok(())
    }
}
