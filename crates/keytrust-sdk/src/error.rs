use keytrust_core::CoreError;
use thiserror::Error;

/// Errors raised while building or decoding the inputs of a verification.
///
/// Trust failures are never reported through this type; they accumulate in
/// a `VerificationResult` instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SdkError {
    /// The canonical `content.signature` string could not be decoded.
    #[error("invalid canonical credential: {0}")]
    InvalidCanonicalForm(String),

    /// A batch was requested for zero credentials.
    #[error("cannot batch an empty credential list")]
    EmptyBatch,

    #[error("core error: {0}")]
    Core(#[from] CoreError),
}

pub type SdkResult<T> = Result<T, SdkError>;
