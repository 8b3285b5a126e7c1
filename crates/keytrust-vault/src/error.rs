use thiserror::Error;

/// Rejections from mnemonic validation, in the order they are checked.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MnemonicError {
    #[error("word {position} ('{word}') is not in the word list")]
    WordNotInList { word: String, position: usize },

    #[error("mnemonic must have {expected} words, got {found}")]
    WrongLength { expected: usize, found: usize },

    #[error("mnemonic checksum mismatch")]
    ChecksumMismatch,

    #[error("mnemonic encoding failed: {0}")]
    Encoding(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DerivationError {
    #[error("invalid derivation path syntax: {0}")]
    InvalidPathSyntax(String),

    #[error("axis index {0} is out of range (max 2^31 - 1)")]
    IndexOutOfRange(u64),

    /// The derived scalar was zero or not below the curve order. Retry with
    /// `index + 1`.
    #[error("invalid child at index {index}; retry with the next index")]
    InvalidChildIndex { index: u32 },

    #[error("cannot derive hardened child {index} from a public key")]
    HardenedFromPublic { index: u32 },

    #[error("key derivation error: {0}")]
    KeyDerivation(String),
}

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("mnemonic error: {0}")]
    Mnemonic(#[from] MnemonicError),

    #[error("derivation error: {0}")]
    Derivation(#[from] DerivationError),

    #[error("key error: {0}")]
    Key(#[from] keytrust_core::CoreError),
}

pub type VaultResult<T> = Result<T, VaultError>;
