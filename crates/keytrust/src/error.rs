use thiserror::Error;

/// Error type for the keytrust root binary, aggregating errors from the
/// library crates.
#[derive(Debug, Error)]
pub enum RootError {
    #[error("core error: {0}")]
    Core(#[from] keytrust_core::CoreError),

    #[error("vault error: {0}")]
    Vault(#[from] keytrust_vault::VaultError),

    #[error("sdk error: {0}")]
    Sdk(#[from] keytrust_sdk::SdkError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<keytrust_vault::MnemonicError> for RootError {
    fn from(e: keytrust_vault::MnemonicError) -> Self {
        RootError::Vault(e.into())
    }
}

impl From<keytrust_vault::DerivationError> for RootError {
    fn from(e: keytrust_vault::DerivationError) -> Self {
        RootError::Vault(e.into())
    }
}

impl From<serde_json::Error> for RootError {
    fn from(e: serde_json::Error) -> Self {
        RootError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for RootError {
    fn from(e: toml::de::Error) -> Self {
        RootError::Config(format!("TOML parse error: {}", e))
    }
}

pub type RootResult<T> = Result<T, RootError>;
