use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid digest: {0}")]
    InvalidDigest(String),

    #[error("invalid merkle proof encoding: {0}")]
    InvalidProofEncoding(String),

    #[error("empty merkle batch")]
    EmptyBatch,

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<hex::FromHexError> for CoreError {
    fn from(e: hex::FromHexError) -> Self {
        CoreError::Serialization(format!("hex decode failed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = CoreError::InvalidPublicKey("not on curve".into());
        assert_eq!(e.to_string(), "invalid public key: not on curve");
        assert_eq!(CoreError::EmptyBatch.to_string(), "empty merkle batch");
    }

    #[test]
    fn test_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let e: CoreError = json_err.into();
        assert!(matches!(e, CoreError::Serialization(_)));
    }

    #[test]
    fn test_from_hex() {
        let hex_err = hex::decode("zz").unwrap_err();
        let e: CoreError = hex_err.into();
        assert!(e.to_string().contains("hex decode failed"));
    }
}
