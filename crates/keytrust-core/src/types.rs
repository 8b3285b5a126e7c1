use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::{CoreError, CoreResult};

// ---------------------------------------------------------------------------
// TimestampInfo: ledger position of an event (block time, block seq, op seq)
// ---------------------------------------------------------------------------

/// When an event became visible on the ledger.
///
/// Ordering is lexicographic over `(block_time, block_sequence,
/// operation_sequence)`; the derived `Ord` relies on the field order below.
/// Values are supplied by the ledger collaborator and are never read from a
/// local clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimestampInfo {
    /// Block time in seconds since the Unix epoch.
    pub block_time: i64,
    /// Position of the block in the ledger.
    pub block_sequence: u32,
    /// Position of the operation inside its block.
    pub operation_sequence: u32,
}

impl TimestampInfo {
    pub fn new(block_time: i64, block_sequence: u32, operation_sequence: u32) -> Self {
        Self {
            block_time,
            block_sequence,
            operation_sequence,
        }
    }

    /// Strictly earlier on the ledger than `other`.
    pub fn occurred_before(&self, other: &TimestampInfo) -> bool {
        self < other
    }

    pub fn to_rfc3339(&self) -> String {
        chrono::DateTime::from_timestamp(self.block_time, 0)
            .map(|d| d.to_rfc3339())
            .unwrap_or_else(|| "invalid".to_string())
    }
}

impl fmt::Display for TimestampInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (block {}, op {})",
            self.to_rfc3339(),
            self.block_sequence,
            self.operation_sequence
        )
    }
}

// ---------------------------------------------------------------------------
// Sha256Digest
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sha256Digest(#[serde(with = "hex_bytes")] pub [u8; 32]);

impl Sha256Digest {
    pub fn compute(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    pub fn from_hex(s: &str) -> CoreResult<Self> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| CoreError::InvalidDigest(format!("expected 32 bytes, got {}", v.len())))?;
        Ok(Self(arr))
    }

    pub fn hex_value(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256Digest({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hex_value())
    }
}

// ---------------------------------------------------------------------------
// KeyType: role of a key inside an identity, used as a hardened path axis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyType {
    /// Controls the identity itself (key rotation, key revocation).
    Master,
    /// Signs issued credentials and batches.
    Issuing,
    Communication,
    Authentication,
}

impl KeyType {
    pub fn index(&self) -> u32 {
        match self {
            KeyType::Master => 0,
            KeyType::Issuing => 1,
            KeyType::Communication => 2,
            KeyType::Authentication => 3,
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyType::Master => write!(f, "master"),
            KeyType::Issuing => write!(f, "issuing"),
            KeyType::Communication => write!(f, "communication"),
            KeyType::Authentication => write!(f, "authentication"),
        }
    }
}

pub(crate) mod hex_bytes {
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S, const N: usize>(bytes: &[u8; N], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom(format!("expected {} bytes", N)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_ordering_by_block_time() {
        let t1 = TimestampInfo::new(100, 9, 9);
        let t2 = TimestampInfo::new(200, 0, 0);
        assert!(t1 < t2);
        assert!(t1.occurred_before(&t2));
    }

    #[test]
    fn test_timestamp_ordering_by_block_sequence() {
        let t1 = TimestampInfo::new(100, 1, 9);
        let t2 = TimestampInfo::new(100, 2, 0);
        assert!(t1 < t2);
    }

    #[test]
    fn test_timestamp_ordering_by_operation_sequence() {
        let t1 = TimestampInfo::new(100, 1, 1);
        let t2 = TimestampInfo::new(100, 1, 2);
        assert!(t1 < t2);
        assert!(!t2.occurred_before(&t1));
    }

    #[test]
    fn test_equal_timestamps_not_before() {
        let t = TimestampInfo::new(100, 1, 1);
        assert!(!t.occurred_before(&t));
        assert!(t <= t);
    }

    #[test]
    fn test_timestamp_display() {
        let t = TimestampInfo::new(0, 3, 4);
        let s = t.to_string();
        assert!(s.starts_with("1970-01-01"));
        assert!(s.contains("block 3"));
        assert!(s.contains("op 4"));
    }

    #[test]
    fn test_timestamp_serde() {
        let t = TimestampInfo::new(1_600_000_000, 12, 3);
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("\"block_sequence\":12"));
        let back: TimestampInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }

    #[test]
    fn test_sha256_known_answer() {
        let d = Sha256Digest::compute(b"abc");
        assert_eq!(
            d.hex_value(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_sha256_hex_roundtrip() {
        let d = Sha256Digest::compute(b"credential");
        let back = Sha256Digest::from_hex(&d.hex_value()).unwrap();
        assert_eq!(d, back);
    }

    #[test]
    fn test_sha256_from_hex_wrong_length() {
        let err = Sha256Digest::from_hex("abcd").unwrap_err();
        assert!(matches!(err, CoreError::InvalidDigest(_)));
    }

    #[test]
    fn test_key_type_indices() {
        assert_eq!(KeyType::Master.index(), 0);
        assert_eq!(KeyType::Issuing.index(), 1);
        assert_eq!(KeyType::Communication.index(), 2);
        assert_eq!(KeyType::Authentication.index(), 3);
        assert_eq!(KeyType::Issuing.to_string(), "issuing");
    }
}
