//! secp256k1 key and signature value types.
//!
//! These are opaque wrappers over the `k256` types. Signing and verification
//! live behind the [`CryptoBackend`](crate::traits::CryptoBackend) trait so
//! that callers pick a back-end once and pass it around explicitly.

use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{PublicKey, SecretKey};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};

pub const PRIVATE_KEY_BYTE_SIZE: usize = 32;
pub const PUBLIC_KEY_BYTE_SIZE: usize = 65;
pub const COMPRESSED_PUBLIC_KEY_BYTE_SIZE: usize = 33;

// ---------------------------------------------------------------------------
// EcPrivateKey
// ---------------------------------------------------------------------------

/// A secp256k1 private scalar in `[1, n-1]`.
#[derive(Clone)]
pub struct EcPrivateKey(SecretKey);

impl EcPrivateKey {
    /// Parse a 32-byte big-endian scalar. Rejects zero and values `>= n`.
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        if bytes.len() != PRIVATE_KEY_BYTE_SIZE {
            return Err(CoreError::InvalidPrivateKey(format!(
                "expected {} bytes, got {}",
                PRIVATE_KEY_BYTE_SIZE,
                bytes.len()
            )));
        }
        SecretKey::from_slice(bytes)
            .map(Self)
            .map_err(|_| CoreError::InvalidPrivateKey("scalar out of range".into()))
    }

    pub fn from_hex(s: &str) -> CoreResult<Self> {
        Self::from_bytes(&hex::decode(s)?)
    }

    pub fn from_secret_key(secret: SecretKey) -> Self {
        Self(secret)
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.0.to_bytes());
        out
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn public_key(&self) -> EcPublicKey {
        EcPublicKey(self.0.public_key())
    }

    pub fn as_secret_key(&self) -> &SecretKey {
        &self.0
    }

    pub fn signing_key(&self) -> SigningKey {
        SigningKey::from(&self.0)
    }
}

impl PartialEq for EcPrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for EcPrivateKey {}

impl fmt::Debug for EcPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcPrivateKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// EcPublicKey
// ---------------------------------------------------------------------------

/// Affine coordinates of a curve point, big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EcPoint {
    pub x: [u8; 32],
    pub y: [u8; 32],
}

/// A secp256k1 public point. Serializes as the hex of its uncompressed
/// 65-byte encoding.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EcPublicKey(PublicKey);

impl EcPublicKey {
    /// Parse a SEC1 encoding: uncompressed (`04‖x‖y`, 65 bytes) or
    /// compressed (33 bytes).
    pub fn from_encoded(bytes: &[u8]) -> CoreResult<Self> {
        if bytes.len() != PUBLIC_KEY_BYTE_SIZE && bytes.len() != COMPRESSED_PUBLIC_KEY_BYTE_SIZE {
            return Err(CoreError::InvalidPublicKey(format!(
                "expected {} or {} bytes, got {}",
                PUBLIC_KEY_BYTE_SIZE,
                COMPRESSED_PUBLIC_KEY_BYTE_SIZE,
                bytes.len()
            )));
        }
        PublicKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|_| CoreError::InvalidPublicKey("point is not on the curve".into()))
    }

    pub fn from_hex(s: &str) -> CoreResult<Self> {
        Self::from_encoded(&hex::decode(s)?)
    }

    pub fn from_coordinates(x: &[u8; 32], y: &[u8; 32]) -> CoreResult<Self> {
        let mut encoded = [0u8; PUBLIC_KEY_BYTE_SIZE];
        encoded[0] = 0x04;
        encoded[1..33].copy_from_slice(x);
        encoded[33..].copy_from_slice(y);
        Self::from_encoded(&encoded)
    }

    pub fn from_public_key(public: PublicKey) -> Self {
        Self(public)
    }

    /// Uncompressed SEC1 encoding.
    pub fn encoded(&self) -> [u8; 65] {
        let point = self.0.to_encoded_point(false);
        let mut out = [0u8; 65];
        out.copy_from_slice(point.as_bytes());
        out
    }

    pub fn compressed(&self) -> [u8; 33] {
        let point = self.0.to_encoded_point(true);
        let mut out = [0u8; 33];
        out.copy_from_slice(point.as_bytes());
        out
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.encoded())
    }

    pub fn curve_point(&self) -> EcPoint {
        let encoded = self.encoded();
        let mut x = [0u8; 32];
        let mut y = [0u8; 32];
        x.copy_from_slice(&encoded[1..33]);
        y.copy_from_slice(&encoded[33..]);
        EcPoint { x, y }
    }

    pub fn as_public_key(&self) -> &PublicKey {
        &self.0
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey::from(&self.0)
    }
}

impl fmt::Debug for EcPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EcPublicKey({})", hex::encode(&self.compressed()[..9]))
    }
}

impl From<EcPublicKey> for String {
    fn from(key: EcPublicKey) -> Self {
        key.to_hex()
    }
}

impl TryFrom<String> for EcPublicKey {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

// ---------------------------------------------------------------------------
// EcKeyPair
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcKeyPair {
    pub private_key: EcPrivateKey,
    pub public_key: EcPublicKey,
}

impl EcKeyPair {
    pub fn from_private_key(private_key: EcPrivateKey) -> Self {
        let public_key = private_key.public_key();
        Self {
            private_key,
            public_key,
        }
    }
}

// ---------------------------------------------------------------------------
// EcSignature: DER-encoded ECDSA signature bytes
// ---------------------------------------------------------------------------

/// Raw DER bytes. Construction never fails; malformed encodings are
/// rejected by `CryptoBackend::verify`, which returns `false` for them.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EcSignature(Vec<u8>);

impl EcSignature {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn from_hex(s: &str) -> CoreResult<Self> {
        Ok(Self(hex::decode(s)?))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Debug for EcSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = &self.0[..self.0.len().min(8)];
        write!(f, "EcSignature({}, {} bytes)", hex::encode(shown), self.0.len())
    }
}

impl From<EcSignature> for String {
    fn from(sig: EcSignature) -> Self {
        sig.to_hex()
    }
}

impl TryFrom<String> for EcSignature {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIVATE_HEX: &str = "933c25b9e0b10b0618517edeb389b1b5ba5e781f377af6f573a1af354d008034";
    const PUBLIC_HEX: &str = "0477d650217424671208f06ed816dab6c09e6b08c4da0f2f46ead049dd5fbd1c82cd23343346003d4c7faf24ed6314bf340e7882941fd69929526cc889a0f93a1c";

    fn random_key() -> EcPrivateKey {
        EcPrivateKey::from_secret_key(SecretKey::random(&mut rand::rngs::OsRng))
    }

    #[test]
    fn test_private_key_hex_roundtrip() {
        let key = EcPrivateKey::from_hex(PRIVATE_HEX).unwrap();
        assert_eq!(key.to_hex(), PRIVATE_HEX);
    }

    #[test]
    fn test_private_key_rejects_zero() {
        let err = EcPrivateKey::from_bytes(&[0u8; 32]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidPrivateKey(_)));
    }

    #[test]
    fn test_private_key_rejects_curve_order() {
        let order =
            hex::decode("fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141").unwrap();
        assert!(EcPrivateKey::from_bytes(&order).is_err());
    }

    #[test]
    fn test_private_key_rejects_wrong_length() {
        assert!(EcPrivateKey::from_bytes(&[1u8; 31]).is_err());
    }

    #[test]
    fn test_private_key_debug_redacted() {
        let key = EcPrivateKey::from_hex(PRIVATE_HEX).unwrap();
        let dbg = format!("{:?}", key);
        assert!(dbg.contains("REDACTED"));
        assert!(!dbg.contains("933c25"));
    }

    #[test]
    fn test_public_key_hex_roundtrip() {
        let key = EcPublicKey::from_hex(PUBLIC_HEX).unwrap();
        assert_eq!(key.to_hex(), PUBLIC_HEX);
    }

    #[test]
    fn test_public_key_compressed_roundtrip() {
        let key = random_key().public_key();
        let compressed = key.compressed();
        assert!(compressed[0] == 0x02 || compressed[0] == 0x03);
        let back = EcPublicKey::from_encoded(&compressed).unwrap();
        assert_eq!(key, back);
    }

    #[test]
    fn test_public_key_from_coordinates() {
        let key = random_key().public_key();
        let point = key.curve_point();
        let back = EcPublicKey::from_coordinates(&point.x, &point.y).unwrap();
        assert_eq!(key, back);
    }

    #[test]
    fn test_public_key_rejects_off_curve_point() {
        let mut bytes = [0u8; 65];
        bytes[0] = 0x04;
        bytes[64] = 0x01;
        assert!(EcPublicKey::from_encoded(&bytes).is_err());
    }

    #[test]
    fn test_public_key_rejects_wrong_length() {
        assert!(EcPublicKey::from_encoded(&[0x04; 10]).is_err());
    }

    #[test]
    fn test_public_key_serde_as_hex() {
        let key = EcPublicKey::from_hex(PUBLIC_HEX).unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, format!("\"{}\"", PUBLIC_HEX));
        let back: EcPublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(key, back);
    }

    #[test]
    fn test_key_pair_from_private() {
        let private_key = random_key();
        let pair = EcKeyPair::from_private_key(private_key.clone());
        assert_eq!(pair.public_key, private_key.public_key());
        assert_eq!(pair.private_key.to_bytes().len(), PRIVATE_KEY_BYTE_SIZE);
        assert_eq!(pair.public_key.encoded().len(), PUBLIC_KEY_BYTE_SIZE);
    }

    #[test]
    fn test_signature_accepts_arbitrary_bytes() {
        let sig = EcSignature::from_bytes(vec![0xde, 0xad]);
        assert_eq!(sig.to_hex(), "dead");
        let back = EcSignature::from_hex("dead").unwrap();
        assert_eq!(sig, back);
    }
}
