use crate::crypto::{EcKeyPair, EcPrivateKey, EcPublicKey, EcSignature};

// ---------------------------------------------------------------------------
// CryptoBackend: secp256k1 ECDSA capability
//
// Implementations are interchangeable. A back-end is chosen once, at
// startup, and handed to every component that signs or verifies.
// ---------------------------------------------------------------------------

pub trait CryptoBackend: Send + Sync {
    /// Stable name used in logs and configuration.
    fn name(&self) -> &'static str;

    /// Fresh key pair with a uniformly random scalar in `[1, n-1]`.
    fn generate_key_pair(&self) -> EcKeyPair;

    /// ECDSA over SHA-256 of `message`, DER-encoded.
    fn sign(&self, message: &[u8], private_key: &EcPrivateKey) -> EcSignature;

    /// True iff `signature` is valid for `message` under `public_key`.
    /// Never panics; malformed signature bytes yield `false`.
    fn verify(&self, message: &[u8], public_key: &EcPublicKey, signature: &EcSignature) -> bool;

    fn public_key_from_private(&self, private_key: &EcPrivateKey) -> EcPublicKey {
        private_key.public_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_backend_object_safe(_: &dyn CryptoBackend) {}
}
