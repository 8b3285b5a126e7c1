//! Signed credentials and credential batches.
//!
//! Canonical form: `base64url(content) "." base64url(signature)`, unpadded.
//! The credential hash is SHA-256 of that string, and is what a batch's
//! Merkle tree commits to.

use base64::engine::general_purpose::URL_SAFE_NO_PAD as BASE64URL;
use base64::Engine;
use keytrust_core::{
    generate_proofs, verify_proof, EcPrivateKey, EcSignature, MerkleInclusionProof, MerkleRoot,
    Sha256Digest,
};
use keytrust_vault::CryptoContext;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{SdkError, SdkResult};
use crate::types::BatchInclusion;

/// Credential bytes and the signature over them. Immutable once built.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SignedCredential {
    content: Vec<u8>,
    signature: EcSignature,
}

impl SignedCredential {
    pub fn new(content: impl Into<Vec<u8>>, signature: EcSignature) -> Self {
        Self {
            content: content.into(),
            signature,
        }
    }

    /// Sign `content` with `private_key` using the context's back-end.
    pub fn sign(content: impl Into<Vec<u8>>, private_key: &EcPrivateKey, context: &CryptoContext) -> Self {
        let content = content.into();
        let signature = context.sign(&content, private_key);
        Self { content, signature }
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn signature(&self) -> &EcSignature {
        &self.signature
    }

    pub fn canonical_form(&self) -> String {
        format!(
            "{}.{}",
            BASE64URL.encode(&self.content),
            BASE64URL.encode(self.signature.as_bytes())
        )
    }

    pub fn from_canonical_form(s: &str) -> SdkResult<Self> {
        let (content, signature) = s.split_once('.').ok_or_else(|| {
            SdkError::InvalidCanonicalForm("expected '<content>.<signature>'".into())
        })?;
        let content = BASE64URL
            .decode(content)
            .map_err(|e| SdkError::InvalidCanonicalForm(format!("content: {}", e)))?;
        let signature = BASE64URL
            .decode(signature)
            .map_err(|e| SdkError::InvalidCanonicalForm(format!("signature: {}", e)))?;
        Ok(Self {
            content,
            signature: EcSignature::from_bytes(signature),
        })
    }

    pub fn hash(&self) -> Sha256Digest {
        Sha256Digest::compute(self.canonical_form().as_bytes())
    }
}

impl fmt::Debug for SignedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedCredential")
            .field("content_len", &self.content.len())
            .field("hash", &self.hash())
            .finish()
    }
}

impl fmt::Display for SignedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_form())
    }
}

impl TryFrom<String> for SignedCredential {
    type Error = SdkError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_canonical_form(&s)
    }
}

impl From<SignedCredential> for String {
    fn from(c: SignedCredential) -> Self {
        c.canonical_form()
    }
}

// ---------------------------------------------------------------------------
// Batches
// ---------------------------------------------------------------------------

/// A Merkle root over a list of credentials and one proof per credential,
/// in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialBatch {
    pub root: MerkleRoot,
    pub proofs: Vec<MerkleInclusionProof>,
}

impl CredentialBatch {
    /// Root and proof for the `index`-th credential of the batch.
    pub fn inclusion(&self, index: usize) -> Option<BatchInclusion> {
        self.proofs.get(index).map(|proof| BatchInclusion {
            root: self.root,
            proof: proof.clone(),
        })
    }
}

pub struct CredentialBatches;

impl CredentialBatches {
    pub fn batch(credentials: &[SignedCredential]) -> SdkResult<CredentialBatch> {
        if credentials.is_empty() {
            return Err(SdkError::EmptyBatch);
        }
        let hashes: Vec<Sha256Digest> = credentials.iter().map(SignedCredential::hash).collect();
        let proofs = generate_proofs(&hashes)?;
        tracing::debug!(size = credentials.len(), root = %proofs.root.0, "built credential batch");
        Ok(CredentialBatch {
            root: proofs.root,
            proofs: proofs.proofs,
        })
    }

    /// The proof names this credential's hash and leads to `root`.
    pub fn verify_inclusion(
        credential: &SignedCredential,
        root: &MerkleRoot,
        proof: &MerkleInclusionProof,
    ) -> bool {
        proof.hash == credential.hash() && verify_proof(root, proof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> CryptoContext {
        CryptoContext::default()
    }

    fn credentials(n: usize) -> Vec<SignedCredential> {
        let ctx = context();
        let pair = ctx.generate_key_pair();
        (0..n)
            .map(|i| SignedCredential::sign(format!("{{\"id\":{}}}", i), &pair.private_key, &ctx))
            .collect()
    }

    #[test]
    fn test_sign_and_verify_content() {
        let ctx = context();
        let pair = ctx.generate_key_pair();
        let cred = SignedCredential::sign(b"{\"name\":\"alice\"}".to_vec(), &pair.private_key, &ctx);
        assert!(ctx.verify(cred.content(), &pair.public_key, cred.signature()));
    }

    #[test]
    fn test_canonical_form_roundtrip() {
        let cred = &credentials(1)[0];
        let text = cred.canonical_form();
        assert_eq!(text.matches('.').count(), 1);
        assert!(!text.contains('='));
        let back = SignedCredential::from_canonical_form(&text).unwrap();
        assert_eq!(&back, cred);
        assert_eq!(back.hash(), cred.hash());
    }

    #[test]
    fn test_canonical_form_known_layout() {
        let cred = SignedCredential::new(b"hi".to_vec(), EcSignature::from_bytes(vec![0xff, 0xfe]));
        assert_eq!(cred.canonical_form(), "aGk.__4");
        assert_eq!(
            cred.hash(),
            Sha256Digest::compute(b"aGk.__4")
        );
    }

    #[test]
    fn test_from_canonical_form_rejects_garbage() {
        for bad in ["no-separator", "!!.AA", "AA.!!"] {
            let err = SignedCredential::from_canonical_form(bad).unwrap_err();
            assert!(matches!(err, SdkError::InvalidCanonicalForm(_)), "{}", bad);
        }
    }

    #[test]
    fn test_serde_as_canonical_string() {
        let cred = &credentials(1)[0];
        let json = serde_json::to_string(cred).unwrap();
        assert_eq!(json, format!("\"{}\"", cred.canonical_form()));
        let back: SignedCredential = serde_json::from_str(&json).unwrap();
        assert_eq!(&back, cred);
    }

    #[test]
    fn test_batch_inclusion() {
        let creds = credentials(5);
        let batch = CredentialBatches::batch(&creds).unwrap();
        assert_eq!(batch.proofs.len(), 5);
        for (cred, proof) in creds.iter().zip(&batch.proofs) {
            assert!(CredentialBatches::verify_inclusion(cred, &batch.root, proof));
        }
    }

    #[test]
    fn test_inclusion_rejects_other_credential() {
        let creds = credentials(3);
        let batch = CredentialBatches::batch(&creds).unwrap();
        assert!(!CredentialBatches::verify_inclusion(&creds[1], &batch.root, &batch.proofs[0]));
    }

    #[test]
    fn test_inclusion_rejects_other_root() {
        let creds = credentials(3);
        let batch = CredentialBatches::batch(&creds).unwrap();
        let other = CredentialBatches::batch(&credentials(3)).unwrap();
        assert!(!CredentialBatches::verify_inclusion(&creds[0], &other.root, &batch.proofs[0]));
    }

    #[test]
    fn test_empty_batch() {
        assert_eq!(CredentialBatches::batch(&[]).unwrap_err(), SdkError::EmptyBatch);
    }

    #[test]
    fn test_batch_inclusion_accessor() {
        let creds = credentials(2);
        let batch = CredentialBatches::batch(&creds).unwrap();
        let inc = batch.inclusion(1).unwrap();
        assert_eq!(inc.root, batch.root);
        assert_eq!(inc.proof, batch.proofs[1]);
        assert!(batch.inclusion(2).is_none());
    }
}
