//! Temporal trust verification.
//!
//! Decides whether a signed credential is trusted given the lifecycle of the
//! key that signed it, the lifecycle of the credential itself and, for
//! batched credentials, the batch lifecycle and the Merkle inclusion proof.
//!
//! Checks, in the order their errors are reported:
//! 1. Signature over the credential content under the key.
//! 2. Key added after the credential was issued.
//! 3. Key revoked at or before issuance.
//! 4. Credential revoked.
//! 5. Batch revoked (batched credentials only).
//! 6. Inclusion proof does not reach the batch root (when a proof is given).
//!
//! Every applicable check runs; failures accumulate. Only the supplied ledger
//! timestamps are compared, never a local clock.

use keytrust_vault::CryptoContext;

use crate::credential::{CredentialBatches, SignedCredential};
use crate::types::{
    BatchData, BatchInclusion, CredentialData, KeyData, VerificationError, VerificationResult,
};

#[derive(Debug, Clone)]
pub struct TrustVerifier {
    context: CryptoContext,
}

impl TrustVerifier {
    pub fn new(context: CryptoContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &CryptoContext {
        &self.context
    }

    /// Verify a credential that was issued on its own, outside any batch.
    pub fn verify(
        &self,
        key: &KeyData,
        credential_data: &CredentialData,
        credential: &SignedCredential,
    ) -> VerificationResult {
        self.run_checks(key, credential_data, credential, None)
    }

    /// Verify a credential published as part of a batch. The Merkle check
    /// runs only when `inclusion` is given.
    pub fn verify_batched(
        &self,
        key: &KeyData,
        credential_data: &CredentialData,
        credential: &SignedCredential,
        batch: &BatchData,
        inclusion: Option<&BatchInclusion>,
    ) -> VerificationResult {
        self.run_checks(key, credential_data, credential, Some((batch, inclusion)))
    }

    fn run_checks(
        &self,
        key: &KeyData,
        credential_data: &CredentialData,
        credential: &SignedCredential,
        batch: Option<(&BatchData, Option<&BatchInclusion>)>,
    ) -> VerificationResult {
        tracing::debug!(
            credential = %credential.hash(),
            backend = self.context.name(),
            batched = batch.is_some(),
            "verifying credential trust"
        );

        let mut errors = Vec::new();
        let issued_on = credential_data.issued_on;

        if !self
            .context
            .verify(credential.content(), &key.public_key, credential.signature())
        {
            errors.push(VerificationError::InvalidSignature);
        }

        if key.added_on > issued_on {
            errors.push(VerificationError::KeyWasNotValid {
                key_added_on: key.added_on,
                credential_issued_on: issued_on,
            });
        }

        if let Some(key_revoked_on) = key.revoked_on {
            if key_revoked_on <= issued_on {
                errors.push(VerificationError::KeyWasRevoked {
                    credential_issued_on: issued_on,
                    key_revoked_on,
                });
            }
        }

        // A revocation event, once on the ledger, is final.
        if let Some(revoked_on) = credential_data.revoked_on {
            errors.push(VerificationError::Revoked { revoked_on });
        }

        if let Some((batch, inclusion)) = batch {
            if let Some(batch_revoked_on) = batch.revoked_on {
                errors.push(VerificationError::BatchWasRevoked { batch_revoked_on });
            }
            if let Some(inclusion) = inclusion {
                if !CredentialBatches::verify_inclusion(credential, &inclusion.root, &inclusion.proof)
                {
                    errors.push(VerificationError::InvalidMerkleProof);
                }
            }
        }

        for error in &errors {
            tracing::warn!(kind = %error.kind(), reason = %error, "credential trust check failed");
        }

        let result = VerificationResult::from_errors(errors);
        tracing::info!(
            credential = %credential.hash(),
            valid = result.is_valid(),
            errors = result.errors().len(),
            "credential verification complete"
        );
        result
    }
}
