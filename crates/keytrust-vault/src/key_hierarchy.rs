use crate::derivation::{DerivationAxis, DerivationPath};
use crate::error::DerivationError;
use hmac::{Hmac, Mac};
use k256::elliptic_curve::PrimeField;
use k256::{FieldBytes, ProjectivePoint, PublicKey, Scalar, SecretKey};
use keytrust_core::{EcKeyPair, EcPrivateKey, EcPublicKey, KeyType};
use sha2::Sha512;
use std::fmt;
use zeroize::Zeroizing;

/// BIP32 hierarchy over secp256k1:
///
/// ```text
/// seed → HMAC-SHA512("Bitcoin seed", seed) → master (scalar ‖ chain code)
///   → child(axis) = HMAC-SHA512(chain code, data ‖ index_be)
///        data = 0x00 ‖ parent scalar      (hardened)
///        data = compressed parent point   (normal)
///     child scalar = IL + parent scalar (mod n), chain code = IR
/// ```
///
/// Identity keys live at `m/did'/key_type'/key_index'`.
const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

#[derive(Clone, PartialEq, Eq)]
enum KeyMaterial {
    Private(EcPrivateKey),
    Public(EcPublicKey),
}

/// A key plus the chain code needed to derive its children.
///
/// Children are always new values; a parent is never modified.
#[derive(Clone, PartialEq, Eq)]
pub struct ExtendedKey {
    key: KeyMaterial,
    chain_code: Zeroizing<[u8; 32]>,
    path: DerivationPath,
}

impl ExtendedKey {
    pub fn path(&self) -> &DerivationPath {
        &self.path
    }

    pub fn depth(&self) -> usize {
        self.path.depth()
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    /// `None` once the key has been neutered.
    pub fn private_key(&self) -> Option<&EcPrivateKey> {
        match &self.key {
            KeyMaterial::Private(sk) => Some(sk),
            KeyMaterial::Public(_) => None,
        }
    }

    pub fn public_key(&self) -> EcPublicKey {
        match &self.key {
            KeyMaterial::Private(sk) => sk.public_key(),
            KeyMaterial::Public(pk) => pk.clone(),
        }
    }

    pub fn key_pair(&self) -> Option<EcKeyPair> {
        self.private_key()
            .map(|sk| EcKeyPair::from_private_key(sk.clone()))
    }

    pub fn is_private(&self) -> bool {
        matches!(self.key, KeyMaterial::Private(_))
    }

    /// Same position in the tree with the private part dropped.
    pub fn neuter(&self) -> ExtendedKey {
        ExtendedKey {
            key: KeyMaterial::Public(self.public_key()),
            chain_code: self.chain_code.clone(),
            path: self.path.clone(),
        }
    }

    pub fn derive_child(&self, axis: DerivationAxis) -> Result<ExtendedKey, DerivationError> {
        let mut mac = hmac_sha512(&self.chain_code[..])?;
        match &self.key {
            KeyMaterial::Private(sk) if axis.is_hardened() => {
                mac.update(&[0x00]);
                mac.update(&sk.to_bytes());
            }
            KeyMaterial::Private(sk) => mac.update(&sk.public_key().compressed()),
            KeyMaterial::Public(_) if axis.is_hardened() => {
                return Err(DerivationError::HardenedFromPublic {
                    index: axis.index(),
                });
            }
            KeyMaterial::Public(pk) => mac.update(&pk.compressed()),
        }
        mac.update(&axis.child_number().to_be_bytes());

        let (il, chain_code) = split_output(&mac.finalize().into_bytes());
        let invalid = || DerivationError::InvalidChildIndex {
            index: axis.index(),
        };
        let tweak = Option::<Scalar>::from(Scalar::from_repr(FieldBytes::from(*il)))
            .ok_or_else(invalid)?;

        let key = match &self.key {
            KeyMaterial::Private(sk) => {
                let child = tweak + *sk.as_secret_key().to_nonzero_scalar();
                let secret = SecretKey::from_bytes(&child.to_repr()).map_err(|_| invalid())?;
                KeyMaterial::Private(EcPrivateKey::from_secret_key(secret))
            }
            KeyMaterial::Public(pk) => {
                let point = ProjectivePoint::GENERATOR * tweak + pk.as_public_key().to_projective();
                let public = PublicKey::from_affine(point.to_affine()).map_err(|_| invalid())?;
                KeyMaterial::Public(EcPublicKey::from_public_key(public))
            }
        };

        Ok(ExtendedKey {
            key,
            chain_code,
            path: self.path.child(axis),
        })
    }
}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("path", &self.path.to_string())
            .field("private", &self.is_private())
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// Stateless entry points for seed → key derivation.
pub struct KeyDerivation;

impl KeyDerivation {
    pub fn master_key_from_seed(seed: &[u8]) -> Result<ExtendedKey, DerivationError> {
        let mut mac = hmac_sha512(MASTER_HMAC_KEY)?;
        mac.update(seed);
        let (il, chain_code) = split_output(&mac.finalize().into_bytes());

        let secret = SecretKey::from_slice(&il[..])
            .map_err(|_| DerivationError::KeyDerivation("seed yields an invalid master key".into()))?;

        Ok(ExtendedKey {
            key: KeyMaterial::Private(EcPrivateKey::from_secret_key(secret)),
            chain_code,
            path: DerivationPath::root(),
        })
    }

    /// Fails with `InvalidChildIndex` when the derived scalar is unusable.
    /// Callers retry with the next index; no retry happens here.
    pub fn derive_child(
        parent: &ExtendedKey,
        axis: DerivationAxis,
    ) -> Result<ExtendedKey, DerivationError> {
        parent.derive_child(axis)
    }

    pub fn derive(seed: &[u8], path: &DerivationPath) -> Result<ExtendedKey, DerivationError> {
        tracing::debug!(path = %path, "deriving key");
        path.axes()
            .iter()
            .try_fold(Self::master_key_from_seed(seed)?, |key, axis| {
                key.derive_child(*axis)
            })
    }
}

/// `m/did_index'/key_type'/key_index'`
pub fn identity_key_path(
    did_index: u32,
    key_type: KeyType,
    key_index: u32,
) -> Result<DerivationPath, DerivationError> {
    Ok(DerivationPath::from_axes(vec![
        DerivationAxis::hardened(did_index)?,
        DerivationAxis::hardened(key_type.index())?,
        DerivationAxis::hardened(key_index)?,
    ]))
}

pub fn derive_identity_key(
    seed: &[u8],
    did_index: u32,
    key_type: KeyType,
    key_index: u32,
) -> Result<ExtendedKey, DerivationError> {
    let path = identity_key_path(did_index, key_type, key_index)?;
    KeyDerivation::derive(seed, &path)
}

fn hmac_sha512(key: &[u8]) -> Result<Hmac<Sha512>, DerivationError> {
    Hmac::<Sha512>::new_from_slice(key)
        .map_err(|e| DerivationError::KeyDerivation(format!("HMAC init failed: {}", e)))
}

fn split_output(output: &[u8]) -> (Zeroizing<[u8; 32]>, Zeroizing<[u8; 32]>) {
    let mut left = Zeroizing::new([0u8; 32]);
    let mut right = Zeroizing::new([0u8; 32]);
    left.copy_from_slice(&output[..32]);
    right.copy_from_slice(&output[32..64]);
    (left, right)
}
