pub mod backend;
pub mod derivation;
pub mod error;
pub mod key_hierarchy;
pub mod mnemonic;

pub use backend::{BackendKind, CryptoContext, DeterministicBackend, HedgedBackend};
pub use derivation::{DerivationAxis, DerivationPath, HARDENED_BIT, MAX_AXIS_INDEX};
pub use error::*;
pub use key_hierarchy::{derive_identity_key, identity_key_path, ExtendedKey, KeyDerivation};
pub use mnemonic::{MnemonicCode, MnemonicCodec, MNEMONIC_WORD_COUNT};
