pub mod crypto;
pub mod error;
pub mod merkle;
pub mod traits;
pub mod types;

pub use crypto::*;
pub use error::*;
pub use merkle::{generate_proofs, verify_proof, MerkleInclusionProof, MerkleProofs, MerkleRoot};
pub use traits::*;
pub use types::*;
