//! Merkle trees over SHA-256 digests, used to anchor a batch of
//! credentials under one root.
//!
//! Leaf and interior node hashes are domain-separated (prefix `0x00` for
//! leaves, `0x01` for nodes) to rule out second-preimage splicing. The tree
//! need not be full: levels are built by pairing adjacent nodes left to right,
//! and an odd node at the end of a level is carried up unchanged.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{CoreError, CoreResult};
use crate::types::Sha256Digest;

const LEAF_PREFIX: u8 = 0x00;
const NODE_PREFIX: u8 = 0x01;

/// A proof with this many siblings or more would describe a tree larger than
/// 2^31 leaves.
pub const MAX_PROOF_LENGTH: usize = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MerkleRoot(pub Sha256Digest);

/// Proof that `hash` is a leaf of the tree with a given root.
///
/// `index` is a bitmask: bit `d` clear means the leaf sits in the left
/// subtree at depth `d` (counting from the root). `siblings` are ordered
/// bottom-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleInclusionProof {
    pub hash: Sha256Digest,
    pub index: u32,
    pub siblings: Vec<Sha256Digest>,
}

impl MerkleInclusionProof {
    /// Root obtained by folding the siblings onto the leaf hash.
    pub fn derived_root(&self) -> MerkleRoot {
        let n = self.siblings.len();
        let root = self
            .siblings
            .iter()
            .enumerate()
            .fold(leaf_hash(&self.hash), |current, (i, sibling)| {
                let bit = n - i - 1;
                let is_left = bit >= 32 || self.index & (1u32 << bit) == 0;
                if is_left {
                    combine_hashes(&current, sibling)
                } else {
                    combine_hashes(sibling, &current)
                }
            });
        MerkleRoot(root)
    }

    pub fn encode(&self) -> CoreResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn decode(encoded: &str) -> CoreResult<Self> {
        serde_json::from_str(encoded).map_err(|e| CoreError::InvalidProofEncoding(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleProofs {
    pub root: MerkleRoot,
    /// One proof per input hash, in input order.
    pub proofs: Vec<MerkleInclusionProof>,
}

enum MerkleTree {
    Leaf {
        data: Sha256Digest,
        hash: Sha256Digest,
    },
    Node {
        left: Box<MerkleTree>,
        right: Box<MerkleTree>,
        hash: Sha256Digest,
    },
}

impl MerkleTree {
    fn hash(&self) -> Sha256Digest {
        match self {
            MerkleTree::Leaf { hash, .. } | MerkleTree::Node { hash, .. } => *hash,
        }
    }

    fn leaf(data: Sha256Digest) -> Self {
        MerkleTree::Leaf {
            hash: leaf_hash(&data),
            data,
        }
    }

    fn node(left: MerkleTree, right: MerkleTree) -> Self {
        let hash = combine_hashes(&left.hash(), &right.hash());
        MerkleTree::Node {
            left: Box::new(left),
            right: Box::new(right),
            hash,
        }
    }

    fn collect_proofs(&self, index: u32, path: &mut Vec<Sha256Digest>, out: &mut Vec<MerkleInclusionProof>) {
        match self {
            MerkleTree::Leaf { data, .. } => {
                // `path` is top-down; proofs store siblings bottom-up.
                let siblings = path.iter().rev().copied().collect();
                out.push(MerkleInclusionProof {
                    hash: *data,
                    index,
                    siblings,
                });
            }
            MerkleTree::Node { left, right, .. } => {
                let depth = path.len() as u32;

                path.push(right.hash());
                left.collect_proofs(index, path, out);
                path.pop();

                path.push(left.hash());
                right.collect_proofs(index | (1u32 << depth), path, out);
                path.pop();
            }
        }
    }
}

/// Build a tree over `hashes` and an inclusion proof for each of them.
pub fn generate_proofs(hashes: &[Sha256Digest]) -> CoreResult<MerkleProofs> {
    if hashes.is_empty() {
        return Err(CoreError::EmptyBatch);
    }

    let mut level: Vec<MerkleTree> = hashes.iter().copied().map(MerkleTree::leaf).collect();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut nodes = level.into_iter();
        while let Some(left) = nodes.next() {
            match nodes.next() {
                Some(right) => next.push(MerkleTree::node(left, right)),
                None => next.push(left),
            }
        }
        level = next;
    }

    let tree = level.pop().ok_or(CoreError::EmptyBatch)?;
    let mut proofs = Vec::with_capacity(hashes.len());
    tree.collect_proofs(0, &mut Vec::new(), &mut proofs);

    Ok(MerkleProofs {
        root: MerkleRoot(tree.hash()),
        proofs,
    })
}

pub fn verify_proof(root: &MerkleRoot, proof: &MerkleInclusionProof) -> bool {
    proof.siblings.len() < MAX_PROOF_LENGTH && proof.derived_root() == *root
}

fn leaf_hash(data: &Sha256Digest) -> Sha256Digest {
    let mut hasher = Sha256::new();
    hasher.update([LEAF_PREFIX]);
    hasher.update(data.as_bytes());
    Sha256Digest(hasher.finalize().into())
}

fn combine_hashes(left: &Sha256Digest, right: &Sha256Digest) -> Sha256Digest {
    let mut hasher = Sha256::new();
    hasher.update([NODE_PREFIX]);
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    Sha256Digest(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digests(n: usize) -> Vec<Sha256Digest> {
        (0..n)
            .map(|i| Sha256Digest::compute(format!("credential-{}", i).as_bytes()))
            .collect()
    }

    #[test]
    fn test_empty_batch_rejected() {
        assert_eq!(generate_proofs(&[]).unwrap_err(), CoreError::EmptyBatch);
    }

    #[test]
    fn test_single_leaf_root_is_leaf_hash() {
        let hashes = digests(1);
        let proofs = generate_proofs(&hashes).unwrap();
        assert_eq!(proofs.root, MerkleRoot(leaf_hash(&hashes[0])));
        assert_eq!(proofs.proofs.len(), 1);
        assert!(proofs.proofs[0].siblings.is_empty());
        assert!(verify_proof(&proofs.root, &proofs.proofs[0]));
    }

    #[test]
    fn test_two_leaves_layout() {
        let hashes = digests(2);
        let proofs = generate_proofs(&hashes).unwrap();
        let expected = combine_hashes(&leaf_hash(&hashes[0]), &leaf_hash(&hashes[1]));
        assert_eq!(proofs.root, MerkleRoot(expected));
        assert_eq!(proofs.proofs[0].index, 0);
        assert_eq!(proofs.proofs[1].index, 1);
    }

    #[test]
    fn test_every_proof_verifies_for_uneven_sizes() {
        for n in 1..=17 {
            let hashes = digests(n);
            let proofs = generate_proofs(&hashes).unwrap();
            assert_eq!(proofs.proofs.len(), n);
            for (h, proof) in hashes.iter().zip(&proofs.proofs) {
                assert_eq!(&proof.hash, h, "proof order must follow input order (n={})", n);
                assert!(verify_proof(&proofs.root, proof), "n={} index={}", n, proof.index);
            }
        }
    }

    #[test]
    fn test_proof_against_wrong_root_fails() {
        let a = generate_proofs(&digests(4)).unwrap();
        let b = generate_proofs(&digests(5)).unwrap();
        assert!(!verify_proof(&b.root, &a.proofs[0]));
    }

    #[test]
    fn test_tampered_sibling_fails() {
        let proofs = generate_proofs(&digests(4)).unwrap();
        let mut proof = proofs.proofs[2].clone();
        proof.siblings[0] = Sha256Digest::compute(b"forged");
        assert!(!verify_proof(&proofs.root, &proof));
    }

    #[test]
    fn test_flipped_index_fails() {
        let proofs = generate_proofs(&digests(4)).unwrap();
        let mut proof = proofs.proofs[1].clone();
        proof.index ^= 1;
        assert!(!verify_proof(&proofs.root, &proof));
    }

    #[test]
    fn test_overlong_proof_rejected() {
        let proofs = generate_proofs(&digests(1)).unwrap();
        let mut proof = proofs.proofs[0].clone();
        proof.siblings = vec![Sha256Digest::compute(b"x"); MAX_PROOF_LENGTH];
        let root = proof.derived_root();
        assert!(!verify_proof(&root, &proof));
    }

    #[test]
    fn test_encode_decode() {
        let proofs = generate_proofs(&digests(3)).unwrap();
        let proof = &proofs.proofs[2];
        let encoded = proof.encode().unwrap();
        assert!(encoded.contains("\"siblings\""));
        assert!(encoded.contains(&proof.hash.hex_value()));
        let decoded = MerkleInclusionProof::decode(&encoded).unwrap();
        assert_eq!(&decoded, proof);
    }

    #[test]
    fn test_decode_garbage() {
        let err = MerkleInclusionProof::decode("{\"hash\":1}").unwrap_err();
        assert!(matches!(err, CoreError::InvalidProofEncoding(_)));
    }
}
