//! Property tests for derivation paths, key derivation and signing.

use keytrust_core::CryptoBackend;
use keytrust_vault::{
    DerivationAxis, DerivationPath, DeterministicBackend, HedgedBackend, KeyDerivation,
    MnemonicCodec, MnemonicError, MAX_AXIS_INDEX,
};
use proptest::prelude::*;

fn axis_strategy() -> impl Strategy<Value = DerivationAxis> {
    (0..=MAX_AXIS_INDEX, any::<bool>())
        .prop_map(|(index, hardened)| DerivationAxis::new(index, hardened).unwrap())
}

fn path_strategy() -> impl Strategy<Value = DerivationPath> {
    prop::collection::vec(axis_strategy(), 0..8).prop_map(DerivationPath::from_axes)
}

proptest! {
    /// Serializing then parsing any path yields the same path.
    #[test]
    fn prop_path_text_roundtrip(path in path_strategy()) {
        let text = path.to_string();
        let parsed = DerivationPath::parse(&text).unwrap();
        prop_assert_eq!(parsed, path);
    }

    /// Any text that parses displays back as exactly the same text.
    #[test]
    fn prop_parsed_text_is_canonical(text in "m(/[0-9]{1,4}'?){0,5}|[m0-9/']{0,12}") {
        if let Ok(path) = DerivationPath::parse(&text) {
            prop_assert_eq!(path.to_string(), text);
        }
    }

    /// Any mnemonic word list that is not exactly 12 dictionary words is rejected.
    #[test]
    fn prop_wrong_word_count_rejected(indices in prop::collection::vec(0usize..2048, 0..24)) {
        prop_assume!(indices.len() != 12);
        let list = MnemonicCodec::word_list();
        let words: Vec<&str> = indices.iter().map(|i| list[*i]).collect();
        let err = MnemonicCodec::validate(&words).unwrap_err();
        prop_assert_eq!(err, MnemonicError::WrongLength { expected: 12, found: words.len() });
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Same seed and path always give the same extended key.
    #[test]
    fn prop_derivation_deterministic(seed in prop::collection::vec(any::<u8>(), 16..=64), path in path_strategy()) {
        let a = KeyDerivation::derive(&seed, &path).unwrap();
        let b = KeyDerivation::derive(&seed, &path).unwrap();
        prop_assert_eq!(a.chain_code(), b.chain_code());
        prop_assert_eq!(a.public_key(), b.public_key());
        prop_assert_eq!(
            a.private_key().map(|k| k.to_bytes()),
            b.private_key().map(|k| k.to_bytes())
        );
    }

    /// Distinct axes under the same parent give distinct chain codes.
    #[test]
    fn prop_sibling_axes_independent(seed in any::<[u8; 32]>(), a in axis_strategy(), b in axis_strategy()) {
        prop_assume!(a != b);
        let master = KeyDerivation::master_key_from_seed(&seed).unwrap();
        let ka = KeyDerivation::derive_child(&master, a).unwrap();
        let kb = KeyDerivation::derive_child(&master, b).unwrap();
        prop_assert_ne!(ka.chain_code(), kb.chain_code());
        prop_assert_ne!(ka.public_key(), kb.public_key());
    }

    /// Normal children of a neutered key match the private derivation.
    #[test]
    fn prop_public_derivation_agrees(seed in any::<[u8; 32]>(), index in 0..=MAX_AXIS_INDEX) {
        let master = KeyDerivation::master_key_from_seed(&seed).unwrap();
        let axis = DerivationAxis::normal(index).unwrap();
        let private_child = master.derive_child(axis).unwrap();
        let public_child = master.neuter().derive_child(axis).unwrap();
        prop_assert_eq!(private_child.public_key(), public_child.public_key());
    }

    /// Signatures verify for their own message and key only.
    #[test]
    fn prop_signature_correctness(message in prop::collection::vec(any::<u8>(), 0..256), flip in any::<usize>()) {
        let backends: [&dyn CryptoBackend; 2] = [&DeterministicBackend, &HedgedBackend];
        for backend in backends {
            let pair = backend.generate_key_pair();
            let other = backend.generate_key_pair();
            let sig = backend.sign(&message, &pair.private_key);

            prop_assert!(backend.verify(&message, &pair.public_key, &sig));
            prop_assert!(!backend.verify(&message, &other.public_key, &sig));

            let mut altered = message.clone();
            if altered.is_empty() {
                altered.push(0);
            } else {
                let i = flip % altered.len();
                altered[i] ^= 0x01;
            }
            prop_assert!(!backend.verify(&altered, &pair.public_key, &sig));
        }
    }
}

#[test]
fn test_generated_mnemonics_validate() {
    for _ in 0..16 {
        let m = MnemonicCodec::generate().unwrap();
        assert!(MnemonicCodec::validate(&m.words()).is_ok());
    }
}
