use crate::error::MnemonicError;
use bip39::{Language, Mnemonic};
use std::fmt;
use zeroize::Zeroizing;

// BIP39 mnemonic codes over the embedded English word list.
//
// words → validate (membership, length, checksum) → MnemonicCode → seed
//
// Seeds are PBKDF2-HMAC-SHA512 over the NFKD sentence, salted with
// "mnemonic" + NFKD(passphrase), 2048 rounds, 64 bytes.

/// Number of words in every mnemonic this crate accepts or produces.
pub const MNEMONIC_WORD_COUNT: usize = 12;

/// 12 words encode 128 bits of entropy plus a 4-bit checksum.
const ENTROPY_BYTES: usize = 16;

pub struct MnemonicCodec;

impl MnemonicCodec {
    /// Fresh 12-word mnemonic from 128 bits of OS randomness.
    pub fn generate() -> Result<MnemonicCode, MnemonicError> {
        let mut entropy = Zeroizing::new([0u8; ENTROPY_BYTES]);
        rand::RngCore::fill_bytes(&mut rand::rngs::OsRng, &mut *entropy);
        let inner = Mnemonic::from_entropy_in(Language::English, &*entropy)
            .map_err(|e| MnemonicError::Encoding(e.to_string()))?;
        Ok(MnemonicCode { inner })
    }

    /// Check `words` against the word list, the expected length and the
    /// checksum, in that order.
    pub fn validate<S: AsRef<str>>(words: &[S]) -> Result<(), MnemonicError> {
        Self::parse_words(words).map(|_| ())
    }

    pub fn to_seed(mnemonic: &MnemonicCode, passphrase: &str) -> Zeroizing<[u8; 64]> {
        mnemonic.to_seed(passphrase)
    }

    /// The 2048-word English list, in index order.
    pub fn word_list() -> &'static [&'static str; 2048] {
        Language::English.word_list()
    }

    pub fn is_valid_word(word: &str) -> bool {
        Language::English.find_word(word).is_some()
    }

    fn parse_words<S: AsRef<str>>(words: &[S]) -> Result<Mnemonic, MnemonicError> {
        // Unknown words are reported first, even when the count is also wrong.
        if let Some((position, word)) = words
            .iter()
            .enumerate()
            .find(|(_, w)| !Self::is_valid_word(w.as_ref()))
        {
            tracing::warn!(position, "mnemonic word not in list");
            return Err(MnemonicError::WordNotInList {
                word: word.as_ref().to_string(),
                position,
            });
        }

        if words.len() != MNEMONIC_WORD_COUNT {
            tracing::warn!(found = words.len(), "mnemonic has wrong length");
            return Err(MnemonicError::WrongLength {
                expected: MNEMONIC_WORD_COUNT,
                found: words.len(),
            });
        }

        let sentence = Zeroizing::new(
            words
                .iter()
                .map(|w| w.as_ref())
                .collect::<Vec<_>>()
                .join(" "),
        );
        Mnemonic::parse_in_normalized(Language::English, &sentence).map_err(|e| match e {
            bip39::Error::InvalidChecksum => {
                tracing::warn!("mnemonic checksum mismatch");
                MnemonicError::ChecksumMismatch
            }
            other => MnemonicError::Encoding(other.to_string()),
        })
    }
}

/// A validated 12-word mnemonic.
#[derive(Clone, PartialEq, Eq)]
pub struct MnemonicCode {
    inner: Mnemonic,
}

impl MnemonicCode {
    pub fn from_words<S: AsRef<str>>(words: &[S]) -> Result<Self, MnemonicError> {
        let inner = MnemonicCodec::parse_words(words)?;
        Ok(Self { inner })
    }

    /// Parse a whitespace-separated sentence.
    pub fn parse(sentence: &str) -> Result<Self, MnemonicError> {
        let words: Vec<&str> = sentence.split_whitespace().collect();
        Self::from_words(&words)
    }

    pub fn words(&self) -> Vec<String> {
        self.inner
            .to_string()
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    /// BIP39 seed for this mnemonic and `passphrase` (may be empty).
    pub fn to_seed(&self, passphrase: &str) -> Zeroizing<[u8; 64]> {
        Zeroizing::new(self.inner.to_seed(passphrase))
    }
}

impl fmt::Display for MnemonicCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl fmt::Debug for MnemonicCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MnemonicCode([REDACTED; {} words])", MNEMONIC_WORD_COUNT)
    }
}
