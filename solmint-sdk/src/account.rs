//! Keypair creation and (de)serialization helpers.

use bip39::{Language, Mnemonic};
use rand::RngCore;
use solana_sdk::{
    pubkey::Pubkey,
    signer::keypair::{keypair_from_seed, Keypair},
};
use std::str::FromStr;
use zeroize::Zeroize;

use crate::error::{Error, Result};

/// Word counts accepted by [`generate_mnemonic`].
pub const MNEMONIC_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

/// Generates a fresh random keypair.
pub fn new_account() -> Keypair {
    Keypair::new()
}

/// Parses a keypair from the base58 encoding of its 64 secret-key bytes.
pub fn account_from_base58(encoded: &str) -> Result<Keypair> {
    let mut bytes = bs58::decode(encoded.trim())
        .into_vec()
        .map_err(|e| Error::InvalidKeypair(e.to_string()))?;
    let keypair = account_from_bytes(&bytes);
    bytes.zeroize();
    keypair
}

pub fn account_to_base58(keypair: &Keypair) -> String {
    keypair.to_base58_string()
}

/// Builds a keypair from its 64-byte secret key (secret scalar followed by public key).
pub fn account_from_bytes(bytes: &[u8]) -> Result<Keypair> {
    Keypair::try_from(bytes).map_err(|e| Error::InvalidKeypair(e.to_string()))
}

/// Derives a keypair from a BIP-39 seed phrase and optional passphrase.
///
/// The first 32 bytes of the BIP-39 seed become the ed25519 secret, which is the
/// derivation used by `solana-keygen` without a derivation path.
pub fn account_from_seed_phrase(phrase: &str, passphrase: &str) -> Result<Keypair> {
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase)
        .map_err(|e| Error::InvalidKeypair(e.to_string()))?;
    let mut seed = mnemonic.to_seed(passphrase);
    let keypair = keypair_from_seed(&seed[..32]).map_err(|e| Error::InvalidKeypair(e.to_string()));
    seed.zeroize();
    keypair
}

/// Generates a new English BIP-39 mnemonic with `word_count` words.
pub fn generate_mnemonic(word_count: usize) -> Result<Mnemonic> {
    if !MNEMONIC_WORD_COUNTS.contains(&word_count) {
        return Err(Error::InvalidKeypair(format!(
            "unsupported mnemonic length {word_count}, expected one of {MNEMONIC_WORD_COUNTS:?}"
        )));
    }

    let mut entropy = vec![0u8; word_count / 3 * 4];
    rand::rngs::OsRng.fill_bytes(&mut entropy);
    let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy)
        .map_err(|e| Error::InvalidKeypair(e.to_string()));
    entropy.zeroize();
    mnemonic
}

/// Parses a base58 public key.
pub fn parse_pubkey(encoded: &str) -> Result<Pubkey> {
    Pubkey::from_str(encoded.trim()).map_err(|e| Error::InvalidPubkey(format!("{encoded}: {e}")))
}

