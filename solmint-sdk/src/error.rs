use solana_client::client_error::ClientError;
use solana_sdk::{
    program_error::ProgramError, pubkey::Pubkey, signature::Signature, signer::SignerError,
    transaction::TransactionError,
};
use std::time::Duration;
use thiserror::Error;

use crate::metadata::TokenStandard;

/// The error type for every fallible operation in this crate.
///
/// Variants are grouped by failure category: caller-side validation, RPC
/// round-trips, (de)serialization of transactions and account data, and signing.
#[derive(Error, Debug)]
pub enum Error {
    // --- Validation ---
    #[error("Fee payer is not set and cannot be defaulted from an owner or nonce authority")]
    MissingFeePayer,

    #[error("Token standard is not set")]
    MissingTokenStandard,

    #[error("Mint account is not set")]
    MissingMint,

    #[error("Owner is not set")]
    MissingOwner,

    #[error("A metadata instruction is required for {0:?} tokens")]
    MissingMetadata(TokenStandard),

    #[error("Master edition mint is not set")]
    MissingMasterMint,

    #[error("Decimals must be in the range 0..=9, got {0}")]
    InvalidDecimals(u8),

    #[error("Wrong token standard: expected {expected}, got {actual:?}")]
    WrongTokenStandard {
        expected: &'static str,
        actual: TokenStandard,
    },

    #[error("Token standard {0:?} is not supported by this builder")]
    UnsupportedTokenStandard(TokenStandard),

    #[error("Master edition supply {supply} has reached its max supply {max_supply}")]
    MaxSupplyReached { supply: u64, max_supply: u64 },

    #[error("Account {0} is not a master edition")]
    TokenIsNotMasterEdition(Pubkey),

    #[error("Instruction step {0} needs an RPC client to resolve")]
    UnresolvedStep(usize),

    #[error("Invalid keypair: {0}")]
    InvalidKeypair(String),

    #[error("Invalid public key: {0}")]
    InvalidPubkey(String),

    // --- RPC ---
    #[error("RPC request failed: {0}")]
    Rpc(#[from] ClientError),

    #[error("Account {0} was not found")]
    AccountNotFound(Pubkey),

    #[error("Blockhash not found after {attempts} attempts")]
    BlockhashNotFound { attempts: u32 },

    #[error("Transaction {signature} was not confirmed within {timeout:?}")]
    ConfirmationTimeout {
        signature: Signature,
        timeout: Duration,
    },

    #[error("Transaction {signature} failed: {error}")]
    TransactionFailed {
        signature: Signature,
        error: TransactionError,
    },

    // --- Serialization ---
    #[error("Serialization failed: {0}")]
    Serialization(#[from] bincode::error::EncodeError),

    #[error("Deserialization failed: {0}")]
    Deserialization(String),

    #[error("Invalid data in account {account}: {reason}")]
    InvalidAccountData { account: Pubkey, reason: String },

    #[error("Failed to create instruction: {0}")]
    Instruction(#[from] ProgramError),

    // --- Signing ---
    #[error("Signing failed: {0}")]
    Signing(#[from] SignerError),

    // --- Off-chain metadata ---
    #[error("Off-chain metadata request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Returns `true` when the error is the RPC node rejecting a transaction
    /// because its recent blockhash is unknown (expired or not yet seen).
    pub fn is_blockhash_not_found(&self) -> bool {
        match self {
            Error::BlockhashNotFound { .. } => true,
            Error::Rpc(e) => {
                let msg = e.to_string();
                msg.contains("BlockhashNotFound") || msg.contains("Blockhash not found")
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
