//! A Rust library for building and submitting Solana token transactions.
//!
//! This crate layers a small, strongly typed API over the Solana RPC client,
//! the SPL token programs and the Metaplex token-metadata program.
//!
//! # Key Components
//!
//! *   [`transaction::TransactionBuilder`]: accumulates instruction steps,
//!     signers, a fee payer and an optional durable nonce, and produces a
//!     signed, base64-serializable transaction.
//! *   [`mint::MintBuilder`]: assembles mint transactions for fungible tokens,
//!     NFTs with a master edition, and editions printed from a master.
//! *   [`client::SolanaClient`]: account and metadata queries, transaction
//!     submission with a bounded blockhash retry, and confirmation polling.
//! *   [`pda`]: derivation of associated token, metadata and edition addresses.
pub mod account;
pub mod client;
/// Configuration structures for the client facade and builders.
pub mod config;
pub mod error;
pub mod instructions;
/// Metaplex metadata and edition records.
pub mod metadata;
pub mod mint;
pub mod pda;
/// The RPC abstraction every network call goes through.
pub mod rpc;
/// SPL mint and token account records.
pub mod token;
pub mod transaction;

pub use client::SolanaClient;
pub use error::{Error, Result};
