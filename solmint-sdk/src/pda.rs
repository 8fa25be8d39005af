//! Program-derived addresses used by the token and token-metadata programs.
//!
//! Every function here is pure and deterministic.

use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address;

const METADATA_SEED: &[u8] = b"metadata";
const EDITION_SEED: &[u8] = b"edition";
const COLLECTION_AUTHORITY_SEED: &[u8] = b"collection_authority";
const USER_SEED: &[u8] = b"user";
const BURN_SEED: &[u8] = b"burn";

/// Number of editions tracked by a single edition marker account.
pub const EDITION_MARKER_BIT_SIZE: u64 = 248;

/// The associated token account of `wallet` for `mint`.
pub fn derive_token_account(wallet: &Pubkey, mint: &Pubkey) -> Pubkey {
    get_associated_token_address(wallet, mint)
}

pub fn derive_metadata_account(mint: &Pubkey) -> Pubkey {
    let (pda, _) = Pubkey::find_program_address(
        &[METADATA_SEED, mpl_token_metadata::ID.as_ref(), mint.as_ref()],
        &mpl_token_metadata::ID,
    );
    pda
}

/// The edition account of `mint`: a master edition for originals, an edition for prints.
pub fn derive_edition_account(mint: &Pubkey) -> Pubkey {
    let (pda, _) = Pubkey::find_program_address(
        &[
            METADATA_SEED,
            mpl_token_metadata::ID.as_ref(),
            mint.as_ref(),
            EDITION_SEED,
        ],
        &mpl_token_metadata::ID,
    );
    pda
}

/// The edition marker recording which prints of `master_mint` exist.
///
/// One marker covers [`EDITION_MARKER_BIT_SIZE`] consecutive edition numbers.
pub fn derive_edition_marker_account(master_mint: &Pubkey, edition: u64) -> Pubkey {
    let marker = (edition / EDITION_MARKER_BIT_SIZE).to_string();
    let (pda, _) = Pubkey::find_program_address(
        &[
            METADATA_SEED,
            mpl_token_metadata::ID.as_ref(),
            master_mint.as_ref(),
            EDITION_SEED,
            marker.as_bytes(),
        ],
        &mpl_token_metadata::ID,
    );
    pda
}

pub fn derive_collection_authority_record(mint: &Pubkey, collection_authority: &Pubkey) -> Pubkey {
    let (pda, _) = Pubkey::find_program_address(
        &[
            METADATA_SEED,
            mpl_token_metadata::ID.as_ref(),
            mint.as_ref(),
            COLLECTION_AUTHORITY_SEED,
            collection_authority.as_ref(),
        ],
        &mpl_token_metadata::ID,
    );
    pda
}

pub fn derive_use_authority_record(mint: &Pubkey, use_authority: &Pubkey) -> Pubkey {
    let (pda, _) = Pubkey::find_program_address(
        &[
            METADATA_SEED,
            mpl_token_metadata::ID.as_ref(),
            mint.as_ref(),
            USER_SEED,
            use_authority.as_ref(),
        ],
        &mpl_token_metadata::ID,
    );
    pda
}

/// The program-wide burner account passed to use-authority instructions.
pub fn derive_burner() -> Pubkey {
    let (pda, _) = Pubkey::find_program_address(
        &[METADATA_SEED, mpl_token_metadata::ID.as_ref(), BURN_SEED],
        &mpl_token_metadata::ID,
    );
    pda
}
