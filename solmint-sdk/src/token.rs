//! Decoding of SPL token mint and token accounts.

use solana_sdk::{account::Account, program_pack::Pack, pubkey::Pubkey};
use spl_token::state::{Account as SplTokenAccount, Mint as SplMint};

use crate::error::{Error, Result};

/// A decoded SPL token mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintInfo {
    pub address: Pubkey,
    pub mint_authority: Option<Pubkey>,
    pub freeze_authority: Option<Pubkey>,
    pub supply: u64,
    pub decimals: u8,
}

/// A decoded SPL token account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenAccountInfo {
    pub address: Pubkey,
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub delegate: Option<Pubkey>,
    pub delegated_amount: u64,
    pub close_authority: Option<Pubkey>,
    pub is_frozen: bool,
}

fn ensure_token_program_owner(address: &Pubkey, account: &Account) -> Result<()> {
    if account.owner != spl_token::id() {
        return Err(Error::InvalidAccountData {
            account: *address,
            reason: format!("owned by {}, not the token program", account.owner),
        });
    }
    Ok(())
}

pub fn decode_mint(address: &Pubkey, account: &Account) -> Result<MintInfo> {
    ensure_token_program_owner(address, account)?;
    let mint = SplMint::unpack(&account.data).map_err(|e| Error::InvalidAccountData {
        account: *address,
        reason: e.to_string(),
    })?;

    Ok(MintInfo {
        address: *address,
        mint_authority: mint.mint_authority.into(),
        freeze_authority: mint.freeze_authority.into(),
        supply: mint.supply,
        decimals: mint.decimals,
    })
}

pub fn decode_token_account(address: &Pubkey, account: &Account) -> Result<TokenAccountInfo> {
    ensure_token_program_owner(address, account)?;
    let token = SplTokenAccount::unpack(&account.data).map_err(|e| Error::InvalidAccountData {
        account: *address,
        reason: e.to_string(),
    })?;

    Ok(TokenAccountInfo {
        address: *address,
        mint: token.mint,
        owner: token.owner,
        amount: token.amount,
        delegate: token.delegate.into(),
        delegated_amount: token.delegated_amount,
        close_authority: token.close_authority.into(),
        is_frozen: token.is_frozen(),
    })
}
