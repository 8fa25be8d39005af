//! # Instruction Helpers
//!
//! Constructors for the system, SPL token, associated token account and
//! token-metadata instructions this crate assembles into transactions.
//!
//! Functions returning [`Instruction`] are pure. Functions returning an
//! [`InstructionStep`] produce deferred steps that read from the cluster when
//! the owning [`crate::transaction::TransactionBuilder`] is resolved.

use async_trait::async_trait;
use mpl_token_metadata::{
    instructions::{
        ApproveCollectionAuthorityBuilder, ApproveUseAuthorityBuilder, BurnNftBuilder,
        CreateMasterEditionV3Builder, CreateMetadataAccountV3Builder,
        MintNewEditionFromMasterEditionViaTokenBuilder, SignMetadataBuilder,
        UpdateMetadataAccountV2Builder, VerifyCollectionBuilder,
    },
    types::MintNewEditionFromMasterEditionViaTokenArgs,
};
use solana_sdk::{instruction::Instruction, program_pack::Pack, pubkey::Pubkey};
use solana_system_interface::instruction as system_instruction;
use spl_associated_token_account::instruction::create_associated_token_account;
use spl_token::{instruction as token_instruction, instruction::AuthorityType, state::Mint};

use crate::error::{Error, Result};
use crate::metadata::MetadataData;
use crate::pda;
use crate::rpc::AsyncRpcClient;
use crate::token::decode_mint;
use crate::transaction::{InstructionStep, ResolveInstructions};

/// Size of a system nonce account (versioned nonce state).
pub const NONCE_ACCOUNT_LENGTH: usize = 80;

// --- System ---

pub fn transfer_sol(from: &Pubkey, to: &Pubkey, lamports: u64) -> Instruction {
    system_instruction::transfer(from, to, lamports)
}

/// Creates a rent-exempt account for a new mint, owned by the token program.
pub fn create_mint_account(payer: Pubkey, mint: Pubkey) -> InstructionStep {
    InstructionStep::deferred(CreateMintAccount { payer, mint })
}

/// Creates and initializes a rent-exempt durable nonce account.
pub fn create_nonce_account(
    payer: Pubkey,
    nonce_account: Pubkey,
    nonce_authority: Pubkey,
) -> InstructionStep {
    InstructionStep::deferred(CreateNonceAccount {
        payer,
        nonce_account,
        nonce_authority,
    })
}

struct CreateMintAccount {
    payer: Pubkey,
    mint: Pubkey,
}

#[async_trait]
impl ResolveInstructions for CreateMintAccount {
    async fn resolve(&self, rpc: &dyn AsyncRpcClient) -> Result<Vec<Instruction>> {
        let lamports = rpc.get_minimum_balance_for_rent_exemption(Mint::LEN).await?;
        tracing::debug!(mint = %self.mint, lamports, "Rent exemption for mint account");
        Ok(vec![system_instruction::create_account(
            &self.payer,
            &self.mint,
            lamports,
            Mint::LEN as u64,
            &spl_token::id(),
        )])
    }
}

struct CreateNonceAccount {
    payer: Pubkey,
    nonce_account: Pubkey,
    nonce_authority: Pubkey,
}

#[async_trait]
impl ResolveInstructions for CreateNonceAccount {
    async fn resolve(&self, rpc: &dyn AsyncRpcClient) -> Result<Vec<Instruction>> {
        let lamports = rpc
            .get_minimum_balance_for_rent_exemption(NONCE_ACCOUNT_LENGTH)
            .await?;
        Ok(system_instruction::create_nonce_account(
            &self.payer,
            &self.nonce_account,
            &self.nonce_authority,
            lamports,
        ))
    }
}

// --- SPL Token ---

pub fn initialize_mint(
    mint: &Pubkey,
    mint_authority: &Pubkey,
    freeze_authority: Option<&Pubkey>,
    decimals: u8,
) -> Result<Instruction> {
    Ok(token_instruction::initialize_mint2(
        &spl_token::id(),
        mint,
        mint_authority,
        freeze_authority,
        decimals,
    )?)
}

pub fn mint_to(
    mint: &Pubkey,
    destination: &Pubkey,
    mint_authority: &Pubkey,
    amount: u64,
) -> Result<Instruction> {
    Ok(token_instruction::mint_to(
        &spl_token::id(),
        mint,
        destination,
        mint_authority,
        &[],
        amount,
    )?)
}

/// Permanently removes the mint authority, fixing the supply.
pub fn revoke_mint_authority(mint: &Pubkey, mint_authority: &Pubkey) -> Result<Instruction> {
    Ok(token_instruction::set_authority(
        &spl_token::id(),
        mint,
        None,
        AuthorityType::MintTokens,
        mint_authority,
        &[],
    )?)
}

/// Creates the associated token account of `wallet` for `mint`.
pub fn create_token_account(payer: &Pubkey, wallet: &Pubkey, mint: &Pubkey) -> Instruction {
    create_associated_token_account(payer, wallet, mint, &spl_token::id())
}

/// Creates the associated token account of `wallet` only if it does not exist yet.
pub fn create_token_account_if_missing(
    payer: Pubkey,
    wallet: Pubkey,
    mint: Pubkey,
) -> InstructionStep {
    InstructionStep::deferred(CreateTokenAccountIfMissing {
        payer,
        wallet,
        mint,
    })
}

struct CreateTokenAccountIfMissing {
    payer: Pubkey,
    wallet: Pubkey,
    mint: Pubkey,
}

#[async_trait]
impl ResolveInstructions for CreateTokenAccountIfMissing {
    async fn resolve(&self, rpc: &dyn AsyncRpcClient) -> Result<Vec<Instruction>> {
        let ata = pda::derive_token_account(&self.wallet, &self.mint);
        if rpc.get_account(&ata).await?.is_some() {
            return Ok(Vec::new());
        }
        Ok(vec![create_token_account(
            &self.payer,
            &self.wallet,
            &self.mint,
        )])
    }
}

pub fn freeze_token_account(
    account: &Pubkey,
    mint: &Pubkey,
    freeze_authority: &Pubkey,
) -> Result<Instruction> {
    Ok(token_instruction::freeze_account(
        &spl_token::id(),
        account,
        mint,
        freeze_authority,
        &[],
    )?)
}

pub fn thaw_token_account(
    account: &Pubkey,
    mint: &Pubkey,
    freeze_authority: &Pubkey,
) -> Result<Instruction> {
    Ok(token_instruction::thaw_account(
        &spl_token::id(),
        account,
        mint,
        freeze_authority,
        &[],
    )?)
}

pub fn burn_tokens(
    account: &Pubkey,
    mint: &Pubkey,
    owner: &Pubkey,
    amount: u64,
    decimals: u8,
) -> Result<Instruction> {
    Ok(token_instruction::burn_checked(
        &spl_token::id(),
        account,
        mint,
        owner,
        &[],
        amount,
        decimals,
    )?)
}

/// Closes an empty token account and sends its rent to `destination`.
pub fn close_token_account(
    account: &Pubkey,
    destination: &Pubkey,
    owner: &Pubkey,
) -> Result<Instruction> {
    Ok(token_instruction::close_account(
        &spl_token::id(),
        account,
        destination,
        owner,
        &[],
    )?)
}

/// Parameters for [`transfer_tokens`].
#[derive(Debug, Clone)]
pub struct TransferTokensParams {
    pub mint: Pubkey,
    /// Wallet owning the source associated token account.
    pub source_owner: Pubkey,
    /// Wallet receiving the tokens; its associated token account is created if missing.
    pub destination_owner: Pubkey,
    /// Pays for the destination account when it has to be created.
    pub payer: Pubkey,
    pub amount: u64,
    /// Looked up from the mint account when `None`.
    pub decimals: Option<u8>,
}

/// Transfers tokens between the associated token accounts of two wallets.
pub fn transfer_tokens(params: TransferTokensParams) -> InstructionStep {
    InstructionStep::deferred(TransferTokens { params })
}

struct TransferTokens {
    params: TransferTokensParams,
}

#[async_trait]
impl ResolveInstructions for TransferTokens {
    async fn resolve(&self, rpc: &dyn AsyncRpcClient) -> Result<Vec<Instruction>> {
        let p = &self.params;

        let decimals = match p.decimals {
            Some(decimals) => decimals,
            None => {
                let account = rpc
                    .get_account(&p.mint)
                    .await?
                    .ok_or(Error::AccountNotFound(p.mint))?;
                decode_mint(&p.mint, &account)?.decimals
            }
        };

        let source = pda::derive_token_account(&p.source_owner, &p.mint);
        let destination = pda::derive_token_account(&p.destination_owner, &p.mint);

        let mut instructions = Vec::with_capacity(2);
        if rpc.get_account(&destination).await?.is_none() {
            instructions.push(create_token_account(
                &p.payer,
                &p.destination_owner,
                &p.mint,
            ));
        }
        instructions.push(token_instruction::transfer_checked(
            &spl_token::id(),
            &source,
            &p.mint,
            &destination,
            &p.source_owner,
            &[],
            p.amount,
            decimals,
        )?);

        Ok(instructions)
    }
}

// --- Token Metadata ---

/// Parameters for [`create_metadata_account`].
#[derive(Debug, Clone)]
pub struct CreateMetadataParams {
    pub mint: Pubkey,
    pub mint_authority: Pubkey,
    pub payer: Pubkey,
    pub update_authority: Pubkey,
    pub data: MetadataData,
    pub is_mutable: bool,
}

pub fn create_metadata_account(params: CreateMetadataParams) -> Instruction {
    let metadata = pda::derive_metadata_account(&params.mint);
    CreateMetadataAccountV3Builder::new()
        .metadata(metadata)
        .mint(params.mint)
        .mint_authority(params.mint_authority)
        .payer(params.payer)
        .update_authority(
            params.update_authority,
            params.update_authority == params.mint_authority,
        )
        .data(params.data.into())
        .is_mutable(params.is_mutable)
        .instruction()
}

/// Parameters for [`create_master_edition`].
#[derive(Debug, Clone)]
pub struct CreateMasterEditionParams {
    pub mint: Pubkey,
    pub update_authority: Pubkey,
    pub mint_authority: Pubkey,
    pub payer: Pubkey,
    /// `None` allows an unlimited number of prints; `Some(0)` makes the NFT unique.
    pub max_supply: Option<u64>,
}

pub fn create_master_edition(params: CreateMasterEditionParams) -> Instruction {
    let mut builder = CreateMasterEditionV3Builder::new();
    builder
        .edition(pda::derive_edition_account(&params.mint))
        .mint(params.mint)
        .update_authority(params.update_authority)
        .mint_authority(params.mint_authority)
        .payer(params.payer)
        .metadata(pda::derive_metadata_account(&params.mint));
    if let Some(max_supply) = params.max_supply {
        builder.max_supply(max_supply);
    }
    builder.instruction()
}

/// Parameters for [`mint_edition_from_master`].
#[derive(Debug, Clone)]
pub struct MintEditionParams {
    /// The freshly minted print, holding exactly one token.
    pub new_mint: Pubkey,
    pub new_mint_authority: Pubkey,
    pub payer: Pubkey,
    pub master_mint: Pubkey,
    /// Wallet holding the master edition token.
    pub master_token_owner: Pubkey,
    pub new_metadata_update_authority: Pubkey,
    pub edition: u64,
}

pub fn mint_edition_from_master(params: MintEditionParams) -> Instruction {
    MintNewEditionFromMasterEditionViaTokenBuilder::new()
        .new_metadata(pda::derive_metadata_account(&params.new_mint))
        .new_edition(pda::derive_edition_account(&params.new_mint))
        .master_edition(pda::derive_edition_account(&params.master_mint))
        .new_mint(params.new_mint)
        .edition_mark_pda(pda::derive_edition_marker_account(
            &params.master_mint,
            params.edition,
        ))
        .new_mint_authority(params.new_mint_authority)
        .payer(params.payer)
        .token_account_owner(params.master_token_owner)
        .token_account(pda::derive_token_account(
            &params.master_token_owner,
            &params.master_mint,
        ))
        .new_metadata_update_authority(params.new_metadata_update_authority)
        .metadata(pda::derive_metadata_account(&params.master_mint))
        .mint_new_edition_from_master_edition_via_token_args(
            MintNewEditionFromMasterEditionViaTokenArgs {
                edition: params.edition,
            },
        )
        .instruction()
}

/// Parameters for [`update_metadata`]. Fields left as `None` are not changed.
#[derive(Debug, Clone)]
pub struct UpdateMetadataParams {
    pub mint: Pubkey,
    pub update_authority: Pubkey,
    pub data: Option<MetadataData>,
    pub new_update_authority: Option<Pubkey>,
    pub primary_sale_happened: Option<bool>,
    pub is_mutable: Option<bool>,
}

impl UpdateMetadataParams {
    pub fn new(mint: Pubkey, update_authority: Pubkey) -> Self {
        Self {
            mint,
            update_authority,
            data: None,
            new_update_authority: None,
            primary_sale_happened: None,
            is_mutable: None,
        }
    }
}

pub fn update_metadata(params: UpdateMetadataParams) -> Instruction {
    let mut builder = UpdateMetadataAccountV2Builder::new();
    builder
        .metadata(pda::derive_metadata_account(&params.mint))
        .update_authority(params.update_authority);
    if let Some(data) = params.data {
        builder.data(data.into());
    }
    if let Some(new_update_authority) = params.new_update_authority {
        builder.new_update_authority(new_update_authority);
    }
    if let Some(primary_sale_happened) = params.primary_sale_happened {
        builder.primary_sale_happened(primary_sale_happened);
    }
    if let Some(is_mutable) = params.is_mutable {
        builder.is_mutable(is_mutable);
    }
    builder.instruction()
}

/// Marks `creator` as verified on the metadata of `mint`. The creator must sign.
pub fn sign_metadata(mint: &Pubkey, creator: &Pubkey) -> Instruction {
    SignMetadataBuilder::new()
        .metadata(pda::derive_metadata_account(mint))
        .creator(*creator)
        .instruction()
}

/// Verifies that the NFT `mint` belongs to the collection `collection_mint`.
pub fn verify_collection(
    mint: &Pubkey,
    collection_mint: &Pubkey,
    collection_authority: &Pubkey,
    payer: &Pubkey,
) -> Instruction {
    VerifyCollectionBuilder::new()
        .metadata(pda::derive_metadata_account(mint))
        .collection_authority(*collection_authority)
        .payer(*payer)
        .collection_mint(*collection_mint)
        .collection(pda::derive_metadata_account(collection_mint))
        .collection_master_edition_account(pda::derive_edition_account(collection_mint))
        .instruction()
}

/// Delegates collection authority over `mint` to `new_collection_authority`.
pub fn approve_collection_authority(
    mint: &Pubkey,
    new_collection_authority: &Pubkey,
    update_authority: &Pubkey,
    payer: &Pubkey,
) -> Instruction {
    ApproveCollectionAuthorityBuilder::new()
        .collection_authority_record(pda::derive_collection_authority_record(
            mint,
            new_collection_authority,
        ))
        .new_collection_authority(*new_collection_authority)
        .update_authority(*update_authority)
        .payer(*payer)
        .metadata(pda::derive_metadata_account(mint))
        .mint(*mint)
        .instruction()
}

/// Allows `user` to consume up to `number_of_uses` uses of the NFT `mint`.
pub fn approve_use_authority(
    mint: &Pubkey,
    owner: &Pubkey,
    user: &Pubkey,
    payer: &Pubkey,
    number_of_uses: u64,
) -> Instruction {
    ApproveUseAuthorityBuilder::new()
        .use_authority_record(pda::derive_use_authority_record(mint, user))
        .owner(*owner)
        .payer(*payer)
        .user(*user)
        .owner_token_account(pda::derive_token_account(owner, mint))
        .metadata(pda::derive_metadata_account(mint))
        .mint(*mint)
        .burner(pda::derive_burner())
        .number_of_uses(number_of_uses)
        .instruction()
}

/// Burns an NFT together with its metadata and master edition accounts.
pub fn burn_nft(mint: &Pubkey, owner: &Pubkey) -> Instruction {
    BurnNftBuilder::new()
        .metadata(pda::derive_metadata_account(mint))
        .owner(*owner)
        .mint(*mint)
        .token_account(pda::derive_token_account(owner, mint))
        .master_edition_account(pda::derive_edition_account(mint))
        .spl_token_program(spl_token::id())
        .instruction()
}
