//! # Mint Builder
//!
//! [`MintBuilder`] assembles the transaction that creates a new token mint and,
//! depending on the token standard, its metadata, initial supply and edition
//! accounts:
//!
//! | Standard                         | Instructions                                                                 |
//! |----------------------------------|------------------------------------------------------------------------------|
//! | `Fungible` / `FungibleAsset`     | create mint, initialize mint, metadata?, [ATA, mint-to, revoke?] if supply > 0 |
//! | `NonFungible`                    | create mint, initialize mint (0 dp), metadata, ATA, mint-to 1, master edition |
//! | `NonFungibleEdition`             | create mint, initialize mint (0 dp), ATA, mint-to 1, print from master edition |
//!
//! Building is split into a pure [`MintBuilder::plan`] step, which validates the
//! parameters and lays out the instruction steps, and the RPC-backed
//! [`MintBuilder::build`].

use async_trait::async_trait;
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};

use crate::config::MintConfig;
use crate::error::{Error, Result};
use crate::instructions::{self, CreateMasterEditionParams, CreateMetadataParams, MintEditionParams};
use crate::metadata::{decode_master_edition, MetadataData, TokenStandard};
use crate::pda;
use crate::rpc::AsyncRpcClient;
use crate::transaction::{
    InstructionStep, PreparedTransaction, ResolveInstructions, SharedSigner, TransactionBuilder,
};

/// Highest number of decimals an SPL mint supports.
pub const MAX_DECIMALS: u8 = 9;

enum MetadataSource {
    Instruction(Instruction),
    Data { data: MetadataData, is_mutable: bool },
}

/// A builder for mint transactions. See the [module documentation](self).
#[derive(Default)]
pub struct MintBuilder {
    mint: Option<Pubkey>,
    owner: Option<Pubkey>,
    fee_payer: Option<Pubkey>,
    mint_authority: Option<Pubkey>,
    freeze_authority: Option<Pubkey>,
    update_authority: Option<Pubkey>,
    token_standard: Option<TokenStandard>,
    decimals: Option<u8>,
    supply: u64,
    fixed_supply: bool,
    max_supply: Option<u64>,
    master_mint: Option<Pubkey>,
    edition: Option<u64>,
    master_token_owner: Option<Pubkey>,
    metadata: Option<MetadataSource>,
    signers: Vec<SharedSigner>,
    nonce: Option<(Pubkey, Pubkey)>,
    config: MintConfig,
}

/// Accounts every mint path needs, after defaults have been applied.
struct MintAccounts {
    mint: Pubkey,
    owner: Pubkey,
    fee_payer: Pubkey,
    mint_authority: Pubkey,
    update_authority: Pubkey,
}

impl MintBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MintConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// The new mint account. Its keypair must be added as a signer.
    pub fn mint(mut self, mint: Pubkey) -> Self {
        self.mint = Some(mint);
        self
    }

    /// The wallet receiving the initial supply. Defaults to the fee payer.
    pub fn owner(mut self, owner: Pubkey) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Defaults to the owner.
    pub fn fee_payer(mut self, fee_payer: Pubkey) -> Self {
        self.fee_payer = Some(fee_payer);
        self
    }

    /// Defaults to the fee payer.
    pub fn mint_authority(mut self, mint_authority: Pubkey) -> Self {
        self.mint_authority = Some(mint_authority);
        self
    }

    pub fn freeze_authority(mut self, freeze_authority: Pubkey) -> Self {
        self.freeze_authority = Some(freeze_authority);
        self
    }

    /// Update authority of metadata built from [`MintBuilder::metadata`] and of
    /// printed editions. Defaults to the mint authority.
    pub fn update_authority(mut self, update_authority: Pubkey) -> Self {
        self.update_authority = Some(update_authority);
        self
    }

    pub fn token_standard(mut self, token_standard: TokenStandard) -> Self {
        self.token_standard = Some(token_standard);
        self
    }

    /// Must be at most [`MAX_DECIMALS`]. Ignored for non-fungible standards.
    pub fn decimals(mut self, decimals: u8) -> Self {
        self.decimals = Some(decimals);
        self
    }

    /// Initial supply in base units, minted to the owner. Ignored for non-fungible standards.
    pub fn supply(mut self, supply: u64) -> Self {
        self.supply = supply;
        self
    }

    /// Revokes the mint authority after minting the initial supply.
    pub fn fixed_supply(mut self, fixed_supply: bool) -> Self {
        self.fixed_supply = fixed_supply;
        self
    }

    /// Maximum number of prints of a `NonFungible` master edition.
    pub fn max_supply(mut self, max_supply: u64) -> Self {
        self.max_supply = Some(max_supply);
        self
    }

    /// Links a `NonFungibleEdition` mint to its master edition.
    ///
    /// When `edition` is `None`, the next free edition number is read from the
    /// master edition account at build time.
    pub fn master_edition(mut self, master_mint: Pubkey, edition: Option<u64>) -> Self {
        self.master_mint = Some(master_mint);
        self.edition = edition;
        self
    }

    /// Wallet holding the master edition token. Defaults to the fee payer.
    pub fn master_token_owner(mut self, owner: Pubkey) -> Self {
        self.master_token_owner = Some(owner);
        self
    }

    /// Uses a caller-built metadata instruction.
    pub fn metadata_instruction(mut self, instruction: Instruction) -> Self {
        self.metadata = Some(MetadataSource::Instruction(instruction));
        self
    }

    /// Builds a `CreateMetadataAccountV3` instruction from `data`.
    pub fn metadata(mut self, data: MetadataData, is_mutable: bool) -> Self {
        self.metadata = Some(MetadataSource::Data { data, is_mutable });
        self
    }

    pub fn add_signer(mut self, signer: SharedSigner) -> Self {
        self.signers.push(signer);
        self
    }

    pub fn durable_nonce(mut self, nonce_account: Pubkey, nonce_authority: Pubkey) -> Self {
        self.nonce = Some((nonce_account, nonce_authority));
        self
    }

    /// Validates the parameters and lays out the instruction steps without any I/O.
    pub fn plan(self) -> Result<TransactionBuilder> {
        self.accounts()?;
        match self.token_standard {
            None => Err(Error::MissingTokenStandard),
            Some(TokenStandard::Fungible) | Some(TokenStandard::FungibleAsset) => {
                self.plan_fungible()
            }
            Some(TokenStandard::NonFungible) => self.plan_non_fungible(),
            Some(TokenStandard::NonFungibleEdition) => self.plan_edition(),
            Some(other) => Err(Error::UnsupportedTokenStandard(other)),
        }
    }

    /// Plans, resolves and compiles the mint transaction.
    pub async fn build(self, rpc: &dyn AsyncRpcClient) -> Result<PreparedTransaction> {
        self.plan()?.build(rpc).await
    }

    /// Plans a `Fungible` or `FungibleAsset` mint.
    pub fn plan_fungible(self) -> Result<TransactionBuilder> {
        let accounts = self.accounts()?;
        match self.token_standard {
            Some(TokenStandard::Fungible) | Some(TokenStandard::FungibleAsset) => {}
            Some(actual) => {
                return Err(Error::WrongTokenStandard {
                    expected: "Fungible or FungibleAsset",
                    actual,
                })
            }
            None => return Err(Error::MissingTokenStandard),
        }

        let decimals = self.decimals.unwrap_or(self.config.default_decimals);
        if decimals > MAX_DECIMALS {
            return Err(Error::InvalidDecimals(decimals));
        }

        let mut tx = self.base_transaction(&accounts, decimals)?;
        if let Some(metadata) = self.metadata_step(&accounts) {
            tx = tx.add_instruction(metadata);
        }

        if self.supply > 0 {
            let ata = pda::derive_token_account(&accounts.owner, &accounts.mint);
            tx = tx
                .add_instruction(instructions::create_token_account(
                    &accounts.fee_payer,
                    &accounts.owner,
                    &accounts.mint,
                ))
                .add_instruction(instructions::mint_to(
                    &accounts.mint,
                    &ata,
                    &accounts.mint_authority,
                    self.supply,
                )?);
            if self.fixed_supply {
                tx = tx.add_instruction(instructions::revoke_mint_authority(
                    &accounts.mint,
                    &accounts.mint_authority,
                )?);
            }
        }

        Ok(self.finish(tx))
    }

    /// Plans a `NonFungible` mint with a master edition.
    pub fn plan_non_fungible(self) -> Result<TransactionBuilder> {
        let accounts = self.accounts()?;
        match self.token_standard {
            Some(TokenStandard::NonFungible) => {}
            Some(actual) => {
                return Err(Error::WrongTokenStandard {
                    expected: "NonFungible",
                    actual,
                })
            }
            None => return Err(Error::MissingTokenStandard),
        }
        let metadata = self
            .metadata_step(&accounts)
            .ok_or(Error::MissingMetadata(TokenStandard::NonFungible))?;

        let ata = pda::derive_token_account(&accounts.owner, &accounts.mint);
        let tx = self
            .base_transaction(&accounts, 0)?
            .add_instruction(metadata)
            .add_instruction(instructions::create_token_account(
                &accounts.fee_payer,
                &accounts.owner,
                &accounts.mint,
            ))
            .add_instruction(instructions::mint_to(
                &accounts.mint,
                &ata,
                &accounts.mint_authority,
                1,
            )?)
            .add_instruction(instructions::create_master_edition(
                CreateMasterEditionParams {
                    mint: accounts.mint,
                    update_authority: accounts.update_authority,
                    mint_authority: accounts.mint_authority,
                    payer: accounts.fee_payer,
                    max_supply: self.max_supply,
                },
            ));

        Ok(self.finish(tx))
    }

    /// Plans a `NonFungibleEdition` mint printed from an existing master edition.
    pub fn plan_edition(self) -> Result<TransactionBuilder> {
        let accounts = self.accounts()?;
        match self.token_standard {
            Some(TokenStandard::NonFungibleEdition) => {}
            Some(actual) => {
                return Err(Error::WrongTokenStandard {
                    expected: "NonFungibleEdition",
                    actual,
                })
            }
            None => return Err(Error::MissingTokenStandard),
        }
        let master_mint = self.master_mint.ok_or(Error::MissingMasterMint)?;

        let ata = pda::derive_token_account(&accounts.owner, &accounts.mint);
        let print = MintEditionFromMaster {
            params: MintEditionParams {
                new_mint: accounts.mint,
                new_mint_authority: accounts.mint_authority,
                payer: accounts.fee_payer,
                master_mint,
                master_token_owner: self.master_token_owner.unwrap_or(accounts.fee_payer),
                new_metadata_update_authority: accounts.update_authority,
                edition: 0,
            },
            edition: self.edition,
        };

        let tx = self
            .base_transaction(&accounts, 0)?
            .add_instruction(instructions::create_token_account(
                &accounts.fee_payer,
                &accounts.owner,
                &accounts.mint,
            ))
            .add_instruction(instructions::mint_to(
                &accounts.mint,
                &ata,
                &accounts.mint_authority,
                1,
            )?)
            .add_instruction(InstructionStep::deferred(print));

        Ok(self.finish(tx))
    }

    fn accounts(&self) -> Result<MintAccounts> {
        let fee_payer = self
            .fee_payer
            .or(self.owner)
            .or(self.nonce.map(|(_, authority)| authority))
            .ok_or(Error::MissingFeePayer)?;
        let mint = self.mint.ok_or(Error::MissingMint)?;
        let owner = self.owner.unwrap_or(fee_payer);
        let mint_authority = self.mint_authority.unwrap_or(fee_payer);
        let update_authority = self.update_authority.unwrap_or(mint_authority);

        Ok(MintAccounts {
            mint,
            owner,
            fee_payer,
            mint_authority,
            update_authority,
        })
    }

    /// Account creation and mint initialization, shared by every path.
    fn base_transaction(&self, accounts: &MintAccounts, decimals: u8) -> Result<TransactionBuilder> {
        Ok(TransactionBuilder::new()
            .fee_payer(accounts.fee_payer)
            .add_instruction(instructions::create_mint_account(
                accounts.fee_payer,
                accounts.mint,
            ))
            .add_instruction(instructions::initialize_mint(
                &accounts.mint,
                &accounts.mint_authority,
                self.freeze_authority.as_ref(),
                decimals,
            )?))
    }

    fn metadata_step(&self, accounts: &MintAccounts) -> Option<Instruction> {
        match &self.metadata {
            Some(MetadataSource::Instruction(ix)) => Some(ix.clone()),
            Some(MetadataSource::Data { data, is_mutable }) => Some(
                instructions::create_metadata_account(CreateMetadataParams {
                    mint: accounts.mint,
                    mint_authority: accounts.mint_authority,
                    payer: accounts.fee_payer,
                    update_authority: accounts.update_authority,
                    data: data.clone(),
                    is_mutable: *is_mutable,
                }),
            ),
            None => None,
        }
    }

    fn finish(self, tx: TransactionBuilder) -> TransactionBuilder {
        let tx = tx.add_signers(self.signers);
        match self.nonce {
            Some((nonce_account, nonce_authority)) => tx.durable_nonce(nonce_account, nonce_authority),
            None => tx,
        }
    }
}

/// Returns the next free edition number of a master edition: its current supply plus one.
///
/// Fails with [`Error::TokenIsNotMasterEdition`] when the edition account of
/// `master_mint` is not a master edition, and with [`Error::MaxSupplyReached`]
/// when no prints are left.
pub async fn next_edition_number(rpc: &dyn AsyncRpcClient, master_mint: &Pubkey) -> Result<u64> {
    let edition_address = pda::derive_edition_account(master_mint);
    let account = rpc
        .get_account(&edition_address)
        .await?
        .ok_or(Error::AccountNotFound(edition_address))?;

    if account.owner != mpl_token_metadata::ID {
        return Err(Error::TokenIsNotMasterEdition(edition_address));
    }

    let (supply, max_supply) = decode_master_edition(&edition_address, &account.data)?;
    if let Some(max_supply) = max_supply {
        if supply >= max_supply {
            return Err(Error::MaxSupplyReached { supply, max_supply });
        }
    }

    // An unlimited master edition can still run out of edition numbers.
    let next = supply.checked_add(1).ok_or(Error::MaxSupplyReached {
        supply,
        max_supply: u64::MAX,
    })?;

    tracing::debug!(master_mint = %master_mint, supply, ?max_supply, "Resolved next edition number");
    Ok(next)
}

struct MintEditionFromMaster {
    params: MintEditionParams,
    edition: Option<u64>,
}

#[async_trait]
impl ResolveInstructions for MintEditionFromMaster {
    async fn resolve(&self, rpc: &dyn AsyncRpcClient) -> Result<Vec<Instruction>> {
        let edition = match self.edition {
            Some(edition) => edition,
            None => next_edition_number(rpc, &self.params.master_mint).await?,
        };

        let params = MintEditionParams {
            edition,
            ..self.params.clone()
        };
        Ok(vec![instructions::mint_edition_from_master(params)])
    }
}
