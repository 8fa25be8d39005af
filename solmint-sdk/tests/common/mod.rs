#![allow(dead_code)]

use async_trait::async_trait;
use borsh::BorshSerialize;
use mpl_token_metadata::{
    accounts::{Edition, MasterEdition, Metadata},
    types::Key,
};
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_nonce::{
    state::{Data as NonceData, DurableNonce, State},
    versions::Versions,
};
use solana_sdk::{
    account::Account,
    hash::Hash,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::Signature,
    transaction::{Transaction, TransactionError},
};
use solana_transaction_status::{TransactionConfirmationStatus, TransactionStatus};
use solmint_sdk::{metadata::TokenStandard, pda, rpc::AsyncRpcClient};
use spl_token::{
    solana_program::{program_option::COption, program_pack::Pack},
    state::{Account as SplTokenAccount, AccountState, Mint as SplMint},
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const RENT: u64 = 1_461_600;

/// An in-memory RPC client that serves canned accounts and records every call.
pub struct MockRpcClient {
    pub blockhash: Hash,
    accounts: Mutex<HashMap<Pubkey, Account>>,
    send_results: Mutex<VecDeque<Result<Signature, ClientError>>>,
    statuses: Mutex<VecDeque<Option<TransactionStatus>>>,
    pub sent: Mutex<Vec<Transaction>>,
    calls: AtomicUsize,
    send_calls: AtomicUsize,
    status_calls: AtomicUsize,
}

impl MockRpcClient {
    pub fn new() -> Self {
        Self {
            blockhash: Hash::new_unique(),
            accounts: Mutex::new(HashMap::new()),
            send_results: Mutex::new(VecDeque::new()),
            statuses: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            send_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_account(self, address: Pubkey, account: Account) -> Self {
        self.accounts.lock().unwrap().insert(address, account);
        self
    }

    /// Queues the outcome of the next `send_transaction` call. When the queue
    /// is empty, sends succeed with a fresh signature.
    pub fn push_send_result(&self, result: Result<Signature, ClientError>) {
        self.send_results.lock().unwrap().push_back(result);
    }

    /// Queues the answer of the next `get_signature_status` call. When the
    /// queue is empty, the signature is reported as unknown.
    pub fn push_status(&self, status: Option<TransactionStatus>) {
        self.statuses.lock().unwrap().push_back(status);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn send_calls(&self) -> usize {
        self.send_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl AsyncRpcClient for MockRpcClient {
    async fn get_latest_blockhash(&self) -> Result<Hash, ClientError> {
        self.record();
        Ok(self.blockhash)
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        _data_len: usize,
    ) -> Result<u64, ClientError> {
        self.record();
        Ok(RENT)
    }

    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>, ClientError> {
        self.record();
        Ok(self.accounts.lock().unwrap().get(pubkey).cloned())
    }

    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, ClientError> {
        self.record();
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .get(pubkey)
            .map(|a| a.lamports)
            .unwrap_or(0))
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature, ClientError> {
        self.record();
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(transaction.clone());
        self.send_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Signature::new_unique()))
    }

    async fn get_signature_status(
        &self,
        _signature: &Signature,
    ) -> Result<Option<TransactionStatus>, ClientError> {
        self.record();
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.statuses.lock().unwrap().pop_front().flatten())
    }

    async fn request_airdrop(
        &self,
        _pubkey: &Pubkey,
        _lamports: u64,
    ) -> Result<Signature, ClientError> {
        self.record();
        Ok(Signature::new_unique())
    }
}

// --- Errors and statuses ---

pub fn blockhash_not_found() -> ClientError {
    ClientError::from(ClientErrorKind::Custom(
        "Transaction simulation failed: Blockhash not found".to_string(),
    ))
}

pub fn other_rpc_error() -> ClientError {
    ClientError::from(ClientErrorKind::Custom(
        "Transaction simulation failed: insufficient funds for fee".to_string(),
    ))
}

pub fn status(confirmation: TransactionConfirmationStatus) -> TransactionStatus {
    let confirmations = match confirmation {
        TransactionConfirmationStatus::Finalized => None,
        TransactionConfirmationStatus::Confirmed => Some(10),
        TransactionConfirmationStatus::Processed => Some(0),
    };
    TransactionStatus {
        slot: 42,
        confirmations,
        status: Ok(()),
        err: None,
        confirmation_status: Some(confirmation),
    }
}

pub fn failed_status(error: TransactionError) -> TransactionStatus {
    TransactionStatus {
        slot: 42,
        confirmations: Some(1),
        status: Err(error.clone()),
        err: Some(error),
        confirmation_status: Some(TransactionConfirmationStatus::Processed),
    }
}

// --- Account fixtures ---

fn owned_by(owner: Pubkey, data: Vec<u8>) -> Account {
    Account {
        lamports: RENT,
        data,
        owner,
        executable: false,
        rent_epoch: 0,
    }
}

/// An initialized SPL mint account.
pub fn mint_account(mint_authority: Option<Pubkey>, supply: u64, decimals: u8) -> Account {
    let mint = SplMint {
        mint_authority: COption::from(mint_authority),
        supply,
        decimals,
        is_initialized: true,
        freeze_authority: COption::None,
    };
    let mut data = vec![0u8; SplMint::LEN];
    SplMint::pack(mint, &mut data).unwrap();
    owned_by(spl_token::id(), data)
}

/// An initialized SPL token account.
pub fn token_account(mint: Pubkey, owner: Pubkey, amount: u64) -> Account {
    let account = SplTokenAccount {
        mint,
        owner,
        amount,
        delegate: COption::None,
        state: AccountState::Initialized,
        is_native: COption::None,
        delegated_amount: 0,
        close_authority: COption::None,
    };
    let mut data = vec![0u8; SplTokenAccount::LEN];
    SplTokenAccount::pack(account, &mut data).unwrap();
    owned_by(spl_token::id(), data)
}

fn token_metadata_account(value: &impl BorshSerialize) -> Account {
    owned_by(mpl_token_metadata::ID, value.try_to_vec().unwrap())
}

/// A master edition (v2) account.
pub fn master_edition_account(supply: u64, max_supply: Option<u64>) -> Account {
    token_metadata_account(&MasterEdition {
        key: Key::MasterEditionV2,
        supply,
        max_supply,
    })
}

/// A print edition account.
pub fn print_edition_account(parent: Pubkey, edition: u64) -> Account {
    token_metadata_account(&Edition {
        key: Key::EditionV1,
        parent,
        edition,
    })
}

/// A metadata account without creators, collection or uses.
pub fn metadata_account(
    mint: Pubkey,
    update_authority: Pubkey,
    name: &str,
    token_standard: Option<TokenStandard>,
) -> Account {
    token_metadata_account(&Metadata {
        key: Key::MetadataV1,
        update_authority,
        mint,
        name: name.to_string(),
        symbol: "SOLM".to_string(),
        uri: "https://example.com/token.json".to_string(),
        seller_fee_basis_points: 500,
        creators: None,
        primary_sale_happened: false,
        is_mutable: true,
        edition_nonce: None,
        token_standard: token_standard.map(Into::into),
        collection: None,
        uses: None,
        collection_details: None,
        programmable_config: None,
    })
}

/// An initialized durable nonce account.
pub fn nonce_account(authority: Pubkey, durable_nonce: DurableNonce) -> Account {
    let state = State::Initialized(NonceData::new(authority, durable_nonce, 5_000));
    let data = bincode::serde::encode_to_vec(Versions::new(state), bincode::config::legacy())
        .unwrap();
    owned_by(solana_sdk::system_program::id(), data)
}

pub fn edition_address(mint: &Pubkey) -> Pubkey {
    pda::derive_edition_account(mint)
}

// --- Instruction labels ---

/// A short label for the instructions this crate emits, for order assertions.
pub fn label(ix: &Instruction) -> &'static str {
    if ix.program_id == solana_sdk::system_program::id() {
        let tag = ix
            .data
            .get(..4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]));
        return match tag {
            Some(0) => "CreateAccount",
            Some(2) => "Transfer",
            Some(4) => "AdvanceNonceAccount",
            Some(6) => "InitializeNonceAccount",
            _ => "System",
        };
    }
    if ix.program_id == spl_token::id() {
        return match ix.data.first() {
            Some(20) => "InitializeMint",
            Some(7) => "MintTo",
            Some(6) => "SetAuthority",
            Some(12) => "TransferChecked",
            Some(15) => "BurnChecked",
            Some(9) => "CloseAccount",
            _ => "Token",
        };
    }
    if ix.program_id == spl_associated_token_account::id() {
        return "CreateAssociatedTokenAccount";
    }
    if ix.program_id == mpl_token_metadata::ID {
        return match ix.data.first() {
            Some(33) => "CreateMetadataAccount",
            Some(17) => "CreateMasterEdition",
            Some(11) => "MintNewEditionFromMasterEdition",
            Some(15) => "UpdateMetadataAccount",
            _ => "TokenMetadata",
        };
    }
    "Unknown"
}

pub fn labels(ixs: &[Instruction]) -> Vec<&'static str> {
    ixs.iter().map(label).collect()
}
