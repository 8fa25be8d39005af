//! # Solana Client Facade
//!
//! [`SolanaClient`] bundles an [`AsyncRpcClient`] with a [`ClientConfig`] and
//! offers the high-level operations the builders need around them: account
//! queries, metadata lookups, transaction submission with a bounded retry on
//! blockhash-not-found, and confirmation polling with a timeout.
//!
//! The client is generic over the RPC implementation so the same code runs
//! against a live `RpcClient` and against in-memory test doubles.

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{pubkey::Pubkey, signature::Signature, transaction::Transaction};
use std::{sync::Arc, time::Duration};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::metadata::{self, OffChainMetadata, TokenMetadata};
use crate::pda;
use crate::rpc::AsyncRpcClient;
use crate::token::{self, MintInfo, TokenAccountInfo};
use crate::transaction::{PreparedTransaction, TransactionBuilder};

/// High-level access to a Solana cluster.
pub struct SolanaClient<C: AsyncRpcClient = RpcClient> {
    rpc: Arc<C>,
    config: ClientConfig,
    http: reqwest::Client,
}

impl SolanaClient<RpcClient> {
    /// Connects to the RPC endpoint named in the configuration.
    pub fn from_config(config: ClientConfig) -> Self {
        let rpc = RpcClient::new_with_commitment(
            config.solana.rpc_url.clone(),
            config.solana.commitment_config(),
        );
        Self::new(Arc::new(rpc), config)
    }
}

impl<C: AsyncRpcClient> Clone for SolanaClient<C> {
    fn clone(&self) -> Self {
        Self {
            rpc: Arc::clone(&self.rpc),
            config: self.config.clone(),
            http: self.http.clone(),
        }
    }
}

impl<C: AsyncRpcClient> SolanaClient<C> {
    pub fn new(rpc: Arc<C>, config: ClientConfig) -> Self {
        Self {
            rpc,
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn rpc(&self) -> &C {
        &self.rpc
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // --- Queries ---

    /// Returns the lamport balance of `address`.
    pub async fn get_balance(&self, address: &Pubkey) -> Result<u64> {
        Ok(self.rpc.get_balance(address).await?)
    }

    pub async fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> Result<u64> {
        Ok(self
            .rpc
            .get_minimum_balance_for_rent_exemption(data_len)
            .await?)
    }

    pub async fn get_mint(&self, mint: &Pubkey) -> Result<MintInfo> {
        let account = self
            .rpc
            .get_account(mint)
            .await?
            .ok_or(Error::AccountNotFound(*mint))?;
        token::decode_mint(mint, &account)
    }

    pub async fn get_token_account(&self, address: &Pubkey) -> Result<TokenAccountInfo> {
        let account = self
            .rpc
            .get_account(address)
            .await?
            .ok_or(Error::AccountNotFound(*address))?;
        token::decode_token_account(address, &account)
    }

    /// Returns the amount of `mint` held in the associated token account of
    /// `owner`, or zero when that account does not exist yet.
    pub async fn get_token_balance(&self, owner: &Pubkey, mint: &Pubkey) -> Result<u64> {
        let ata = pda::derive_token_account(owner, mint);
        match self.rpc.get_account(&ata).await? {
            Some(account) => Ok(token::decode_token_account(&ata, &account)?.amount),
            None => Ok(0),
        }
    }

    /// Fetches and decodes the metadata of `mint`.
    ///
    /// For standards that carry an edition, the edition account is fetched as
    /// well and attached to the result. Legacy metadata without a token standard
    /// gets its edition attached when one exists.
    pub async fn get_metadata(&self, mint: &Pubkey) -> Result<TokenMetadata> {
        let metadata_address = pda::derive_metadata_account(mint);
        let account = self
            .rpc
            .get_account(&metadata_address)
            .await?
            .ok_or(Error::AccountNotFound(metadata_address))?;
        let mut metadata = metadata::decode_metadata(&metadata_address, &account.data)?;

        let wants_edition = metadata
            .token_standard
            .map_or(true, |standard| standard.has_edition());
        if wants_edition {
            let edition_address = pda::derive_edition_account(mint);
            match self.rpc.get_account(&edition_address).await? {
                Some(edition) => {
                    metadata.edition =
                        Some(metadata::decode_edition(&edition_address, &edition.data)?);
                }
                None if metadata.token_standard.is_some() => {
                    return Err(Error::AccountNotFound(edition_address));
                }
                None => {}
            }
        }

        tracing::debug!(mint = %mint, name = %metadata.name, edition = metadata.edition.is_some(), "Fetched metadata");
        Ok(metadata)
    }

    /// Downloads the JSON document a metadata `uri` points to.
    pub async fn fetch_offchain_metadata(&self, uri: &str) -> Result<OffChainMetadata> {
        let response = self.http.get(uri).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    // --- Transactions ---

    /// Resolves and compiles a transaction against this client's cluster.
    pub async fn prepare(&self, builder: TransactionBuilder) -> Result<PreparedTransaction> {
        builder.build(self.rpc.as_ref()).await
    }

    /// Submits a signed transaction.
    ///
    /// A submission rejected because the node does not know the blockhash is
    /// retried up to `send.max-attempts` times in total, `send.retry-delay-ms`
    /// apart. Any other error is returned immediately.
    pub async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        let max_attempts = self.config.send.max_attempts.max(1);
        let delay = self.config.send.retry_delay();

        for attempt in 1..=max_attempts {
            match self.rpc.send_transaction(transaction).await {
                Ok(signature) => {
                    tracing::info!(%signature, attempt, "Transaction submitted");
                    return Ok(signature);
                }
                Err(e) => {
                    let error = Error::from(e);
                    if !error.is_blockhash_not_found() {
                        tracing::error!(error = %error, attempt, "Transaction submission failed");
                        return Err(error);
                    }
                    tracing::warn!(attempt, max_attempts, "Blockhash not found, retrying submission");
                    if attempt < max_attempts {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(Error::BlockhashNotFound {
            attempts: max_attempts,
        })
    }

    /// Polls the status of `signature` until it reaches the configured commitment.
    pub async fn wait_for_confirmation(&self, signature: &Signature) -> Result<()> {
        self.wait_for_confirmation_with_timeout(signature, self.config.confirmation.timeout())
            .await
    }

    /// Like [`SolanaClient::wait_for_confirmation`] with an explicit time budget.
    ///
    /// Fails with [`Error::TransactionFailed`] as soon as the cluster reports an
    /// execution error, and with [`Error::ConfirmationTimeout`] once `timeout`
    /// has elapsed.
    pub async fn wait_for_confirmation_with_timeout(
        &self,
        signature: &Signature,
        timeout: Duration,
    ) -> Result<()> {
        match tokio::time::timeout(timeout, self.poll_confirmation(signature)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(%signature, ?timeout, "Confirmation timed out");
                Err(Error::ConfirmationTimeout {
                    signature: *signature,
                    timeout,
                })
            }
        }
    }

    async fn poll_confirmation(&self, signature: &Signature) -> Result<()> {
        let commitment = self.config.solana.commitment_config();
        let interval = self.config.confirmation.poll_interval();

        loop {
            if let Some(status) = self.rpc.get_signature_status(signature).await? {
                if let Some(error) = status.err.clone() {
                    tracing::error!(%signature, %error, "Transaction failed");
                    return Err(Error::TransactionFailed {
                        signature: *signature,
                        error,
                    });
                }
                if status.satisfies_commitment(commitment) {
                    tracing::info!(%signature, commitment = ?commitment.commitment, "Transaction confirmed");
                    return Ok(());
                }
            }
            tracing::debug!(%signature, "Transaction not confirmed yet");
            tokio::time::sleep(interval).await;
        }
    }

    /// Submits a fully signed transaction and waits for its confirmation.
    pub async fn send_and_confirm(&self, transaction: &Transaction) -> Result<Signature> {
        let signature = self.send_transaction(transaction).await?;
        self.wait_for_confirmation(&signature).await?;
        Ok(signature)
    }

    /// Requests an airdrop and returns its signature without waiting.
    pub async fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> Result<Signature> {
        let signature = self.rpc.request_airdrop(address, lamports).await?;
        tracing::info!(%address, lamports, %signature, "Airdrop requested");
        Ok(signature)
    }
}
