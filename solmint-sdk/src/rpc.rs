//! Defines a generic RPC client trait to abstract over different client implementations.

use async_trait::async_trait;
use solana_client::{client_error::ClientError, nonblocking::rpc_client::RpcClient};
use solana_sdk::{
    account::Account, hash::Hash, pubkey::Pubkey, signature::Signature, transaction::Transaction,
};
use solana_transaction_status::TransactionStatus;

/// A trait abstracting over the asynchronous RPC client functionality.
///
/// Builders and the client facade only ever talk to the cluster through this
/// trait, so the live `RpcClient` and in-memory test doubles are interchangeable.
#[async_trait]
pub trait AsyncRpcClient: Send + Sync {
    /// Fetches the latest blockhash from the RPC endpoint.
    async fn get_latest_blockhash(&self) -> Result<Hash, ClientError>;

    /// Returns the lamports an account of `data_len` bytes needs to be rent exempt.
    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, ClientError>;

    /// Fetches an account, returning `None` when it does not exist.
    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>, ClientError>;

    /// Returns the lamport balance of an account.
    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, ClientError>;

    /// Submits a signed transaction without waiting for confirmation.
    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature, ClientError>;

    /// Looks up the status of a single signature.
    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<TransactionStatus>, ClientError>;

    /// Requests an airdrop of `lamports` to `pubkey` (devnet/testnet/localnet only).
    async fn request_airdrop(&self, pubkey: &Pubkey, lamports: u64)
        -> Result<Signature, ClientError>;
}

#[async_trait]
impl AsyncRpcClient for RpcClient {
    async fn get_latest_blockhash(&self) -> Result<Hash, ClientError> {
        self.get_latest_blockhash().await
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, ClientError> {
        self.get_minimum_balance_for_rent_exemption(data_len).await
    }

    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>, ClientError> {
        let response = self
            .get_account_with_commitment(pubkey, self.commitment())
            .await?;
        Ok(response.value)
    }

    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, ClientError> {
        self.get_balance(pubkey).await
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature, ClientError> {
        self.send_transaction(transaction).await
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<TransactionStatus>, ClientError> {
        let response = self.get_signature_statuses(&[*signature]).await?;
        Ok(response.value.into_iter().next().flatten())
    }

    async fn request_airdrop(
        &self,
        pubkey: &Pubkey,
        lamports: u64,
    ) -> Result<Signature, ClientError> {
        self.request_airdrop(pubkey, lamports).await
    }
}
