//! # Transaction Builder
//!
//! This module provides the [`TransactionBuilder`], the accumulator every other
//! builder in this crate funnels into. It collects instruction steps, signers
//! and a fee payer, then assembles a Solana transaction in two phases:
//!
//! 1.  **Resolve**: every [`InstructionStep`] is turned into concrete
//!     instructions, in registration order. [`InstructionStep::Ready`] steps are
//!     pure; [`InstructionStep::Deferred`] steps may read from the cluster first
//!     (rent exemption, account existence, edition counters) and may legitimately
//!     produce zero instructions.
//! 2.  **Compile**: the instructions are placed into a message with a recent
//!     blockhash (or a durable nonce) and signed by the declared signers that
//!     the message actually requires.
//!
//! Solana executes instructions strictly in order, so the builder never
//! reorders them: callers put setup instructions (account creation) before the
//! instructions that use those accounts.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use solana_client::nonce_utils;
use solana_sdk::{
    hash::Hash,
    instruction::Instruction,
    message::Message,
    pubkey::Pubkey,
    signer::Signer,
    transaction::Transaction,
};
use solana_system_interface::instruction as system_instruction;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::rpc::AsyncRpcClient;

/// A signer shared between the caller and the builders.
pub type SharedSigner = Arc<dyn Signer + Send + Sync>;

/// An instruction step whose output depends on on-chain state.
///
/// Implementors perform their reads through the given client and return the
/// instructions to append. Returning an empty list is valid.
#[async_trait]
pub trait ResolveInstructions: Send + Sync {
    async fn resolve(&self, rpc: &dyn AsyncRpcClient) -> Result<Vec<Instruction>>;
}

/// One unit of work registered on a [`TransactionBuilder`].
pub enum InstructionStep {
    /// Instructions known up front; resolving them never touches the network.
    Ready(Vec<Instruction>),
    /// Instructions that require an RPC lookup before they can be emitted.
    Deferred(Box<dyn ResolveInstructions>),
}

impl InstructionStep {
    pub fn deferred(resolver: impl ResolveInstructions + 'static) -> Self {
        InstructionStep::Deferred(Box::new(resolver))
    }

    /// Returns `true` if the step can be resolved without an RPC client.
    pub fn is_ready(&self) -> bool {
        matches!(self, InstructionStep::Ready(_))
    }
}

impl From<Instruction> for InstructionStep {
    fn from(ix: Instruction) -> Self {
        InstructionStep::Ready(vec![ix])
    }
}

impl From<Vec<Instruction>> for InstructionStep {
    fn from(ixs: Vec<Instruction>) -> Self {
        InstructionStep::Ready(ixs)
    }
}

impl std::fmt::Debug for InstructionStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstructionStep::Ready(ixs) => f.debug_tuple("Ready").field(&ixs.len()).finish(),
            InstructionStep::Deferred(_) => f.write_str("Deferred"),
        }
    }
}

/// Durable nonce parameters: the nonce account whose stored value replaces the
/// recent blockhash, and the authority allowed to advance it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurableNonce {
    pub nonce_account: Pubkey,
    pub nonce_authority: Pubkey,
}

/// A builder for assembling one Solana transaction.
///
/// All setters take and return the builder by value; [`TransactionBuilder::build`]
/// consumes it, so a builder can only ever produce a single transaction.
#[derive(Default)]
pub struct TransactionBuilder {
    fee_payer: Option<Pubkey>,
    steps: Vec<InstructionStep>,
    signers: Vec<SharedSigner>,
    nonce: Option<DurableNonce>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the account paying the transaction fees.
    pub fn fee_payer(mut self, fee_payer: Pubkey) -> Self {
        self.fee_payer = Some(fee_payer);
        self
    }

    /// Appends an instruction step. Steps are resolved in the order they were added.
    pub fn add_instruction(mut self, step: impl Into<InstructionStep>) -> Self {
        self.steps.push(step.into());
        self
    }

    pub fn add_instructions<I>(mut self, steps: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<InstructionStep>,
    {
        self.steps.extend(steps.into_iter().map(Into::into));
        self
    }

    /// Declares a signer. Signers not required by the final message are ignored.
    pub fn add_signer(mut self, signer: SharedSigner) -> Self {
        self.signers.push(signer);
        self
    }

    pub fn add_signers<I>(mut self, signers: I) -> Self
    where
        I: IntoIterator<Item = SharedSigner>,
    {
        self.signers.extend(signers);
        self
    }

    /// Switches the transaction to durable-nonce mode.
    ///
    /// An `AdvanceNonceAccount` instruction is prepended at compile time and the
    /// nonce value stored in `nonce_account` is used as the message blockhash.
    /// When no fee payer is set, the nonce authority pays.
    pub fn durable_nonce(mut self, nonce_account: Pubkey, nonce_authority: Pubkey) -> Self {
        self.nonce = Some(DurableNonce {
            nonce_account,
            nonce_authority,
        });
        self
    }

    /// The number of registered instruction steps (not instructions).
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn effective_fee_payer(&self) -> Option<Pubkey> {
        self.fee_payer
            .or_else(|| self.nonce.map(|nonce| nonce.nonce_authority))
    }

    /// Runs every instruction step in order and collects the results.
    ///
    /// Fails with [`Error::MissingFeePayer`] before issuing any RPC call when no
    /// fee payer can be determined. The first failing step aborts the whole
    /// resolution.
    pub async fn resolve(self, rpc: &dyn AsyncRpcClient) -> Result<ResolvedTransaction> {
        let fee_payer = self.effective_fee_payer().ok_or(Error::MissingFeePayer)?;

        let mut instructions = Vec::new();
        for (index, step) in self.steps.into_iter().enumerate() {
            let produced = match step {
                InstructionStep::Ready(ixs) => ixs,
                InstructionStep::Deferred(resolver) => resolver.resolve(rpc).await?,
            };
            tracing::trace!(step = index, count = produced.len(), "Resolved instruction step");
            instructions.extend(produced);
        }

        Ok(ResolvedTransaction {
            fee_payer,
            instructions,
            signers: self.signers,
            nonce: self.nonce,
        })
    }

    /// Resolves all steps without a client. Fails if any step is deferred.
    pub fn resolve_ready(self) -> Result<ResolvedTransaction> {
        let fee_payer = self.effective_fee_payer().ok_or(Error::MissingFeePayer)?;

        let mut instructions = Vec::new();
        for (index, step) in self.steps.into_iter().enumerate() {
            match step {
                InstructionStep::Ready(ixs) => instructions.extend(ixs),
                InstructionStep::Deferred(_) => return Err(Error::UnresolvedStep(index)),
            }
        }

        Ok(ResolvedTransaction {
            fee_payer,
            instructions,
            signers: self.signers,
            nonce: self.nonce,
        })
    }

    /// Resolves all steps, fetches a blockhash (or the durable nonce) and
    /// compiles the transaction.
    pub async fn build(self, rpc: &dyn AsyncRpcClient) -> Result<PreparedTransaction> {
        let resolved = self.resolve(rpc).await?;

        let blockhash = match &resolved.nonce {
            Some(nonce) => fetch_durable_nonce(rpc, nonce).await?,
            None => rpc.get_latest_blockhash().await?,
        };

        resolved.compile(blockhash)
    }

    /// Like [`TransactionBuilder::build`] but with a caller-provided blockhash.
    pub async fn build_with_blockhash(
        self,
        rpc: &dyn AsyncRpcClient,
        blockhash: Hash,
    ) -> Result<PreparedTransaction> {
        self.resolve(rpc).await?.compile(blockhash)
    }
}

/// Reads the durable nonce value stored in a nonce account.
async fn fetch_durable_nonce(rpc: &dyn AsyncRpcClient, nonce: &DurableNonce) -> Result<Hash> {
    let account = rpc
        .get_account(&nonce.nonce_account)
        .await?
        .ok_or(Error::AccountNotFound(nonce.nonce_account))?;

    let data = nonce_utils::data_from_account(&account).map_err(|e| Error::InvalidAccountData {
        account: nonce.nonce_account,
        reason: e.to_string(),
    })?;

    if data.authority != nonce.nonce_authority {
        return Err(Error::InvalidAccountData {
            account: nonce.nonce_account,
            reason: format!(
                "nonce authority is {}, expected {}",
                data.authority, nonce.nonce_authority
            ),
        });
    }

    Ok(data.blockhash())
}

/// The concrete, ordered instruction list produced by [`TransactionBuilder::resolve`].
pub struct ResolvedTransaction {
    fee_payer: Pubkey,
    instructions: Vec<Instruction>,
    signers: Vec<SharedSigner>,
    nonce: Option<DurableNonce>,
}

impl ResolvedTransaction {
    pub fn fee_payer(&self) -> &Pubkey {
        &self.fee_payer
    }

    /// The resolved instructions, without the nonce-advance instruction.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn nonce(&self) -> Option<&DurableNonce> {
        self.nonce.as_ref()
    }

    /// Places the instructions into a message and signs it with every declared
    /// signer the message requires. Performs no I/O.
    pub fn compile(self, blockhash: Hash) -> Result<PreparedTransaction> {
        let mut instructions = self.instructions;
        if let Some(nonce) = &self.nonce {
            instructions.insert(
                0,
                system_instruction::advance_nonce_account(
                    &nonce.nonce_account,
                    &nonce.nonce_authority,
                ),
            );
        }

        let message = Message::new_with_blockhash(&instructions, Some(&self.fee_payer), &blockhash);
        let mut transaction = Transaction::new_unsigned(message);

        let required = transaction.message.signer_keys();
        let signers: Vec<&dyn Signer> = self
            .signers
            .iter()
            .filter(|signer| required.contains(&&signer.pubkey()))
            .map(|signer| &**signer as &dyn Signer)
            .collect();
        if !signers.is_empty() {
            transaction.try_partial_sign(&signers[..], blockhash)?;
        }

        tracing::debug!(
            fee_payer = %self.fee_payer,
            instructions = instructions.len(),
            signed = signers.len(),
            durable_nonce = self.nonce.is_some(),
            "Compiled transaction"
        );

        Ok(PreparedTransaction {
            transaction,
            blockhash,
        })
    }
}

/// A compiled, possibly partially signed transaction ready for serialization.
#[derive(Debug, Clone)]
pub struct PreparedTransaction {
    transaction: Transaction,
    blockhash: Hash,
}

impl PreparedTransaction {
    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn into_transaction(self) -> Transaction {
        self.transaction
    }

    pub fn message(&self) -> &Message {
        &self.transaction.message
    }

    /// The recent blockhash, or the durable nonce value, the message commits to.
    pub fn blockhash(&self) -> &Hash {
        &self.blockhash
    }

    /// Adds signatures from additional signers.
    pub fn sign(&mut self, signers: &[&dyn Signer]) -> Result<()> {
        self.transaction.try_partial_sign(signers, self.blockhash)?;
        Ok(())
    }

    /// Returns `true` once every required signature is present.
    pub fn is_fully_signed(&self) -> bool {
        self.transaction.is_signed()
    }

    /// Serializes the transaction in the Solana wire format.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serde::encode_to_vec(
            &self.transaction,
            bincode::config::legacy(),
        )?)
    }

    /// Serializes the transaction in the Solana wire format and base64-encodes it.
    pub fn to_base64(&self) -> Result<String> {
        Ok(BASE64.encode(self.to_bytes()?))
    }
}
