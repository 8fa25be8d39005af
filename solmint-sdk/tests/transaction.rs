mod common;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use common::{labels, nonce_account, token_account, MockRpcClient};
use solana_nonce::state::DurableNonce;
use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};
use solmint_sdk::{
    instructions,
    pda,
    transaction::{SharedSigner, TransactionBuilder},
    Error,
};
use std::sync::Arc;

fn shared(keypair: Keypair) -> (Pubkey, SharedSigner) {
    (keypair.pubkey(), Arc::new(keypair))
}

#[tokio::test]
async fn test_missing_fee_payer_fails_before_any_rpc_call() -> anyhow::Result<()> {
    let rpc = MockRpcClient::new();
    let mint = Pubkey::new_unique();

    let result = TransactionBuilder::new()
        .add_instruction(instructions::create_mint_account(Pubkey::new_unique(), mint))
        .add_instruction(instructions::transfer_sol(
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            1,
        ))
        .build(&rpc)
        .await;

    assert!(matches!(result, Err(Error::MissingFeePayer)));
    assert_eq!(rpc.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_instructions_keep_registration_order() -> anyhow::Result<()> {
    let (payer, payer_signer) = shared(Keypair::new());
    let recipient = Pubkey::new_unique();
    let mint = Pubkey::new_unique();
    let rpc = MockRpcClient::new();

    let resolved = TransactionBuilder::new()
        .fee_payer(payer)
        .add_instruction(instructions::transfer_sol(&payer, &recipient, 10))
        .add_instruction(instructions::create_mint_account(payer, mint))
        .add_instruction(instructions::initialize_mint(&mint, &payer, None, 6)?)
        .add_instruction(instructions::transfer_sol(&payer, &recipient, 20))
        .add_signer(payer_signer)
        .resolve(&rpc)
        .await?;

    assert_eq!(
        labels(resolved.instructions()),
        vec!["Transfer", "CreateAccount", "InitializeMint", "Transfer"]
    );
    assert_eq!(resolved.fee_payer(), &payer);
    // Only the rent lookup of the deferred step.
    assert_eq!(rpc.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_order_holds_for_any_instruction_count() -> anyhow::Result<()> {
    let payer = Pubkey::new_unique();
    let recipient = Pubkey::new_unique();

    for count in [0u64, 1, 7] {
        let resolved = TransactionBuilder::new()
            .fee_payer(payer)
            .add_instructions((1..=count).map(|lamports| {
                instructions::transfer_sol(&payer, &recipient, lamports)
            }))
            .resolve_ready()?;

        let amounts: Vec<u64> = resolved
            .instructions()
            .iter()
            .map(|ix| u64::from_le_bytes(ix.data[4..12].try_into().unwrap()))
            .collect();
        assert_eq!(amounts, (1..=count).collect::<Vec<_>>());

        let prepared = resolved.compile(Hash::new_unique())?;
        assert_eq!(prepared.message().instructions.len(), count as usize);
    }
    Ok(())
}

#[tokio::test]
async fn test_deferred_step_may_produce_no_instructions() -> anyhow::Result<()> {
    let payer = Pubkey::new_unique();
    let wallet = Pubkey::new_unique();
    let mint = Pubkey::new_unique();
    let ata = pda::derive_token_account(&wallet, &mint);
    let rpc = MockRpcClient::new().with_account(ata, token_account(mint, wallet, 0));

    let resolved = TransactionBuilder::new()
        .fee_payer(payer)
        .add_instruction(instructions::create_token_account_if_missing(payer, wallet, mint))
        .add_instruction(instructions::transfer_sol(&payer, &wallet, 1))
        .resolve(&rpc)
        .await?;

    assert_eq!(labels(resolved.instructions()), vec!["Transfer"]);

    let fresh_wallet = Pubkey::new_unique();
    let resolved = TransactionBuilder::new()
        .fee_payer(payer)
        .add_instruction(instructions::create_token_account_if_missing(
            payer,
            fresh_wallet,
            mint,
        ))
        .resolve(&rpc)
        .await?;

    assert_eq!(
        labels(resolved.instructions()),
        vec!["CreateAssociatedTokenAccount"]
    );
    Ok(())
}

#[tokio::test]
async fn test_resolve_ready_rejects_deferred_steps() -> anyhow::Result<()> {
    let payer = Pubkey::new_unique();

    let result = TransactionBuilder::new()
        .fee_payer(payer)
        .add_instruction(instructions::transfer_sol(&payer, &Pubkey::new_unique(), 1))
        .add_instruction(instructions::create_mint_account(payer, Pubkey::new_unique()))
        .resolve_ready();

    assert!(matches!(result, Err(Error::UnresolvedStep(1))));
    Ok(())
}

#[tokio::test]
async fn test_only_required_signers_sign() -> anyhow::Result<()> {
    let (payer, payer_signer) = shared(Keypair::new());
    let (mint, mint_signer) = shared(Keypair::new());
    let (_, unrelated_signer) = shared(Keypair::new());
    let rpc = MockRpcClient::new();

    let prepared = TransactionBuilder::new()
        .fee_payer(payer)
        .add_instruction(instructions::create_mint_account(payer, mint))
        .add_signers(vec![payer_signer, mint_signer, unrelated_signer])
        .build(&rpc)
        .await?;

    assert!(prepared.is_fully_signed());
    assert_eq!(prepared.message().header.num_required_signatures, 2);
    assert_eq!(prepared.transaction().signatures.len(), 2);
    assert_eq!(prepared.blockhash(), &rpc.blockhash);
    Ok(())
}

#[tokio::test]
async fn test_partial_signing_then_cosign() -> anyhow::Result<()> {
    let payer = Keypair::new();
    let (mint, mint_signer) = shared(Keypair::new());
    let rpc = MockRpcClient::new();

    let mut prepared = TransactionBuilder::new()
        .fee_payer(payer.pubkey())
        .add_instruction(instructions::create_mint_account(payer.pubkey(), mint))
        .add_signer(mint_signer)
        .build(&rpc)
        .await?;

    assert!(!prepared.is_fully_signed());

    prepared.sign(&[&payer])?;
    assert!(prepared.is_fully_signed());
    assert!(prepared.transaction().verify().is_ok());
    Ok(())
}

#[tokio::test]
async fn test_base64_output_is_wire_format() -> anyhow::Result<()> {
    let (payer, payer_signer) = shared(Keypair::new());
    let rpc = MockRpcClient::new();

    let prepared = TransactionBuilder::new()
        .fee_payer(payer)
        .add_instruction(instructions::transfer_sol(&payer, &Pubkey::new_unique(), 42))
        .add_signer(payer_signer)
        .build(&rpc)
        .await?;

    let encoded = prepared.to_base64()?;
    let bytes = BASE64.decode(encoded)?;
    assert_eq!(bytes, prepared.to_bytes()?);

    let (decoded, _): (Transaction, usize) =
        bincode::serde::decode_from_slice(&bytes, bincode::config::legacy())?;
    assert_eq!(&decoded, prepared.transaction());
    Ok(())
}

#[tokio::test]
async fn test_durable_nonce_replaces_blockhash() -> anyhow::Result<()> {
    let (authority, authority_signer) = shared(Keypair::new());
    let nonce_address = Pubkey::new_unique();
    let durable_nonce = DurableNonce::from_blockhash(&Hash::new_unique());
    let nonce_value = *durable_nonce.as_hash();
    let rpc = MockRpcClient::new().with_account(nonce_address, nonce_account(authority, durable_nonce));

    let prepared = TransactionBuilder::new()
        .add_instruction(instructions::transfer_sol(&authority, &Pubkey::new_unique(), 5))
        .add_signer(authority_signer)
        .durable_nonce(nonce_address, authority)
        .build(&rpc)
        .await?;

    let message = prepared.message();
    assert_eq!(message.recent_blockhash, nonce_value);
    assert_eq!(prepared.blockhash(), &nonce_value);
    // The nonce authority pays when no fee payer is set.
    assert_eq!(message.account_keys[0], authority);

    let first = &message.instructions[0];
    assert_eq!(
        message.account_keys[first.program_id_index as usize],
        solana_sdk::system_program::id()
    );
    assert_eq!(&first.data[..4], &4u32.to_le_bytes());

    assert!(prepared.is_fully_signed());
    // Only the nonce account lookup; no blockhash request.
    assert_eq!(rpc.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_durable_nonce_authority_mismatch() -> anyhow::Result<()> {
    let authority = Pubkey::new_unique();
    let nonce_address = Pubkey::new_unique();
    let rpc = MockRpcClient::new().with_account(
        nonce_address,
        nonce_account(
            Pubkey::new_unique(),
            DurableNonce::from_blockhash(&Hash::new_unique()),
        ),
    );

    let result = TransactionBuilder::new()
        .add_instruction(instructions::transfer_sol(&authority, &Pubkey::new_unique(), 5))
        .durable_nonce(nonce_address, authority)
        .build(&rpc)
        .await;

    assert!(matches!(result, Err(Error::InvalidAccountData { account, .. }) if account == nonce_address));
    Ok(())
}

#[tokio::test]
async fn test_missing_nonce_account() -> anyhow::Result<()> {
    let authority = Pubkey::new_unique();
    let nonce_address = Pubkey::new_unique();
    let rpc = MockRpcClient::new();

    let result = TransactionBuilder::new()
        .add_instruction(instructions::transfer_sol(&authority, &Pubkey::new_unique(), 5))
        .durable_nonce(nonce_address, authority)
        .build(&rpc)
        .await;

    assert!(matches!(result, Err(Error::AccountNotFound(address)) if address == nonce_address));
    Ok(())
}
