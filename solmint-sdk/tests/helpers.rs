mod common;

use common::{labels, master_edition_account, mint_account, print_edition_account, MockRpcClient};
use solana_sdk::{pubkey::Pubkey, signature::Signer};
use solmint_sdk::{
    account,
    instructions::{self, TransferTokensParams, UpdateMetadataParams},
    metadata::{decode_edition, decode_master_edition, EditionInfo},
    pda,
    transaction::TransactionBuilder,
    Error,
};

// --- Accounts ---

#[test]
fn test_base58_keypair_round_trip() -> anyhow::Result<()> {
    let keypair = account::new_account();
    let encoded = account::account_to_base58(&keypair);

    let decoded = account::account_from_base58(&encoded)?;

    assert_eq!(decoded.pubkey(), keypair.pubkey());
    assert_eq!(account::account_to_base58(&decoded), encoded);
    Ok(())
}

#[test]
fn test_invalid_keypair_encodings() {
    assert!(matches!(
        account::account_from_base58("not-base58-0OIl"),
        Err(Error::InvalidKeypair(_))
    ));
    // Valid base58, wrong length.
    assert!(matches!(
        account::account_from_base58("3mJr7AoUXx2Wqd"),
        Err(Error::InvalidKeypair(_))
    ));
    assert!(matches!(
        account::account_from_bytes(&[7u8; 10]),
        Err(Error::InvalidKeypair(_))
    ));
}

#[test]
fn test_seed_phrase_derivation_is_deterministic() -> anyhow::Result<()> {
    let mnemonic = account::generate_mnemonic(24)?;
    assert_eq!(mnemonic.word_count(), 24);
    let phrase = mnemonic.to_string();

    let first = account::account_from_seed_phrase(&phrase, "")?;
    let second = account::account_from_seed_phrase(&phrase, "")?;
    let with_passphrase = account::account_from_seed_phrase(&phrase, "hunter2")?;

    assert_eq!(first.pubkey(), second.pubkey());
    assert_ne!(first.pubkey(), with_passphrase.pubkey());
    Ok(())
}

#[test]
fn test_mnemonic_validation() {
    assert!(matches!(
        account::generate_mnemonic(13),
        Err(Error::InvalidKeypair(_))
    ));
    assert!(matches!(
        account::account_from_seed_phrase("definitely not a valid phrase", ""),
        Err(Error::InvalidKeypair(_))
    ));
}

#[test]
fn test_parse_pubkey() -> anyhow::Result<()> {
    let key = Pubkey::new_unique();
    assert_eq!(account::parse_pubkey(&format!(" {key} "))?, key);
    assert!(matches!(
        account::parse_pubkey("xyz"),
        Err(Error::InvalidPubkey(_))
    ));
    Ok(())
}

// --- PDAs ---

#[test]
fn test_pda_derivation_is_deterministic() {
    let wallet = Pubkey::new_unique();
    let mint = Pubkey::new_unique();

    assert_eq!(
        pda::derive_token_account(&wallet, &mint),
        pda::derive_token_account(&wallet, &mint)
    );
    assert_ne!(
        pda::derive_token_account(&wallet, &mint),
        pda::derive_token_account(&mint, &wallet)
    );

    let metadata = pda::derive_metadata_account(&mint);
    let edition = pda::derive_edition_account(&mint);
    assert_eq!(metadata, pda::derive_metadata_account(&mint));
    assert_ne!(metadata, edition);

    let authority = Pubkey::new_unique();
    assert_ne!(
        pda::derive_collection_authority_record(&mint, &authority),
        pda::derive_use_authority_record(&mint, &authority)
    );
    assert_eq!(pda::derive_burner(), pda::derive_burner());
}

#[test]
fn test_edition_marker_groups_editions() {
    let master = Pubkey::new_unique();

    let first = pda::derive_edition_marker_account(&master, 1);
    assert_eq!(first, pda::derive_edition_marker_account(&master, 247));
    assert_ne!(first, pda::derive_edition_marker_account(&master, 248));
    assert_eq!(
        pda::derive_edition_marker_account(&master, 248),
        pda::derive_edition_marker_account(&master, 495)
    );
}

// --- Edition decoding ---

#[test]
fn test_decode_editions() -> anyhow::Result<()> {
    let address = Pubkey::new_unique();
    let parent = Pubkey::new_unique();

    let master = master_edition_account(2, Some(9));
    assert_eq!(decode_master_edition(&address, &master.data)?, (2, Some(9)));

    let print = print_edition_account(parent, 3);
    assert_eq!(
        decode_edition(&address, &print.data)?,
        EditionInfo::Print { parent, edition: 3 }
    );
    assert!(matches!(
        decode_master_edition(&address, &print.data),
        Err(Error::TokenIsNotMasterEdition(a)) if a == address
    ));
    assert!(matches!(
        decode_edition(&address, &[9u8, 0, 0]),
        Err(Error::InvalidAccountData { .. })
    ));
    Ok(())
}

// --- Deferred helpers ---

#[tokio::test]
async fn test_transfer_tokens_looks_up_decimals_and_creates_destination() -> anyhow::Result<()> {
    let mint = Pubkey::new_unique();
    let source_owner = Pubkey::new_unique();
    let destination_owner = Pubkey::new_unique();
    let rpc = MockRpcClient::new().with_account(mint, mint_account(None, 1_000, 4));

    let resolved = TransactionBuilder::new()
        .fee_payer(source_owner)
        .add_instruction(instructions::transfer_tokens(TransferTokensParams {
            mint,
            source_owner,
            destination_owner,
            payer: source_owner,
            amount: 25,
            decimals: None,
        }))
        .resolve(&rpc)
        .await?;

    assert_eq!(
        labels(resolved.instructions()),
        vec!["CreateAssociatedTokenAccount", "TransferChecked"]
    );
    let transfer = &resolved.instructions()[1];
    assert_eq!(&transfer.data[1..9], &25u64.to_le_bytes());
    assert_eq!(transfer.data[9], 4);
    Ok(())
}

#[tokio::test]
async fn test_transfer_tokens_with_unknown_mint() -> anyhow::Result<()> {
    let mint = Pubkey::new_unique();
    let owner = Pubkey::new_unique();
    let rpc = MockRpcClient::new();

    let result = TransactionBuilder::new()
        .fee_payer(owner)
        .add_instruction(instructions::transfer_tokens(TransferTokensParams {
            mint,
            source_owner: owner,
            destination_owner: Pubkey::new_unique(),
            payer: owner,
            amount: 1,
            decimals: None,
        }))
        .resolve(&rpc)
        .await;

    assert!(matches!(result, Err(Error::AccountNotFound(address)) if address == mint));
    Ok(())
}

#[tokio::test]
async fn test_create_nonce_account() -> anyhow::Result<()> {
    let payer = Pubkey::new_unique();
    let rpc = MockRpcClient::new();

    let resolved = TransactionBuilder::new()
        .fee_payer(payer)
        .add_instruction(instructions::create_nonce_account(
            payer,
            Pubkey::new_unique(),
            payer,
        ))
        .resolve(&rpc)
        .await?;

    assert_eq!(
        labels(resolved.instructions()),
        vec!["CreateAccount", "InitializeNonceAccount"]
    );
    Ok(())
}

#[test]
fn test_update_metadata_targets_metadata_account() {
    let mint = Pubkey::new_unique();
    let update_authority = Pubkey::new_unique();

    let mut params = UpdateMetadataParams::new(mint, update_authority);
    params.primary_sale_happened = Some(true);
    let ix = instructions::update_metadata(params);

    assert_eq!(ix.program_id, mpl_token_metadata::ID);
    assert_eq!(ix.data[0], 15);
    assert_eq!(ix.accounts[0].pubkey, pda::derive_metadata_account(&mint));
    assert_eq!(ix.accounts[1].pubkey, update_authority);
    assert!(ix.accounts[1].is_signer);
}
