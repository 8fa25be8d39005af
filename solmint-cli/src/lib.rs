pub mod cli;
pub mod config;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{AirdropCmd, BalanceCmd, Cli, Commands, MetadataCmd, NewWalletCmd};
use config::{load_config, CliConfig};
use serde_json::json;
use solana_sdk::{native_token::LAMPORTS_PER_SOL, signer::Signer};
use solmint_sdk::{account, SolanaClient};

/// The main entry point for the CLI.
/// This function handles argument parsing, configuration and logging setup,
/// then dispatches to the selected command.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config_from_cli(cli.config.as_deref())?;
    solmint_logger::init(&config.log)?;
    tracing::debug!("Configuration loaded: {:?}", &config);

    match cli.command {
        Commands::NewWallet(cmd) => new_wallet(cmd),
        Commands::Airdrop(cmd) => airdrop(&config, cmd).await,
        Commands::Balance(cmd) => balance(&config, cmd).await,
        Commands::Metadata(cmd) => metadata(&config, cmd).await,
    }
}

/// Loads the configuration file when one is given, defaults otherwise.
fn load_config_from_cli(path: Option<&str>) -> Result<CliConfig> {
    match path {
        Some(config_path) => load_config(config_path),
        None => Ok(CliConfig::default()),
    }
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn new_wallet(cmd: NewWalletCmd) -> Result<()> {
    let mnemonic = account::generate_mnemonic(cmd.words)?;
    let phrase = mnemonic.to_string();
    let keypair = account::account_from_seed_phrase(&phrase, &cmd.passphrase)?;

    print_json(&json!({
        "address": keypair.pubkey().to_string(),
        "secret-key": account::account_to_base58(&keypair),
        "mnemonic": phrase,
    }))
}

async fn airdrop(config: &CliConfig, cmd: AirdropCmd) -> Result<()> {
    if !(cmd.sol.is_finite() && cmd.sol > 0.0) {
        anyhow::bail!("Airdrop amount must be a positive number of SOL, got {}", cmd.sol);
    }
    let address = account::parse_pubkey(&cmd.address)?;
    let lamports = (cmd.sol * LAMPORTS_PER_SOL as f64).round() as u64;
    let client = SolanaClient::from_config(config.client.clone());

    let signature = client.request_airdrop(&address, lamports).await?;
    if cmd.wait {
        client
            .wait_for_confirmation(&signature)
            .await
            .with_context(|| format!("Airdrop {} was not confirmed", signature))?;
    }

    print_json(&json!({
        "address": address.to_string(),
        "lamports": lamports,
        "signature": signature.to_string(),
        "confirmed": cmd.wait,
    }))
}

async fn balance(config: &CliConfig, cmd: BalanceCmd) -> Result<()> {
    let address = account::parse_pubkey(&cmd.address)?;
    let client = SolanaClient::from_config(config.client.clone());

    let lamports = client.get_balance(&address).await?;

    print_json(&json!({
        "address": address.to_string(),
        "lamports": lamports,
        "sol": lamports as f64 / LAMPORTS_PER_SOL as f64,
    }))
}

async fn metadata(config: &CliConfig, cmd: MetadataCmd) -> Result<()> {
    let mint = account::parse_pubkey(&cmd.mint)?;
    let client = SolanaClient::from_config(config.client.clone());

    let metadata = client.get_metadata(&mint).await?;
    let offchain = if cmd.offchain {
        Some(client.fetch_offchain_metadata(&metadata.uri).await?)
    } else {
        None
    };

    print_json(&json!({
        "metadata": metadata,
        "offchain": offchain,
    }))
}
