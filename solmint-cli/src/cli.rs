use clap::{Parser, Subcommand};

/// Command-line access to the solmint client.
#[derive(Parser, Debug)]
#[command(name = "solmint", author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file.
    /// If not provided, default values will be used.
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a new wallet from a fresh BIP-39 mnemonic.
    NewWallet(NewWalletCmd),
    /// Request an airdrop of SOL (devnet, testnet or a local validator).
    Airdrop(AirdropCmd),
    /// Print the SOL balance of an address.
    Balance(BalanceCmd),
    /// Print the token metadata of a mint.
    Metadata(MetadataCmd),
}

#[derive(Parser, Debug)]
pub struct NewWalletCmd {
    /// Number of mnemonic words (12, 15, 18, 21 or 24).
    #[arg(long, default_value_t = 12)]
    pub words: usize,

    /// Optional BIP-39 passphrase.
    #[arg(long, default_value = "")]
    pub passphrase: String,
}

#[derive(Parser, Debug)]
pub struct AirdropCmd {
    #[arg(long)]
    pub address: String,

    /// Amount in SOL.
    #[arg(long)]
    pub sol: f64,

    /// Wait until the airdrop is confirmed.
    #[arg(long)]
    pub wait: bool,
}

#[derive(Parser, Debug)]
pub struct BalanceCmd {
    #[arg(long)]
    pub address: String,
}

#[derive(Parser, Debug)]
pub struct MetadataCmd {
    #[arg(long)]
    pub mint: String,

    /// Also download the off-chain JSON the metadata URI points to.
    #[arg(long)]
    pub offchain: bool,
}
