use anyhow::{Context, Result};
use serde::Deserialize;
use solmint_logger::LogConfig;
use solmint_sdk::config::ClientConfig;

/// The top-level configuration for the solmint CLI.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct CliConfig {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Loads the CLI configuration from a TOML file, with `SOLMINT__*`
/// environment variables taking precedence (e.g. `SOLMINT__CLIENT__SOLANA__RPC_URL=...`).
///
/// Environment key segments are converted to kebab case to match the file keys.
pub fn load_config(path: &str) -> Result<CliConfig> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name(path))
        .add_source(
            config::Environment::with_prefix("SOLMINT")
                .separator("__")
                .convert_case(config::Case::Kebab),
        );

    let settings: CliConfig = builder
        .build()
        .context(format!("Failed to build configuration from '{}'", path))?
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    Ok(settings)
}
