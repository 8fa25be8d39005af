use serde::{Deserialize, Serialize};

use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use std::time::Duration;

/// The top-level configuration for the `solmint-sdk` client facade.
///
/// This struct aggregates the Solana endpoint, confirmation polling, send
/// retry and minting defaults. It is typically deserialized from a
/// configuration file and passed to [`crate::client::SolanaClient`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClientConfig {
    #[serde(default)]
    pub solana: Solana,
    #[serde(default)]
    pub confirmation: Confirmation,
    #[serde(default)]
    pub send: SendRetry,
    #[serde(default)]
    pub mint: MintConfig,
}

/// Defines the connection settings for the Solana cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Solana {
    pub rpc_url: String,
    #[serde(with = "serde_commitment")]
    pub commitment: CommitmentLevel,
}

/// Controls how `wait_for_confirmation` polls signature statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Confirmation {
    /// Seconds between two `getSignatureStatuses` calls.
    pub poll_interval_secs: u64,
    /// Overall time budget before giving up on a signature.
    pub timeout_secs: u64,
}

/// Controls the resubmission of transactions rejected for an unknown blockhash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SendRetry {
    /// Total number of submissions, including the first one.
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
}

/// Defaults applied by [`crate::mint::MintBuilder`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MintConfig {
    /// Decimals used for fungible mints when the caller does not set any.
    pub default_decimals: u8,
}

impl Solana {
    pub fn commitment_config(&self) -> CommitmentConfig {
        CommitmentConfig {
            commitment: self.commitment,
        }
    }
}

impl Confirmation {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl SendRetry {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for Solana {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8899".to_string(),
            commitment: CommitmentLevel::Confirmed,
        }
    }
}

impl Default for Confirmation {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            timeout_secs: 300,
        }
    }
}

impl Default for SendRetry {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay_ms: 500,
        }
    }
}

impl Default for MintConfig {
    fn default() -> Self {
        Self {
            default_decimals: 9,
        }
    }
}

mod serde_commitment {

    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(c: &CommitmentLevel, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = match c {
            CommitmentLevel::Processed => "processed",
            CommitmentLevel::Confirmed => "confirmed",
            CommitmentLevel::Finalized => "finalized",
        };
        serializer.serialize_str(s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<CommitmentLevel, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        match s.to_lowercase().as_str() {
            "processed" => Ok(CommitmentLevel::Processed),
            "confirmed" => Ok(CommitmentLevel::Confirmed),
            "finalized" => Ok(CommitmentLevel::Finalized),
            other => Err(serde::de::Error::custom(format!(
                "unknown commitment level '{}', expected processed, confirmed or finalized",
                other
            ))),
        }
    }
}
