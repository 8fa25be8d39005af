use anyhow::Result;
use serde::Deserialize;
use std::fs::File;
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Plain,
}

/// Where log lines go. Command results are printed on stdout, so logs default to stderr.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    #[default]
    Stderr,
    File,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct LogConfig {
    /// A level (`info`) or a full filter directive (`solmint_sdk=debug,warn`).
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
    pub file_path: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            file_path: None,
        }
    }
}

impl LogConfig {
    /// Builds the filter for this config. `RUST_LOG`, when set, takes precedence.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Installs the global tracing subscriber described by `config`.
///
/// Fails if the log file cannot be created or a subscriber is already installed.
pub fn init(config: &LogConfig) -> Result<()> {
    let subscriber = Registry::default().with(config.env_filter());

    match config.output {
        LogOutput::File => {
            let file_path = config.file_path.as_deref().ok_or_else(|| {
                anyhow::anyhow!("Log output is 'file' but 'file-path' is not specified")
            })?;
            let log_file = Mutex::new(File::create(file_path)?);

            match config.format {
                LogFormat::Json => subscriber
                    .with(fmt::layer().with_writer(log_file).json())
                    .try_init()?,
                LogFormat::Plain => subscriber
                    .with(fmt::layer().with_writer(log_file).with_ansi(false))
                    .try_init()?,
            }
        }
        LogOutput::Stdout => match config.format {
            LogFormat::Json => subscriber
                .with(fmt::layer().with_writer(std::io::stdout).json())
                .try_init()?,
            LogFormat::Plain => subscriber
                .with(fmt::layer().with_writer(std::io::stdout))
                .try_init()?,
        },
        LogOutput::Stderr => match config.format {
            LogFormat::Json => subscriber
                .with(fmt::layer().with_writer(std::io::stderr).json())
                .try_init()?,
            LogFormat::Plain => subscriber
                .with(fmt::layer().with_writer(std::io::stderr))
                .try_init()?,
        },
    };

    Ok(())
}
