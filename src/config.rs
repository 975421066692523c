//! SDK configuration

use crate::{Result, SdkError};
use solana_sdk::{commitment_config::CommitmentConfig, pubkey, pubkey::Pubkey};
use std::str::FromStr;

/// Default relay tip recipient (Jito mainnet tip account).
pub const DEFAULT_TIP_ACCOUNT: Pubkey = pubkey!("96gYZGLnJYVFmbjzopPSU6QiEV5fGqZNyN9nmNhvrZU5");

/// Default on-ledger program owning session delegation accounts.
pub const DEFAULT_SESSION_PROGRAM: Pubkey = pubkey!("5xk7TofwN46GUpkRoLAtJVaGkfHGYY7wm3aGWAzBAmq7");

#[derive(Debug, Clone)]
pub struct Config {
    /// Solana RPC endpoint URL
    pub rpc_url: String,

    /// Commitment level for RPC queries
    pub commitment: CommitmentConfig,

    /// Bundle relay base URL
    pub relay_url: String,

    /// Tip recipient address for bundle prioritization
    pub tip_account: Pubkey,

    /// Program owning session delegation accounts
    pub session_program: Pubkey,

    /// Maximum transactions per bundle
    pub max_bundle_size: usize,

    /// Bundle relay request timeout (seconds)
    pub bundle_timeout_secs: u64,

    /// Confirmation poll attempts
    pub retry_attempts: u32,

    /// Base delay between confirmation polls (seconds); the nth poll waits
    /// `retry_base_delay * n`
    pub retry_base_delay: f64,

    /// Expired-session sweep interval (seconds)
    pub cleanup_interval_secs: u64,

    /// Rate ceiling applied to sessions that do not set their own
    pub default_rate_limit_per_minute: u32,

    /// Chunk size used when grouping loose instructions into transactions
    pub max_instructions_per_transaction: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            commitment: CommitmentConfig::confirmed(),
            relay_url: "https://mainnet.block-engine.jito.wtf".to_string(),
            tip_account: DEFAULT_TIP_ACCOUNT,
            session_program: DEFAULT_SESSION_PROGRAM,
            max_bundle_size: 5,
            bundle_timeout_secs: 30,
            retry_attempts: 3,
            retry_base_delay: 1.0,
            cleanup_interval_secs: 300,
            default_rate_limit_per_minute: 60,
            max_instructions_per_transaction: 3,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let session_program = match std::env::var("SESSION_PROGRAM_ID") {
            Ok(raw) => Pubkey::from_str(&raw)
                .map_err(|_| SdkError::Validation("invalid SESSION_PROGRAM_ID".to_string()))?,
            Err(_) => defaults.session_program,
        };

        let tip_account = match std::env::var("TIP_ACCOUNT") {
            Ok(raw) => Pubkey::from_str(&raw)
                .map_err(|_| SdkError::Validation("invalid TIP_ACCOUNT".to_string()))?,
            Err(_) => defaults.tip_account,
        };

        Ok(Config {
            rpc_url: std::env::var("RPC_URL").unwrap_or(defaults.rpc_url),
            commitment: defaults.commitment,
            relay_url: std::env::var("RELAY_URL").unwrap_or(defaults.relay_url),
            tip_account,
            session_program,
            max_bundle_size: env_parsed("MAX_BUNDLE_SIZE", defaults.max_bundle_size)?,
            bundle_timeout_secs: env_parsed("BUNDLE_TIMEOUT", defaults.bundle_timeout_secs)?,
            retry_attempts: env_parsed("RETRY_ATTEMPTS", defaults.retry_attempts)?,
            retry_base_delay: env_parsed("RETRY_BASE_DELAY", defaults.retry_base_delay)?,
            cleanup_interval_secs: env_parsed(
                "SESSION_CLEANUP_INTERVAL",
                defaults.cleanup_interval_secs,
            )?,
            default_rate_limit_per_minute: env_parsed(
                "RATE_LIMIT_PER_MINUTE",
                defaults.default_rate_limit_per_minute,
            )?,
            max_instructions_per_transaction: defaults.max_instructions_per_transaction,
        })
    }
}

fn env_parsed<T: FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| SdkError::Validation(format!("invalid {name}"))),
        Err(_) => Ok(default),
    }
}
