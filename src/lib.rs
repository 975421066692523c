//! Keylease SDK
//!
//! Client-side SDK for issuing, constraining and revoking ephemeral delegated
//! signing credentials (session keys) on Solana, and for submitting groups of
//! transactions as atomic, tip-prioritized bundles through a relay endpoint.
//! Both subsystems manage time-bounded, usage-bounded, revocable authority
//! over fee-bearing operations and fail closed.

pub mod bundle;
pub mod client;
pub mod config;
pub mod error;
pub mod ledger;
pub mod rate_limit;
pub mod relay;
pub mod secure;
pub mod session;
pub mod wallet;

pub use bundle::{
    group_instructions, BundleRecord, BundleStatistics, BundleStatus, BundleTransaction,
    FeeEstimate,
};
pub use client::KeyleaseClient;
pub use config::Config;
pub use error::{AuthorizationError, SdkError};
pub use ledger::{LedgerClient, RpcLedger};
pub use relay::{BundleRelayClient, BundleStatusView, HttpRelay, RelayApi};
pub use secure::{SecureBuffer, SecureKeypair};
pub use session::{SessionInfo, SessionManager, SessionPolicy};
pub use wallet::{KeypairWallet, TransactionSigner};

// Re-export commonly used types
pub use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    signer::Signer,
    transaction::Transaction,
};

pub type Result<T> = std::result::Result<T, error::SdkError>;
