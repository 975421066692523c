//! Ledger client seam
//!
//! The underlying chain client is an external collaborator: every call here
//! is a single fallible network operation with no implicit retry. Retry and
//! backoff, where specified, belong to the components built on top.

use crate::Result;
use crate::SdkError;
use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey, signature::Signature,
    transaction::Transaction,
};
use std::sync::Arc;

#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn latest_blockhash(&self) -> Result<Hash>;

    /// Submit a wire-encoded transaction, returning its signature.
    async fn send_raw_transaction(&self, wire: &[u8]) -> Result<Signature>;

    /// Whether the transaction has reached the configured commitment.
    async fn confirm_transaction(&self, signature: &Signature) -> Result<bool>;

    /// `Some(true)` processed successfully, `Some(false)` failed on-ledger,
    /// `None` not yet seen.
    async fn signature_status(&self, signature: &Signature) -> Result<Option<bool>>;

    async fn account_exists(&self, address: &Pubkey) -> Result<bool>;

    /// Recent per-transaction prioritization fees, most recent slots first.
    async fn recent_prioritization_fees(&self) -> Result<Vec<u64>>;
}

/// [`LedgerClient`] over the nonblocking Solana RPC client.
pub struct RpcLedger {
    rpc: Arc<RpcClient>,
    commitment: CommitmentConfig,
}

impl RpcLedger {
    pub fn new(rpc_url: String, commitment: CommitmentConfig) -> Self {
        Self {
            rpc: Arc::new(RpcClient::new_with_commitment(rpc_url, commitment)),
            commitment,
        }
    }
}

#[async_trait]
impl LedgerClient for RpcLedger {
    async fn latest_blockhash(&self) -> Result<Hash> {
        Ok(self.rpc.get_latest_blockhash().await?)
    }

    async fn send_raw_transaction(&self, wire: &[u8]) -> Result<Signature> {
        let tx: Transaction = bincode::deserialize(wire)
            .map_err(|e| SdkError::Validation(format!("malformed transaction encoding: {e}")))?;
        Ok(self.rpc.send_transaction(&tx).await?)
    }

    async fn confirm_transaction(&self, signature: &Signature) -> Result<bool> {
        Ok(self.rpc.confirm_transaction(signature).await?)
    }

    async fn signature_status(&self, signature: &Signature) -> Result<Option<bool>> {
        let status = self.rpc.get_signature_status(signature).await?;
        Ok(status.map(|result| result.is_ok()))
    }

    async fn account_exists(&self, address: &Pubkey) -> Result<bool> {
        let response = self
            .rpc
            .get_account_with_commitment(address, self.commitment)
            .await?;
        Ok(response.value.is_some())
    }

    async fn recent_prioritization_fees(&self) -> Result<Vec<u64>> {
        let fees = self.rpc.get_recent_prioritization_fees(&[]).await?;
        Ok(fees.into_iter().map(|f| f.prioritization_fee).collect())
    }
}
