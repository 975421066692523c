//! Bundle relay client
//!
//! Prepares groups of transactions as atomic bundles (compute budget, fees,
//! tip on the last member), submits them to a block-engine relay over
//! JSON-RPC and polls for confirmation with linear backoff.

use crate::bundle::{
    self, decorate_transaction, group_instructions, BundleRecord, BundleStats, BundleStatistics,
    BundleStatus, BundleTransaction, FeeEstimate,
};
use crate::ledger::LedgerClient;
use crate::wallet::TransactionSigner;
use crate::{Config, Result, SdkError};
use async_trait::async_trait;
use base64::Engine;
use dashmap::DashMap;
use serde::Serialize;
use solana_sdk::{instruction::Instruction, signature::Keypair};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Raw status of a bundle as reported by the relay.
#[derive(Debug, Clone)]
pub struct RelayBundleStatus {
    /// Relay-side status string; an unknown bundle reports `"pending"`.
    pub status: String,
    pub block_height: Option<u64>,
}

/// Relay transport seam. One method per relay RPC, no retry at this layer.
#[async_trait]
pub trait RelayApi: Send + Sync {
    /// Submit wire-encoded transactions as one atomic bundle; returns the
    /// relay's bundle id.
    async fn send_bundle(&self, encoded: &[String]) -> Result<String>;

    async fn bundle_statuses(&self, bundle_id: &str) -> Result<RelayBundleStatus>;
}

/// [`RelayApi`] over the block-engine JSON-RPC endpoint.
pub struct HttpRelay {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRelay {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SdkError::Relay(format!("failed to build relay client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn rpc_call(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": chrono::Utc::now().timestamp_millis(),
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(format!("{}/api/v1/bundles", self.base_url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| SdkError::Relay(format!("relay request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(SdkError::Relay(format!(
                "relay returned HTTP {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SdkError::Relay(format!("malformed relay response: {e}")))?;

        if let Some(error) = body.get("error") {
            return Err(SdkError::Relay(format!("relay rejected request: {error}")));
        }
        Ok(body.get("result").cloned().unwrap_or(serde_json::Value::Null))
    }
}

#[async_trait]
impl RelayApi for HttpRelay {
    async fn send_bundle(&self, encoded: &[String]) -> Result<String> {
        let result = self
            .rpc_call("sendBundle", serde_json::json!([encoded]))
            .await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| SdkError::Relay("relay response missing bundle id".to_string()))
    }

    async fn bundle_statuses(&self, bundle_id: &str) -> Result<RelayBundleStatus> {
        let result = self
            .rpc_call("getBundleStatuses", serde_json::json!([[bundle_id]]))
            .await?;

        // An empty value array means the relay has not seen the bundle yet.
        let entry = result
            .get("value")
            .and_then(|v| v.as_array())
            .and_then(|entries| entries.first());

        Ok(match entry {
            Some(entry) => RelayBundleStatus {
                status: entry
                    .get("confirmation_status")
                    .and_then(|v| v.as_str())
                    .unwrap_or("pending")
                    .to_string(),
                block_height: entry.get("slot").and_then(|v| v.as_u64()),
            },
            None => RelayBundleStatus {
                status: "pending".to_string(),
                block_height: None,
            },
        })
    }
}

/// Merged view of a bundle from local tracking plus, for still-pending
/// bundles, a best-effort live relay status.
#[derive(Debug, Clone, Serialize)]
pub struct BundleStatusView {
    pub record: BundleRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relay_status: Option<String>,
}

/// Client for atomic multi-transaction submission through a bundle relay.
pub struct BundleRelayClient {
    config: Config,
    ledger: Arc<dyn LedgerClient>,
    relay: Arc<dyn RelayApi>,
    wallet: RwLock<Option<Arc<dyn TransactionSigner>>>,
    pending: DashMap<String, BundleRecord>,
    history: RwLock<Vec<BundleRecord>>,
    stats: RwLock<BundleStats>,
}

impl BundleRelayClient {
    pub fn new(ledger: Arc<dyn LedgerClient>, relay: Arc<dyn RelayApi>, config: Config) -> Self {
        Self {
            config,
            ledger,
            relay,
            wallet: RwLock::new(None),
            pending: DashMap::new(),
            history: RwLock::new(Vec::new()),
            stats: RwLock::new(BundleStats::default()),
        }
    }

    /// Set the fee-payer wallet used for every bundle member.
    pub async fn set_wallet(&self, wallet: Arc<dyn TransactionSigner>) {
        *self.wallet.write().await = Some(wallet);
    }

    /// Prepare, submit and confirm a bundle. The whole group lands
    /// atomically or not at all; the tip transfer rides the last member.
    /// `max_retries` overrides the configured confirmation poll budget for
    /// this call only.
    pub async fn send_bundle(
        &self,
        transactions: Vec<BundleTransaction>,
        tip_lamports: Option<u64>,
        max_retries: Option<u32>,
    ) -> Result<BundleRecord> {
        let wallet = self.wallet.read().await.clone().ok_or_else(|| {
            SdkError::Authority("no fee payer wallet configured".to_string())
        })?;

        // Size violations surface before any network traffic.
        if transactions.is_empty() {
            return Err(SdkError::Validation("bundle has no transactions".to_string()));
        }
        if transactions.len() > self.config.max_bundle_size {
            return Err(SdkError::Validation(format!(
                "bundle size {} exceeds maximum of {}",
                transactions.len(),
                self.config.max_bundle_size
            )));
        }

        let blockhash = self.ledger.latest_blockhash().await?;
        let fee_payer = wallet.public_identity();
        let tip = tip_lamports.unwrap_or(bundle::MIN_TIP_LAMPORTS);

        let mut encoded = Vec::with_capacity(transactions.len());
        let mut signatures = Vec::with_capacity(transactions.len());
        let last = transactions.len() - 1;

        for (index, member) in transactions.iter().enumerate() {
            let tip_for_member = (index == last).then_some((self.config.tip_account, tip));
            let mut tx = decorate_transaction(member, &fee_payer, blockhash, tip_for_member);

            if !member.signers.is_empty() {
                let extra: Vec<&Keypair> = member.signers.iter().collect();
                tx.try_partial_sign(&extra, blockhash).map_err(|e| {
                    SdkError::Validation(format!("failed to sign bundle member: {e}"))
                })?;
            }
            let tx = wallet.sign_transaction(tx).await?;

            signatures.push(tx.signatures[0].to_string());
            let wire = bincode::serialize(&tx).map_err(|e| {
                SdkError::Validation(format!("failed to encode transaction: {e}"))
            })?;
            encoded.push(base64::engine::general_purpose::STANDARD.encode(wire));
        }

        let bundle_id = match self.relay.send_bundle(&encoded).await {
            Ok(id) => id,
            Err(e) => {
                let mut stats = self.stats.write().await;
                stats.total += 1;
                stats.failed += 1;
                return Err(e);
            }
        };
        debug!("submitted bundle {} ({} transactions)", bundle_id, encoded.len());

        self.pending.insert(
            bundle_id.clone(),
            BundleRecord {
                bundle_id: bundle_id.clone(),
                transactions: signatures,
                status: BundleStatus::Pending,
                submitted_at: chrono::Utc::now().timestamp(),
                confirmation_time: None,
                block_height: None,
            },
        );

        let retries = max_retries.unwrap_or(self.config.retry_attempts);
        self.await_confirmation(&bundle_id, retries).await
    }

    /// Group loose instructions into bundle members and submit them as one
    /// bundle.
    pub async fn send_instruction_bundle(
        &self,
        instructions: Vec<Instruction>,
        tip_lamports: Option<u64>,
    ) -> Result<BundleRecord> {
        let members = group_instructions(instructions, self.config.max_instructions_per_transaction)
            .into_iter()
            .map(BundleTransaction::new)
            .collect();
        self.send_bundle(members, tip_lamports, None).await
    }

    /// Poll the relay until the bundle reaches a terminal state or the
    /// retry budget is spent. Backoff grows linearly per attempt.
    async fn await_confirmation(&self, bundle_id: &str, max_retries: u32) -> Result<BundleRecord> {
        let started = Instant::now();
        let deadline = Duration::from_secs(self.config.bundle_timeout_secs);

        for attempt in 1..=max_retries {
            tokio::time::sleep(Duration::from_secs_f64(
                self.config.retry_base_delay * f64::from(attempt),
            ))
            .await;

            let status = match self.relay.bundle_statuses(bundle_id).await {
                Ok(status) => status,
                Err(e) => {
                    warn!("bundle status poll failed: {}", e);
                    continue;
                }
            };

            match status.status.as_str() {
                "confirmed" | "finalized" | "landed" => {
                    return Ok(self.finalize_confirmed(bundle_id, status.block_height).await);
                }
                "failed" | "invalid" | "dropped" => {
                    self.finalize_terminal(bundle_id, BundleStatus::Failed).await;
                    let mut stats = self.stats.write().await;
                    stats.total += 1;
                    stats.failed += 1;
                    return Err(SdkError::Relay(format!(
                        "bundle {bundle_id} rejected by relay: {}",
                        status.status
                    )));
                }
                other => debug!("bundle {} still {}", bundle_id, other),
            }

            if started.elapsed() > deadline {
                break;
            }
        }

        self.finalize_terminal(bundle_id, BundleStatus::Timeout).await;
        let mut stats = self.stats.write().await;
        stats.total += 1;
        stats.failed += 1;
        Err(SdkError::Timeout(format!(
            "bundle {bundle_id} not confirmed within retry budget"
        )))
    }

    /// Move a pending record to history under its terminal status.
    async fn finalize_terminal(&self, bundle_id: &str, status: BundleStatus) {
        if let Some((_, mut record)) = self.pending.remove(bundle_id) {
            record.status = status;
            self.history.write().await.push(record);
        }
    }

    async fn finalize_confirmed(&self, bundle_id: &str, block_height: Option<u64>) -> BundleRecord {
        let now = chrono::Utc::now().timestamp();
        let mut record = match self.pending.remove(bundle_id) {
            Some((_, record)) => record,
            None => BundleRecord {
                bundle_id: bundle_id.to_string(),
                transactions: vec![],
                status: BundleStatus::Pending,
                submitted_at: now,
                confirmation_time: None,
                block_height: None,
            },
        };
        record.status = BundleStatus::Confirmed;
        record.confirmation_time = Some((now - record.submitted_at) as f64);
        record.block_height = block_height;

        self.history.write().await.push(record.clone());
        let mut stats = self.stats.write().await;
        stats.total += 1;
        stats.successful += 1;
        info!("bundle {} confirmed", bundle_id);

        record
    }

    /// Merged status view: a pending bundle additionally carries its live
    /// relay status (best effort), a confirmed one comes from history.
    pub async fn bundle_status(&self, bundle_id: &str) -> Result<BundleStatusView> {
        if let Some(record) = self.pending.get(bundle_id) {
            let relay_status = self
                .relay
                .bundle_statuses(bundle_id)
                .await
                .ok()
                .map(|s| s.status);
            return Ok(BundleStatusView {
                record: record.clone(),
                relay_status,
            });
        }

        let history = self.history.read().await;
        history
            .iter()
            .rev()
            .find(|record| record.bundle_id == bundle_id)
            .map(|record| BundleStatusView {
                record: record.clone(),
                relay_status: None,
            })
            .ok_or_else(|| SdkError::Validation(format!("unknown bundle {bundle_id}")))
    }

    /// Advisory fee breakdown for a bundle of `transaction_count` members.
    /// Never fails: when the network fee query errors the estimate degrades
    /// to fixed fallbacks and carries the underlying error.
    pub async fn estimate_fee(&self, transaction_count: usize, priority_level: &str) -> FeeEstimate {
        match self.estimate_fee_inner(transaction_count, priority_level).await {
            Ok(estimate) => estimate,
            Err(e) => {
                warn!("fee query failed, using fallback estimate: {}", e);
                let mut estimate = build_estimate(
                    bundle::FALLBACK_AVERAGE_FEE,
                    transaction_count,
                    priority_level,
                );
                estimate.error = Some(e.to_string());
                estimate
            }
        }
    }

    async fn estimate_fee_inner(
        &self,
        transaction_count: usize,
        priority_level: &str,
    ) -> Result<FeeEstimate> {
        let fees = self.ledger.recent_prioritization_fees().await?;
        let average = if fees.is_empty() {
            bundle::FALLBACK_AVERAGE_FEE
        } else {
            fees.iter().sum::<u64>() / fees.len() as u64
        };
        Ok(build_estimate(average, transaction_count, priority_level))
    }

    /// Aggregate submission outcomes; recent counts cover the last hour.
    pub async fn statistics(&self) -> BundleStatistics {
        let stats = self.stats.read().await;
        let history = self.history.read().await;
        let now = chrono::Utc::now().timestamp();

        let confirmation_times: Vec<f64> = history
            .iter()
            .filter_map(|record| record.confirmation_time)
            .collect();
        let average_confirmation_time = if confirmation_times.is_empty() {
            0.0
        } else {
            confirmation_times.iter().sum::<f64>() / confirmation_times.len() as f64
        };

        BundleStatistics {
            total_bundles: stats.total,
            successful_bundles: stats.successful,
            failed_bundles: stats.failed,
            success_rate: stats.successful as f64 / stats.total.max(1) as f64,
            average_confirmation_time,
            pending_bundles: self.pending.len(),
            recent_bundles: history
                .iter()
                .filter(|record| now - record.submitted_at < 3_600)
                .count(),
            last_updated: now,
        }
    }

    /// Drop all tracking state. Counters reset; in-flight bundles are no
    /// longer observable through this client.
    pub async fn clear(&self) {
        self.pending.clear();
        self.history.write().await.clear();
        *self.stats.write().await = BundleStats::default();
    }

    /// Release tracking state on shutdown. Never fails.
    pub async fn shutdown(&self) {
        let dropped = self.pending.len();
        self.clear().await;
        if dropped > 0 {
            info!("dropped {} pending bundles on shutdown", dropped);
        }
    }
}

fn build_estimate(average_fee: u64, transaction_count: usize, priority_level: &str) -> FeeEstimate {
    let multiplier = bundle::priority_multiplier(priority_level);
    let priority_fee = (average_fee as f64 * multiplier) as u64;
    let recommended_tip = bundle::MIN_TIP_LAMPORTS.max(priority_fee * 2);
    let base_fee = bundle::BASE_FEE_PER_TX * transaction_count as u64;

    FeeEstimate {
        base_fee,
        priority_fee,
        recommended_tip,
        total_estimated: base_fee + priority_fee + recommended_tip,
        priority_level: priority_level.to_string(),
        transaction_count,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::KeypairWallet;
    use solana_sdk::{hash::Hash, pubkey::Pubkey, signature::Signature};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    struct MockLedger {
        fees: Vec<u64>,
        fail_fees: bool,
    }

    #[async_trait]
    impl LedgerClient for MockLedger {
        async fn latest_blockhash(&self) -> Result<Hash> {
            Ok(Hash::new_unique())
        }
        async fn send_raw_transaction(&self, _wire: &[u8]) -> Result<Signature> {
            Ok(Signature::new_unique())
        }
        async fn confirm_transaction(&self, _signature: &Signature) -> Result<bool> {
            Ok(true)
        }
        async fn signature_status(&self, _signature: &Signature) -> Result<Option<bool>> {
            Ok(Some(true))
        }
        async fn account_exists(&self, _address: &Pubkey) -> Result<bool> {
            Ok(true)
        }
        async fn recent_prioritization_fees(&self) -> Result<Vec<u64>> {
            if self.fail_fees {
                return Err(SdkError::Relay("fee query unavailable".to_string()));
            }
            Ok(self.fees.clone())
        }
    }

    /// Relay stub with a scripted status and call counters.
    struct MockRelay {
        status: String,
        submissions: AtomicU32,
        polls: AtomicU32,
        last_bundle_sizes: Mutex<Vec<usize>>,
    }

    impl MockRelay {
        fn with_status(status: &str) -> Arc<Self> {
            Arc::new(Self {
                status: status.to_string(),
                submissions: AtomicU32::new(0),
                polls: AtomicU32::new(0),
                last_bundle_sizes: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl RelayApi for MockRelay {
        async fn send_bundle(&self, encoded: &[String]) -> Result<String> {
            self.submissions.fetch_add(1, Ordering::SeqCst);
            self.last_bundle_sizes.lock().unwrap().push(encoded.len());
            Ok(format!("bundle-{}", self.submissions.load(Ordering::SeqCst)))
        }

        async fn bundle_statuses(&self, _bundle_id: &str) -> Result<RelayBundleStatus> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            Ok(RelayBundleStatus {
                status: self.status.clone(),
                block_height: Some(1_234),
            })
        }
    }

    fn fast_config() -> Config {
        Config {
            retry_attempts: 3,
            retry_base_delay: 0.0,
            ..Config::default()
        }
    }

    async fn client_with_wallet(relay: Arc<MockRelay>) -> BundleRelayClient {
        let ledger = Arc::new(MockLedger {
            fees: vec![500, 1_500],
            fail_fees: false,
        });
        let client = BundleRelayClient::new(ledger, relay, fast_config());
        client
            .set_wallet(Arc::new(KeypairWallet::new(
                solana_sdk::signature::Keypair::new(),
            )))
            .await;
        client
    }

    fn noop_member() -> BundleTransaction {
        BundleTransaction::new(vec![Instruction {
            program_id: Pubkey::new_unique(),
            accounts: vec![],
            data: vec![1],
        }])
    }

    #[tokio::test]
    async fn test_send_bundle_requires_wallet() {
        let relay = MockRelay::with_status("confirmed");
        let ledger = Arc::new(MockLedger {
            fees: vec![],
            fail_fees: false,
        });
        let client = BundleRelayClient::new(ledger, relay, fast_config());

        let err = client.send_bundle(vec![noop_member()], None, None).await.unwrap_err();
        assert!(matches!(err, SdkError::Authority(_)));
    }

    #[tokio::test]
    async fn test_oversized_bundle_rejected_before_submission() {
        let relay = MockRelay::with_status("confirmed");
        let client = client_with_wallet(relay.clone()).await;

        let members = (0..6).map(|_| noop_member()).collect();
        let err = client.send_bundle(members, None, None).await.unwrap_err();
        assert!(matches!(err, SdkError::Validation(_)));
        assert_eq!(relay.submissions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_bundle_rejected() {
        let relay = MockRelay::with_status("confirmed");
        let client = client_with_wallet(relay.clone()).await;

        let err = client.send_bundle(vec![], None, None).await.unwrap_err();
        assert!(matches!(err, SdkError::Validation(_)));
        assert_eq!(relay.submissions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_confirmed_bundle_moves_to_history() {
        let relay = MockRelay::with_status("confirmed");
        let client = client_with_wallet(relay.clone()).await;

        let record = client
            .send_bundle(vec![noop_member(), noop_member()], None, None)
            .await
            .unwrap();

        assert_eq!(record.status, BundleStatus::Confirmed);
        assert_eq!(record.transactions.len(), 2);
        assert_eq!(record.block_height, Some(1_234));
        assert!(record.confirmation_time.is_some());
        assert_eq!(client.pending.len(), 0);
        assert_eq!(client.history.read().await.len(), 1);

        let view = client.bundle_status(&record.bundle_id).await.unwrap();
        assert_eq!(view.record.status, BundleStatus::Confirmed);
        assert!(view.relay_status.is_none());
    }

    #[tokio::test]
    async fn test_unconfirmed_bundle_times_out_after_retries() {
        let relay = MockRelay::with_status("processing");
        let client = client_with_wallet(relay.clone()).await;

        let err = client.send_bundle(vec![noop_member()], None, None).await.unwrap_err();
        assert!(matches!(err, SdkError::Timeout(_)));

        // One poll per retry attempt, then the record leaves the pending
        // table marked with its terminal status.
        assert_eq!(relay.polls.load(Ordering::SeqCst), 3);
        assert_eq!(client.pending.len(), 0);

        let history = client.history.read().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, BundleStatus::Timeout);
        drop(history);

        let stats = client.statistics().await;
        assert_eq!(stats.failed_bundles, 1);
        assert_eq!(stats.successful_bundles, 0);
    }

    #[tokio::test]
    async fn test_per_call_retry_override() {
        let relay = MockRelay::with_status("processing");
        let client = client_with_wallet(relay.clone()).await;

        let err = client
            .send_bundle(vec![noop_member()], None, Some(1))
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Timeout(_)));

        // The override wins over the configured three attempts.
        assert_eq!(relay.polls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejected_bundle_surfaces_relay_error() {
        let relay = MockRelay::with_status("failed");
        let client = client_with_wallet(relay.clone()).await;

        let err = client.send_bundle(vec![noop_member()], None, None).await.unwrap_err();
        assert!(matches!(err, SdkError::Relay(_)));
        assert_eq!(client.pending.len(), 0);

        let history = client.history.read().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, BundleStatus::Failed);
    }

    #[tokio::test]
    async fn test_instruction_bundle_grouping() {
        let relay = MockRelay::with_status("confirmed");
        let client = client_with_wallet(relay.clone()).await;

        let instructions: Vec<Instruction> = (0..7)
            .map(|i| Instruction {
                program_id: Pubkey::new_unique(),
                accounts: vec![],
                data: vec![i],
            })
            .collect();

        let record = client
            .send_instruction_bundle(instructions, None)
            .await
            .unwrap();

        // Seven instructions at three per transaction make three members.
        assert_eq!(record.transactions.len(), 3);
        assert_eq!(*relay.last_bundle_sizes.lock().unwrap(), vec![3]);
    }

    #[tokio::test]
    async fn test_statistics_success_rate() {
        let relay = MockRelay::with_status("confirmed");
        let client = client_with_wallet(relay.clone()).await;

        let empty = client.statistics().await;
        assert_eq!(empty.success_rate, 0.0);

        client.send_bundle(vec![noop_member()], None, None).await.unwrap();
        client.send_bundle(vec![noop_member()], None, None).await.unwrap();

        let stats = client.statistics().await;
        assert_eq!(stats.total_bundles, 2);
        assert_eq!(stats.success_rate, 1.0);
        assert_eq!(stats.recent_bundles, 2);
    }

    #[tokio::test]
    async fn test_estimate_fee_from_network_average() {
        let relay = MockRelay::with_status("confirmed");
        let client = client_with_wallet(relay).await;

        // Average of 500 and 1500 is 1000; high multiplies by five. The
        // priority fee enters the total once, not per transaction.
        let estimate = client.estimate_fee(3, "high").await;
        assert_eq!(estimate.base_fee, 15_000);
        assert_eq!(estimate.priority_fee, 5_000);
        assert_eq!(estimate.recommended_tip, 10_000);
        assert_eq!(estimate.total_estimated, 15_000 + 5_000 + 10_000);
        assert!(estimate.error.is_none());
    }

    #[tokio::test]
    async fn test_estimate_fee_degrades_on_query_failure() {
        let relay = MockRelay::with_status("confirmed");
        let ledger = Arc::new(MockLedger {
            fees: vec![],
            fail_fees: true,
        });
        let client = BundleRelayClient::new(ledger, relay, fast_config());

        let estimate = client.estimate_fee(1, "medium").await;
        assert_eq!(estimate.base_fee, 5_000);
        assert_eq!(estimate.priority_fee, 2_000);
        assert_eq!(estimate.recommended_tip, 10_000);
        assert!(estimate.error.is_some());
    }

    #[tokio::test]
    async fn test_clear_resets_tracking() {
        let relay = MockRelay::with_status("confirmed");
        let client = client_with_wallet(relay).await;

        client.send_bundle(vec![noop_member()], None, None).await.unwrap();
        client.clear().await;

        let stats = client.statistics().await;
        assert_eq!(stats.total_bundles, 0);
        assert!(client.history.read().await.is_empty());
    }
}
