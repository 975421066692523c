//! Session-key lifecycle management
//!
//! Issues ephemeral delegated signing credentials, gates every use on the
//! credential's authorization envelope (active flag, expiry, remaining uses,
//! rate ceiling) and revokes them. Expiry is detected lazily at use time; the
//! background sweep is best-effort housekeeping only.
//!
//! Per credential the state machine is monotone:
//! `Active -> Inactive -> Removed`, never back.

use crate::error::AuthorizationError;
use crate::ledger::LedgerClient;
use crate::rate_limit::RateLimiter;
use crate::secure::SecureKeypair;
use crate::wallet::TransactionSigner;
use crate::{Config, Result, SdkError};
use rand::RngCore;
use serde::Serialize;
use sha2::{Digest, Sha256};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    signature::Signature,
    system_program,
    transaction::Transaction,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::{
    sync::{broadcast, RwLock},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

/// Authorization envelope of a session credential. Immutable once issued.
#[derive(Debug, Clone)]
pub struct SessionPolicy {
    /// Programs the session is allowed to invoke; empty means unrestricted.
    pub target_programs: Vec<Pubkey>,

    /// Absolute expiry, unix seconds.
    pub expires_at: i64,

    /// Maximum number of authorized uses; `None` means unlimited.
    pub max_uses: Option<u32>,

    /// Optional instruction-name allowlist, enforced by the on-ledger
    /// program (raw instructions carry no names client-side).
    pub allowed_instructions: Option<Vec<String>>,

    /// Requests-per-minute ceiling; `0` falls back to the manager default.
    pub rate_limit_per_minute: u32,
}

impl SessionPolicy {
    pub fn new(target_programs: Vec<Pubkey>, expires_at: i64) -> Self {
        Self {
            target_programs,
            expires_at,
            max_uses: None,
            allowed_instructions: None,
            rate_limit_per_minute: 60,
        }
    }

    pub fn with_max_uses(mut self, max_uses: u32) -> Self {
        self.max_uses = Some(max_uses);
        self
    }

    pub fn with_rate_limit(mut self, per_minute: u32) -> Self {
        self.rate_limit_per_minute = per_minute;
        self
    }
}

/// One issued credential. Exclusively owns its ephemeral key material; the
/// key bytes are zeroed when the credential is removed.
struct SessionCredential {
    keys: SecureKeypair,
    delegation_account: Pubkey,
    policy: SessionPolicy,
    created_at: i64,
    /// `-1` is the unlimited sentinel.
    uses_remaining: i64,
    is_active: bool,
}

/// Read-only snapshot of a credential. Never carries key material, and the
/// token is truncated to a non-reversible prefix.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub token: String,
    pub delegation_account: String,
    pub created_at: i64,
    pub expires_at: i64,
    pub uses_remaining: i64,
    pub is_active: bool,
    pub is_expired: bool,
    pub target_programs: Vec<String>,
    pub rate_limit_per_minute: u32,
}

/// Live credential table plus the per-token rate windows. Guarded by one
/// lock so a sweep removes a credential and its window atomically.
#[derive(Default)]
struct SessionTable {
    sessions: HashMap<String, SessionCredential>,
    rate: RateLimiter,
}

/// Owns the credential table and its housekeeping task.
pub struct SessionManager {
    ledger: Arc<dyn LedgerClient>,
    program_id: Pubkey,
    default_rate_limit: u32,
    retry_attempts: u32,
    retry_base_delay: f64,
    cleanup_interval: Duration,
    wallet: RwLock<Option<Arc<dyn TransactionSigner>>>,
    table: Arc<RwLock<SessionTable>>,
    shutdown_tx: broadcast::Sender<()>,
    sweeper: RwLock<Option<JoinHandle<()>>>,
}

impl SessionManager {
    pub fn new(ledger: Arc<dyn LedgerClient>, config: &Config) -> Self {
        let (shutdown_tx, _) = broadcast::channel(4);

        Self {
            ledger,
            program_id: config.session_program,
            default_rate_limit: config.default_rate_limit_per_minute,
            retry_attempts: config.retry_attempts,
            retry_base_delay: config.retry_base_delay,
            cleanup_interval: Duration::from_secs(config.cleanup_interval_secs),
            wallet: RwLock::new(None),
            table: Arc::new(RwLock::new(SessionTable::default())),
            shutdown_tx,
            sweeper: RwLock::new(None),
        }
    }

    /// Set the default delegator wallet for issue and revoke operations.
    pub async fn set_wallet(&self, wallet: Arc<dyn TransactionSigner>) {
        *self.wallet.write().await = Some(wallet);
    }

    /// Issue a new session credential under `policy`, creating its
    /// delegation account on-ledger signed by the delegator.
    pub async fn issue(
        &self,
        policy: SessionPolicy,
        delegator: Option<Arc<dyn TransactionSigner>>,
    ) -> Result<String> {
        let wallet = match delegator {
            Some(wallet) => wallet,
            None => self.wallet.read().await.clone().ok_or_else(|| {
                SdkError::Authority("no delegator identity available".to_string())
            })?,
        };
        let delegator_key = wallet.public_identity();

        let keys = SecureKeypair::generate();
        let ephemeral_key = keys.pubkey();
        let delegation_account = derive_delegation_account(
            &self.program_id,
            &delegator_key,
            &ephemeral_key,
        );

        let instruction = create_session_instruction(
            &self.program_id,
            &delegator_key,
            &ephemeral_key,
            &delegation_account,
            &policy,
        )?;

        let mut tx = Transaction::new_with_payer(&[instruction], Some(&delegator_key));
        tx.message.recent_blockhash = self.ledger.latest_blockhash().await?;
        let tx = wallet.sign_transaction(tx).await?;

        let signature = self.submit_and_confirm(&tx).await?;
        debug!("session account created in {}", signature);

        let token = generate_token(&ephemeral_key, &delegator_key);
        let uses_remaining = policy.max_uses.map_or(-1, i64::from);

        let mut table = self.table.write().await;
        table.sessions.insert(
            token.clone(),
            SessionCredential {
                keys,
                delegation_account,
                policy,
                created_at: unix_now(),
                uses_remaining,
                is_active: true,
            },
        );
        info!("issued session {}", truncated(&token));

        Ok(token)
    }

    /// Execute instructions under a session credential.
    ///
    /// Usage accounting happens only after the submission is confirmed: a
    /// failed submission never consumes a use or a rate-window slot.
    pub async fn authorize(
        &self,
        token: &str,
        instructions: Vec<Instruction>,
    ) -> Result<Signature> {
        let now = unix_now();

        // Validate the envelope and capture the signer under the lock.
        let (signer, fee_payer) = {
            let mut table = self.table.write().await;
            let credential = table
                .sessions
                .get_mut(token)
                .ok_or(AuthorizationError::NotFound)?;

            // Expiry and exhaustion outrank the active flag so a depleted
            // credential keeps reporting the reason it was deactivated.
            if now > credential.policy.expires_at {
                // Lazy expiry detection; the sweep will remove it later.
                credential.is_active = false;
                return Err(AuthorizationError::Expired.into());
            }
            if credential.uses_remaining == 0 {
                credential.is_active = false;
                return Err(AuthorizationError::Exhausted.into());
            }
            if !credential.is_active {
                return Err(AuthorizationError::Inactive.into());
            }

            if !credential.policy.target_programs.is_empty() {
                for instruction in &instructions {
                    if !credential.policy.target_programs.contains(&instruction.program_id) {
                        return Err(SdkError::Validation(format!(
                            "program {} not in session allowlist",
                            instruction.program_id
                        )));
                    }
                }
            }

            let ceiling = effective_rate_limit(&credential.policy, self.default_rate_limit);
            table.rate.check(token, ceiling, unix_now_f64())?;

            let credential = &table.sessions[token];
            (credential.keys.signer()?, credential.keys.pubkey())
        };

        let mut tx = Transaction::new_with_payer(&instructions, Some(&fee_payer));
        let blockhash = self.ledger.latest_blockhash().await?;
        tx.try_sign(&[&signer], blockhash)
            .map_err(|e| SdkError::Validation(format!("failed to sign transaction: {e}")))?;

        let signature = self.submit_and_confirm(&tx).await?;

        // Side effects only after confirmed submission.
        let mut table = self.table.write().await;
        if let Some(credential) = table.sessions.get_mut(token) {
            if credential.uses_remaining > 0 {
                credential.uses_remaining -= 1;
                if credential.uses_remaining == 0 {
                    credential.is_active = false;
                }
            }
        }
        table.rate.record(token, unix_now_f64());

        Ok(signature)
    }

    /// Revoke a session credential on-ledger.
    ///
    /// The local record is removed only after the revoke transaction is
    /// confirmed, so a failed revoke can be retried idempotently.
    pub async fn revoke(
        &self,
        token: &str,
        delegator: Option<Arc<dyn TransactionSigner>>,
    ) -> Result<Signature> {
        let wallet = match delegator {
            Some(wallet) => wallet,
            None => self.wallet.read().await.clone().ok_or_else(|| {
                SdkError::Authority("no delegator identity available".to_string())
            })?,
        };
        let delegator_key = wallet.public_identity();

        let delegation_account = {
            let table = self.table.read().await;
            table
                .sessions
                .get(token)
                .ok_or(AuthorizationError::NotFound)?
                .delegation_account
        };

        let instruction = revoke_session_instruction(
            &self.program_id,
            &delegator_key,
            &delegation_account,
        );
        let mut tx = Transaction::new_with_payer(&[instruction], Some(&delegator_key));
        tx.message.recent_blockhash = self.ledger.latest_blockhash().await?;
        let tx = wallet.sign_transaction(tx).await?;

        let signature = self.submit_and_confirm(&tx).await?;

        let mut table = self.table.write().await;
        if let Some(mut credential) = table.sessions.remove(token) {
            credential.is_active = false;
        }
        table.rate.remove(token);
        info!("revoked session {}", truncated(token));

        Ok(signature)
    }

    /// Read-only snapshot of one credential.
    pub async fn describe(&self, token: &str) -> Result<SessionInfo> {
        let table = self.table.read().await;
        let credential = table
            .sessions
            .get(token)
            .ok_or(AuthorizationError::NotFound)?;
        Ok(snapshot(token, credential, unix_now()))
    }

    /// Snapshots of all credentials currently active and unexpired. Tokens
    /// are truncated so listings cannot leak usable credentials.
    pub async fn list_active(&self) -> Vec<SessionInfo> {
        let now = unix_now();
        let table = self.table.read().await;
        table
            .sessions
            .iter()
            .filter(|(_, c)| c.is_active && now <= c.policy.expires_at)
            .map(|(token, c)| snapshot(token, c, now))
            .collect()
    }

    /// Start the periodic expiry sweep.
    pub async fn start(&self) {
        let mut sweeper = self.sweeper.write().await;
        if sweeper.is_some() {
            return;
        }

        info!(
            "starting session sweep every {}s",
            self.cleanup_interval.as_secs()
        );
        let table = self.table.clone();
        let interval = self.cleanup_interval;
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        *sweeper = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // first tick fires immediately
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        debug!("session sweep received shutdown signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        let mut table = table.write().await;
                        let removed = remove_stale(&mut table, unix_now());
                        if removed > 0 {
                            info!("sweep removed {} stale sessions", removed);
                        }
                    }
                }
            }
        }));
    }

    /// Stop the sweep task and wait for it to drain.
    pub async fn stop(&self) {
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.sweeper.write().await.take() {
            let _ = handle.await;
        }
    }

    /// Stop housekeeping and release every credential. Key material is
    /// zeroed as the table drops. Never fails; failures are logged.
    pub async fn shutdown(&self) {
        self.stop().await;
        let mut table = self.table.write().await;
        let count = table.sessions.len();
        table.sessions.clear();
        table.rate = RateLimiter::new();
        if count > 0 {
            info!("released {} sessions on shutdown", count);
        }
    }

    /// Submit a signed transaction and poll for confirmation with linear
    /// backoff. Network errors during polling are retried, not surfaced.
    async fn submit_and_confirm(&self, tx: &Transaction) -> Result<Signature> {
        let wire = bincode::serialize(tx)
            .map_err(|e| SdkError::Validation(format!("failed to encode transaction: {e}")))?;
        let signature = self.ledger.send_raw_transaction(&wire).await?;

        for attempt in 1..=self.retry_attempts {
            match self.ledger.confirm_transaction(&signature).await {
                Ok(true) => return Ok(signature),
                Ok(false) => {}
                Err(e) => warn!("confirmation poll failed: {}", e),
            }
            tokio::time::sleep(Duration::from_secs_f64(
                self.retry_base_delay * f64::from(attempt),
            ))
            .await;
        }

        Err(SdkError::Relay(format!(
            "transaction {signature} not confirmed"
        )))
    }
}

fn effective_rate_limit(policy: &SessionPolicy, default: u32) -> u32 {
    if policy.rate_limit_per_minute == 0 {
        default
    } else {
        policy.rate_limit_per_minute
    }
}

/// Remove inactive or expired credentials and their rate windows.
fn remove_stale(table: &mut SessionTable, now: i64) -> usize {
    let stale: Vec<String> = table
        .sessions
        .iter()
        .filter(|(_, c)| !c.is_active || now > c.policy.expires_at)
        .map(|(token, _)| token.clone())
        .collect();

    for token in &stale {
        table.sessions.remove(token);
        table.rate.remove(token);
    }
    stale.len()
}

fn snapshot(token: &str, credential: &SessionCredential, now: i64) -> SessionInfo {
    SessionInfo {
        token: truncated(token),
        delegation_account: credential.delegation_account.to_string(),
        created_at: credential.created_at,
        expires_at: credential.policy.expires_at,
        uses_remaining: credential.uses_remaining,
        is_active: credential.is_active,
        is_expired: now > credential.policy.expires_at,
        target_programs: credential
            .policy
            .target_programs
            .iter()
            .map(Pubkey::to_string)
            .collect(),
        rate_limit_per_minute: credential.policy.rate_limit_per_minute,
    }
}

/// Deterministic delegation account address for (delegator, ephemeral key).
pub fn derive_delegation_account(
    program_id: &Pubkey,
    delegator: &Pubkey,
    ephemeral: &Pubkey,
) -> Pubkey {
    let (address, _bump) = Pubkey::find_program_address(
        &[b"session", delegator.as_ref(), ephemeral.as_ref()],
        program_id,
    );
    address
}

/// Opaque session token: digest over both identities and a fresh nonce, so
/// tokens are unique and not guessable from public material alone.
fn generate_token(ephemeral: &Pubkey, delegator: &Pubkey) -> String {
    let mut nonce = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut nonce);

    let mut hasher = Sha256::new();
    hasher.update(ephemeral.as_ref());
    hasher.update(delegator.as_ref());
    hasher.update(nonce);
    hex::encode(hasher.finalize())
}

/// Non-reversible display form of a token.
fn truncated(token: &str) -> String {
    let prefix: String = token.chars().take(16).collect();
    format!("{prefix}...")
}

fn instruction_discriminator(name: &str) -> [u8; 8] {
    let mut hasher = Sha256::new();
    hasher.update(format!("global:{name}").as_bytes());
    let digest = hasher.finalize();
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&digest[..8]);
    discriminator
}

fn create_session_instruction(
    program_id: &Pubkey,
    delegator: &Pubkey,
    ephemeral: &Pubkey,
    delegation_account: &Pubkey,
    policy: &SessionPolicy,
) -> Result<Instruction> {
    let mut data = instruction_discriminator("create_session").to_vec();
    let args = (
        policy.expires_at,
        policy.max_uses,
        policy.rate_limit_per_minute,
    );
    data.extend(
        bincode::serialize(&args)
            .map_err(|e| SdkError::Validation(format!("failed to encode policy: {e}")))?,
    );

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*delegator, true),
            AccountMeta::new(*delegation_account, false),
            AccountMeta::new_readonly(*ephemeral, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data,
    })
}

fn revoke_session_instruction(
    program_id: &Pubkey,
    delegator: &Pubkey,
    delegation_account: &Pubkey,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*delegator, true),
            AccountMeta::new(*delegation_account, false),
        ],
        data: instruction_discriminator("revoke_session").to_vec(),
    }
}

fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn unix_now_f64() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1_000.0
}
