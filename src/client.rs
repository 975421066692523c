//! SDK facade
//!
//! Wires the session manager and the bundle relay client over one shared
//! ledger connection and one wallet identity.

use crate::config::Config;
use crate::ledger::{LedgerClient, RpcLedger};
use crate::relay::{BundleRelayClient, HttpRelay, RelayApi};
use crate::session::SessionManager;
use crate::wallet::TransactionSigner;
use crate::Result;
use std::sync::Arc;
use tracing::info;

pub struct KeyleaseClient {
    sessions: Arc<SessionManager>,
    bundles: Arc<BundleRelayClient>,
}

impl KeyleaseClient {
    /// Connect to the configured RPC endpoint and bundle relay.
    pub fn connect(config: Config) -> Result<Self> {
        let ledger: Arc<dyn LedgerClient> =
            Arc::new(RpcLedger::new(config.rpc_url.clone(), config.commitment));
        let relay: Arc<dyn RelayApi> = Arc::new(HttpRelay::new(&config.relay_url)?);
        Ok(Self::with_parts(ledger, relay, config))
    }

    /// Assemble the client from explicit collaborators. Useful for tests
    /// and for callers bringing their own transports.
    pub fn with_parts(
        ledger: Arc<dyn LedgerClient>,
        relay: Arc<dyn RelayApi>,
        config: Config,
    ) -> Self {
        let sessions = Arc::new(SessionManager::new(ledger.clone(), &config));
        let bundles = Arc::new(BundleRelayClient::new(ledger, relay, config));
        Self { sessions, bundles }
    }

    /// Set the wallet on both subsystems and start session housekeeping.
    pub async fn set_wallet(&self, wallet: Arc<dyn TransactionSigner>) {
        self.sessions.set_wallet(wallet.clone()).await;
        self.bundles.set_wallet(wallet).await;
        self.sessions.start().await;
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn bundles(&self) -> &BundleRelayClient {
        &self.bundles
    }

    /// Release everything: stop housekeeping, zero session key material,
    /// drop bundle tracking. Never fails.
    pub async fn shutdown(&self) {
        self.sessions.shutdown().await;
        self.bundles.shutdown().await;
        info!("client shut down");
    }
}
