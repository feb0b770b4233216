//! Wallet session state machine.
//!
//! The session moves between four states:
//!
//! ```text
//!                connect            ≥1 account
//! Disconnected ──────────► Connecting ──────────► Connected ◄─┐
//!      ▲                       │                   │  │  │    │ account / chain
//!      │                       │ rejected / empty  │  │  └────┘ changed, switch
//!      │                       ▼                   │  │
//!      │   connect (retry)   Error                 │  │
//!      │   ◄────────────────                       │  │
//!      └───────────────────────────────────────────┘  │
//!         disconnect, or accountsChanged([])          │
//! ```
//!
//! Every side effect goes through the injected [`WalletProvider`]. Inside
//! [`WalletSession::run`] a single task applies user commands and provider
//! events one at a time and publishes each new state on a watch channel.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, watch};

use crate::client::provider::{
    ETH_ACCOUNTS, ETH_CHAIN_ID, ETH_REQUEST_ACCOUNTS, WALLET_ADD_CHAIN, WALLET_SWITCH_CHAIN,
    request_as,
};
use crate::client::{ProviderError, ProviderEvent, Signer, WalletProvider};
use crate::domain::{DashError, NetworkInfo, network_info, parse_chain_id};

// ============================================================================
// State Types
// ============================================================================

/// Connection status of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalletStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl WalletStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Error => "error",
        }
    }
}

/// Observable state of the session.
///
/// `account` is `Some` exactly when `status` is [`WalletStatus::Connected`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WalletSessionState {
    pub status: WalletStatus,
    pub account: Option<String>,
    pub chain_id: Option<u64>,
    pub last_error: Option<String>,
}

impl WalletSessionState {
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.status == WalletStatus::Connected
    }

    /// Registry entry of the active chain, if it is a supported one.
    #[must_use]
    pub fn network(&self) -> Option<&'static NetworkInfo> {
        self.chain_id.and_then(network_info)
    }
}

/// User actions accepted by [`WalletSession::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletCommand {
    Connect,
    Disconnect,
    SwitchNetwork(u64),
    Restore,
}

// ============================================================================
// Wallet Session
// ============================================================================

/// Wallet connection state driven by user actions and provider events.
#[derive(Debug)]
pub struct WalletSession {
    provider: Arc<dyn WalletProvider>,
    state: WalletSessionState,
    signer: Option<Signer>,
    publisher: watch::Sender<WalletSessionState>,
}

impl WalletSession {
    /// Creates a disconnected session.
    #[must_use]
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        let (publisher, _) = watch::channel(WalletSessionState::default());
        Self {
            provider,
            state: WalletSessionState::default(),
            signer: None,
            publisher,
        }
    }

    #[must_use]
    pub fn state(&self) -> &WalletSessionState {
        &self.state
    }

    /// Receives every state the session publishes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<WalletSessionState> {
        self.publisher.subscribe()
    }

    fn publish(&self) {
        self.publisher.send_replace(self.state.clone());
    }

    fn enter_error(&mut self, message: String) {
        tracing::warn!("Wallet connection failed: {message}");
        self.state = WalletSessionState {
            status: WalletStatus::Error,
            last_error: Some(message),
            ..WalletSessionState::default()
        };
        self.signer = None;
        self.publish();
    }

    fn enter_connected(&mut self, account: String, chain_id: u64) {
        tracing::info!("Wallet connected: {account} on chain {chain_id}");
        self.state = WalletSessionState {
            status: WalletStatus::Connected,
            account: Some(account),
            chain_id: Some(chain_id),
            last_error: None,
        };
        self.publish();
    }

    async fn query_chain_id(&self) -> Result<u64, DashError> {
        let raw: String = request_as(self.provider.as_ref(), ETH_CHAIN_ID, json!([])).await?;
        parse_chain_id(&raw)
    }

    // ------------------------------------------------------------------------
    // User Actions
    // ------------------------------------------------------------------------

    /// Asks the provider for account access.
    ///
    /// A no-op when already connected.
    ///
    /// # Errors
    ///
    /// Returns `DashError::Connectivity` when the provider rejects the
    /// request or exposes no account; the session is then in
    /// [`WalletStatus::Error`].
    pub async fn connect(&mut self) -> Result<(), DashError> {
        if self.state.is_connected() {
            return Ok(());
        }

        self.state = WalletSessionState {
            status: WalletStatus::Connecting,
            ..WalletSessionState::default()
        };
        self.publish();

        let accounts: Vec<String> =
            match request_as(self.provider.as_ref(), ETH_REQUEST_ACCOUNTS, json!([])).await {
                Ok(accounts) => accounts,
                Err(err) => {
                    self.enter_error(err.to_string());
                    return Err(err);
                }
            };

        let Some(account) = accounts.into_iter().next() else {
            let err = DashError::connectivity("wallet returned no accounts");
            self.enter_error(err.to_string());
            return Err(err);
        };

        match self.query_chain_id().await {
            Ok(chain_id) => {
                self.enter_connected(account, chain_id);
                Ok(())
            }
            Err(err) => {
                self.enter_error(err.to_string());
                Err(err)
            }
        }
    }

    /// Reconnects silently if the provider already exposes an account.
    ///
    /// Returns whether the session ended up connected. Failures are logged
    /// and leave the state untouched.
    pub async fn restore(&mut self) -> bool {
        if self.state.is_connected() {
            return true;
        }
        if self.state.status != WalletStatus::Disconnected {
            return false;
        }

        let accounts: Vec<String> =
            match request_as(self.provider.as_ref(), ETH_ACCOUNTS, json!([])).await {
                Ok(accounts) => accounts,
                Err(err) => {
                    tracing::debug!("No existing wallet connection: {err}");
                    return false;
                }
            };
        let Some(account) = accounts.into_iter().next() else {
            return false;
        };

        match self.query_chain_id().await {
            Ok(chain_id) => {
                self.enter_connected(account, chain_id);
                true
            }
            Err(err) => {
                tracing::debug!("Existing connection has no chain id: {err}");
                false
            }
        }
    }

    /// Forgets the account locally. Permissions granted to the dashboard
    /// are not revoked.
    pub fn disconnect(&mut self) {
        if self.state.status != WalletStatus::Disconnected {
            tracing::info!("Wallet disconnected");
        }
        self.state = WalletSessionState::default();
        self.signer = None;
        self.publish();
    }

    /// Asks the provider to switch to a supported chain, registering it
    /// first if the provider does not know it.
    ///
    /// The session stays connected either way; on failure the message is
    /// kept in `last_error`.
    ///
    /// # Errors
    ///
    /// Returns `DashError::Validation` when not connected or when the chain
    /// is not in the registry, and the provider error when switching fails.
    pub async fn switch_network(&mut self, chain_id: u64) -> Result<(), DashError> {
        if !self.state.is_connected() {
            return Err(DashError::invalid_input("connect a wallet first"));
        }
        let info = network_info(chain_id).ok_or_else(|| {
            DashError::invalid_input(format!("chain {chain_id} is not a supported network"))
        })?;

        if let Err(err) = self.request_switch(info).await {
            let err = DashError::from(err);
            tracing::warn!("Network switch to {} failed: {err}", info.name);
            self.state.last_error = Some(err.to_string());
            self.publish();
            return Err(err);
        }

        // The provider also announces the change; re-read so state does not
        // depend on event delivery.
        let active = self.query_chain_id().await.unwrap_or(chain_id);
        tracing::info!("Switched to {info}");
        self.state.chain_id = Some(active);
        self.state.last_error = None;
        self.publish();
        Ok(())
    }

    async fn request_switch(&self, info: &NetworkInfo) -> Result<(), ProviderError> {
        let params = json!([{ "chainId": info.chain_id_hex() }]);
        match self.provider.request(WALLET_SWITCH_CHAIN, params.clone()).await {
            Ok(_) => Ok(()),
            Err(err) if err.is_unrecognized_chain() => {
                tracing::info!("Provider does not know {}, adding it", info.name);
                self.provider
                    .request(WALLET_ADD_CHAIN, json!([info.add_chain_params()]))
                    .await?;
                self.provider.request(WALLET_SWITCH_CHAIN, params).await?;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    // ------------------------------------------------------------------------
    // Provider Events
    // ------------------------------------------------------------------------

    /// Applies one provider notification. Ignored unless connected.
    pub fn apply_event(&mut self, event: ProviderEvent) {
        if !self.state.is_connected() {
            tracing::debug!("Ignoring {event:?} while {}", self.state.status.as_str());
            return;
        }

        match event {
            ProviderEvent::AccountsChanged(accounts) => match accounts.into_iter().next() {
                None => {
                    tracing::info!("Wallet exposed no accounts, disconnecting");
                    self.state = WalletSessionState::default();
                    self.signer = None;
                }
                Some(account) => {
                    let changed = self
                        .state
                        .account
                        .as_deref()
                        .is_none_or(|current| !current.eq_ignore_ascii_case(&account));
                    if changed {
                        tracing::info!("Wallet account changed to {account}");
                        self.signer = None;
                    }
                    self.state.account = Some(account);
                }
            },
            ProviderEvent::ChainChanged(raw) => match parse_chain_id(&raw) {
                Ok(chain_id) => {
                    tracing::info!("Wallet chain changed to {chain_id}");
                    self.state.chain_id = Some(chain_id);
                }
                Err(err) => {
                    tracing::warn!("Ignoring chain change: {err}");
                    return;
                }
            },
        }
        self.publish();
    }

    // ------------------------------------------------------------------------
    // Signer
    // ------------------------------------------------------------------------

    /// Signer for the connected account, created on first use.
    ///
    /// # Errors
    ///
    /// Returns `DashError::Validation` when no wallet is connected.
    pub fn signer(&mut self) -> Result<Signer, DashError> {
        let account = match (&self.state.status, &self.state.account) {
            (WalletStatus::Connected, Some(account)) => account.clone(),
            _ => return Err(DashError::invalid_input("connect a wallet first")),
        };

        let signer = match self.signer.take() {
            Some(signer) if signer.account() == account => signer,
            _ => Signer::new(Arc::clone(&self.provider), account),
        };
        self.signer = Some(signer.clone());
        Ok(signer)
    }

    // ------------------------------------------------------------------------
    // Session Task
    // ------------------------------------------------------------------------

    /// Runs the session until the command channel closes, applying commands
    /// and provider events in arrival order. Returns the final session.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<WalletCommand>,
        mut events: broadcast::Receiver<ProviderEvent>,
    ) -> Self {
        let mut events_open = true;

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                event = events.recv(), if events_open => match event {
                    Ok(event) => self.apply_event(event),
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!("Missed {missed} provider events");
                    }
                    Err(RecvError::Closed) => events_open = false,
                },
            }
        }

        self
    }

    async fn handle_command(&mut self, command: WalletCommand) {
        let result = match command {
            WalletCommand::Connect => self.connect().await,
            WalletCommand::Disconnect => {
                self.disconnect();
                Ok(())
            }
            WalletCommand::SwitchNetwork(chain_id) => self.switch_network(chain_id).await,
            WalletCommand::Restore => {
                self.restore().await;
                Ok(())
            }
        };
        if let Err(err) = result {
            tracing::debug!("Wallet command failed: {err}");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
