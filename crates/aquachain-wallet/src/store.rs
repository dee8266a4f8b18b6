//! SESSION STORE
//!
//! Single source of truth for who is viewing the dashboard. All mutations go
//! through four operations, each synchronous and run to completion:
//!
//! - `connect_default`  -> Connected(default resident)
//! - `switch_identity`  -> Connected(identity)
//! - `switch_to_public` -> Public
//! - `disconnect`       -> Public, balance zeroed
//!
//! Connected states are mirrored into the injected key-value store under
//! `current_user` / `wallet_connected`; public states remove both keys.
//! Storage write failures never block a transition.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::identity::{Identity, Roster};
use crate::role::ViewerRole;
use crate::session::Session;
use crate::storage::{KeyValueStore, CURRENT_USER_KEY, WALLET_CONNECTED_KEY};

pub struct SessionStore<S: KeyValueStore> {
    roster: Arc<Roster>,
    storage: S,
    config: WalletConfig,
    session: Session,
    rng: StdRng,
    updates: watch::Sender<Session>,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Opens a store over `storage` with the built-in roster, restoring any
    /// persisted connection.
    pub fn open(storage: S) -> Self {
        Self::with_parts(
            storage,
            Arc::new(Roster::builtin()),
            WalletConfig::default(),
            StdRng::from_entropy(),
        )
    }

    pub fn with_config(storage: S, config: WalletConfig) -> Self {
        Self::with_parts(
            storage,
            Arc::new(Roster::builtin()),
            config,
            StdRng::from_entropy(),
        )
    }

    /// Fully injected constructor. Tests pass a seeded RNG.
    pub fn with_parts(storage: S, roster: Arc<Roster>, config: WalletConfig, rng: StdRng) -> Self {
        let (updates, _) = watch::channel(Session::public());
        let mut store = Self {
            roster,
            storage,
            config,
            session: Session::public(),
            rng,
            updates,
        };
        store.restore();
        store
    }

    // ── Reads ────────────────────────────────────────────────────────────

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn connected(&self) -> bool {
        self.session.is_connected()
    }

    pub fn active_identity(&self) -> Option<&Arc<Identity>> {
        self.session.active_identity()
    }

    pub fn viewer_role(&self) -> ViewerRole {
        self.session.viewer_role()
    }

    pub fn balance(&self) -> f64 {
        self.session.balance()
    }

    pub fn all_identities(&self) -> &[Arc<Identity>] {
        self.roster.identities()
    }

    pub fn roster(&self) -> &Arc<Roster> {
        &self.roster
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Receives a fresh snapshot whenever the session actually changes.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.updates.subscribe()
    }

    // ── Transitions ──────────────────────────────────────────────────────

    /// Connects as the configured default resident.
    ///
    /// A configured default that is missing from the roster or is the
    /// administrator falls back to the first resident.
    pub fn connect_default(&mut self) -> Result<Arc<Identity>, WalletError> {
        let identity = match self.roster.find(&self.config.default_identity) {
            Some(identity) if !identity.is_admin() => Arc::clone(identity),
            _ => {
                warn!(
                    configured = %self.config.default_identity,
                    "default identity unusable, falling back to first resident"
                );
                self.roster
                    .residents()
                    .next()
                    .cloned()
                    .ok_or_else(|| WalletError::NotFound("no resident identity in roster".into()))?
            }
        };
        self.connect(Arc::clone(&identity));
        Ok(identity)
    }

    /// Switches to `id`. An unknown id is rejected and nothing changes.
    pub fn switch_identity(&mut self, id: &str) -> Result<Arc<Identity>, WalletError> {
        let identity = self
            .roster
            .find(id)
            .cloned()
            .ok_or_else(|| WalletError::NotFound(id.to_string()))?;
        self.connect(Arc::clone(&identity));
        Ok(identity)
    }

    pub fn switch_to_public(&mut self) {
        self.session.clear_identity();
        self.clear_persisted();
        info!("switched to public view");
        self.publish();
    }

    pub fn disconnect(&mut self) {
        self.session.reset();
        self.clear_persisted();
        info!("wallet disconnected");
        self.publish();
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn connect(&mut self, identity: Arc<Identity>) {
        let balance = self.next_balance();
        self.persist(&identity);
        info!(identity = %identity.id, role = %identity.role, "wallet connected");
        self.session = Session::connected_as(identity, balance);
        self.publish();
    }

    fn next_balance(&mut self) -> f64 {
        self.rng.gen_range(self.config.balance_range())
    }

    fn persist(&self, identity: &Identity) {
        let record = match serde_json::to_string(identity) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "failed to serialize identity, session not persisted");
                return;
            }
        };
        if let Err(e) = self.storage.set(CURRENT_USER_KEY, &record) {
            warn!(error = %e, key = CURRENT_USER_KEY, "failed to persist session");
        }
        if let Err(e) = self.storage.set(WALLET_CONNECTED_KEY, "true") {
            warn!(error = %e, key = WALLET_CONNECTED_KEY, "failed to persist session");
        }
    }

    fn clear_persisted(&self) {
        for key in [CURRENT_USER_KEY, WALLET_CONNECTED_KEY] {
            if let Err(e) = self.storage.delete(key) {
                warn!(error = %e, key, "failed to clear persisted session");
            }
        }
    }

    fn restore(&mut self) {
        match self.read_persisted() {
            Ok(Some(identity)) => {
                let balance = self.next_balance();
                info!(identity = %identity.id, "restored persisted session");
                self.session = Session::connected_as(identity, balance);
                self.publish();
            }
            Ok(None) => debug!("no persisted session, starting public"),
            Err(e) => {
                warn!(error = %e, "discarding persisted session, starting public");
                self.clear_persisted();
            }
        }
    }

    fn read_persisted(&self) -> Result<Option<Arc<Identity>>, WalletError> {
        let read = |key: &str| {
            self.storage
                .get(key)
                .map_err(|e| WalletError::PersistenceRead(e.to_string()))
        };
        let flag = read(WALLET_CONNECTED_KEY)?;
        let record = read(CURRENT_USER_KEY)?;

        let (Some(flag), Some(record)) = (flag, record) else {
            return Ok(None);
        };
        if flag != "true" {
            return Ok(None);
        }

        let persisted: Identity = serde_json::from_str(&record).map_err(|e| {
            WalletError::PersistenceRead(format!("malformed {CURRENT_USER_KEY}: {e}"))
        })?;
        // The roster is authoritative; a stored role is never trusted.
        self.roster
            .find(&persisted.id)
            .cloned()
            .map(Some)
            .ok_or_else(|| {
                WalletError::PersistenceRead(format!("unknown identity {}", persisted.id))
            })
    }

    fn publish(&self) {
        let snapshot = self.session.clone();
        self.updates.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}
