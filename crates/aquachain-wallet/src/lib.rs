//! AquaChain wallet: the demo session store.
//!
//! Holds the current viewer identity (public, resident or administrator),
//! exposes the role-switching operations, and persists the active identity
//! through an injected [`KeyValueStore`].

pub mod config;
pub mod error;
pub mod identity;
pub mod role;
pub mod session;
pub mod storage;
pub mod store;

pub use config::WalletConfig;
pub use error::{StorageError, WalletError};
pub use identity::{Identity, IdentityRole, Roster};
pub use role::ViewerRole;
pub use session::{Session, SessionState};
pub use storage::{FileStore, KeyValueStore, MemoryStore, CURRENT_USER_KEY, WALLET_CONNECTED_KEY};
pub use store::SessionStore;
