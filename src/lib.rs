//! AquaChain umbrella crate.
//!
//! Re-exports the workspace crates so the integration tests (and anyone
//! embedding the dashboard) can depend on a single package.

pub use aquachain_cli as cli;
pub use aquachain_telemetry as telemetry;
pub use aquachain_wallet as wallet;

pub use aquachain_wallet::{Identity, Roster, Session, SessionStore, ViewerRole};
