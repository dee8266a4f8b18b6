use std::sync::Arc;

use crate::identity::Identity;
use crate::role::ViewerRole;

/// Coarse state of the session state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Public,
    Connected(Arc<Identity>),
}

/// Mutable core state: who is connected and with what cosmetic balance.
///
/// The active identity is a shared handle into the roster; the session never
/// edits it.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    connected: bool,
    active_identity: Option<Arc<Identity>>,
    balance: f64,
}

impl Session {
    pub fn public() -> Self {
        Self {
            connected: false,
            active_identity: None,
            balance: 0.0,
        }
    }

    pub fn connected_as(identity: Arc<Identity>, balance: f64) -> Self {
        Self {
            connected: true,
            active_identity: Some(identity),
            balance,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn active_identity(&self) -> Option<&Arc<Identity>> {
        self.active_identity.as_ref()
    }

    pub fn viewer_role(&self) -> ViewerRole {
        ViewerRole::derive(self.connected, self.active_identity.as_deref())
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn state(&self) -> SessionState {
        match (&self.active_identity, self.connected) {
            (Some(identity), true) => SessionState::Connected(Arc::clone(identity)),
            _ => SessionState::Public,
        }
    }

    /// Drops the identity but keeps the last balance, matching what the
    /// "continue as public viewer" action does.
    pub(crate) fn clear_identity(&mut self) {
        self.connected = false;
        self.active_identity = None;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::public();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::public()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Roster;

    #[test]
    fn test_default_is_public() {
        let session = Session::default();
        assert!(!session.is_connected());
        assert_eq!(session.viewer_role(), ViewerRole::Public);
        assert_eq!(session.state(), SessionState::Public);
        assert_eq!(session.balance(), 0.0);
    }

    #[test]
    fn test_connected_shares_roster_record() {
        let roster = Roster::builtin();
        let admin = Arc::clone(roster.admin());
        let session = Session::connected_as(Arc::clone(&admin), 4.2);

        assert_eq!(session.viewer_role(), ViewerRole::Admin);
        let active = session.active_identity().unwrap();
        assert!(Arc::ptr_eq(active, &admin));
        assert_eq!(session.state(), SessionState::Connected(admin));
    }

    #[test]
    fn test_clear_identity_keeps_balance() {
        let roster = Roster::builtin();
        let mut session = Session::connected_as(Arc::clone(roster.admin()), 7.5);
        session.clear_identity();
        assert_eq!(session.viewer_role(), ViewerRole::Public);
        assert_eq!(session.balance(), 7.5);
        session.reset();
        assert_eq!(session, Session::public());
    }
}
