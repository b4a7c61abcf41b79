//! Admin gate controlling the editing mode
//!
//! This is a cosmetic gate for a single local user: the secret lives in the
//! same store as the document and is compared in plaintext. The persisted
//! "authenticated" marker is a plain flag with no expiry.

use thiserror::Error;

use super::storage::{KeyValueStore, StorageError};

/// Storage key of the authenticated flag
pub const ADMIN_FLAG_KEY: &str = "bioAppAdmin";
/// Storage key of the configured secret
pub const ADMIN_SECRET_KEY: &str = "bioAppAdminPass";
/// Secret used when none has been configured
pub const DEFAULT_SECRET: &str = "1234";

/// Notice shown when a password does not match
pub const INCORRECT_PASSWORD_NOTICE: &str = "รหัสผ่านไม่ถูกต้อง";

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("รหัสผ่านไม่ถูกต้อง")]
    IncorrectPassword,
    #[error("รหัสผ่านใหม่ต้องไม่ว่าง")]
    EmptySecret,
    #[error("ต้องเข้าสู่ระบบก่อน")]
    NotAuthenticated,
    #[error("บันทึกรหัสผ่านไม่สำเร็จ: {0}")]
    Storage(#[from] StorageError),
}

/// Observable gate state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminState {
    LoggedOut,
    Viewing,
    Editing,
}

/// Authenticated and editing flags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminGate {
    authenticated: bool,
    editing: bool,
}

impl AdminGate {
    /// Restore the authenticated flag from the store. Editing always starts off.
    pub fn restore(store: &dyn KeyValueStore) -> Self {
        Self {
            authenticated: store.get(ADMIN_FLAG_KEY).as_deref() == Some("true"),
            editing: false,
        }
    }

    pub fn state(&self) -> AdminState {
        match (self.authenticated, self.editing) {
            (false, _) => AdminState::LoggedOut,
            (true, false) => AdminState::Viewing,
            (true, true) => AdminState::Editing,
        }
    }

    /// Whether document writes are currently allowed
    pub fn can_edit(&self) -> bool {
        self.state() == AdminState::Editing
    }

    /// The configured secret, or the default when none was set
    pub fn secret(store: &dyn KeyValueStore) -> String {
        store
            .get(ADMIN_SECRET_KEY)
            .unwrap_or_else(|| DEFAULT_SECRET.to_string())
    }

    /// Log in and switch to editing. A mismatch leaves the gate unchanged.
    pub fn login(&mut self, store: &mut dyn KeyValueStore, password: &str) -> Result<(), AdminError> {
        if password != Self::secret(store) {
            tracing::warn!("Rejected admin login");
            return Err(AdminError::IncorrectPassword);
        }

        self.authenticated = true;
        self.editing = true;
        if let Err(e) = store.set(ADMIN_FLAG_KEY, "true") {
            tracing::warn!("Could not persist admin flag: {}", e);
        }
        tracing::info!("Admin logged in");
        Ok(())
    }

    /// Flip between viewing and editing. No-op when logged out.
    pub fn toggle_editing(&mut self) {
        if self.authenticated {
            self.editing = !self.editing;
        }
    }

    /// Log out and forget the persisted flag
    pub fn logout(&mut self, store: &mut dyn KeyValueStore) {
        self.authenticated = false;
        self.editing = false;
        if let Err(e) = store.remove(ADMIN_FLAG_KEY) {
            tracing::warn!("Could not clear admin flag: {}", e);
        }
        tracing::info!("Admin logged out");
    }

    /// Replace the stored secret
    pub fn change_secret(
        &self,
        store: &mut dyn KeyValueStore,
        current: &str,
        new: &str,
    ) -> Result<(), AdminError> {
        if !self.authenticated {
            return Err(AdminError::NotAuthenticated);
        }
        if current != Self::secret(store) {
            return Err(AdminError::IncorrectPassword);
        }
        if new.is_empty() {
            return Err(AdminError::EmptySecret);
        }

        store.set(ADMIN_SECRET_KEY, new)?;
        tracing::info!("Admin secret changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStore;

    #[test]
    fn test_login_with_default_secret() {
        let mut store = MemoryStore::new();
        let mut gate = AdminGate::restore(&store);
        assert_eq!(gate.state(), AdminState::LoggedOut);

        gate.login(&mut store, DEFAULT_SECRET).unwrap();
        assert_eq!(gate.state(), AdminState::Editing);
        assert!(gate.can_edit());
        assert_eq!(store.get(ADMIN_FLAG_KEY).as_deref(), Some("true"));
    }

    #[test]
    fn test_login_rejects_wrong_password() {
        let mut store = MemoryStore::new();
        store.set(ADMIN_SECRET_KEY, "s3cret").unwrap();
        let mut gate = AdminGate::restore(&store);

        for attempt in ["1234", "", "S3CRET", "s3cret "] {
            let err = gate.login(&mut store, attempt).unwrap_err();
            assert!(matches!(err, AdminError::IncorrectPassword));
            assert_eq!(err.to_string(), INCORRECT_PASSWORD_NOTICE);
            assert_eq!(gate.state(), AdminState::LoggedOut);
        }
        assert_eq!(store.get(ADMIN_FLAG_KEY), None);

        gate.login(&mut store, "s3cret").unwrap();
        assert_eq!(gate.state(), AdminState::Editing);
    }

    #[test]
    fn test_toggle_and_logout() {
        let mut store = MemoryStore::new();
        let mut gate = AdminGate::restore(&store);

        gate.toggle_editing();
        assert_eq!(gate.state(), AdminState::LoggedOut);

        gate.login(&mut store, DEFAULT_SECRET).unwrap();
        gate.toggle_editing();
        assert_eq!(gate.state(), AdminState::Viewing);
        assert!(!gate.can_edit());
        gate.toggle_editing();
        assert_eq!(gate.state(), AdminState::Editing);

        gate.logout(&mut store);
        assert_eq!(gate.state(), AdminState::LoggedOut);
        assert_eq!(store.get(ADMIN_FLAG_KEY), None);
    }

    #[test]
    fn test_restore_starts_viewing() {
        let mut store = MemoryStore::new();
        store.set(ADMIN_FLAG_KEY, "true").unwrap();
        assert_eq!(AdminGate::restore(&store).state(), AdminState::Viewing);

        store.set(ADMIN_FLAG_KEY, "yes").unwrap();
        assert_eq!(AdminGate::restore(&store).state(), AdminState::LoggedOut);
    }

    #[test]
    fn test_login_survives_flag_write_failure() {
        let mut store = MemoryStore::with_quota(0);
        let mut gate = AdminGate::default();
        gate.login(&mut store, DEFAULT_SECRET).unwrap();
        assert_eq!(gate.state(), AdminState::Editing);
    }

    #[test]
    fn test_change_secret() {
        let mut store = MemoryStore::new();
        let mut gate = AdminGate::restore(&store);

        assert!(matches!(
            gate.change_secret(&mut store, DEFAULT_SECRET, "new"),
            Err(AdminError::NotAuthenticated)
        ));

        gate.login(&mut store, DEFAULT_SECRET).unwrap();
        assert!(matches!(
            gate.change_secret(&mut store, "wrong", "new"),
            Err(AdminError::IncorrectPassword)
        ));
        assert!(matches!(
            gate.change_secret(&mut store, DEFAULT_SECRET, ""),
            Err(AdminError::EmptySecret)
        ));

        gate.change_secret(&mut store, DEFAULT_SECRET, "new").unwrap();
        assert_eq!(AdminGate::secret(&store), "new");

        gate.logout(&mut store);
        assert!(gate.login(&mut store, DEFAULT_SECRET).is_err());
        gate.login(&mut store, "new").unwrap();
    }
}
