use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserError {
    #[error("user {username:?} already exists")]
    Duplicate { username: String },

    #[error("username and password must be non-empty")]
    EmptyCredentials,
}

/// Credential storage behind the registration/login endpoints. Injected
/// through router state so the process holds no globals; implementations
/// own their lifecycle (seed at startup, query per request).
///
/// Passwords are stored and compared as given. Hardening the scheme is
/// explicitly out of scope for this dashboard.
pub trait UserRepository: Send + Sync {
    fn register(&self, username: &str, password: &str) -> Result<(), UserError>;
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// In-memory repository; contents last for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<String, String>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(users: &[(&str, &str)]) -> Self {
        let store = Self::new();
        let mut guard = store.users.lock().expect("user store lock");
        for (username, password) in users {
            guard.insert(username.to_string(), password.to_string());
        }
        drop(guard);
        store
    }
}

impl UserRepository for MemoryUserStore {
    fn register(&self, username: &str, password: &str) -> Result<(), UserError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(UserError::EmptyCredentials);
        }
        let mut users = self.users.lock().expect("user store lock");
        if users.contains_key(username) {
            return Err(UserError::Duplicate {
                username: username.to_string(),
            });
        }
        users.insert(username.to_string(), password.to_string());
        Ok(())
    }

    fn verify(&self, username: &str, password: &str) -> bool {
        let users = self.users.lock().expect("user store lock");
        users.get(username.trim()).is_some_and(|p| p == password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_then_verify() {
        let store = MemoryUserStore::new();
        store.register("alice", "hunter2").expect("must register");
        assert!(store.verify("alice", "hunter2"));
        assert!(!store.verify("alice", "wrong"));
        assert!(!store.verify("bob", "hunter2"));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let store = MemoryUserStore::new();
        store.register("alice", "hunter2").expect("must register");
        let err = store.register("alice", "other").expect_err("must reject");
        assert_eq!(
            err,
            UserError::Duplicate {
                username: "alice".to_string(),
            }
        );
    }

    #[test]
    fn empty_credentials_are_rejected() {
        let store = MemoryUserStore::new();
        assert_eq!(
            store.register("  ", "pw").expect_err("must reject"),
            UserError::EmptyCredentials
        );
        assert_eq!(
            store.register("alice", "").expect_err("must reject"),
            UserError::EmptyCredentials
        );
    }

    #[test]
    fn seeded_store_verifies_seed_users() {
        let store = MemoryUserStore::seeded(&[("admin", "changeme")]);
        assert!(store.verify("admin", "changeme"));
    }
}
