use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::logger;

/// Hands the Sheets source a bearer token per call. Returns `AuthRequired`
/// when there is nothing to hand out; the shell then runs the account
/// picker and retries the failed request once.
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> Result<String, SourceError>;
}

/// One configured account: a display name and its OAuth bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub name: String,
    pub token: String,
}

/// The configured accounts plus which one is active. No account is active
/// until the picker has run, so the first fetch bounces with `AuthRequired`
/// exactly like the cold-start flow it mirrors.
pub struct AccountStore {
    accounts: Vec<Account>,
    active: RwLock<Option<usize>>,
}

impl AccountStore {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self {
            accounts,
            active: RwLock::new(None),
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.accounts.iter().map(|a| a.name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// The account-picker result: parameterizes every grid operation that
    /// follows.
    pub fn select(&self, index: usize) {
        if index < self.accounts.len() {
            *self.active.write().unwrap() = Some(index);
            logger::log(&format!("auth: selected account {}", self.accounts[index].name));
        }
    }

    pub fn active_name(&self) -> Option<String> {
        let active = self.active.read().unwrap();
        active.map(|i| self.accounts[i].name.clone())
    }
}

impl TokenProvider for AccountStore {
    fn token(&self) -> Result<String, SourceError> {
        let active = self.active.read().unwrap();
        match *active {
            Some(i) => Ok(self.accounts[i].token.clone()),
            None => Err(SourceError::AuthRequired),
        }
    }
}

/// Fixed token, for sources that do not go through the picker (tests, or a
/// token minted outside the app).
pub struct StaticToken(pub String);

impl TokenProvider for StaticToken {
    fn token(&self) -> Result<String, SourceError> {
        Ok(self.0.clone())
    }
}
