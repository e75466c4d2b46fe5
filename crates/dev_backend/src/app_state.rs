use std::{collections::HashMap, sync::Arc};

use sha2::{Digest, Sha256};
use shared::{domain::UserId, protocol::InputRequest};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub(crate) struct Account {
    pub(crate) user_id: UserId,
    pub(crate) email: String,
    /// `None` for guest accounts.
    password_sha256: Option<Vec<u8>>,
}

impl Account {
    pub(crate) fn is_guest(&self) -> bool {
        self.password_sha256.is_none()
    }

    pub(crate) fn password_matches(&self, password: &str) -> bool {
        self.password_sha256.as_deref() == Some(hash_password(password).as_slice())
    }
}

#[derive(Debug, Default)]
pub(crate) struct Store {
    accounts_by_email: HashMap<String, Account>,
    emails_by_user: HashMap<UserId, String>,
    baselines: HashMap<UserId, InputRequest>,
}

impl Store {
    pub(crate) fn account(&self, email: &str) -> Option<&Account> {
        self.accounts_by_email.get(&normalize_email(email))
    }

    pub(crate) fn has_user(&self, user_id: &UserId) -> bool {
        self.emails_by_user.contains_key(user_id)
    }

    pub(crate) fn create_account(&mut self, email: &str, password: Option<&str>) -> Account {
        let account = Account {
            user_id: UserId::new(Uuid::new_v4().simple().to_string()),
            email: email.trim().to_string(),
            password_sha256: password.map(hash_password),
        };
        self.emails_by_user
            .insert(account.user_id.clone(), account.email.clone());
        self.accounts_by_email
            .insert(normalize_email(email), account.clone());
        account
    }

    pub(crate) fn store_baseline(&mut self, input: InputRequest) {
        self.baselines.insert(input.user_id.clone(), input);
    }

    pub(crate) fn baseline(&self, user_id: &UserId) -> Option<&InputRequest> {
        self.baselines.get(user_id)
    }
}

#[derive(Clone, Default)]
pub(crate) struct AppState {
    pub(crate) store: Arc<RwLock<Store>>,
}

fn hash_password(password: &str) -> Vec<u8> {
    Sha256::digest(password.as_bytes()).to_vec()
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
