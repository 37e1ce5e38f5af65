//! Demo sign-in against a fixed account list.
//!
//! The signed-in user is kept in the key-value store so it survives a
//! restart. There is no hashing, token or expiry here.

use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::storage::{KeyValueStore, StorageError, CURRENT_USER_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    FacilityManager,
    Teacher,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Admin => "admin",
            Role::FacilityManager => "facility_manager",
            Role::Teacher => "teacher",
        })
    }
}

/// Signed-in user as persisted and returned to callers. Never carries the
/// password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: u32,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub avatar: String,
}

struct Account {
    user: User,
    password: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

fn account(id: u32, email: &str, password: &'static str, name: &str, role: Role, avatar: &str) -> Account {
    Account {
        user: User {
            id,
            email: email.to_owned(),
            name: name.to_owned(),
            role,
            avatar: avatar.to_owned(),
        },
        password,
    }
}

fn demo_accounts() -> Vec<Account> {
    vec![
        account(1, "admin@comfortcheck.com", "admin123", "John Smith", Role::Admin, "👨‍💼"),
        account(
            2,
            "manager@comfortcheck.com",
            "manager123",
            "Sarah Johnson",
            Role::FacilityManager,
            "👩‍🔧",
        ),
        account(3, "teacher@comfortcheck.com", "teacher123", "Mike Wilson", Role::Teacher, "👨‍🏫"),
    ]
}

#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    accounts: Arc<Vec<Account>>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            accounts: Arc::new(demo_accounts()),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let Some(account) = self
            .accounts
            .iter()
            .find(|a| a.user.email == email && a.password == password)
        else {
            warn!(email = %email, "Login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        let user = account.user.clone();
        let value = serde_json::to_value(&user).map_err(|source| StorageError::Encode {
            key: CURRENT_USER_KEY.to_owned(),
            source,
        })?;
        self.store.set(CURRENT_USER_KEY, value).await?;

        info!(user_id = user.id, role = %user.role, "User signed in");
        Ok(user)
    }

    pub async fn logout(&self) -> Result<(), AuthError> {
        self.store.remove(CURRENT_USER_KEY).await?;
        info!("User signed out");
        Ok(())
    }

    /// The persisted user, if any. A record that no longer decodes counts as
    /// signed out.
    pub async fn current_user(&self) -> Option<User> {
        match self.store.get(CURRENT_USER_KEY).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!(error = %e, "Stored user record is unreadable; treating as signed out");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to read stored user");
                None
            }
        }
    }

    pub async fn has_role(&self, role: Role) -> bool {
        self.current_user().await.is_some_and(|u| u.role == role)
    }
}
