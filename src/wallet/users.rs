use std::sync::Arc;

use crate::common_utils::get_current_timestamp_ms;
use crate::models::{validate_user_id, Role, User, WalletError};
use crate::store::{abort, Collection, DocStore};

/// User directory: profile records and the admin role check
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<DocStore>,
}

impl UserDirectory {
    pub fn new(store: Arc<DocStore>) -> Self {
        Self { store }
    }

    pub fn get_user(&self, user_id: &str) -> Result<Option<User>, WalletError> {
        validate_user_id(user_id)?;
        self.store.get(Collection::Users, user_id)
    }

    /// Return the user, creating it with balance 0 if absent.
    /// A known email is filled in on an existing record that has none.
    pub fn ensure_user(&self, user_id: &str, email: Option<&str>) -> Result<User, WalletError> {
        validate_user_id(user_id)?;
        let now = get_current_timestamp_ms();
        self.store.with_transaction(&[Collection::Users], |tx| {
            let mut user = match tx.get::<User>(Collection::Users, user_id)? {
                Some(user) if user.email.is_some() || email.is_none() => return Ok(user),
                Some(user) => user,
                None => User::new(user_id, None, now),
            };
            user.email = email.map(str::to_string);
            tx.put(Collection::Users, user_id, &user)?;
            Ok(user)
        })
    }

    /// All users, newest first
    pub fn list_users(&self) -> Result<Vec<User>, WalletError> {
        let mut users: Vec<User> = self.store.scan(Collection::Users)?;
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    pub fn update_role(&self, user_id: &str, role: Role) -> Result<User, WalletError> {
        validate_user_id(user_id)?;
        let user = self.store.with_transaction(&[Collection::Users], |tx| {
            let mut user = match tx.get::<User>(Collection::Users, user_id)? {
                Some(user) => user,
                None => return abort(WalletError::NotFound(format!("user {}", user_id))),
            };
            user.role = role;
            tx.put(Collection::Users, user_id, &user)?;
            Ok(user)
        })?;
        log::info!("user {} role set to {}", user_id, role);
        Ok(user)
    }

    /// Fails with `PermissionDenied` unless the caller holds the admin role
    pub fn require_admin(&self, user_id: &str) -> Result<User, WalletError> {
        match self.get_user(user_id)? {
            Some(user) if user.is_admin() => Ok(user),
            _ => Err(WalletError::PermissionDenied(format!("{} is not an admin", user_id))),
        }
    }
}
