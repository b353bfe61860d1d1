use crate::db::next_id;
use crate::models::{NewUser, User};

use super::{Ledger, LedgerError};

impl Ledger {
    /// Create an account. Username is checked before email, so a form that
    /// repeats both reports the username.
    pub fn register(&mut self, new_user: NewUser) -> Result<User, LedgerError> {
        if self.users.iter().any(|u| u.username == new_user.username) {
            return Err(LedgerError::DuplicateUsername);
        }
        if self
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&new_user.email))
        {
            return Err(LedgerError::DuplicateEmail);
        }

        let user = User {
            id: next_id(self.users.iter().map(|u| u.id))?,
            name: new_user.name,
            email: new_user.email,
            username: new_user.username,
            password: new_user.password,
            user_type: new_user.user_type,
        };
        self.users.push(user.clone());
        if let Err(e) = self.save_users() {
            self.users.pop();
            return Err(e.into());
        }

        tracing::info!(user_id = user.id, user_type = %user.user_type, "User registered");
        Ok(user)
    }

    /// Start a session. Both fields must match exactly.
    pub fn login(&mut self, username: &str, password: &str) -> Result<User, LedgerError> {
        let user = self
            .users
            .iter()
            .find(|u| u.username == username && u.password == password)
            .cloned()
            .ok_or_else(|| {
                tracing::warn!(username, "Failed login");
                LedgerError::InvalidCredentials
            })?;

        let previous = self.current_user.replace(user.clone());
        if let Err(e) = self.save_current_user() {
            self.current_user = previous;
            return Err(e.into());
        }

        tracing::info!(user_id = user.id, "Logged in");
        Ok(user)
    }

    /// End the session and forget it in the store.
    pub fn logout(&mut self) -> Result<(), LedgerError> {
        if let Some(user) = self.current_user.take() {
            tracing::info!(user_id = user.id, "Logged out");
        }
        self.save_current_user()?;
        Ok(())
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }
}
