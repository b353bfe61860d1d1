//! Account commands: register, login, logout, session lookup.

use serde::{Deserialize, Serialize};

use crate::core_state::CoreState;
use crate::ledger::UserInfo;
use crate::models::{NewUser, UserType};

use super::to_message;

/// Longest accepted name or username.
const MAX_NAME_CHARS: usize = 100;

/// Registration form as submitted. `user_type` is the raw select value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(rename = "type")]
    pub user_type: String,
}

/// Creates a patient or doctor account. Admin accounts cannot be registered.
pub fn register(form: RegistrationForm, state: &CoreState) -> Result<UserInfo, String> {
    let name = form.name.trim();
    let email = form.email.trim();
    let username = form.username.trim();

    if name.is_empty() {
        return Err("Name is required".into());
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(format!("Name too long (max {MAX_NAME_CHARS} chars)"));
    }
    if email.is_empty() {
        return Err("Email is required".into());
    }
    if !email.contains('@') || email.len() > 254 {
        return Err("Invalid email address".into());
    }
    if username.is_empty() {
        return Err("Username is required".into());
    }
    if username.chars().count() > MAX_NAME_CHARS {
        return Err(format!("Username too long (max {MAX_NAME_CHARS} chars)"));
    }
    if form.password.is_empty() {
        return Err("Password is required".into());
    }

    let user_type = match form.user_type.parse::<UserType>() {
        Ok(t @ (UserType::Patient | UserType::Doctor)) => t,
        _ => return Err(format!("Invalid account type: {}", form.user_type)),
    };

    let mut ledger = state.lock_ledger().map_err(to_message)?;
    let user = ledger
        .register(NewUser {
            name: name.to_string(),
            email: email.to_string(),
            username: username.to_string(),
            password: form.password,
            user_type,
        })
        .map_err(to_message)?;

    Ok(UserInfo::from(&user))
}

/// Starts a session for matching credentials.
pub fn login(username: String, password: String, state: &CoreState) -> Result<UserInfo, String> {
    let mut ledger = state.lock_ledger().map_err(to_message)?;
    let user = ledger.login(&username, &password).map_err(to_message)?;
    Ok(UserInfo::from(&user))
}

/// Ends the current session, if any.
pub fn logout(state: &CoreState) -> Result<(), String> {
    let mut ledger = state.lock_ledger().map_err(to_message)?;
    ledger.logout().map_err(to_message)
}

/// The logged-in account, restored across restarts.
pub fn current_user(state: &CoreState) -> Result<Option<UserInfo>, String> {
    let user = state.current_user().map_err(to_message)?;
    Ok(user.as_ref().map(UserInfo::from))
}
