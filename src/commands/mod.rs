//! UI-facing commands.
//!
//! Each command takes its form input plus `&CoreState` and returns
//! `Result<T, String>`; the error string is the alert shown to the user.

pub mod appointment;
pub mod auth;
pub mod doctors;

use chrono::{Local, NaiveDate};

use crate::authorization::{self, Action};
use crate::core_state::CoreError;
use crate::ledger::{Ledger, LedgerError};
use crate::models::User;

/// Local calendar date used for past/upcoming decisions.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Turn any state or ledger error into the user-facing message.
/// Storage failures are logged; the user only sees a short notice.
pub(crate) fn to_message<E: Into<CoreError>>(e: E) -> String {
    let e = e.into();
    if let CoreError::Ledger(LedgerError::Store(inner)) = &e {
        tracing::error!(error = %inner, "Storage failure");
    }
    e.to_string()
}

/// Logged-in user allowed to perform `action`, or the given message.
pub(crate) fn authorized_user(
    ledger: &Ledger,
    action: Action,
    denied: &str,
) -> Result<User, String> {
    let user = ledger.current_user().cloned();
    let decision = authorization::check_access(user.as_ref(), action);
    match user {
        Some(user) if decision.allowed => Ok(user),
        Some(_) => Err(denied.to_string()),
        None => Err(CoreError::NotLoggedIn.to_string()),
    }
}
