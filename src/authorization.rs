//! Role-based access checks for clinic operations.
//!
//! The ledger itself never checks roles; callers ask here first.
//! Rules, checked in order:
//! 1. Browsing doctors → allowed for everyone, logged in or not
//! 2. No logged-in user → DENY
//! 3. Admin → confirm, cancel any, manage doctors, list all
//! 4. Patient → book; cancel and list own appointments
//! 5. Doctor account → list and cancel appointments on its own schedule
//! 6. Default → DENY

use crate::models::{User, UserType};

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Something a user attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    BrowseDoctors,
    BookAppointment,
    ViewOwnAppointments,
    /// Cancel an appointment owned by `patient_id` with doctor `doctor_id`.
    CancelAppointment { patient_id: u64, doctor_id: u64 },
    ConfirmAppointment,
    ViewAllAppointments,
    ManageDoctors,
}

/// Why access was granted (or denied), for the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessReason {
    Public,
    Admin,
    Patient,
    OwnAppointment,
    OwnSchedule,
    NotLoggedIn,
    Denied,
}

/// Result of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: AccessReason,
}

impl AccessDecision {
    fn allow(reason: AccessReason) -> Self {
        Self {
            allowed: true,
            reason,
        }
    }

    fn deny(reason: AccessReason) -> Self {
        Self {
            allowed: false,
            reason,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Authorization check
// ═══════════════════════════════════════════════════════════

/// Decide whether `user` (None = nobody logged in) may perform `action`.
pub fn check_access(user: Option<&User>, action: Action) -> AccessDecision {
    if action == Action::BrowseDoctors {
        return AccessDecision::allow(AccessReason::Public);
    }

    let Some(user) = user else {
        return AccessDecision::deny(AccessReason::NotLoggedIn);
    };

    let decision = match (user.user_type, action) {
        (
            UserType::Admin,
            Action::ConfirmAppointment
            | Action::CancelAppointment { .. }
            | Action::ManageDoctors
            | Action::ViewAllAppointments,
        ) => AccessDecision::allow(AccessReason::Admin),

        (UserType::Patient, Action::BookAppointment | Action::ViewOwnAppointments) => {
            AccessDecision::allow(AccessReason::Patient)
        }
        (UserType::Patient, Action::CancelAppointment { patient_id, .. })
            if patient_id == user.id =>
        {
            AccessDecision::allow(AccessReason::OwnAppointment)
        }

        (UserType::Doctor, Action::ViewOwnAppointments) => {
            AccessDecision::allow(AccessReason::OwnSchedule)
        }
        (UserType::Doctor, Action::CancelAppointment { doctor_id, .. })
            if doctor_id == user.id =>
        {
            AccessDecision::allow(AccessReason::OwnSchedule)
        }

        _ => AccessDecision::deny(AccessReason::Denied),
    };

    if !decision.allowed {
        tracing::debug!(
            user_id = user.id,
            ?action,
            reason = ?decision.reason,
            "Access denied"
        );
    }
    decision
}
