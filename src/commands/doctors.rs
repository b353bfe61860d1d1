//! Doctor directory commands. Browsing is public; changes are admin-only.

use crate::authorization::Action;
use crate::core_state::CoreState;
use crate::ledger::DoctorView;
use crate::models::Doctor;

use super::{authorized_user, to_message};

const ADMIN_ONLY: &str = "Only admins can manage doctors";

/// All doctors, with booking flags for the current viewer.
pub fn list_doctors(state: &CoreState) -> Result<Vec<DoctorView>, String> {
    let ledger = state.lock_ledger().map_err(to_message)?;
    Ok(ledger.doctor_views(ledger.current_user()))
}

/// Doctors offered in the booking form.
pub fn list_available_doctors(state: &CoreState) -> Result<Vec<Doctor>, String> {
    let ledger = state.lock_ledger().map_err(to_message)?;
    Ok(ledger.available_doctors().cloned().collect())
}

pub fn add_doctor(name: String, specialty: String, state: &CoreState) -> Result<Doctor, String> {
    if name.len() > 200 {
        return Err("Doctor name too long".into());
    }
    if specialty.len() > 200 {
        return Err("Specialty too long".into());
    }

    let mut ledger = state.lock_ledger().map_err(to_message)?;
    authorized_user(&ledger, Action::ManageDoctors, ADMIN_ONLY)?;
    ledger.add_doctor(&name, &specialty).map_err(to_message)
}

/// Returns the doctor's new availability.
pub fn toggle_doctor_availability(doctor_id: u64, state: &CoreState) -> Result<bool, String> {
    let mut ledger = state.lock_ledger().map_err(to_message)?;
    authorized_user(&ledger, Action::ManageDoctors, ADMIN_ONLY)?;
    ledger
        .toggle_doctor_availability(doctor_id)
        .map_err(to_message)?
        .ok_or_else(|| "Doctor not found".to_string())
}

/// Removes the doctor and all of its appointments. Returns whether a doctor
/// record existed.
pub fn remove_doctor(doctor_id: u64, state: &CoreState) -> Result<bool, String> {
    let mut ledger = state.lock_ledger().map_err(to_message)?;
    let admin = authorized_user(&ledger, Action::ManageDoctors, ADMIN_ONLY)?;
    tracing::info!(admin_id = admin.id, doctor_id, "Removing doctor");
    ledger.remove_doctor(doctor_id).map_err(to_message)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn anyone_can_list_doctors() {
        let state = state();
        let doctors = list_doctors(&state).unwrap();
        assert_eq!(doctors.len(), 4);
        assert!(doctors.iter().all(|d| !d.bookable));
    }

    #[test]
    fn patient_sees_bookable_doctors() {
        let state = state();
        login_patient(&state, "hina");
        let doctors = list_doctors(&state).unwrap();
        assert!(doctors.iter().all(|d| d.bookable));
    }

    #[test]
    fn admin_adds_and_toggles_doctor() {
        let state = state();
        login_admin(&state);

        let doctor = add_doctor("Dr. Imran Qureshi".into(), "ENT".into(), &state).unwrap();
        assert_eq!(doctor.id, 5);

        assert!(!toggle_doctor_availability(doctor.id, &state).unwrap());
        let available = list_available_doctors(&state).unwrap();
        assert_eq!(available.len(), 4);
        assert!(available.iter().all(|d| d.id != doctor.id));

        let err = toggle_doctor_availability(99, &state).unwrap_err();
        assert_eq!(err, "Doctor not found");
    }

    #[test]
    fn patient_cannot_manage_doctors() {
        let state = state();
        login_patient(&state, "hina");
        let err = add_doctor("Dr. X".into(), "ENT".into(), &state).unwrap_err();
        assert_eq!(err, ADMIN_ONLY);
        let err = remove_doctor(1, &state).unwrap_err();
        assert_eq!(err, ADMIN_ONLY);
        assert_eq!(list_doctors(&state).unwrap().len(), 4);
    }

    #[test]
    fn empty_doctor_fields_rejected() {
        let state = state();
        login_admin(&state);
        let err = add_doctor(" ".into(), "ENT".into(), &state).unwrap_err();
        assert_eq!(err, "Doctor name is required");
    }

    #[test]
    fn admin_removes_doctor() {
        let state = state();
        login_admin(&state);
        assert!(remove_doctor(1, &state).unwrap());
        assert!(!remove_doctor(1, &state).unwrap());
        assert_eq!(list_doctors(&state).unwrap().len(), 3);
    }
}
