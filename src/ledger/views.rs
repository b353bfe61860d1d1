use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::{hh_mm, Appointment, AppointmentStatus, Doctor, User, UserType};

use super::Ledger;

/// Shown when an appointment outlives its doctor record.
pub const UNKNOWN_DOCTOR: &str = "Unknown Doctor";

// ─── Types ────────────────────────────────────────────────────────────────────

/// Account info safe to hand to the UI (no password).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub username: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            user_type: user.user_type,
        }
    }
}

/// Doctor card. `bookable` is set when the viewer is a patient and the
/// doctor takes bookings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorView {
    pub id: u64,
    pub name: String,
    pub specialty: String,
    pub available: bool,
    pub bookable: bool,
}

/// Appointment row with the doctor name resolved and the actions the
/// current viewer may take on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentView {
    pub id: u64,
    pub doctor_id: u64,
    pub doctor_name: String,
    pub patient_id: u64,
    pub patient_name: String,
    pub date: NaiveDate,
    #[serde(with = "hh_mm")]
    pub time: NaiveTime,
    pub reason: String,
    pub status: AppointmentStatus,
    pub can_cancel: bool,
    pub can_confirm: bool,
}

/// A user's own appointments split around today.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MyAppointments {
    /// Today and later, soonest first.
    pub upcoming: Vec<AppointmentView>,
    /// Before today, most recent first.
    pub past: Vec<AppointmentView>,
}

// ─── Queries ──────────────────────────────────────────────────────────────────

impl Ledger {
    /// Doctor cards for `viewer` (or an anonymous visitor).
    pub fn doctor_views(&self, viewer: Option<&User>) -> Vec<DoctorView> {
        let is_patient = viewer.is_some_and(|u| u.user_type == UserType::Patient);
        self.doctors
            .iter()
            .map(|d| DoctorView {
                id: d.id,
                name: d.name.clone(),
                specialty: d.specialty.clone(),
                available: d.available,
                bookable: is_patient && d.available,
            })
            .collect()
    }

    /// Appointments belonging to `user`: a patient sees the ones they
    /// booked, a doctor account sees the ones whose doctor id equals its
    /// user id. Admins get nothing here; they use `all_appointments`.
    ///
    /// Only booked appointments that are not in the past can be cancelled.
    pub fn appointments_for(&self, user: &User, today: NaiveDate) -> MyAppointments {
        let mut mine = MyAppointments::default();

        for appt in self.appointments.iter().filter(|a| match user.user_type {
            UserType::Patient => a.patient_id == user.id,
            UserType::Doctor => a.doctor_id == user.id,
            UserType::Admin => false,
        }) {
            let is_past = appt.date < today;
            let can_cancel = !is_past && appt.status == AppointmentStatus::Booked;
            let view = self.view(appt, can_cancel, false);
            if is_past {
                mine.past.push(view);
            } else {
                mine.upcoming.push(view);
            }
        }

        mine.upcoming.sort_by_key(|v| (v.date, v.time));
        mine.past.sort_by_key(|v| std::cmp::Reverse((v.date, v.time)));
        mine
    }

    /// Every appointment in booking order, with admin actions: confirm a
    /// booked one, cancel anything not yet cancelled.
    pub fn all_appointments(&self) -> Vec<AppointmentView> {
        self.appointments
            .iter()
            .map(|a| {
                self.view(
                    a,
                    a.status.is_active(),
                    a.status == AppointmentStatus::Booked,
                )
            })
            .collect()
    }

    fn doctor_name(&self, doctor_id: u64) -> String {
        self.find_doctor(doctor_id)
            .map(|d: &Doctor| d.name.clone())
            .unwrap_or_else(|| UNKNOWN_DOCTOR.to_string())
    }

    fn view(&self, appt: &Appointment, can_cancel: bool, can_confirm: bool) -> AppointmentView {
        AppointmentView {
            id: appt.id,
            doctor_id: appt.doctor_id,
            doctor_name: self.doctor_name(appt.doctor_id),
            patient_id: appt.patient_id,
            patient_name: appt.patient_name.clone(),
            date: appt.date,
            time: appt.time,
            reason: appt.reason.clone(),
            status: appt.status,
            can_cancel,
            can_confirm,
        }
    }
}
