//! Appointment commands.
//!
//! - `book_appointment`: patient books a slot
//! - `cancel_appointment`: patient/doctor on their own upcoming booking, admin on any
//! - `confirm_appointment`: admin only
//! - `list_my_appointments`: upcoming/past split for the logged-in user
//! - `list_all_appointments`: admin overview

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::authorization::Action;
use crate::core_state::{CoreError, CoreState};
use crate::ledger::{AppointmentView, MyAppointments};
use crate::models::{hh_mm, Appointment, AppointmentStatus, BookingRequest};

use super::{authorized_user, to_message, today};

/// Longest accepted visit reason.
const MAX_REASON_CHARS: usize = 500;

/// Booking form as submitted: raw date/time strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingForm {
    pub doctor_id: u64,
    pub date: String, // YYYY-MM-DD
    pub time: String, // HH:MM
    #[serde(default)]
    pub reason: String,
}

/// Validate the form against `today` and build the ledger request.
fn parse_booking(form: BookingForm, today: NaiveDate) -> Result<BookingRequest, String> {
    let date = NaiveDate::parse_from_str(form.date.trim(), "%Y-%m-%d")
        .map_err(|_| "Invalid date format. Use YYYY-MM-DD")?;
    if date < today {
        return Err("Appointment date cannot be in the past".into());
    }
    let time = hh_mm::parse(form.time.trim()).ok_or("Invalid time format. Use HH:MM")?;

    let reason = form.reason.trim();
    if reason.chars().count() > MAX_REASON_CHARS {
        return Err(format!("Reason too long (max {MAX_REASON_CHARS} chars)"));
    }

    Ok(BookingRequest {
        doctor_id: form.doctor_id,
        date,
        time,
        reason: reason.to_string(),
    })
}

/// Books a slot for the logged-in patient.
pub fn book_appointment(form: BookingForm, state: &CoreState) -> Result<Appointment, String> {
    let mut ledger = state.lock_ledger().map_err(to_message)?;
    if ledger.current_user().is_none() {
        return Err("Please login to book an appointment".into());
    }
    let patient = authorized_user(
        &ledger,
        Action::BookAppointment,
        "Only patients can book appointments",
    )?;

    let request = parse_booking(form, today())?;
    ledger.book(request, &patient).map_err(to_message)
}

/// Cancels an appointment. Repeating a cancellation is not an error.
pub fn cancel_appointment(appointment_id: u64, state: &CoreState) -> Result<(), String> {
    let mut ledger = state.lock_ledger().map_err(to_message)?;
    let appt = ledger
        .find_appointment(appointment_id)
        .cloned()
        .ok_or("Appointment not found")?;

    let user = authorized_user(
        &ledger,
        Action::CancelAppointment {
            patient_id: appt.patient_id,
            doctor_id: appt.doctor_id,
        },
        "You cannot cancel this appointment",
    )?;

    if !user.is_admin() {
        let open = appt.status == AppointmentStatus::Booked && appt.date >= today();
        if !open && appt.status != AppointmentStatus::Cancelled {
            return Err("Only upcoming booked appointments can be cancelled".into());
        }
    }

    if ledger.cancel(appointment_id).map_err(to_message)? {
        Ok(())
    } else {
        Err("Appointment not found".into())
    }
}

/// Confirms a booked appointment. Admin only.
pub fn confirm_appointment(appointment_id: u64, state: &CoreState) -> Result<(), String> {
    let mut ledger = state.lock_ledger().map_err(to_message)?;
    authorized_user(
        &ledger,
        Action::ConfirmAppointment,
        "Only admins can confirm appointments",
    )?;

    if ledger.confirm(appointment_id).map_err(to_message)? {
        return Ok(());
    }
    match ledger.find_appointment(appointment_id) {
        Some(_) => Err("Cancelled appointments cannot be confirmed".into()),
        None => Err("Appointment not found".into()),
    }
}

/// Upcoming and past appointments of the logged-in patient or doctor.
pub fn list_my_appointments(state: &CoreState) -> Result<MyAppointments, String> {
    let ledger = state.lock_ledger().map_err(to_message)?;
    let user = ledger
        .current_user()
        .ok_or_else(|| CoreError::NotLoggedIn.to_string())?;
    Ok(ledger.appointments_for(user, today()))
}

/// Every appointment with admin actions. Admin only.
pub fn list_all_appointments(state: &CoreState) -> Result<Vec<AppointmentView>, String> {
    let ledger = state.lock_ledger().map_err(to_message)?;
    authorized_user(
        &ledger,
        Action::ViewAllAppointments,
        "Only admins can view all appointments",
    )?;
    Ok(ledger.all_appointments())
}
