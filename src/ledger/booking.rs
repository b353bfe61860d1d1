use crate::db::next_id;
use crate::models::{Appointment, AppointmentStatus, BookingRequest, User};

use super::{Ledger, LedgerError};

impl Ledger {
    /// Book a slot for `patient`.
    ///
    /// Fails with `SlotTaken` when an active appointment already holds the
    /// same (doctor, date, time). Cancelled appointments do not block.
    pub fn book(
        &mut self,
        request: BookingRequest,
        patient: &User,
    ) -> Result<Appointment, LedgerError> {
        let doctor = self
            .find_doctor(request.doctor_id)
            .ok_or(LedgerError::DoctorNotFound(request.doctor_id))?;
        if !doctor.available {
            return Err(LedgerError::DoctorUnavailable(doctor.name.clone()));
        }

        let slot = request.slot();
        if self.appointments.iter().any(|a| a.occupies(&slot)) {
            tracing::warn!(
                doctor_id = slot.doctor_id,
                date = %slot.date,
                time = %slot.time,
                "Slot already booked"
            );
            return Err(LedgerError::SlotTaken);
        }

        let appointment = Appointment {
            id: next_id(self.appointments.iter().map(|a| a.id))?,
            doctor_id: request.doctor_id,
            date: request.date,
            time: request.time,
            reason: request.reason,
            status: AppointmentStatus::Booked,
            patient_id: patient.id,
            patient_name: patient.name.clone(),
        };

        self.appointments.push(appointment.clone());
        if let Err(e) = self.save_appointments() {
            self.appointments.pop();
            return Err(e.into());
        }

        tracing::info!(
            appointment_id = appointment.id,
            doctor_id = appointment.doctor_id,
            patient_id = appointment.patient_id,
            "Appointment booked"
        );
        Ok(appointment)
    }

    /// Mark an appointment cancelled. The record is kept.
    ///
    /// Returns `false` only when no appointment has this id; cancelling an
    /// already cancelled appointment succeeds without writing.
    pub fn cancel(&mut self, appointment_id: u64) -> Result<bool, LedgerError> {
        let Some(index) = self.position(appointment_id) else {
            return Ok(false);
        };
        let previous = self.appointments[index].status;
        if previous == AppointmentStatus::Cancelled {
            return Ok(true);
        }

        self.set_status(index, AppointmentStatus::Cancelled)?;
        tracing::info!(appointment_id, from = %previous, "Appointment cancelled");
        Ok(true)
    }

    /// Move a booked appointment to confirmed.
    ///
    /// Role checks belong to the caller. Returns `false` for an unknown id
    /// or a cancelled appointment; an already confirmed one is left as is.
    pub fn confirm(&mut self, appointment_id: u64) -> Result<bool, LedgerError> {
        let Some(index) = self.position(appointment_id) else {
            return Ok(false);
        };
        match self.appointments[index].status {
            AppointmentStatus::Confirmed => Ok(true),
            AppointmentStatus::Cancelled => {
                tracing::warn!(appointment_id, "Refusing to confirm a cancelled appointment");
                Ok(false)
            }
            AppointmentStatus::Booked => {
                self.set_status(index, AppointmentStatus::Confirmed)?;
                tracing::info!(appointment_id, "Appointment confirmed");
                Ok(true)
            }
        }
    }

    fn position(&self, appointment_id: u64) -> Option<usize> {
        self.appointments.iter().position(|a| a.id == appointment_id)
    }

    /// Write a status change, restoring the old status if the store fails.
    fn set_status(&mut self, index: usize, status: AppointmentStatus) -> Result<(), LedgerError> {
        let previous = std::mem::replace(&mut self.appointments[index].status, status);
        if let Err(e) = self.save_appointments() {
            self.appointments[index].status = previous;
            return Err(e.into());
        }
        Ok(())
    }
}
