use crate::db::next_id;
use crate::models::{Appointment, Doctor};

use super::{Ledger, LedgerError};

impl Ledger {
    /// Add a doctor. New doctors start out available.
    pub fn add_doctor(&mut self, name: &str, specialty: &str) -> Result<Doctor, LedgerError> {
        let name = name.trim();
        let specialty = specialty.trim();
        if name.is_empty() {
            return Err(LedgerError::MissingField("Doctor name"));
        }
        if specialty.is_empty() {
            return Err(LedgerError::MissingField("Specialty"));
        }

        let doctor = Doctor {
            id: next_id(self.doctors.iter().map(|d| d.id))?,
            name: name.to_string(),
            specialty: specialty.to_string(),
            available: true,
        };
        self.doctors.push(doctor.clone());
        if let Err(e) = self.save_doctors() {
            self.doctors.pop();
            return Err(e.into());
        }

        tracing::info!(doctor_id = doctor.id, "Doctor added");
        Ok(doctor)
    }

    /// Flip a doctor's availability. Returns the new value, `None` if unknown.
    pub fn toggle_doctor_availability(
        &mut self,
        doctor_id: u64,
    ) -> Result<Option<bool>, LedgerError> {
        let Some(index) = self.doctors.iter().position(|d| d.id == doctor_id) else {
            return Ok(None);
        };
        let available = !self.doctors[index].available;
        self.doctors[index].available = available;
        if let Err(e) = self.save_doctors() {
            self.doctors[index].available = !available;
            return Err(e.into());
        }

        tracing::info!(doctor_id, available, "Doctor availability changed");
        Ok(Some(available))
    }

    /// Delete a doctor and every appointment referencing it, whatever its
    /// status. The cascade runs even when the doctor record is already gone.
    ///
    /// Appointments are written before doctors so a failed write never
    /// leaves stored appointments pointing at a deleted doctor. On failure
    /// both collections are restored.
    ///
    /// Returns whether a doctor record was removed.
    pub fn remove_doctor(&mut self, doctor_id: u64) -> Result<bool, LedgerError> {
        let kept_appointments: Vec<Appointment> = self
            .appointments
            .iter()
            .filter(|a| a.doctor_id != doctor_id)
            .cloned()
            .collect();
        let removed_appointments = self.appointments.len() - kept_appointments.len();

        let kept_doctors: Vec<Doctor> = self
            .doctors
            .iter()
            .filter(|d| d.id != doctor_id)
            .cloned()
            .collect();
        let removed_doctor = kept_doctors.len() != self.doctors.len();

        let previous_appointments = std::mem::replace(&mut self.appointments, kept_appointments);
        if removed_appointments > 0 {
            if let Err(e) = self.save_appointments() {
                self.appointments = previous_appointments;
                return Err(e.into());
            }
        }

        let previous_doctors = std::mem::replace(&mut self.doctors, kept_doctors);
        if let Err(e) = self.save_doctors() {
            self.doctors = previous_doctors;
            self.appointments = previous_appointments;
            if removed_appointments > 0 {
                if let Err(restore) = self.save_appointments() {
                    tracing::error!(doctor_id, error = %restore, "Failed to restore appointments");
                }
            }
            return Err(e.into());
        }

        tracing::info!(
            doctor_id,
            removed_doctor,
            removed_appointments,
            "Doctor removed with appointments"
        );
        Ok(removed_doctor)
    }
}
