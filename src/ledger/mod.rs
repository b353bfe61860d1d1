//! Appointment ledger: users, doctors and appointments held in memory and
//! written back to the key-value store on every mutation.
//!
//! Each collection is a flat JSON array under its own key (`users`,
//! `doctors`, `appointments`); the logged-in user sits under `currentUser`.
//! Booking enforces one active appointment per (doctor, date, time) slot.
//! Cancellation is a terminal soft delete. Removing a doctor cascades to
//! every appointment that references it.

mod accounts;
mod booking;
mod doctors;
mod views;

pub use views::*;

use thiserror::Error;

use crate::config::{
    KEY_APPOINTMENTS, KEY_CURRENT_USER, KEY_DOCTORS, KEY_USERS, SEED_ADMIN_EMAIL,
    SEED_ADMIN_NAME, SEED_ADMIN_PASSWORD, SEED_ADMIN_USERNAME, SEED_DOCTORS,
};
use crate::db::{
    load_collection, load_record, next_id, save_collection, save_record, KeyValueStore,
    StoreError,
};
use crate::models::{Appointment, Doctor, User, UserType};

/// Ledger failures. `Display` is the message shown to the user.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Username already exists")]
    DuplicateUsername,
    #[error("Email already registered")]
    DuplicateEmail,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("This time slot is already booked. Please choose another.")]
    SlotTaken,
    #[error("Doctor not found")]
    DoctorNotFound(u64),
    #[error("{0} is not available for booking")]
    DoctorUnavailable(String),
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

pub struct Ledger {
    store: Box<dyn KeyValueStore>,
    users: Vec<User>,
    doctors: Vec<Doctor>,
    appointments: Vec<Appointment>,
    current_user: Option<User>,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("users", &self.users.len())
            .field("doctors", &self.doctors.len())
            .field("appointments", &self.appointments.len())
            .field("current_user", &self.current_user.as_ref().map(|u| u.id))
            .finish()
    }
}

impl Ledger {
    /// Load all collections from `store`, writing seed data on first launch.
    ///
    /// - `doctors` absent → the default doctors are written.
    /// - no user named `admin` → the default admin account is appended.
    /// - `currentUser` is restored only if that user still exists.
    pub fn load(store: Box<dyn KeyValueStore>) -> Result<Self, LedgerError> {
        let users: Vec<User> = load_collection(&*store, KEY_USERS)?.unwrap_or_default();
        let appointments: Vec<Appointment> =
            load_collection(&*store, KEY_APPOINTMENTS)?.unwrap_or_default();
        let doctors: Option<Vec<Doctor>> = load_collection(&*store, KEY_DOCTORS)?;
        let saved_user: Option<User> = load_record(&*store, KEY_CURRENT_USER)?;

        let needs_doctor_seed = doctors.is_none();
        let mut ledger = Self {
            store,
            users,
            doctors: doctors.unwrap_or_default(),
            appointments,
            current_user: None,
        };

        if needs_doctor_seed {
            ledger.seed_doctors()?;
        }
        if !ledger.users.iter().any(|u| u.username == SEED_ADMIN_USERNAME) {
            ledger.seed_admin()?;
        }
        ledger.restore_session(saved_user)?;

        tracing::debug!(
            users = ledger.users.len(),
            doctors = ledger.doctors.len(),
            appointments = ledger.appointments.len(),
            "Ledger loaded"
        );
        Ok(ledger)
    }

    fn seed_doctors(&mut self) -> Result<(), StoreError> {
        self.doctors = SEED_DOCTORS
            .iter()
            .zip(1u64..)
            .map(|(&(name, specialty), id)| Doctor {
                id,
                name: name.to_string(),
                specialty: specialty.to_string(),
                available: true,
            })
            .collect();
        self.save_doctors()?;
        tracing::info!(count = self.doctors.len(), "Seeded default doctors");
        Ok(())
    }

    fn seed_admin(&mut self) -> Result<(), StoreError> {
        let admin = User {
            id: next_id(self.users.iter().map(|u| u.id))?,
            name: SEED_ADMIN_NAME.to_string(),
            email: SEED_ADMIN_EMAIL.to_string(),
            username: SEED_ADMIN_USERNAME.to_string(),
            password: SEED_ADMIN_PASSWORD.to_string(),
            user_type: UserType::Admin,
        };
        self.users.push(admin);
        self.save_users()?;
        tracing::info!("Seeded default admin account");
        Ok(())
    }

    fn restore_session(&mut self, saved: Option<User>) -> Result<(), StoreError> {
        let Some(saved) = saved else {
            return Ok(());
        };
        match self.users.iter().find(|u| u.id == saved.id) {
            Some(user) => {
                self.current_user = Some(user.clone());
            }
            None => {
                tracing::warn!(user_id = saved.id, "Stored session refers to unknown user, clearing");
                self.store.remove(KEY_CURRENT_USER)?;
            }
        }
        Ok(())
    }

    // ── Read access ──────────────────────────────────────────

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn doctors(&self) -> &[Doctor] {
        &self.doctors
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn find_user(&self, id: u64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn find_doctor(&self, id: u64) -> Option<&Doctor> {
        self.doctors.iter().find(|d| d.id == id)
    }

    pub fn find_appointment(&self, id: u64) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id == id)
    }

    /// Doctors offered in the booking form.
    pub fn available_doctors(&self) -> impl Iterator<Item = &Doctor> {
        self.doctors.iter().filter(|d| d.available)
    }

    // ── Persistence ──────────────────────────────────────────

    fn save_users(&self) -> Result<(), StoreError> {
        save_collection(&*self.store, KEY_USERS, &self.users)
    }

    fn save_doctors(&self) -> Result<(), StoreError> {
        save_collection(&*self.store, KEY_DOCTORS, &self.doctors)
    }

    fn save_appointments(&self) -> Result<(), StoreError> {
        save_collection(&*self.store, KEY_APPOINTMENTS, &self.appointments)
    }

    fn save_current_user(&self) -> Result<(), StoreError> {
        match &self.current_user {
            Some(user) => save_record(&*self.store, KEY_CURRENT_USER, user),
            None => self.store.remove(KEY_CURRENT_USER),
        }
    }
}


#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::test_support::*;
    use super::*;
    use crate::db::{MemoryStore, SqliteStore};
    use crate::models::AppointmentStatus;

    /// Store handle that survives the ledger so tests can inspect raw keys.
    #[derive(Clone, Default)]
    struct SharedStore(Arc<MemoryStore>);

    impl KeyValueStore for SharedStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.0.get(key)
        }
        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            self.0.set(key, value)
        }
        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.0.remove(key)
        }
    }

    /// Shared store whose writes to the listed keys fail.
    #[derive(Clone, Default)]
    struct FailingStore {
        inner: SharedStore,
        failing: Arc<Mutex<Vec<&'static str>>>,
    }

    impl FailingStore {
        fn fail_writes_to(&self, key: &'static str) {
            self.failing.lock().unwrap().push(key);
        }

        fn heal(&self) {
            self.failing.lock().unwrap().clear();
        }

        fn check(&self, key: &str) -> Result<(), StoreError> {
            if self.failing.lock().unwrap().iter().any(|k| *k == key) {
                return Err(StoreError::Io(std::io::Error::other("disk full")));
            }
            Ok(())
        }
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }
        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            self.check(key)?;
            self.inner.set(key, value)
        }
        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.check(key)?;
            self.inner.remove(key)
        }
    }

    fn failing_ledger() -> (Ledger, FailingStore) {
        let store = FailingStore::default();
        let ledger = Ledger::load(Box::new(store.clone())).unwrap();
        (ledger, store)
    }

    fn reload(store: &FailingStore) -> Ledger {
        store.heal();
        Ledger::load(Box::new(store.clone())).unwrap()
    }

    #[test]
    fn fresh_store_is_seeded() {
        let ledger = memory_ledger();
        assert_eq!(ledger.doctors().len(), 4);
        assert_eq!(ledger.doctors()[0].name, "Dr. Ayesha Khan");
        assert!(ledger.doctors().iter().all(|d| d.available));

        assert_eq!(ledger.users().len(), 1);
        let admin = &ledger.users()[0];
        assert_eq!(admin.id, 1);
        assert_eq!(admin.username, "admin");
        assert_eq!(admin.password, "1234");
        assert!(admin.is_admin());
        assert!(ledger.appointments().is_empty());
    }

    #[test]
    fn seeds_written_to_store() {
        let store = SharedStore::default();
        Ledger::load(Box::new(store.clone())).unwrap();

        let doctors = store.get(KEY_DOCTORS).unwrap().unwrap();
        assert!(doctors.contains("Dr. Omar Farooq"));
        let users = store.get(KEY_USERS).unwrap().unwrap();
        assert!(users.contains("\"type\":\"admin\""));
    }

    #[test]
    fn empty_doctor_list_is_not_reseeded() {
        let store = SharedStore::default();
        store.set(KEY_DOCTORS, "[]").unwrap();
        let ledger = Ledger::load(Box::new(store)).unwrap();
        assert!(ledger.doctors().is_empty());
    }

    #[test]
    fn admin_seeded_once() {
        let store = SharedStore::default();
        Ledger::load(Box::new(store.clone())).unwrap();
        let ledger = Ledger::load(Box::new(store)).unwrap();
        let admins = ledger.users().iter().filter(|u| u.username == "admin").count();
        assert_eq!(admins, 1);
    }

    #[test]
    fn stale_session_is_cleared() {
        let store = SharedStore::default();
        store
            .set(
                KEY_CURRENT_USER,
                r#"{"id":42,"name":"Ghost","email":"g@x.com","username":"ghost","password":"p","type":"patient"}"#,
            )
            .unwrap();
        let ledger = Ledger::load(Box::new(store.clone())).unwrap();
        assert!(ledger.current_user().is_none());
        assert_eq!(store.get(KEY_CURRENT_USER).unwrap(), None);
    }

    #[test]
    fn malformed_collection_fails_load() {
        let store = SharedStore::default();
        store.set(KEY_APPOINTMENTS, "[{").unwrap();
        let err = Ledger::load(Box::new(store)).unwrap_err();
        assert!(matches!(err, LedgerError::Store(StoreError::Json { .. })));
    }

    #[test]
    fn state_survives_sqlite_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clinic.db");

        let appt_id = {
            let mut ledger = Ledger::load(Box::new(SqliteStore::open(&path).unwrap())).unwrap();
            let patient = register_patient(&mut ledger, "hina");
            ledger.login("hina", "secret").unwrap();
            ledger
                .book(request(2, "2099-01-10", "10:00"), &patient)
                .unwrap()
                .id
        };

        let ledger = Ledger::load(Box::new(SqliteStore::open(&path).unwrap())).unwrap();
        assert_eq!(ledger.users().len(), 2);
        assert_eq!(ledger.current_user().map(|u| u.username.as_str()), Some("hina"));
        let appt = ledger.find_appointment(appt_id).unwrap();
        assert_eq!(appt.patient_name, "Patient hina");
        assert_eq!(appt.doctor_id, 2);
    }

    #[test]
    fn failed_booking_write_leaves_no_appointment() {
        let (mut ledger, store) = failing_ledger();
        let hina = register_patient(&mut ledger, "hina");
        store.fail_writes_to(KEY_APPOINTMENTS);

        let err = ledger.book(request(1, "2099-03-01", "09:00"), &hina).unwrap_err();
        assert!(matches!(err, LedgerError::Store(StoreError::Io(_))));
        assert!(ledger.appointments().is_empty());
        assert!(reload(&store).appointments().is_empty());
    }

    #[test]
    fn failed_register_write_leaves_no_user() {
        let (mut ledger, store) = failing_ledger();
        store.fail_writes_to(KEY_USERS);

        let err = ledger
            .register(crate::models::NewUser {
                name: "Sana".into(),
                email: "sana@example.com".into(),
                username: "sana".into(),
                password: "pw".into(),
                user_type: UserType::Patient,
            })
            .unwrap_err();
        assert!(matches!(err, LedgerError::Store(_)));
        assert_eq!(ledger.users().len(), 1);
        assert_eq!(reload(&store).users().len(), 1);
    }

    #[test]
    fn failed_login_write_keeps_previous_session() {
        let (mut ledger, store) = failing_ledger();
        register_patient(&mut ledger, "hina");
        ledger.login("hina", "secret").unwrap();
        store.fail_writes_to(KEY_CURRENT_USER);

        assert!(ledger.login("admin", "1234").is_err());
        assert_eq!(
            ledger.current_user().map(|u| u.username.as_str()),
            Some("hina")
        );
    }

    #[test]
    fn failed_status_write_keeps_previous_status() {
        let (mut ledger, store) = failing_ledger();
        let hina = register_patient(&mut ledger, "hina");
        let appt = ledger.book(request(1, "2099-03-01", "09:00"), &hina).unwrap();
        store.fail_writes_to(KEY_APPOINTMENTS);

        assert!(ledger.cancel(appt.id).is_err());
        assert!(ledger.confirm(appt.id).is_err());
        let status = ledger.find_appointment(appt.id).unwrap().status;
        assert_eq!(status, AppointmentStatus::Booked);
        let stored = reload(&store).find_appointment(appt.id).unwrap().status;
        assert_eq!(stored, AppointmentStatus::Booked);
    }

    #[test]
    fn failed_doctor_writes_leave_doctors_untouched() {
        let (mut ledger, store) = failing_ledger();
        store.fail_writes_to(KEY_DOCTORS);

        assert!(ledger.toggle_doctor_availability(1).is_err());
        assert!(ledger.find_doctor(1).unwrap().available);
        assert!(ledger.add_doctor("Dr. Nadia Malik", "Neurology").is_err());
        assert_eq!(ledger.doctors().len(), 4);
    }

    #[test]
    fn failed_cascade_write_keeps_doctor_and_appointments() {
        let (mut ledger, store) = failing_ledger();
        let hina = register_patient(&mut ledger, "hina");
        ledger.book(request(2, "2099-03-01", "09:00"), &hina).unwrap();
        store.fail_writes_to(KEY_APPOINTMENTS);

        assert!(ledger.remove_doctor(2).is_err());
        assert!(ledger.find_doctor(2).is_some());
        assert_eq!(ledger.appointments().len(), 1);

        let reloaded = reload(&store);
        assert!(reloaded.find_doctor(2).is_some());
        assert_eq!(reloaded.appointments().len(), 1);
    }

    #[test]
    fn failed_doctor_delete_restores_appointments() {
        let (mut ledger, store) = failing_ledger();
        let hina = register_patient(&mut ledger, "hina");
        ledger.book(request(2, "2099-03-01", "09:00"), &hina).unwrap();
        store.fail_writes_to(KEY_DOCTORS);

        assert!(ledger.remove_doctor(2).is_err());
        assert!(ledger.find_doctor(2).is_some());
        assert_eq!(ledger.appointments().len(), 1);

        let reloaded = reload(&store);
        assert!(reloaded.find_doctor(2).is_some());
        assert_eq!(reloaded.appointments().len(), 1);
    }

    #[test]
    fn booking_past_largest_id_is_rejected() {
        let store = SharedStore::default();
        store
            .set(
                KEY_APPOINTMENTS,
                r#"[{"id":18446744073709551615,"doctorId":1,"date":"2099-01-01","time":"09:00","reason":"x","status":"booked","patientId":1,"patientName":"A"}]"#,
            )
            .unwrap();
        let mut ledger = Ledger::load(Box::new(store)).unwrap();
        let hina = register_patient(&mut ledger, "hina");

        let err = ledger.book(request(1, "2099-03-01", "10:00"), &hina).unwrap_err();
        assert!(matches!(err, LedgerError::Store(StoreError::IdsExhausted)));
        assert_eq!(ledger.appointments().len(), 1);
    }
}
