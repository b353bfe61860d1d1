use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "ClinicBooking";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// File name of the SQLite key-value store inside the data directory.
pub const STORE_FILE_NAME: &str = "clinic.db";

// ─── Storage keys ─────────────────────────────────────────────────────────────

pub const KEY_USERS: &str = "users";
pub const KEY_DOCTORS: &str = "doctors";
pub const KEY_APPOINTMENTS: &str = "appointments";
pub const KEY_CURRENT_USER: &str = "currentUser";

// ─── Seed data ────────────────────────────────────────────────────────────────

/// Doctors written on first launch: (name, specialty). Ids are assigned 1..=N.
pub const SEED_DOCTORS: &[(&str, &str)] = &[
    ("Dr. Ayesha Khan", "Cardiology"),
    ("Dr. Bilal Ahmed", "Dermatology"),
    ("Dr. Sara Javed", "Pediatrics"),
    ("Dr. Omar Farooq", "Orthopedics"),
];

pub const SEED_ADMIN_NAME: &str = "Admin User";
pub const SEED_ADMIN_EMAIL: &str = "admin@clinic.com";
pub const SEED_ADMIN_USERNAME: &str = "admin";
pub const SEED_ADMIN_PASSWORD: &str = "1234";

/// Get the application data directory
/// ~/ClinicBooking/ on all platforms. Falls back to the working directory
/// when no home directory can be determined.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Get the path of the persistent key-value store
pub fn store_path() -> PathBuf {
    app_data_dir().join(STORE_FILE_NAME)
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "clinic_booking_lib=debug,info"
    } else {
        "clinic_booking_lib=info,warn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_data_dir_ends_with_app_name() {
        let dir = app_data_dir();
        assert!(dir.ends_with("ClinicBooking"));
    }

    #[test]
    fn store_path_under_app_data() {
        let path = store_path();
        assert!(path.starts_with(app_data_dir()));
        assert!(path.ends_with("clinic.db"));
    }

    #[test]
    fn seed_doctor_count() {
        assert_eq!(SEED_DOCTORS.len(), 4);
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn default_filter_targets_crate() {
        assert!(default_log_filter().starts_with("clinic_booking_lib="));
    }
}
