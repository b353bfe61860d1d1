pub mod appointment;
pub mod doctor;
pub mod enums;
pub mod user;

pub use appointment::*;
pub use doctor::*;
pub use enums::*;
pub use user::*;
