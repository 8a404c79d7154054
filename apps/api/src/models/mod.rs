pub mod passenger;
pub mod profile;
pub mod session;
