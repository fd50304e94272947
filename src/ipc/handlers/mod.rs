pub mod attendance;
pub mod core;
pub mod dashboard;
pub mod exchange;
pub mod payments;
pub mod setup;
pub mod students;
