//! API Routes

pub mod email;
pub mod form;
pub mod health;
pub mod registrations;
pub mod uploads;
