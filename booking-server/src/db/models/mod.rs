//! Database Models

pub mod reservation;

pub use reservation::Reservation;
