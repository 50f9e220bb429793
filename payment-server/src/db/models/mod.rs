//! Database Models

pub mod payment;

pub use payment::Payment;
