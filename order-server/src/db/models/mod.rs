//! Database Models

pub mod order;

pub use order::{Order, OrderItem};
