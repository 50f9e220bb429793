//! Repository Module
//!
//! Provides persistence operations for SurrealDB tables.

pub mod payment;

pub use payment::PaymentRepository;

pub use shared::db::{BaseRepository, RepoError, RepoResult};
