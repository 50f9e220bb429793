//! Repository Module
//!
//! Provides persistence operations for SurrealDB tables.

pub mod reservation;

pub use reservation::ReservationRepository;

pub use shared::db::{BaseRepository, RepoError, RepoResult};
