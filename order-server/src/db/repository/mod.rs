//! Repository Module
//!
//! Provides persistence operations for SurrealDB tables.

pub mod order;

pub use order::OrderRepository;

pub use shared::db::{BaseRepository, RepoError, RepoResult};
