//! Core use-case services.
//!
//! # Responsibility
//! - Compose identity rows with current attribute versions for reads.
//! - Run every mutation as one all-or-nothing transaction.
//!
//! # See also
//! - `repo::temporal_repo` for the versioning primitive.

pub mod aggregate_service;
pub mod mutation_service;
