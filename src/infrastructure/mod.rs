//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete storage and throttling backends.
//!
//! # Modules
//!
//! - [`abuse_guard`] - Creation throttling (in-process and Redis-backed)
//! - [`persistence`] - Slug store implementations (PostgreSQL and in-memory)

pub mod abuse_guard;
pub mod persistence;
