//! Domain layer containing the short link entity and the store contract.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//!
//! The domain layer has no dependencies on infrastructure or presentation
//! layers. Store implementations live in [`crate::infrastructure::persistence`].

pub mod entities;
pub mod repositories;
