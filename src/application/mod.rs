//! Application layer services implementing business logic.
//!
//! Services consume the [`crate::domain::repositories::LinkRepository`] trait
//! and give HTTP handlers a small API.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Short link creation (the write path)
//! - [`services::redirect_resolver::RedirectResolver`] - Slug resolution (the read path)

pub mod services;
