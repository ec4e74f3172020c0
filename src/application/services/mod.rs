//! Business logic services for the application layer.

pub mod link_service;
pub mod redirect_resolver;

pub use link_service::LinkService;
pub use redirect_resolver::{RedirectResolver, Resolution};
