//! HTTP request handlers for public endpoints.

pub mod create_link;
pub mod health;
pub mod not_found;
pub mod redirect;

pub use create_link::create_link_handler;
pub use health::health_handler;
pub use not_found::not_found_handler;
pub use redirect::redirect_handler;
