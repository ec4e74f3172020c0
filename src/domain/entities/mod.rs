//! Core domain entities.
//!
//! - [`ShortLink`] - A persisted slug → target mapping with its click counter
//! - [`NewShortLink`] - Input for creating a mapping

pub mod short_link;

pub use short_link::{NewShortLink, ShortLink};
