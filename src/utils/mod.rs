//! Utility functions for slug handling, URL policy, and request inspection.
//!
//! - [`slug`] - Slug generation, normalization, and validation
//! - [`url_policy`] - Target URL validation and the self-reference policy
//! - [`client_ip`] - Client identity extraction for throttling
//! - [`db_error`] - Structured database error classification

pub mod client_ip;
pub mod db_error;
pub mod slug;
pub mod url_policy;
