//! StudentStay REST backend adapter.
//!
//! This module provides one reqwest-backed type implementing the listing,
//! booking, review, user, counts and auth ports.

mod dto;
mod http_backend;

pub use http_backend::RestBackend;
