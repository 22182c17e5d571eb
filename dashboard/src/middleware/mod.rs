//! Request middleware.
//!
//! Purpose: cross-cutting request lifecycle concerns. Route guarding lives
//! with the HTTP adapter because it depends on adapter configuration.

pub mod trace;

pub use trace::Trace;
