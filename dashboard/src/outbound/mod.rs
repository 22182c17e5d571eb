//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **rest**: reqwest client for the StudentStay REST backend, implementing
//!   every backend port.
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod rest;
