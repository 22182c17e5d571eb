//! HTTP inbound adapter: guarded dashboard pages and the JSON API behind
//! them.

pub mod auth;
pub mod drafts;
pub mod error;
pub mod guard;
pub mod health;
pub mod pages;
pub mod resources;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;
