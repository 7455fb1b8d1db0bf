//! Router Module Index
//!
//! Splits routing by access level so authentication is applied per module
//! via Axum layers rather than per handler.

/// Routes accessible without credentials.
pub mod public;

/// Routes behind the `Principal` extractor middleware.
pub mod authenticated;
