//! Stub Routes
//!
//! Route handlers organized by functionality.

pub mod api_keys;
pub mod health;
pub mod qr;
pub mod scan;
