//! Data stored outside the catalog for a visitor.

pub mod session;

pub use session::keys as session_keys;
