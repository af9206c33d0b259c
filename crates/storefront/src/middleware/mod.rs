//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Request ID (record a unique ID on the request span)
//! 4. Session layer (tower-sessions with in-memory store)
//!
//! The visitor's cart is read from the session by the [`SessionCart`] extractor.

pub mod cart;
pub mod request_id;
pub mod session;

pub use cart::SessionCart;
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
