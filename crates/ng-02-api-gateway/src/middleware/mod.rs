//! Middleware for the gateway router.
//!
//! Layer order: Request → Trace → CORS → BodyLimit → Handler

pub mod cors;
pub mod metrics;

pub use cors::create_cors_layer;
pub use metrics::{GatewayMetrics, RequestTimer};
