//! API route declarations (e.g., /api/v1/*)

pub mod cost_routes;
pub mod metrics_routes;
pub mod system_routes;
