//! HTTP server layer for Resize Streamer.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                      HTTP Layer                       │
//! │  GET /{alias}/{assortment}/{object_key...}/{size}.ext │
//! │                                                       │
//! │  ┌──────────────────────┐  ┌───────────────────────┐  │
//! │  │      handlers        │  │        routes         │  │
//! │  │ (requests, errors)   │  │ (router, CORS, trace) │  │
//! │  └──────────────────────┘  └───────────────────────┘  │
//! └───────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    health_handler, image_handler, AppState, ErrorResponse, HealthResponse, CACHE_HIT_HEADER,
};
pub use routes::{create_router, RouterConfig};
