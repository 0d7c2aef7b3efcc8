//! Resize service layer.
//!
//! The service sits between the HTTP layer and the storage, cache and codec
//! collaborators:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Handlers              │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │             ResizeService               │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │  CacheStore  │  │  Resize engine  │  │
//! │  │  (encoded    │  │  (decode →      │  │
//! │  │   variants)  │  │ resize → encode)│  │
//! │  └──────────────┘  └─────────────────┘  │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │              ObjectStore                │
//! └─────────────────────────────────────────┘
//! ```

mod pipeline;

pub use pipeline::{ResizeService, ServeResponse};
