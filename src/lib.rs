// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod cache;
pub mod enrich;
pub mod ensemble;
pub mod entities;
pub mod error;
pub mod metrics;
pub mod normalize;
pub mod options;
pub mod pipeline;
pub mod providers;
pub mod reliability;
pub mod types;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::cache::ResultCache;
pub use crate::error::ServiceError;
pub use crate::options::AnalyzeOptions;
pub use crate::pipeline::Pipeline;
pub use crate::providers::ProviderRegistry;
pub use crate::reliability::ReliabilityConfig;
pub use crate::types::{SentimentLabel, Source};
