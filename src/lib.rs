// Host and per-process metrics acquisition, normalized into serializable records

pub mod collector;
pub mod config;
pub mod connections;
pub mod error;
pub mod metrics;
pub mod models;
pub mod normalize;
pub mod provider;

pub use error::{ErrorKind, MetricsError, ProviderError};
pub use metrics::MetricsReader;
pub use provider::{HostProvider, SystemMetricsProvider};
