//! Scheduled exporter that flattens an in-process metrics registry into
//! Redis string keys.
//!
//! Every report cycle takes a snapshot of the [`Registry`], turns each
//! metric into `(statistic, value)` pairs and writes them as
//! `<metric name><suffix>` keys through a [`Store`].

pub mod config;
pub mod error;
pub mod extract;
pub mod filter;
pub mod keys;
pub mod metrics;
pub mod reporter;
pub mod store;
pub mod units;

pub use config::{ReporterConfig, Settings, StoreTarget};
pub use error::{ConfigError, StartError, StoreError};
pub use filter::{AllMetrics, MetricFilter, PrefixFilter};
pub use keys::{key_for, Statistic};
pub use metrics::{Metric, MetricGroups, MetricKind, Registry};
pub use reporter::{CycleSummary, Reporter, ReporterHandle};
pub use store::{MemoryStore, RedisStore, Store};
pub use units::{TimeUnit, Units};
