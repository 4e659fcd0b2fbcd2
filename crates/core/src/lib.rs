pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod platform;

#[cfg(test)]
mod test_support;

pub use config::{CliConfig, Config, PlatformPaths};
pub use error::{CoreError, Result};
pub use metrics::{MetricsCollector, SampleReport, SamplingLoop};
pub use model::*;
pub use platform::PlatformProvider;
