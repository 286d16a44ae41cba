// Structured logging setup
pub mod logging;

// Prometheus recorder and exposition
pub mod metrics;

pub use logging::init_logging;
pub use metrics::Metrics;
