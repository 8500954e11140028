// Observability: metrics, failure reporting, and logging

pub mod failures;
pub mod metrics;

pub use failures::{CollectingFailureSink, TracingFailureSink};
