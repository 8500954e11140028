pub mod normalize;
pub mod orchestrator;
pub mod pool;

pub use orchestrator::{PipelineOrchestrator, PipelineResult, RunSummary};
