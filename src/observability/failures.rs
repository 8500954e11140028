use crate::app::ports::FailureSink;
use crate::error::Result;
use crate::types::FailureReport;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use tracing::warn;

/// Logs each failure and otherwise forgets it.
#[derive(Debug, Default)]
pub struct TracingFailureSink;

impl FailureSink for TracingFailureSink {
    fn report(&self, failure: FailureReport) {
        warn!(
            url = %failure.url,
            kind = failure.kind.as_str(),
            "Page failed: {}",
            failure.message
        );
    }
}

/// Logs each failure and keeps it for the end-of-run summary.
#[derive(Debug, Default)]
pub struct CollectingFailureSink {
    failures: Mutex<Vec<FailureReport>>,
}

impl CollectingFailureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<FailureReport> {
        self.failures.lock().map(|f| f.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.failures.lock().map(|f| f.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FailureSink for CollectingFailureSink {
    fn report(&self, failure: FailureReport) {
        TracingFailureSink.report(failure.clone());
        if let Ok(mut failures) = self.failures.lock() {
            failures.push(failure);
        }
    }
}

/// Write failures as JSON lines, one report per line.
pub fn write_failures_jsonl(path: &Path, failures: &[FailureReport]) -> Result<()> {
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    for failure in failures {
        serde_json::to_writer(&mut file, failure)?;
        file.write_all(b"\n")?;
    }
    file.flush()?;
    Ok(())
}
