use crate::constants::CSV_HEADERS;
use crate::error::Result;
use crate::types::TalkRecord;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Row cells in header order. Empty records become an all-blank row.
fn row(record: &TalkRecord) -> [&str; 7] {
    match record {
        TalkRecord::Complete(t) => [
            t.title.as_str(),
            t.speaker.as_str(),
            t.calling.as_str(),
            t.conference.as_str(),
            t.url.as_str(),
            t.talk.as_str(),
            t.footnotes.as_str(),
        ],
        TalkRecord::Empty => [""; 7],
    }
}

/// Header row, then one row per record with no index column.
pub fn write_records<W: Write>(writer: W, records: &[TalkRecord]) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(writer);
    csv.write_record(CSV_HEADERS)?;
    for record in records {
        csv.write_record(row(record))?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_csv(path: &Path, records: &[TalkRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    write_records(File::create(path)?, records)?;
    info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}
