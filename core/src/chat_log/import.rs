//! Offline chat.log import.
//!
//! Parses a complete log file into a finalized event sequence, for
//! re-analyzing past sessions. Classification is pure per line, so it
//! runs in parallel; aggregation stays sequential to preserve stream
//! order. The game client writes the log in the system codepage, so raw
//! bytes are decoded as Windows-1252 rather than assumed UTF-8.

use std::fs::File;
use std::path::Path;

use encoding_rs::WINDOWS_1252;
use memchr::memchr_iter;
use memmap2::Mmap;
use rayon::prelude::*;

use artemis_types::PipelineTuning;

use super::{RawLine, classify};
use crate::events::{EventAggregator, ParsedEvent};

/// Parse an entire chat.log into finalized events.
pub fn parse_chat_file<P: AsRef<Path>>(
    path: P,
    session_id: &str,
    user_id: &str,
    tuning: &PipelineTuning,
) -> std::io::Result<Vec<ParsedEvent>> {
    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };
    let bytes = mmap.as_ref();

    // Find all line boundaries
    let mut line_ranges: Vec<(usize, usize)> = Vec::new();
    let mut start = 0;
    for end in memchr_iter(b'\n', bytes) {
        if end > start {
            line_ranges.push((start, end));
        }
        start = end + 1;
    }
    if start < bytes.len() {
        line_ranges.push((start, bytes.len()));
    }

    let ingested_at = chrono::Local::now().naive_local();

    let raw_events: Vec<ParsedEvent> = line_ranges
        .par_iter()
        .filter_map(|&(start, end)| {
            let (line, _, _) = WINDOWS_1252.decode(&bytes[start..end]);
            let raw = RawLine::new(line.trim_end_matches('\r'), ingested_at);
            classify(&raw, session_id, user_id)
        })
        .collect();

    tracing::info!(
        lines = line_ranges.len(),
        events = raw_events.len(),
        "imported chat log"
    );

    Ok(EventAggregator::extract_events(raw_events, tuning))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;
    use std::io::Write;

    #[test]
    fn imports_and_aggregates_a_small_log() {
        let tmp = tempfile_path();
        {
            let mut f = File::create(&tmp.0).unwrap();
            writeln!(f, "2024-01-15 12:00:00 [System] [] You inflicted 50.0 points of damage.").unwrap();
            writeln!(f, "2024-01-15 12:00:01 [System] [] You inflicted 52.0 points of damage.").unwrap();
            writeln!(f, "2024-01-15 12:00:02 [System] [] You received Shrapnel x (100) Value: 0.01 PED").unwrap();
            writeln!(f, "2024-01-15 12:00:10 [Local] [Jane Doe] chat noise, not an event").unwrap();
        }

        let events =
            parse_chat_file(&tmp.0, "s1", "u1", &PipelineTuning::default()).unwrap();
        tmp.cleanup();

        // hit, hit, synthesized kill, loot
        assert_eq!(events.len(), 4);
        assert!(events[2].is_kill());
        assert!(matches!(events[3].kind, EventKind::LootReceived { .. }));
    }

    struct TmpFile(std::path::PathBuf);
    impl TmpFile {
        fn cleanup(self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    fn tempfile_path() -> TmpFile {
        let mut p = std::env::temp_dir();
        p.push(format!("artemis-import-test-{}.log", std::process::id()));
        TmpFile(p)
    }
}
