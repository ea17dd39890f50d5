use crate::types::TestSuiteReport;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

pub const SECTION_START: &str = "#-------- TESTING SECTION START --------#";
pub const SECTION_END: &str = "#-------- TESTING SECTION END --------#";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scanner {
    Outside,
    Inside,
}

/// Recovers the report embedded in the raw run output. `Ok(None)` means no
/// delimited section was present, which is not an error here; the caller
/// decides what a missing report means for the group.
pub fn extract(path: &Path) -> Result<Option<TestSuiteReport>> {
    // Emulator consoles interleave the report with arbitrary bytes; never
    // fail the read on undecodable sequences.
    let raw = fs::read(path)
        .with_context(|| format!("failed to read run output '{}'", path.display()))?;
    let text = String::from_utf8_lossy(&raw);

    let body = delimited_section(&text);
    if body.is_empty() {
        return Ok(None);
    }
    debug!("found a report section of {} bytes", body.len());

    let report: TestSuiteReport = serde_json::from_str(&body)
        .with_context(|| format!("malformed test report in '{}'", path.display()))?;
    Ok(Some(report))
}

// Two-state scan over the output: only lines strictly between the start and
// end sentinels are kept, the sentinels themselves are dropped.
fn delimited_section(text: &str) -> String {
    let mut state = Scanner::Outside;
    let mut body = String::new();
    for line in text.lines() {
        let trimmed = line.trim_end();
        match state {
            Scanner::Outside => {
                if trimmed == SECTION_START {
                    state = Scanner::Inside;
                }
            }
            Scanner::Inside => {
                if trimmed == SECTION_END {
                    state = Scanner::Outside;
                } else {
                    body.push_str(line);
                    body.push('\n');
                }
            }
        }
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scanner_keeps_only_the_delimited_region() {
        let text = format!("boot noise\n{SECTION_START}\n{{}}\n{SECTION_END}\ntrailing\n");
        assert_eq!(delimited_section(&text), "{}\n");
    }

    #[test]
    fn scanner_without_sentinels_yields_nothing() {
        assert_eq!(delimited_section("just some console chatter\n"), "");
    }
}
