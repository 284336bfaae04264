//! Removal of `MODRINTH_EXCLUDE_START` / `MODRINTH_EXCLUDE_END` regions.
//!
//! Markers are collected in one regex scan and validated with a depth counter
//! before anything is removed. Nested regions are allowed; only the outermost
//! span is removed, taking the inner markers with it.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use autodesc_shared::{AutoDescError, Result};

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<!--\s*MODRINTH_EXCLUDE_(START|END)\s*-->").expect("valid regex")
});

/// Which delimiter a marker is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Start,
    End,
}

/// A delimiter found in the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMarker {
    pub kind: MarkerKind,
    /// Byte offset of the first character of the comment.
    pub start: usize,
    /// Byte offset just past the comment.
    pub end: usize,
    /// 1-based line number of the comment.
    pub line: usize,
}

/// A byte span `[start, end)` to remove, delimiters included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExcludedRegion {
    pub start: usize,
    pub end: usize,
}

/// Find every marker in document order.
pub fn scan_markers(text: &str) -> Vec<TagMarker> {
    let mut line = 1;
    let mut counted_to = 0;

    MARKER_RE
        .captures_iter(text)
        .map(|caps| {
            let whole = caps.get(0).expect("group 0 always matches");
            line += text[counted_to..whole.start()].matches('\n').count();
            counted_to = whole.start();

            let kind = if &caps[1] == "START" {
                MarkerKind::Start
            } else {
                MarkerKind::End
            };

            TagMarker {
                kind,
                start: whole.start(),
                end: whole.end(),
                line,
            }
        })
        .collect()
}

/// Validate marker nesting and compute the outermost regions.
pub fn excluded_regions(text: &str) -> Result<Vec<ExcludedRegion>> {
    let markers = scan_markers(text);

    let mut depth: usize = 0;
    let mut open: Option<&TagMarker> = None;
    let mut regions = Vec::new();

    for marker in &markers {
        match marker.kind {
            MarkerKind::Start => {
                if depth == 0 {
                    open = Some(marker);
                }
                depth += 1;
            }
            MarkerKind::End => {
                if depth == 0 {
                    return Err(AutoDescError::structural(
                        format!(
                            "MODRINTH_EXCLUDE_END on line {} has no preceding MODRINTH_EXCLUDE_START",
                            marker.line
                        ),
                        marker.start,
                    ));
                }
                depth -= 1;
                if depth == 0 {
                    if let Some(start) = open.take() {
                        regions.push(ExcludedRegion {
                            start: start.start,
                            end: marker.end,
                        });
                    }
                }
            }
        }
    }

    if let Some(start) = open {
        return Err(AutoDescError::structural(
            format!(
                "MODRINTH_EXCLUDE_START on line {} is never closed ({depth} unmatched start marker{})",
                start.line,
                if depth == 1 { "" } else { "s" }
            ),
            start.start,
        ));
    }

    Ok(regions)
}

/// Remove every excluded region, preserving all other text verbatim.
///
/// Fails without producing output if the markers are unbalanced.
pub fn remove_excluded_sections(text: &str) -> Result<String> {
    let regions = excluded_regions(text)?;
    if regions.is_empty() {
        return Ok(text.to_string());
    }

    let mut result = String::with_capacity(text.len());
    let mut cursor = 0;
    for region in &regions {
        result.push_str(&text[cursor..region.start]);
        cursor = region.end;
    }
    result.push_str(&text[cursor..]);

    debug!(
        regions = regions.len(),
        bytes_removed = text.len() - result.len(),
        "excluded sections removed"
    );

    Ok(result)
}
