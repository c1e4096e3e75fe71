//! Parser for SONiC `show` command tables.
//!
//! SONiC CLI tables have a header line, a separator line made of dash
//! groups, then one line per row:
//!
//! ```text
//! Drawer    LED    FAN    Speed    Direction    Presence    Status
//! --------  -----  -----  -------  -----------  ----------  --------
//! drawer1   green  fan1   50%      intake       Present     OK
//! ```
//!
//! Column boundaries come from the dash groups. Keys are the lowercased
//! header cells.

use std::collections::BTreeMap;

/// One parsed table row, keyed by lowercased column header.
pub type ShowRow = BTreeMap<String, String>;

fn is_separator(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c == '-' || c == ' ')
}

/// Returns `(start, end)` char positions of each dash group.
fn column_spans(separator: &[char]) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;
    for (i, &c) in separator.iter().enumerate() {
        match (c, start) {
            ('-', None) => start = Some(i),
            (' ', Some(s)) => {
                spans.push((s, i));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push((s, separator.len()));
    }
    spans
}

fn cell(line: &[char], start: usize, end: Option<usize>) -> String {
    if start >= line.len() {
        return String::new();
    }
    let end = end.map_or(line.len(), |e| e.min(line.len()));
    line[start..end].iter().collect::<String>().trim().to_string()
}

fn split_row(line: &[char], spans: &[(usize, usize)]) -> Vec<String> {
    spans
        .iter()
        .enumerate()
        .map(|(i, (start, _))| {
            // Cells run up to the next column; the last one to end of line.
            let end = spans.get(i + 1).map(|(next, _)| *next);
            cell(line, *start, end)
        })
        .collect()
}

/// Parses the first table found in `output`.
///
/// Returns an empty list when no separator line is present.
pub fn parse_show_table(output: &str) -> Vec<ShowRow> {
    let lines: Vec<&str> = output.lines().collect();
    let Some(sep_idx) = lines.iter().position(|l| is_separator(l)) else {
        return Vec::new();
    };
    if sep_idx == 0 {
        return Vec::new();
    }

    let separator: Vec<char> = lines[sep_idx].chars().collect();
    let spans = column_spans(&separator);
    let header: Vec<char> = lines[sep_idx - 1].chars().collect();
    let keys: Vec<String> = split_row(&header, &spans)
        .into_iter()
        .map(|k| k.to_lowercase())
        .collect();

    lines[sep_idx + 1..]
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            let chars: Vec<char> = l.chars().collect();
            keys.iter()
                .cloned()
                .zip(split_row(&chars, &spans))
                .collect::<ShowRow>()
        })
        .collect()
}
