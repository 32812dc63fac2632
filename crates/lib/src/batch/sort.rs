//! Client-side sorting of batch rows.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::FileRow;

/// Column a batch table can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Path,
    Preview,
    #[default]
    Status,
    Confidence,
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path" => Ok(SortKey::Path),
            "preview" => Ok(SortKey::Preview),
            "status" => Ok(SortKey::Status),
            "confidence" => Ok(SortKey::Confidence),
            other => Err(format!("unknown sort key '{other}'")),
        }
    }
}

/// Current sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub key: SortKey,
    pub ascending: bool,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            key: SortKey::Status,
            ascending: true,
        }
    }
}

impl SortState {
    pub fn new(key: SortKey, ascending: bool) -> Self {
        Self { key, ascending }
    }

    /// Header click: selects `key` and flips the direction, whether or not
    /// the column changed.
    pub fn toggle(&mut self, key: SortKey) {
        self.key = key;
        self.ascending = !self.ascending;
    }
}

fn compare(a: &FileRow, b: &FileRow, key: SortKey) -> Ordering {
    match key {
        SortKey::Path => a.path.cmp(&b.path),
        SortKey::Preview => a.preview.cmp(&b.preview),
        SortKey::Status => a.status.as_str().cmp(b.status.as_str()),
        SortKey::Confidence => match (a.confidence, b.confidence) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            // Absent on either side leaves the pair where it is
            _ => Ordering::Equal,
        },
    }
}

/// Rows in display order for `state`.
///
/// A row without a value for the sort column compares equal to everything,
/// which is not a total order. Insertion sort is used because it stays
/// well-defined (and stable) under such a comparator.
pub fn sorted<'a>(rows: &'a [FileRow], state: SortState) -> Vec<&'a FileRow> {
    let mut out: Vec<&FileRow> = rows.iter().collect();
    for i in 1..out.len() {
        let mut j = i;
        while j > 0 {
            let mut ord = compare(out[j - 1], out[j], state.key);
            if !state.ascending {
                ord = ord.reverse();
            }
            if ord != Ordering::Greater {
                break;
            }
            out.swap(j - 1, j);
            j -= 1;
        }
    }
    out
}
