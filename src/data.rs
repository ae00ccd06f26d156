use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use crate::types::{ContinuationToken, QueryString, Word};

/// One short text record produced by a batch source.
///
/// The source format truncates `text`; when the record overflowed, the full
/// content arrives in `extended` instead. Immutable once produced.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Record {
    /// Primary (possibly truncated) text field.
    pub text: String,
    /// Full overflow text, present when `text` was truncated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended: Option<String>,
}

impl Record {
    /// Create a record carrying only primary text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            extended: None,
        }
    }

    /// Create a record whose primary text was truncated by the source.
    pub fn extended(text: impl Into<String>, full_text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            extended: Some(full_text.into()),
        }
    }

    /// The text to tally: the overflow field when non-empty, else the primary field.
    pub fn effective_text(&self) -> &str {
        match self.extended.as_deref() {
            Some(full) if !full.is_empty() => full,
            _ => &self.text,
        }
    }
}

/// One page of records plus the cursor for the page after it.
///
/// An empty `next` token means the source is exhausted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Batch {
    /// Records in page order.
    pub records: Vec<Record>,
    /// Continuation token for the following page; empty means no further batches.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub next: ContinuationToken,
}

impl Batch {
    /// Create a batch with an explicit continuation token.
    pub fn new(records: Vec<Record>, next: impl Into<ContinuationToken>) -> Self {
        Self {
            records,
            next: next.into(),
        }
    }

    /// Create a final batch that carries no continuation token.
    pub fn last(records: Vec<Record>) -> Self {
        Self {
            records,
            next: String::new(),
        }
    }

    /// Returns `true` when no page follows this one.
    pub fn is_last(&self) -> bool {
        self.next.is_empty()
    }
}

/// Word-to-occurrence mapping, either partial (one batch) or total (whole run).
///
/// Merging is commutative and associative summation per word, which is what
/// lets tally workers complete in any order without changing the total.
pub type FrequencyMap = HashMap<Word, u64>;

/// A word and its total occurrence count.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankedWord {
    /// The ranked word; empty for a padding placeholder.
    pub word: Word,
    /// Total occurrences across the whole run.
    pub count: u64,
}

impl RankedWord {
    /// Placeholder entry used to pad results with fewer than K distinct words.
    pub fn zero() -> Self {
        Self {
            word: String::new(),
            count: 0,
        }
    }
}

/// Ranked result of a completed run: exactly K entries, descending by count,
/// ascending lexicographic within equal counts.
///
/// When fewer than K distinct words were seen, the tail is padded with
/// zero-valued entries (empty word, zero count). Those placeholders are
/// literal entries of the serialized result; `distinct_len` reports how many
/// entries carry real words.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct TopKResult {
    entries: Vec<RankedWord>,
}

impl TopKResult {
    /// Wrap an already-ranked, already-padded entry list.
    pub(crate) fn from_ranked(entries: Vec<RankedWord>) -> Self {
        Self { entries }
    }

    /// Ranked entries, placeholders included.
    pub fn entries(&self) -> &[RankedWord] {
        &self.entries
    }

    /// Total entry count, always the K the result was built with.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` for a zero-K result.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of leading entries that carry a real word.
    pub fn distinct_len(&self) -> usize {
        self.entries
            .iter()
            .take_while(|ranked| !ranked.word.is_empty())
            .count()
    }
}

/// Persisted artifact of one completed search run.
///
/// Serializes to `{"time_of_search": ..., "query": ..., "top_words": [...]}`
/// and is owned by the persistence sink after handoff.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchRecord {
    /// Wall-clock time the search started.
    pub time_of_search: DateTime<Utc>,
    /// Original query string the run was issued for.
    pub query: QueryString,
    /// Ranked top-K words, padded to exactly K entries.
    pub top_words: TopKResult,
}

impl SearchRecord {
    /// Render the record as indented JSON, the shape handed back to callers.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn effective_text_prefers_non_empty_overflow() {
        let truncated = Record::extended("short…", "short but actually the full text");
        assert_eq!(
            truncated.effective_text(),
            "short but actually the full text"
        );

        let plain = Record::new("untruncated");
        assert_eq!(plain.effective_text(), "untruncated");

        let empty_overflow = Record {
            text: "kept".to_string(),
            extended: Some(String::new()),
        };
        assert_eq!(empty_overflow.effective_text(), "kept");
    }

    #[test]
    fn batch_is_last_tracks_token_presence() {
        assert!(Batch::last(Vec::new()).is_last());
        assert!(!Batch::new(Vec::new(), "page-2").is_last());
    }

    #[test]
    fn distinct_len_stops_at_first_placeholder() {
        let result = TopKResult::from_ranked(vec![
            RankedWord {
                word: "b".to_string(),
                count: 3,
            },
            RankedWord {
                word: "a".to_string(),
                count: 2,
            },
            RankedWord::zero(),
        ]);
        assert_eq!(result.len(), 3);
        assert_eq!(result.distinct_len(), 2);
    }

    #[test]
    fn search_record_serializes_original_wire_shape() {
        let record = SearchRecord {
            time_of_search: Utc.with_ymd_and_hms(2018, 12, 1, 0, 0, 0).unwrap(),
            query: "ruby".to_string(),
            top_words: TopKResult::from_ranked(vec![RankedWord {
                word: "ruby".to_string(),
                count: 4,
            }]),
        };
        let json: serde_json::Value = serde_json::to_value(&record).unwrap();
        assert_eq!(json["query"], "ruby");
        assert_eq!(json["top_words"][0]["word"], "ruby");
        assert_eq!(json["top_words"][0]["count"], 4);
        assert!(json["time_of_search"].is_string());
    }
}
