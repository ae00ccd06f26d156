//! Built-in batch source implementations and their shared wire shapes.

use serde::{Deserialize, Serialize};

use crate::data::{Batch, Record};

pub mod file_source;
pub mod search_api;

pub use file_source::FixtureFileSource;
pub use search_api::{SearchApiConfig, SearchApiSource};

/// Request body of the full-archive search endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireRequest<'a> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_date: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_date: Option<&'a str>,
    pub max_results: u32,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub next: &'a str,
}

/// Response document of the full-archive search endpoint; also the shape of
/// captured fixture files.
#[derive(Debug, Deserialize)]
pub(crate) struct WirePage {
    #[serde(default)]
    pub results: Vec<WireTweet>,
    #[serde(default)]
    pub next: String,
}

/// One tweet as the endpoint delivers it. Extra fields are ignored; the
/// overflow text lives in an embedded object rather than an API version.
#[derive(Debug, Deserialize)]
pub(crate) struct WireTweet {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub extended_tweet: Option<WireExtendedTweet>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireExtendedTweet {
    #[serde(default)]
    pub full_text: String,
}

impl WirePage {
    /// Convert the decoded page into the pipeline batch model.
    pub(crate) fn into_batch(self) -> Batch {
        let records = self
            .results
            .into_iter()
            .map(|tweet| {
                let extended = tweet
                    .extended_tweet
                    .map(|inner| inner.full_text)
                    .filter(|full_text| !full_text.is_empty());
                Record {
                    text: tweet.text,
                    extended,
                }
            })
            .collect();
        Batch::new(records, self.next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_page_maps_overflow_text_and_token() {
        let page: WirePage = serde_json::from_str(
            r#"{
                "results": [
                    {"text": "short", "truncated": false},
                    {"text": "cut…", "truncated": true,
                     "extended_tweet": {"full_text": "cut but complete here"}},
                    {"text": "kept", "extended_tweet": {"full_text": ""}}
                ],
                "next": "cursor-2"
            }"#,
        )
        .unwrap();

        let batch = page.into_batch();
        assert_eq!(batch.next, "cursor-2");
        assert_eq!(batch.records.len(), 3);
        assert_eq!(batch.records[0].effective_text(), "short");
        assert_eq!(batch.records[1].effective_text(), "cut but complete here");
        assert_eq!(batch.records[2].effective_text(), "kept");
    }

    #[test]
    fn wire_request_omits_empty_optional_fields() {
        let body = serde_json::to_value(WireRequest {
            query: "ruby",
            from_date: None,
            to_date: None,
            max_results: 100,
            next: "",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"query": "ruby", "maxResults": 100}));

        let chained = serde_json::to_value(WireRequest {
            query: "ruby",
            from_date: Some("201812010000"),
            to_date: Some("201812310000"),
            max_results: 100,
            next: "cursor-2",
        })
        .unwrap();
        assert_eq!(chained["fromDate"], "201812010000");
        assert_eq!(chained["next"], "cursor-2");
    }
}
