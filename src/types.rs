/// Whitespace-delimited token extracted from record text.
/// Examples: `ruby`, `Rails!`, `#rustlang`
pub type Word = String;
/// Opaque paging cursor returned by a batch source; empty means no more pages.
/// Example: `eyJtYXhJZCI6OTUyfQ==`
pub type ContinuationToken = String;
/// Identifier for the source that produced a batch.
/// Examples: `search_api`, `fixture_file`, `scripted`
pub type SourceId = String;
/// Free-text search query submitted by a caller.
/// Example: `ruby on rails`
pub type QueryString = String;
/// Search-API date bound in `YYYYMMDDHHmm` form, interpreted by the remote service.
/// Example: `201812010000`
pub type DateBound = String;
