/// Placeholder company label for boards that do not expose a company column.
pub const COMPANY_PLACEHOLDER: &str = "Check Title";

/// Sentinel description for rows without a resolvable detail page.
/// Downstream classification still scores these, typically low.
pub const DESCRIPTION_PLACEHOLDER: &str = "Description not available on list page.";

/// One job posting as scraped from the listings page, pre-classification.
///
/// `url` is the deduplication key: non-empty and stable across runs
/// for the same posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub url: String,
    pub title: String,
    pub company: String,
    pub description: String,
}
