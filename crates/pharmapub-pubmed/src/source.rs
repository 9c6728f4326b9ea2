//! Fetch collaborator interface

use crate::parser::PaperRecord;

/// Resolves search queries to PMIDs and PMIDs to parsed records.
///
/// Implementations never propagate transport errors: failures are
/// logged and surface as an empty list or `None`.
pub trait PaperSource {
    /// Up to `max_results` PMIDs matching `query`, in search-rank order.
    fn resolve_ids(&self, query: &str, max_results: usize) -> Vec<String>;

    /// Parsed record for one PMID, or `None` if it could not be fetched or parsed.
    fn fetch_record(&self, id: &str) -> Option<PaperRecord>;
}
