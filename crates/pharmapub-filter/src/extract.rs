//! Metadata extraction from a parsed PubMed record
//!
//! Each field falls back to the "N/A" sentinel when nothing qualifies.
//! Classifier errors propagate so the caller can drop the whole record.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use pharmapub_pubmed::PaperRecord;
use regex::Regex;

use crate::classifier::{AffiliationClassifier, ClassifyError, KeywordClassifier};
use crate::paper::{ExtractedPaper, NOT_AVAILABLE, or_sentinel_list};

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.-]+@[\w.-]+").expect("invalid email regex"));

/// Remove embedded email addresses and surrounding whitespace
pub fn strip_emails(text: &str) -> String {
    EMAIL_REGEX.replace_all(text, "").trim().to_string()
}

/// The caller-supplied identifier is authoritative
pub fn extract_id(id: &str) -> String {
    log::debug!("PubMed ID: {id}");
    id.to_string()
}

pub fn extract_title(record: &PaperRecord) -> String {
    match record.title.as_deref().map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => {
            log::warn!("PMID {}: title not found", record.pmid);
            NOT_AVAILABLE.to_string()
        }
    }
}

/// "Y-M-D" from the raw PubDate components; all three must be present.
pub fn extract_publication_date(record: &PaperRecord) -> String {
    let Some(date) = &record.pub_date else {
        log::warn!("PMID {}: publication date not found", record.pmid);
        return NOT_AVAILABLE.to_string();
    };
    match (&date.year, &date.month, &date.day) {
        (Some(year), Some(month), Some(day)) => format!("{year}-{month}-{day}"),
        _ => {
            log::warn!(
                "PMID {}: incomplete publication date (missing year, month, or day)",
                record.pmid
            );
            NOT_AVAILABLE.to_string()
        }
    }
}

/// Applies an [`AffiliationClassifier`] to a record's authors
pub struct Extractor {
    classifier: Box<dyn AffiliationClassifier>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(Box::new(KeywordClassifier::default()))
    }
}

impl Extractor {
    pub fn new(classifier: Box<dyn AffiliationClassifier>) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &dyn AffiliationClassifier {
        self.classifier.as_ref()
    }

    /// Extract every field of one record.
    pub fn extract(&self, id: &str, record: &PaperRecord) -> Result<ExtractedPaper, ClassifyError> {
        let paper = ExtractedPaper {
            pubmed_id: extract_id(id),
            title: extract_title(record),
            publication_date: extract_publication_date(record),
            authors: self.extract_authors(record)?,
            company_affiliations: self.extract_affiliations(record)?,
            corresponding_author_email: self.extract_corresponding_email(record)?,
        };
        log::debug!(
            "PMID {id}: {} non-academic authors, {} company affiliations",
            paper.authors.len(),
            paper.company_affiliations.len()
        );
        Ok(paper)
    }

    /// Authors with at least one non-academic affiliation, or none at all.
    ///
    /// Authors without both a fore name and a last name are skipped.
    pub fn extract_authors(&self, record: &PaperRecord) -> Result<Vec<String>, ClassifyError> {
        let mut authors = Vec::new();

        for author in &record.authors {
            let qualifies = if author.affiliations.is_empty() {
                true
            } else {
                let mut any_non_academic = false;
                for aff in &author.affiliations {
                    if !self.classifier.is_academic(aff)? {
                        any_non_academic = true;
                        break;
                    }
                }
                any_non_academic
            };

            if !qualifies {
                continue;
            }
            match (&author.fore_name, &author.last_name) {
                (Some(fore), Some(last)) => {
                    let name = format!("{fore} {last}");
                    log::debug!("Adding author: {name}");
                    authors.push(name);
                }
                _ => log::debug!("Skipping non-academic author without full name"),
            }
        }

        Ok(or_sentinel_list(authors))
    }

    /// Unique pharma/biotech, non-academic affiliations with emails stripped.
    ///
    /// Sorted, so output is stable across runs.
    pub fn extract_affiliations(&self, record: &PaperRecord) -> Result<Vec<String>, ClassifyError> {
        let mut affiliations = BTreeSet::new();

        for aff in record.authors.iter().flat_map(|a| &a.affiliations) {
            if self.classifier.is_pharma_biotech(aff)? && !self.classifier.is_academic(aff)? {
                let clean = strip_emails(aff);
                if !clean.is_empty() {
                    log::debug!("Adding pharma/biotech affiliation: {clean}");
                    affiliations.insert(clean);
                }
            }
        }

        Ok(or_sentinel_list(affiliations.into_iter().collect()))
    }

    /// Trailing email of the first non-academic affiliation, in document order.
    pub fn extract_corresponding_email(
        &self,
        record: &PaperRecord,
    ) -> Result<String, ClassifyError> {
        for aff in record.authors.iter().flat_map(|a| &a.affiliations) {
            let Some(candidate) = aff.split_whitespace().last() else {
                continue;
            };
            if candidate.contains('@') && !self.classifier.is_academic(aff)? {
                log::debug!("Corresponding email found: {candidate}");
                return Ok(candidate.to_string());
            }
        }

        log::debug!("PMID {}: no corresponding email found", record.pmid);
        Ok(NOT_AVAILABLE.to_string())
    }
}
