//! Extracted paper record

use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder for a field that could not be determined
pub const NOT_AVAILABLE: &str = "N/A";

/// Output columns, in field order
pub const FIELD_NAMES: [&str; 6] = [
    "PubMedID",
    "Title",
    "PublicationDate",
    "Authors",
    "CompanyAffiliations",
    "CorrespondingAuthorEmail",
];

/// Metadata extracted from one PubMed record.
///
/// List fields are never empty: they hold `["N/A"]` when nothing qualified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedPaper {
    #[serde(rename = "PubMedID")]
    pub pubmed_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "PublicationDate")]
    pub publication_date: String,
    /// Non-academic authors, "ForeName LastName"
    #[serde(rename = "Authors")]
    pub authors: Vec<String>,
    /// Unique pharma/biotech affiliations, emails stripped
    #[serde(rename = "CompanyAffiliations")]
    pub company_affiliations: Vec<String>,
    #[serde(rename = "CorrespondingAuthorEmail")]
    pub corresponding_author_email: String,
}

impl ExtractedPaper {
    /// Whether any pharma/biotech affiliation was found
    pub fn has_company_affiliation(&self) -> bool {
        !is_sentinel_list(&self.company_affiliations)
    }
}

/// `["N/A"]` when `items` is empty
pub fn or_sentinel_list(items: Vec<String>) -> Vec<String> {
    if items.is_empty() {
        vec![NOT_AVAILABLE.to_string()]
    } else {
        items
    }
}

fn is_sentinel_list(items: &[String]) -> bool {
    matches!(items, [only] if only == NOT_AVAILABLE)
}

impl fmt::Display for ExtractedPaper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PubMedID: {}", self.pubmed_id)?;
        writeln!(f, "Title: {}", self.title)?;
        writeln!(f, "PublicationDate: {}", self.publication_date)?;
        writeln!(f, "Authors: {}", self.authors.join("; "))?;
        writeln!(f, "CompanyAffiliations: {}", self.company_affiliations.join("; "))?;
        write!(f, "CorrespondingAuthorEmail: {}", self.corresponding_author_email)
    }
}
