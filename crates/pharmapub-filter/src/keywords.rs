//! Keyword sets and substring classification of affiliation text

/// Markers of an academic affiliation
pub const ACADEMIC_KEYWORDS: &[&str] = &[
    "University",
    "College",
    "Institute",
    "Academy",
    "School",
    "Faculty",
    "Academician",
    "PhD",
    "Professor",
];

/// Markers of a pharmaceutical or biotech affiliation
pub const PHARMA_BIOTECH_KEYWORDS: &[&str] = &[
    "Pharmaceutical",
    "Biotech",
    "Biotechnology",
    "Pharma",
    "Biopharma",
    "Med",
    "Healthcare",
    "Bio",
    "Genetics",
    "Drug",
    "Therapeutics",
    "Vaccine",
    "Diagnostics",
    "Clinical",
    "Development",
    "Manufacturing",
];

/// Immutable set of case-insensitive substring markers.
///
/// Lowercased forms are computed once at construction; empty keywords are
/// dropped since they would match every text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    keywords: Vec<String>,
    lowered: Vec<String>,
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keywords: Vec<String> = keywords
            .into_iter()
            .map(Into::into)
            .filter(|k| !k.trim().is_empty())
            .collect();
        let lowered = keywords.iter().map(|k| k.to_lowercase()).collect();
        Self { keywords, lowered }
    }

    /// Default academic markers
    pub fn academic() -> Self {
        Self::new(ACADEMIC_KEYWORDS.iter().copied())
    }

    /// Default pharma/biotech markers
    pub fn pharma_biotech() -> Self {
        Self::new(PHARMA_BIOTECH_KEYWORDS.iter().copied())
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// First keyword (in set order) contained in `text`, ignoring case
    pub fn find_match(&self, text: &str) -> Option<&str> {
        if text.is_empty() {
            return None;
        }
        let text = text.to_lowercase();
        self.lowered
            .iter()
            .position(|k| text.contains(k.as_str()))
            .map(|i| self.keywords[i].as_str())
    }

    pub fn matches(&self, text: &str) -> bool {
        self.find_match(text).is_some()
    }
}

/// Whether `text` mentions any academic marker
pub fn is_academic(text: &str, academic_keywords: &KeywordSet) -> bool {
    match academic_keywords.find_match(text) {
        Some(keyword) => {
            log::trace!("Academic marker {keyword:?} in {text:?}");
            true
        }
        None => {
            log::debug!("Affiliation is not academic: {text:?}");
            false
        }
    }
}

/// Whether `text` mentions any pharma/biotech marker
pub fn is_pharma_biotech(text: &str, pharma_biotech_keywords: &KeywordSet) -> bool {
    match pharma_biotech_keywords.find_match(text) {
        Some(keyword) => {
            log::trace!("Pharma/biotech marker {keyword:?} in {text:?}");
            true
        }
        None => {
            log::debug!("Affiliation is not pharma/biotech: {text:?}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sets_match_published_lists() {
        assert_eq!(KeywordSet::academic().len(), 9);
        assert_eq!(KeywordSet::pharma_biotech().len(), 16);
        assert_eq!(KeywordSet::academic().keywords()[0], "University");
        assert_eq!(KeywordSet::pharma_biotech().keywords()[15], "Manufacturing");
    }

    #[test]
    fn academic_case_insensitive() {
        let academic = KeywordSet::academic();
        assert!(is_academic("UNIVERSITY of X", &academic));
        assert!(is_academic("university of x", &academic));
        assert!(is_academic("Harvard Medical School, Boston", &academic));
        assert!(is_academic("phd candidate, Dept. of Biology", &academic));
    }

    #[test]
    fn academic_false_without_keyword() {
        let academic = KeywordSet::academic();
        assert!(!is_academic("Pfizer Inc., New York, NY", &academic));
        assert!(!is_academic("Genentech, South San Francisco", &academic));
    }

    #[test]
    fn pharma_case_insensitive() {
        let pharma = KeywordSet::pharma_biotech();
        assert!(is_pharma_biotech("ACME PHARMA Inc.", &pharma));
        assert!(is_pharma_biotech("Moderna Therapeutics, Cambridge", &pharma));
        assert!(is_pharma_biotech("Roche Diagnostics GmbH", &pharma));
    }

    #[test]
    fn pharma_false_without_keyword() {
        let pharma = KeywordSet::pharma_biotech();
        assert!(!is_pharma_biotech("Department of Physics, CERN", &pharma));
        assert!(!is_pharma_biotech("Google LLC, Mountain View", &pharma));
    }

    #[test]
    fn pharma_substring_match() {
        // "Med" is a substring marker, so "Medicine" matches as well
        let pharma = KeywordSet::pharma_biotech();
        assert_eq!(
            pharma.find_match("Department of Internal Medicine"),
            Some("Med")
        );
    }

    #[test]
    fn empty_text_never_matches() {
        assert!(!is_academic("", &KeywordSet::academic()));
        assert!(!is_pharma_biotech("", &KeywordSet::pharma_biotech()));
    }

    #[test]
    fn first_keyword_in_set_order_wins() {
        let set = KeywordSet::new(["Bio", "Biotech"]);
        assert_eq!(set.find_match("Acme Biotech"), Some("Bio"));
    }

    #[test]
    fn blank_keywords_dropped() {
        let set = KeywordSet::new(["", "  ", "Lab"]);
        assert_eq!(set.len(), 1);
        assert!(!set.matches("Foundry"));
        assert!(set.matches("Bell Labs"));
    }

    #[test]
    fn empty_set_never_matches() {
        let set = KeywordSet::new(Vec::<String>::new());
        assert!(set.is_empty());
        assert!(!set.matches("University of Somewhere"));
    }
}
