//! Pharmapub Filter - affiliation classification and paper extraction
//!
//! Classifies author affiliations as academic or pharma/biotech, extracts
//! the non-academic authors and company affiliations of each record, and
//! writes the results as CSV.
//!
//! # Example
//!
//! ```ignore
//! use pharmapub_filter::{Extractor, Pipeline, write_csv};
//! use pharmapub_pubmed::{Config, EutilsClient};
//!
//! let client = EutilsClient::new(Config::default());
//! let extractor = Extractor::default();
//! let papers = Pipeline::new(&client, &extractor).fetch_all_papers("cancer", 10);
//! write_csv(&papers, "papers.csv".as_ref())?;
//! ```

pub mod classifier;
pub mod export;
pub mod extract;
pub mod keywords;
pub mod llm;
pub mod paper;
pub mod pipeline;

// Re-exports
pub use classifier::{
    AffiliationClassifier, ClassifierBackend, ClassifierConfig, ClassifyError, KeywordClassifier,
    build_classifier,
};
pub use export::{read_csv, read_csv_from, write_csv, write_csv_to};
pub use extract::Extractor;
pub use keywords::{KeywordSet, is_academic, is_pharma_biotech};
pub use llm::OllamaClassifier;
pub use paper::{ExtractedPaper, FIELD_NAMES, NOT_AVAILABLE};
pub use pipeline::{DEFAULT_MAX_RESULTS, Pipeline, RunOutput, Summary};
