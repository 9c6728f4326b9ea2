//! Pharmapub PubMed - E-utilities client and record parser
//!
//! Resolves a search query to PMIDs with `esearch`, fetches each record
//! with `efetch`, and parses the XML into [`PaperRecord`]s.
//!
//! # Example
//!
//! ```ignore
//! use pharmapub_pubmed::{Config, EutilsClient, PaperSource};
//!
//! let client = EutilsClient::new(Config::default());
//! for pmid in client.resolve_ids("cancer immunotherapy", 10) {
//!     if let Some(record) = client.fetch_record(&pmid) {
//!         println!("{}: {:?}", record.pmid, record.title);
//!     }
//! }
//! ```

pub mod config;
pub mod eutils;
pub mod parser;
pub mod source;

// Re-exports
pub use config::Config;
pub use eutils::EutilsClient;
pub use parser::{Author, PaperRecord, PubDate, parse_esearch_ids, parse_pubmed_xml};
pub use source::PaperSource;
