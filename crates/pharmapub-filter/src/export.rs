//! CSV output of extracted papers
//!
//! One header row with the column names from [`FIELD_NAMES`], then one row
//! per paper. List fields are stored as JSON string arrays so they survive
//! a round trip unchanged.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::paper::{ExtractedPaper, FIELD_NAMES};

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "PubMedID")]
    pubmed_id: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "PublicationDate")]
    publication_date: String,
    #[serde(rename = "Authors")]
    authors: String,
    #[serde(rename = "CompanyAffiliations")]
    company_affiliations: String,
    #[serde(rename = "CorrespondingAuthorEmail")]
    corresponding_author_email: String,
}

impl CsvRow {
    fn from_paper(paper: &ExtractedPaper) -> Result<Self> {
        Ok(Self {
            pubmed_id: paper.pubmed_id.clone(),
            title: paper.title.clone(),
            publication_date: paper.publication_date.clone(),
            authors: serde_json::to_string(&paper.authors)?,
            company_affiliations: serde_json::to_string(&paper.company_affiliations)?,
            corresponding_author_email: paper.corresponding_author_email.clone(),
        })
    }

    fn into_paper(self) -> Result<ExtractedPaper> {
        let authors = serde_json::from_str(&self.authors)
            .with_context(|| format!("PMID {}: invalid Authors list", self.pubmed_id))?;
        let company_affiliations = serde_json::from_str(&self.company_affiliations)
            .with_context(|| {
                format!("PMID {}: invalid CompanyAffiliations list", self.pubmed_id)
            })?;
        Ok(ExtractedPaper {
            pubmed_id: self.pubmed_id,
            title: self.title,
            publication_date: self.publication_date,
            authors,
            company_affiliations,
            corresponding_author_email: self.corresponding_author_email,
        })
    }
}

/// Write `papers` to `path`, replacing any existing file.
///
/// Nothing is written, and no file is created, when `papers` is empty.
pub fn write_csv(papers: &[ExtractedPaper], path: &Path) -> Result<()> {
    if papers.is_empty() {
        log::warn!("No papers to write; {} not created", path.display());
        return Ok(());
    }
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_csv_to(papers, file)?;
    log::info!("Wrote {} papers to {}", papers.len(), path.display());
    Ok(())
}

/// Write header plus one row per paper to `writer`.
///
/// Writes nothing at all when `papers` is empty.
pub fn write_csv_to<W: Write>(papers: &[ExtractedPaper], writer: W) -> Result<()> {
    if papers.is_empty() {
        return Ok(());
    }
    let mut csv = csv::Writer::from_writer(writer);
    for paper in papers {
        csv.serialize(CsvRow::from_paper(paper)?)?;
    }
    csv.flush()?;
    Ok(())
}

pub fn read_csv(path: &Path) -> Result<Vec<ExtractedPaper>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    read_csv_from(file).with_context(|| format!("read {}", path.display()))
}

pub fn read_csv_from<R: Read>(reader: R) -> Result<Vec<ExtractedPaper>> {
    let mut csv = csv::Reader::from_reader(reader);
    let headers = csv.headers()?.clone();
    if headers.iter().ne(FIELD_NAMES) {
        anyhow::bail!("unexpected CSV header: {:?}", headers.iter().collect::<Vec<_>>());
    }
    csv.deserialize::<CsvRow>()
        .map(|row| row?.into_paper())
        .collect()
}
