//! Search, fetch, and extract orchestration

use std::time::{Duration, Instant};

use pharmapub_core::ProgressContext;
use pharmapub_pubmed::PaperSource;

use crate::extract::Extractor;
use crate::paper::ExtractedPaper;

/// Result cap when the caller does not choose one
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Counters from one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub total_ids: usize,
    pub extracted: usize,
    pub fetch_failures: usize,
    pub extract_failures: usize,
    pub elapsed: Duration,
}

impl Summary {
    pub fn empty() -> Self {
        Self {
            total_ids: 0,
            extracted: 0,
            fetch_failures: 0,
            extract_failures: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn log(&self) {
        log::info!("=== Pipeline Summary ===");
        log::info!(
            "Papers: {}/{} extracted ({} fetch failures, {} extraction failures)",
            self.extracted,
            self.total_ids,
            self.fetch_failures,
            self.extract_failures
        );
        log::info!("Time: {:.1}s", self.elapsed.as_secs_f64());
    }
}

/// Papers in identifier order plus run counters
#[derive(Debug)]
pub struct RunOutput {
    pub papers: Vec<ExtractedPaper>,
    pub summary: Summary,
}

/// Sequential search → fetch → extract over a [`PaperSource`]
pub struct Pipeline<'a> {
    source: &'a dyn PaperSource,
    extractor: &'a Extractor,
    progress: Option<&'a ProgressContext>,
}

impl<'a> Pipeline<'a> {
    pub fn new(source: &'a dyn PaperSource, extractor: &'a Extractor) -> Self {
        Self {
            source,
            extractor,
            progress: None,
        }
    }

    /// Show a record bar while fetching
    pub fn with_progress(mut self, progress: &'a ProgressContext) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Fetch and extract papers for `query`, skipping any that fail.
    pub fn fetch_all_papers(&self, query: &str, max_results: usize) -> Vec<ExtractedPaper> {
        self.run(query, max_results).papers
    }

    /// Fetch and extract one identifier; `None` when fetching or extraction fails.
    pub fn fetch_paper_details(&self, id: &str) -> Option<ExtractedPaper> {
        self.process(id).ok()
    }

    pub fn run(&self, query: &str, max_results: usize) -> RunOutput {
        let start = Instant::now();

        log::info!("Searching PubMed for {query:?} (max {max_results})");
        let ids = self.source.resolve_ids(query, max_results);
        if ids.is_empty() {
            log::warn!("No papers found for query {query:?}");
            return RunOutput {
                papers: Vec::new(),
                summary: Summary {
                    elapsed: start.elapsed(),
                    ..Summary::empty()
                },
            };
        }
        log::info!("Found {} papers", ids.len());

        let pb = match self.progress {
            Some(progress) => progress.record_bar("papers", ids.len() as u64),
            None => indicatif::ProgressBar::hidden(),
        };

        let mut papers = Vec::with_capacity(ids.len());
        let mut fetch_failures = 0;
        let mut extract_failures = 0;

        for id in &ids {
            pb.set_message(id.clone());
            match self.process(id) {
                Ok(paper) => papers.push(paper),
                Err(Failure::Fetch) => fetch_failures += 1,
                Err(Failure::Extract) => extract_failures += 1,
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        let summary = Summary {
            total_ids: ids.len(),
            extracted: papers.len(),
            fetch_failures,
            extract_failures,
            elapsed: start.elapsed(),
        };
        summary.log();

        RunOutput { papers, summary }
    }

    fn process(&self, id: &str) -> Result<ExtractedPaper, Failure> {
        let Some(record) = self.source.fetch_record(id) else {
            log::error!("PMID {id}: failed to fetch record, skipping");
            return Err(Failure::Fetch);
        };
        self.extractor.extract(id, &record).map_err(|e| {
            log::error!("PMID {id}: extraction failed, skipping: {e}");
            Failure::Extract
        })
    }
}

enum Failure {
    Fetch,
    Extract,
}
