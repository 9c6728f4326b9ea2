//! get-papers-list - PubMed papers with pharma/biotech-affiliated authors
//!
//! Searches PubMed, keeps the non-academic authors and company affiliations
//! of each hit, and prints them or writes them as CSV.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use pharmapub_core::ProgressContext;
use pharmapub_filter::{ClassifierBackend, DEFAULT_MAX_RESULTS, Extractor, Pipeline};
use pharmapub_pubmed::EutilsClient;

mod config;
mod render;

use config::Config;

#[derive(Parser, Debug)]
#[command(name = "get-papers-list")]
#[command(about = "Fetch PubMed papers with pharmaceutical or biotech affiliated authors")]
#[command(version)]
struct Cli {
    /// PubMed search query
    query: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Save results as CSV to this file instead of printing them
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Maximum number of papers to fetch
    #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_RESULTS)]
    max_results: usize,

    /// Affiliation classifier (default: from config, else keyword)
    #[arg(long, value_enum)]
    classifier: Option<ClassifierChoice>,

    /// Ollama model for the llm classifier
    #[arg(long)]
    model: Option<String>,

    /// Config file path (default: ./pharmapub.toml or ~/.config/pharmapub/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum, Debug)]
enum ClassifierChoice {
    /// Case-insensitive keyword matching
    Keyword,
    /// Local Ollama chat model
    Llm,
}

impl From<ClassifierChoice> for ClassifierBackend {
    fn from(c: ClassifierChoice) -> Self {
        match c {
            ClassifierChoice::Keyword => ClassifierBackend::Keyword,
            ClassifierChoice::Llm => ClassifierBackend::Llm,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let progress = ProgressContext::new();

    // Logging:
    //   TTY:     quiet (warn) unless --debug, the progress bar shows activity
    //   non-TTY: info unless --debug, logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = is_tty && !cli.debug;
    pharmapub_core::init_logging(quiet, cli.debug, multi);
    log::debug!("Arguments: {cli:?}");

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    // CLI flags override config file values
    if let Some(choice) = cli.classifier {
        config.classifier.backend = choice.into();
    }
    if let Some(model) = cli.model {
        config.classifier.model = model;
    }
    anyhow::ensure!(cli.max_results > 0, "--max-results must be at least 1");

    pharmapub_core::set_http_config(config.http.http_config());

    let client = EutilsClient::new(config.pubmed.client_config());
    log::debug!("E-utilities endpoint: {}", client.config().base_url);
    let extractor = Extractor::new(pharmapub_filter::build_classifier(&config.classifier));
    log::info!(
        "Fetching papers for query {:?} with the {} classifier",
        cli.query,
        extractor.classifier().name()
    );

    let output = Pipeline::new(&client, &extractor)
        .with_progress(&progress)
        .run(&cli.query, cli.max_results);
    let with_company = output
        .papers
        .iter()
        .filter(|p| p.has_company_affiliation())
        .count();
    log::info!(
        "Found {} relevant papers ({with_company} with company affiliations)",
        output.papers.len()
    );

    match &cli.file {
        Some(path) => {
            pharmapub_filter::write_csv(&output.papers, path)?;
            render::print_summary(&output.summary);
        }
        None => render::print_papers(&output.papers),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::try_parse_from(["get-papers-list", "cancer"]).unwrap();
        assert_eq!(cli.query, "cancer");
        assert!(!cli.debug);
        assert!(cli.file.is_none());
        assert_eq!(cli.max_results, 10);
        assert!(cli.classifier.is_none());
    }

    #[test]
    fn cli_short_flags() {
        let cli = Cli::try_parse_from([
            "get-papers-list",
            "-d",
            "-f",
            "out.csv",
            "-n",
            "25",
            "--classifier",
            "llm",
            "covid vaccine",
        ])
        .unwrap();
        assert!(cli.debug);
        assert_eq!(cli.file, Some(PathBuf::from("out.csv")));
        assert_eq!(cli.max_results, 25);
        assert_eq!(
            ClassifierBackend::from(cli.classifier.unwrap()),
            ClassifierBackend::Llm
        );
        assert_eq!(cli.query, "covid vaccine");
    }

    #[test]
    fn cli_requires_query() {
        assert!(Cli::try_parse_from(["get-papers-list"]).is_err());
    }

    #[test]
    fn cli_rejects_unknown_classifier() {
        assert!(Cli::try_parse_from(["get-papers-list", "--classifier", "magic", "q"]).is_err());
    }
}
