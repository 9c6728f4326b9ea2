//! Affiliation classifier interface and backend selection

use pharmapub_core::FetchError;
use serde::Deserialize;

use crate::keywords::{KeywordSet, is_academic, is_pharma_biotech};
use crate::llm::OllamaClassifier;

/// Error from a classifier backend.
///
/// The keyword backend never fails; remote backends surface transport
/// and protocol problems here.
#[derive(Debug)]
pub enum ClassifyError {
    /// Request to the backend failed
    Backend(FetchError),
    /// Backend answered, but not in the expected shape
    UnexpectedReply(String),
}

impl std::fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend(e) => write!(f, "classifier backend: {e}"),
            Self::UnexpectedReply(body) => write!(f, "unexpected classifier reply: {body}"),
        }
    }
}

impl std::error::Error for ClassifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Backend(e) => Some(e),
            Self::UnexpectedReply(_) => None,
        }
    }
}

impl From<FetchError> for ClassifyError {
    fn from(e: FetchError) -> Self {
        Self::Backend(e)
    }
}

/// Decides whether affiliation text is academic and/or pharma/biotech.
pub trait AffiliationClassifier {
    /// Short backend label for logs
    fn name(&self) -> &str;

    fn is_academic(&self, text: &str) -> Result<bool, ClassifyError>;

    fn is_pharma_biotech(&self, text: &str) -> Result<bool, ClassifyError>;
}

/// Substring matching against two injected keyword sets
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    academic: KeywordSet,
    pharma_biotech: KeywordSet,
}

impl KeywordClassifier {
    pub fn new(academic: KeywordSet, pharma_biotech: KeywordSet) -> Self {
        Self {
            academic,
            pharma_biotech,
        }
    }

    pub fn academic_keywords(&self) -> &KeywordSet {
        &self.academic
    }

    pub fn pharma_biotech_keywords(&self) -> &KeywordSet {
        &self.pharma_biotech
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(KeywordSet::academic(), KeywordSet::pharma_biotech())
    }
}

impl AffiliationClassifier for KeywordClassifier {
    fn name(&self) -> &str {
        "keyword"
    }

    fn is_academic(&self, text: &str) -> Result<bool, ClassifyError> {
        Ok(is_academic(text, &self.academic))
    }

    fn is_pharma_biotech(&self, text: &str) -> Result<bool, ClassifyError> {
        Ok(is_pharma_biotech(text, &self.pharma_biotech))
    }
}

/// Which classifier implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierBackend {
    #[default]
    Keyword,
    Llm,
}

/// Classifier settings (the `[classifier]` config section)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub backend: ClassifierBackend,
    /// Ollama model for the `llm` backend
    pub model: String,
    /// Ollama server for the `llm` backend
    pub ollama_url: String,
    /// Replaces the default academic markers when set
    pub academic_keywords: Option<Vec<String>>,
    /// Replaces the default pharma/biotech markers when set
    pub pharma_biotech_keywords: Option<Vec<String>>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            backend: ClassifierBackend::Keyword,
            model: "llama3:8b".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            academic_keywords: None,
            pharma_biotech_keywords: None,
        }
    }
}

impl ClassifierConfig {
    pub fn academic_set(&self) -> KeywordSet {
        self.academic_keywords
            .as_ref()
            .map_or_else(KeywordSet::academic, |k| KeywordSet::new(k.iter().cloned()))
    }

    pub fn pharma_biotech_set(&self) -> KeywordSet {
        self.pharma_biotech_keywords
            .as_ref()
            .map_or_else(KeywordSet::pharma_biotech, |k| {
                KeywordSet::new(k.iter().cloned())
            })
    }
}

/// Build the classifier selected by `config`
pub fn build_classifier(config: &ClassifierConfig) -> Box<dyn AffiliationClassifier> {
    match config.backend {
        ClassifierBackend::Keyword => {
            let classifier =
                KeywordClassifier::new(config.academic_set(), config.pharma_biotech_set());
            log::debug!(
                "Keyword classifier: {} academic, {} pharma/biotech markers",
                classifier.academic_keywords().len(),
                classifier.pharma_biotech_keywords().len()
            );
            Box::new(classifier)
        }
        ClassifierBackend::Llm => {
            let classifier = OllamaClassifier::new(&config.ollama_url, &config.model);
            log::info!(
                "LLM classifier: model {} at {}",
                classifier.model(),
                classifier.base_url()
            );
            Box::new(classifier)
        }
    }
}
