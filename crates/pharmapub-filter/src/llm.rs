//! Ollama-backed affiliation classifier
//!
//! Asks a local chat model a yes/no question per affiliation. Answers are
//! memoised per (question, text) since the extractor asks about the same
//! affiliation several times.

use std::collections::HashMap;
use std::sync::Mutex;

use pharmapub_core::{FetchError, SHARED_RUNTIME, http_client, http_config, retry_with_backoff};

use crate::classifier::{AffiliationClassifier, ClassifyError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Question {
    Academic,
    PharmaBiotech,
}

impl Question {
    fn prompt(self, affiliation: &str) -> String {
        match self {
            Self::Academic => format!(
                "Is the following affiliation academic or not? Reply with only 'Yes' or 'No'.\n\nAffiliation: \"{affiliation}\""
            ),
            Self::PharmaBiotech => format!(
                "Is the following affiliation related to pharmaceutical or biotech industry? Reply with only 'Yes' or 'No'.\n\nAffiliation: \"{affiliation}\""
            ),
        }
    }
}

/// `true` iff the model's reply starts with "yes" (case-insensitive)
pub fn parse_yes_no(reply: &str) -> bool {
    reply.trim().to_lowercase().starts_with("yes")
}

/// Classifier that delegates each decision to an Ollama chat model
pub struct OllamaClassifier {
    base_url: String,
    model: String,
    cache: Mutex<HashMap<(Question, String), bool>>,
}

impl OllamaClassifier {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": &self.model,
            "messages": [{"role": "user", "content": prompt}],
            "stream": false,
            "options": {"temperature": 0},
        })
    }

    fn chat(&self, prompt: &str) -> Result<String, ClassifyError> {
        let url = self.chat_url();
        let body = self.request_body(prompt);
        let timeout = http_config().request_timeout;

        let reply: serde_json::Value = retry_with_backoff("ollama chat", &http_config().retry, || {
            SHARED_RUNTIME.block_on(async {
                http_client()
                    .post(&url)
                    .json(&body)
                    .timeout(timeout)
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(FetchError::from_reqwest)?
                    .json::<serde_json::Value>()
                    .await
                    .map_err(FetchError::from_reqwest)
            })
        })?;

        reply["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ClassifyError::UnexpectedReply(reply.to_string()))
    }

    fn ask(&self, question: Question, text: &str) -> Result<bool, ClassifyError> {
        if text.trim().is_empty() {
            return Ok(false);
        }
        let key = (question, text.to_string());
        if let Some(&answer) = self.lock_cache().get(&key) {
            return Ok(answer);
        }

        let reply = self.chat(&question.prompt(text))?;
        let answer = parse_yes_no(&reply);
        log::debug!("{question:?} {text:?} -> {reply:?}");

        self.lock_cache().insert(key, answer);
        Ok(answer)
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<(Question, String), bool>> {
        // a poisoned cache only loses memoised answers
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl AffiliationClassifier for OllamaClassifier {
    fn name(&self) -> &str {
        "ollama"
    }

    fn is_academic(&self, text: &str) -> Result<bool, ClassifyError> {
        self.ask(Question::Academic, text)
    }

    fn is_pharma_biotech(&self, text: &str) -> Result<bool, ClassifyError> {
        self.ask(Question::PharmaBiotech, text)
    }
}
