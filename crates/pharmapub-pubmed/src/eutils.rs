//! PubMed E-utilities client (esearch + efetch)

use pharmapub_core::{FetchError, get_text, http_config, retry_with_backoff};

use crate::config::Config;
use crate::parser::{PaperRecord, parse_esearch_ids, parse_pubmed_xml};
use crate::source::PaperSource;

/// Blocking E-utilities client backed by the shared HTTP client
#[derive(Debug, Clone, Default)]
pub struct EutilsClient {
    config: Config,
}

impl EutilsClient {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Query parameters for an esearch call
    fn esearch_params(&self, query: &str, max_results: usize) -> Vec<(&'static str, String)> {
        let mut params = self.config.common_params();
        params.push(("term", query.to_string()));
        params.push(("retmax", max_results.to_string()));
        params.push(("usehistory", "y".to_string()));
        params.push(("retmode", "xml".to_string()));
        params
    }

    /// Query parameters for an efetch call
    fn efetch_params(&self, id: &str) -> Vec<(&'static str, String)> {
        let mut params = self.config.common_params();
        params.push(("id", id.to_string()));
        params.push(("retmode", "xml".to_string()));
        params
    }

    /// Search PubMed and return up to `max_results` PMIDs.
    pub fn esearch(&self, query: &str, max_results: usize) -> Result<Vec<String>, FetchError> {
        let url = self.config.endpoint("esearch");
        let params = self.esearch_params(query, max_results);
        log::debug!("esearch term={query:?} retmax={max_results}");

        let body = retry_with_backoff("esearch", &http_config().retry, || {
            get_text(&url, &params)
        })?;
        let mut ids = parse_esearch_ids(&body).map_err(|e| FetchError::Parse(format!("{e:#}")))?;
        ids.truncate(max_results);
        Ok(ids)
    }

    /// Fetch and parse the record for one PMID.
    ///
    /// `Ok(None)` when the response holds no `<PubmedArticle>`.
    pub fn efetch(&self, id: &str) -> Result<Option<PaperRecord>, FetchError> {
        let url = self.config.endpoint("efetch");
        let params = self.efetch_params(id);
        let label = format!("efetch {id}");

        let body = retry_with_backoff(&label, &http_config().retry, || get_text(&url, &params))?;
        let records = parse_pubmed_xml(&body).map_err(|e| FetchError::Parse(format!("{e:#}")))?;
        if records.len() > 1 {
            log::debug!("{label}: {} articles in response, using first", records.len());
        }
        Ok(records.into_iter().next())
    }
}

impl PaperSource for EutilsClient {
    fn resolve_ids(&self, query: &str, max_results: usize) -> Vec<String> {
        match self.esearch(query, max_results) {
            Ok(ids) => {
                log::info!("esearch returned {} PMIDs for {query:?}", ids.len());
                ids
            }
            Err(e) => {
                log::error!("Failed to search PubMed for {query:?}: {e}");
                Vec::new()
            }
        }
    }

    fn fetch_record(&self, id: &str) -> Option<PaperRecord> {
        match self.efetch(id) {
            Ok(Some(record)) => {
                log::debug!("Fetched record for PMID {id}");
                Some(record)
            }
            Ok(None) => {
                log::error!("No article in efetch response for PMID {id}");
                None
            }
            Err(e) => {
                log::error!("Failed to fetch PMID {id}: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> EutilsClient {
        EutilsClient::new(Config {
            api_key: None,
            ..Default::default()
        })
    }

    fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn esearch_params_bound_results() {
        let params = client().esearch_params("cancer immunotherapy", 10);
        assert_eq!(param(&params, "db"), Some("pubmed"));
        assert_eq!(param(&params, "term"), Some("cancer immunotherapy"));
        assert_eq!(param(&params, "retmax"), Some("10"));
        assert_eq!(param(&params, "usehistory"), Some("y"));
        assert_eq!(param(&params, "retmode"), Some("xml"));
        assert_eq!(param(&params, "api_key"), None);
    }

    #[test]
    fn efetch_params_single_id() {
        let params = client().efetch_params("38000001");
        assert_eq!(param(&params, "id"), Some("38000001"));
        assert_eq!(param(&params, "retmode"), Some("xml"));
    }

    #[test]
    fn unreachable_host_yields_empty_results() {
        // Nothing listens on the discard port: connection refused
        let client = EutilsClient::new(Config {
            base_url: "http://127.0.0.1:9/eutils/".to_string(),
            api_key: None,
            ..Default::default()
        });
        pharmapub_core::set_http_config(pharmapub_core::HttpConfig {
            request_timeout: std::time::Duration::from_secs(2),
            retry: pharmapub_core::RetryPolicy {
                max_retries: 0,
                base_delay: std::time::Duration::from_millis(1),
            },
        });
        assert!(client.resolve_ids("anything", 5).is_empty());
        assert!(client.fetch_record("1").is_none());
    }
}
