//! E-utilities client configuration

/// Runtime configuration for the PubMed E-utilities client
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL for E-utilities (esearch.fcgi / efetch.fcgi live below it)
    pub base_url: String,
    /// NCBI API key (raises the rate limit from 3 to 10 requests/sec)
    pub api_key: Option<String>,
    /// `tool` parameter identifying this client to NCBI
    pub tool: String,
    /// Contact `email` parameter requested by NCBI usage policy
    pub email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/".to_string(),
            api_key: std::env::var("NCBI_API_KEY").ok(),
            tool: "pharmapub".to_string(),
            email: None,
        }
    }
}

impl Config {
    /// Full URL of an E-utility endpoint, e.g. `endpoint("esearch")`
    pub fn endpoint(&self, utility: &str) -> String {
        format!("{}/{utility}.fcgi", self.base_url.trim_end_matches('/'))
    }

    /// Parameters shared by every request
    pub fn common_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("db", "pubmed".to_string()), ("tool", self.tool.clone())];
        if let Some(email) = &self.email {
            params.push(("email", email.clone()));
        }
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }
        params
    }
}
