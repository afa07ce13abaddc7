use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use url::Url;

use crate::collect::request::AnalysisRequest;
use crate::collect::response::{parse_success_body, status_failure, AnalysisResult};
use crate::config::ServiceSettings;
use crate::error::{ConfigError, RequestFailure};

/// Remote analysis service contract.
///
/// One call, one outbound request: implementations must not retry.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, RequestFailure>;
}

/// Sentinel-2 analysis service reached over HTTP
///
/// Sends `POST {base_url}{percentage_path}?evi=true` (or `ndvi=true`) with the
/// JSON request body and parses the composite image and percentages.
#[derive(Debug, Clone)]
pub struct HttpAnalysisService {
    client: Client,
    endpoint: Url,
}

impl HttpAnalysisService {
    pub fn new(settings: &ServiceSettings) -> Result<Self, ConfigError> {
        Self::with_client(settings, Client::new())
    }

    /// Use a preconfigured `reqwest` client (proxy, TLS, timeouts)
    pub fn with_client(settings: &ServiceSettings, client: Client) -> Result<Self, ConfigError> {
        let endpoint = Self::endpoint_url(&settings.base_url, &settings.percentage_path)?;
        Ok(HttpAnalysisService { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn endpoint_url(base_url: &str, path: &str) -> Result<Url, ConfigError> {
        let invalid = |source| ConfigError::InvalidUrl {
            url: format!("{}{}", base_url, path),
            source,
        };
        let base = Url::parse(base_url).map_err(invalid)?;
        base.join(path).map_err(invalid)
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisService {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, RequestFailure> {
        let mut url = self.endpoint.clone();
        let (key, value) = request.index_choice.query_param();
        url.query_pairs_mut().append_pair(key, value);

        debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .json(&request.body())
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(status_failure(status.as_u16(), &bytes));
        }

        parse_success_body(&bytes)
    }
}
