use crate::errors::{Error, Result};
use reqwest::{Client, Method, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP transport for one engine instance.
///
/// The base URL is injected at construction time so multiple upstream
/// targets can coexist (there is no process-wide lookup). The transport
/// issues exactly one request per call and classifies the outcome; it
/// never retries.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    base_url: Url,
}

/// Raw outcome of a single request that reached the engine: the status
/// code plus the response body if it parsed as JSON.
#[derive(Debug)]
pub(crate) struct Reply {
    pub url: Url,
    pub status: u16,
    pub payload: Option<Value>,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Succeed with the payload, or map a non-2xx status to `UpstreamHttp`.
    pub fn into_success(self) -> Result<Value> {
        if self.is_success() {
            Ok(self.payload.unwrap_or(Value::Null))
        } else {
            Err(Error::UpstreamHttp {
                url: self.url.to_string(),
                status: self.status,
                body: self.payload,
            })
        }
    }
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|source| Error::BaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        if parsed.cannot_be_a_base() {
            return Err(Error::BaseUrl {
                url: base_url.to_string(),
                source: url::ParseError::RelativeUrlWithoutBase,
            });
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| Error::Transport {
                url: base_url.to_string(),
                source,
            })?;
        Ok(Self {
            http,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL from path segments. Segments are appended via
    /// `path_segments_mut`, which percent-encodes them.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Issue one request and classify the outcome. A connect/send failure
    /// becomes `Error::Transport`; any received response (2xx or not) is
    /// returned as a `Reply` for the caller to interpret.
    pub(crate) async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> Result<Reply> {
        debug!(%method, %url, "engine request");
        let mut request = self.http.request(method, url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(|source| Error::Transport {
            url: url.to_string(),
            source,
        })?;
        let status = response.status().as_u16();
        let payload = response.json::<Value>().await.ok();
        debug!(%url, status, "engine response");
        Ok(Reply {
            url,
            status,
            payload,
        })
    }

    pub(crate) async fn get(&self, segments: &[&str]) -> Result<Value> {
        self.send(Method::GET, self.endpoint(segments), None)
            .await?
            .into_success()
    }

    pub(crate) async fn post(&self, segments: &[&str], body: &Value) -> Result<Value> {
        self.send(Method::POST, self.endpoint(segments), Some(body))
            .await?
            .into_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_percent_encodes_segments() {
        let transport = HttpTransport::new("http://localhost:3000").unwrap();
        let url = transport.endpoint(&["c", "addr with space", "query"]);
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/c/addr%20with%20space/query"
        );
    }

    #[test]
    fn endpoint_preserves_base_path() {
        let transport = HttpTransport::new("http://localhost:3000/engine").unwrap();
        let url = transport.endpoint(&["api", "root-context"]);
        assert_eq!(url.as_str(), "http://localhost:3000/engine/api/root-context");
    }

    #[test]
    fn rejects_unparseable_base_url() {
        assert!(matches!(
            HttpTransport::new("not a url"),
            Err(Error::BaseUrl { .. })
        ));
    }
}
