use reqwest::{Client, RequestBuilder, Response};
use thiserror::Error;
use tracing::{debug, warn};

/// Transport-level failures. HTTP error statuses are not transport failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("All {attempts} routes failed, last error: {last}")]
    Exhausted { attempts: usize, last: String },
}

impl TransportError {
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::ConnectionFailed(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

/// Ordered proxy endpoints plus the index to try first.
///
/// A plain value: callers hold it and replace it with the rotation returned
/// by a successful request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyRotation {
    endpoints: Vec<String>,
    index: usize,
}

impl ProxyRotation {
    pub fn new(endpoints: Vec<String>) -> Self {
        Self { endpoints, index: 0 }
    }

    /// Rotation without any proxy, requests only go direct.
    pub fn direct_only() -> Self {
        Self::default()
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn current(&self) -> Option<&str> {
        self.endpoints.get(self.index).map(String::as_str)
    }

    /// Same endpoints, pointing at the next one (wrapping).
    pub fn advance(&self) -> Self {
        self.at(self.index + 1)
    }

    fn at(&self, index: usize) -> Self {
        let index = if self.endpoints.is_empty() {
            0
        } else {
            index % self.endpoints.len()
        };
        Self {
            endpoints: self.endpoints.clone(),
            index,
        }
    }

    /// Every endpoint once, starting from the current index.
    pub fn attempts(&self) -> impl Iterator<Item = ProxyRotation> + '_ {
        (0..self.endpoints.len()).map(move |offset| self.at(self.index + offset))
    }
}

/// URL of `target` routed through a prefix-style proxy endpoint.
pub fn proxied_url(endpoint: &str, target: &str) -> String {
    format!("{}{}", endpoint, urlencoding::encode(target))
}

/// A response together with the route that produced it.
#[derive(Debug)]
pub struct FallbackResponse {
    pub response: Response,
    /// Proxy endpoint used, `None` for a direct hit.
    pub via: Option<String>,
    /// Rotation to keep for the next request.
    pub rotation: ProxyRotation,
}

/// Send a request directly, then through each proxy on transport failure.
///
/// `build` is called once per attempt with the URL to hit, so headers and
/// bodies are rebuilt for every route.
pub async fn send_with_fallback<F>(
    client: &Client,
    target: &str,
    rotation: &ProxyRotation,
    build: F,
) -> Result<FallbackResponse, TransportError>
where
    F: Fn(&Client, &str) -> RequestBuilder,
{
    let mut last = match build(client, target).send().await {
        Ok(response) => {
            return Ok(FallbackResponse {
                response,
                via: None,
                rotation: rotation.clone(),
            })
        }
        Err(e) => {
            let err = TransportError::from_reqwest(&e);
            if rotation.is_empty() {
                return Err(err);
            }
            warn!("Direct request to {} failed: {}, trying proxies", target, err);
            err
        }
    };

    let mut attempts = 1;
    for attempt in rotation.attempts() {
        let Some(endpoint) = attempt.current() else {
            break;
        };
        attempts += 1;
        let url = proxied_url(endpoint, target);
        match build(client, &url).send().await {
            Ok(response) => {
                debug!("Request to {} succeeded via proxy {}", target, endpoint);
                return Ok(FallbackResponse {
                    response,
                    via: Some(endpoint.to_string()),
                    rotation: attempt.clone(),
                });
            }
            Err(e) => {
                last = TransportError::from_reqwest(&e);
                warn!("Proxy {} failed for {}: {}", endpoint, target, last);
            }
        }
    }

    Err(TransportError::Exhausted {
        attempts,
        last: last.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{path_and_query, unreachable_url};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn rotation(n: usize) -> ProxyRotation {
        ProxyRotation::new(
            (0..n)
                .map(|i| format!("http://proxy{}.local/?url=", i))
                .collect(),
        )
    }

    #[test]
    fn test_advance_wraps() {
        let r = rotation(3);
        assert_eq!(r.index(), 0);
        assert_eq!(r.advance().index(), 1);
        assert_eq!(r.advance().advance().advance().index(), 0);
        assert_eq!(r.advance().current(), Some("http://proxy1.local/?url="));
    }

    #[test]
    fn test_advance_empty_rotation() {
        let r = ProxyRotation::direct_only();
        assert_eq!(r.advance(), r);
        assert!(r.current().is_none());
        assert_eq!(r.attempts().count(), 0);
    }

    #[test]
    fn test_attempts_start_at_index() {
        let r = rotation(3).advance().advance();
        let order: Vec<usize> = r.attempts().map(|a| a.index()).collect();
        assert_eq!(order, vec![2, 0, 1]);
    }

    #[test]
    fn test_proxied_url_encodes_target() {
        assert_eq!(
            proxied_url("https://proxy.example/?", "https://api.example/a?b=1"),
            "https://proxy.example/?https%3A%2F%2Fapi.example%2Fa%3Fb%3D1"
        );
    }

    #[tokio::test]
    async fn test_direct_success_keeps_rotation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(1)
            .mount(&server)
            .await;
        let client = Client::new();
        let r = rotation(2).advance();
        let target = format!("{}/ping", server.uri());

        let result = send_with_fallback(&client, &target, &r, |c, url| c.get(url))
            .await
            .unwrap();

        assert!(result.via.is_none());
        assert_eq!(result.rotation, r);
        assert_eq!(result.response.status().as_u16(), 200);
    }

    #[tokio::test]
    async fn test_falls_back_to_proxy_on_connect_failure() {
        let dead = unreachable_url();
        let proxy = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"ok\":true}"))
            .mount(&proxy)
            .await;
        let proxy_prefix = format!("{}/?url=", proxy.uri());
        let r = ProxyRotation::new(vec![
            format!("{}/?url=", unreachable_url()),
            proxy_prefix.clone(),
        ]);
        let client = Client::new();
        let target = format!("{}/torrents", dead);

        let result = send_with_fallback(&client, &target, &r, |c, url| c.get(url))
            .await
            .unwrap();

        assert_eq!(result.via.as_deref(), Some(proxy_prefix.as_str()));
        assert_eq!(result.rotation.index(), 1);

        let requests = proxy.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(path_and_query(&requests[0]).contains(&*urlencoding::encode(&target)));
    }

    #[tokio::test]
    async fn test_http_error_status_does_not_rotate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/x"))
            .respond_with(ResponseTemplate::new(503).set_body_string("{}"))
            .mount(&server)
            .await;
        let client = Client::new();
        let r = rotation(2);
        let target = format!("{}/x", server.uri());

        let result = send_with_fallback(&client, &target, &r, |c, url| c.get(url))
            .await
            .unwrap();

        assert!(result.via.is_none());
        assert_eq!(result.response.status().as_u16(), 503);
    }

    #[tokio::test]
    async fn test_exhausted_when_every_route_fails() {
        let r = ProxyRotation::new(vec![format!("{}/?", unreachable_url())]);
        let client = Client::new();
        let target = format!("{}/x", unreachable_url());

        let err = send_with_fallback(&client, &target, &r, |c, url| c.get(url))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Exhausted { attempts: 2, .. }));
    }

    #[tokio::test]
    async fn test_no_proxies_returns_direct_error() {
        let client = Client::new();
        let target = format!("{}/x", unreachable_url());

        let err = send_with_fallback(&client, &target, &ProxyRotation::direct_only(), |c, url| {
            c.get(url)
        })
        .await
        .unwrap_err();

        assert!(matches!(err, TransportError::ConnectionFailed(_)));
    }
}
