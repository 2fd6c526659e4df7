//! HTTP transport: one GET returning parsed JSON or a typed failure

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::Value;
use std::error::Error as StdError;
use std::time::Duration;

use crate::shared::errors::{AppError, FetchError};

/// Certificate verification mode for a single request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TlsMode {
    Verified,
    Insecure,
}

/// Базовый trait для HTTP транспорта
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// One GET round-trip. Never panics, every failure is a `FetchError`.
    async fn get_json(&self, url: &str, tls: TlsMode) -> Result<Value, FetchError>;
}

/// reqwest-backed transport. Both clients share the timeout and are safe to
/// use from concurrent chain pipelines.
pub struct ReqwestTransport {
    verified: Client,
    insecure: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let user_agent = concat!("poolscope/", env!("CARGO_PKG_VERSION"));

        let verified = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| AppError::HttpClientError(format!("Failed to build HTTP client: {}", e)))?;

        let insecure = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| AppError::HttpClientError(format!("Failed to build insecure HTTP client: {}", e)))?;

        Ok(Self { verified, insecure })
    }

    fn client(&self, tls: TlsMode) -> &Client {
        match tls {
            TlsMode::Verified => &self.verified,
            TlsMode::Insecure => &self.insecure,
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get_json(&self, url: &str, tls: TlsMode) -> Result<Value, FetchError> {
        let response = self
            .client(tls)
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.bytes().await.map_err(classify)?;
        serde_json::from_slice::<Value>(&body).map_err(|e| FetchError::MalformedPayload(e.to_string()))
    }
}

/// Map a reqwest failure onto the fetch taxonomy
fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Network(format!("timeout: {}", err))
    } else if is_certificate_failure(&err) {
        FetchError::Certificate(err.to_string())
    } else if err.is_decode() {
        FetchError::MalformedPayload(err.to_string())
    } else {
        FetchError::Network(err.to_string())
    }
}

const CERTIFICATE_MARKERS: [&str; 5] = [
    "certificate",
    "cert verify",
    "self signed",
    "self-signed",
    "unknownissuer",
];

/// TLS backends don't expose a typed validation error through reqwest,
/// so the causes below the top-level error are inspected. The top level
/// carries the request URL and is never matched.
fn is_certificate_failure(err: &(dyn StdError + 'static)) -> bool {
    let mut source = err.source();
    while let Some(current) = source {
        let text = current.to_string().to_lowercase();
        if CERTIFICATE_MARKERS.iter().any(|marker| text.contains(marker)) {
            return true;
        }
        source = current.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport(timeout_ms: u64) -> ReqwestTransport {
        ReqwestTransport::new(Duration::from_millis(timeout_ms)).unwrap()
    }

    #[tokio::test]
    async fn test_success_returns_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/getPools/ethereum/main"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "poolData": [ { "address": "0xabc" } ] }
            })))
            .mount(&server)
            .await;

        let url = format!("{}/api/getPools/ethereum/main", server.uri());
        let body = transport(2_000).get_json(&url, TlsMode::Verified).await.unwrap();
        assert_eq!(body["data"]["poolData"][0]["address"], "0xabc");
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = transport(2_000).get_json(&server.uri(), TlsMode::Verified).await.unwrap_err();
        assert_eq!(err, FetchError::HttpStatus(503));
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let err = transport(2_000).get_json(&server.uri(), TlsMode::Insecure).await.unwrap_err();
        assert!(matches!(err, FetchError::MalformedPayload(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(1_500)))
            .mount(&server)
            .await;

        let err = transport(100).get_json(&server.uri(), TlsMode::Verified).await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }

    /// Address nothing listens on
    fn closed_port_url(path: &str) -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}{}", addr, path)
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let err = transport(2_000)
            .get_json(&closed_port_url("/api/getPools/ethereum/main"), TlsMode::Verified)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Network(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_certificate_words_in_url_are_ignored() {
        let err = transport(2_000)
            .get_json(&closed_port_url("/api/certificates/self-signed/pools"), TlsMode::Verified)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Network(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_timeout_on_certificate_url_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(1_500)))
            .mount(&server)
            .await;

        let url = format!("{}/certificate/pools", server.uri());
        let err = transport(100).get_json(&url, TlsMode::Verified).await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)), "got {:?}", err);
    }

    /// One link of a hand-built error chain
    #[derive(Debug)]
    struct Layer {
        message: String,
        cause: Option<Box<dyn StdError + Send + Sync + 'static>>,
    }

    impl Layer {
        fn new(message: &str) -> Self {
            Self {
                message: message.to_string(),
                cause: None,
            }
        }

        fn caused_by(mut self, cause: impl StdError + Send + Sync + 'static) -> Self {
            self.cause = Some(Box::new(cause));
            self
        }
    }

    impl std::fmt::Display for Layer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.message)
        }
    }

    impl StdError for Layer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.cause.as_deref().map(|e| e as &(dyn StdError + 'static))
        }
    }

    #[test]
    fn test_certificate_cause_detected() {
        let rustls = Layer::new("error sending request for url (https://api.curve.fi/api/getPools/ethereum/main)")
            .caused_by(Layer::new("client error (Connect)").caused_by(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "invalid peer certificate: UnknownIssuer",
            )));
        assert!(is_certificate_failure(&rustls));

        let openssl = Layer::new("error sending request for url (https://api.curve.fi/)").caused_by(
            Layer::new("error:0A000086:SSL routines:tls_post_process_server_certificate:certificate verify failed"),
        );
        assert!(is_certificate_failure(&openssl));
    }

    #[test]
    fn test_non_certificate_causes_not_detected() {
        let refused = Layer::new("error sending request for url (http://127.0.0.1:1/api/certificates/pools)")
            .caused_by(Layer::new("tcp connect error").caused_by(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Connection refused (os error 111)",
            )));
        assert!(!is_certificate_failure(&refused));

        let timeout = Layer::new("error sending request for url (https://self-signed.example/pools)")
            .caused_by(Layer::new("operation timed out"));
        assert!(!is_certificate_failure(&timeout));

        // a bare top-level message is never matched
        assert!(!is_certificate_failure(&Layer::new("certificate verify failed")));
    }
}
