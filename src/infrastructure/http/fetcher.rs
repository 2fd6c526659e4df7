//! Candidate fetcher with the certificate-failure recovery path

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::transport::{HttpTransport, ReqwestTransport, TlsMode};
use crate::domain::endpoint::EndpointCandidate;
use crate::shared::errors::{AppError, FetchError};

/// JSON body returned by one candidate
#[derive(Debug, Clone)]
pub struct RawPayload {
    pub url: String,
    pub body: Value,
    /// Answered only after retrying without certificate verification
    pub tls_fallback: bool,
}

/// Issues at most two round-trips per candidate: the original attempt and,
/// only after a certificate failure, one retry with verification disabled.
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn HttpTransport>,
    insecure_tls: bool,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, insecure_tls: bool) -> Self {
        Self { transport, insecure_tls }
    }

    /// reqwest transport with a shared per-request timeout
    pub fn with_timeout(timeout: Duration, insecure_tls: bool) -> Result<Self, AppError> {
        let transport = ReqwestTransport::new(timeout)?;
        Ok(Self::new(Arc::new(transport), insecure_tls))
    }

    pub async fn fetch(&self, candidate: &EndpointCandidate) -> Result<RawPayload, FetchError> {
        let url = candidate.url.as_str();
        let mode = if self.insecure_tls { TlsMode::Insecure } else { TlsMode::Verified };

        debug!("🔍 GET {} ({:?})", url, mode);
        match self.transport.get_json(url, mode).await {
            Ok(body) => Ok(RawPayload {
                url: url.to_string(),
                body,
                tls_fallback: false,
            }),
            Err(FetchError::Certificate(reason)) if mode == TlsMode::Verified => {
                // авто-ретрай без проверки, только если упала верификация
                warn!("⚠️ TLS verification failed at {}: {}; retrying once without verification", url, reason);
                match self.transport.get_json(url, TlsMode::Insecure).await {
                    Ok(body) => {
                        warn!("⚠️ {} answered only with certificate verification disabled", url);
                        Ok(RawPayload {
                            url: url.to_string(),
                            body,
                            tls_fallback: true,
                        })
                    }
                    Err(e) => {
                        warn!("❌ Insecure retry failed at {}: {}", url, e);
                        Err(e)
                    }
                }
            }
            Err(e) => Err(e),
        }
    }
}
