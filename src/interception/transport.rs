//! Network transport seams.
//!
//! The execution context owns two request primitives behind these traits:
//! a fetch-style function ([`FetchTransport`]) whose response bodies are
//! single-read, and an XHR-style object ([`XhrTransport`]) whose transferred
//! text is buffered at completion. [`ReqwestTransport`] backs both with real
//! HTTP for the manual-fetch path.

use async_trait::async_trait;

use super::types::{FetchRequest, FetchResponse, XhrCompletion, XhrRequest};
use crate::error_handling::types::TransportError;

/// Fetch-style request function.
#[async_trait]
pub trait FetchTransport: Send + Sync {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, TransportError>;
}

/// XHR-style request object executor.
#[async_trait]
pub trait XhrTransport: Send + Sync {
    async fn execute(&self, request: XhrRequest) -> Result<XhrCompletion, TransportError>;
}

/// Production transport over a shared HTTP client.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ReqwestTransport {
    async fn request_text(
        &self,
        method: &str,
        url: &str,
    ) -> Result<(u16, String, String), TransportError> {
        let method = reqwest::Method::from_bytes(method.as_bytes())
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
        let response = self
            .client
            .request(method, url)
            .send()
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
        Ok((status, final_url, text))
    }
}

#[async_trait]
impl FetchTransport for ReqwestTransport {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, TransportError> {
        let (status, url, text) = self.request_text(&request.method, &request.url).await?;
        Ok(FetchResponse::new(status, url, text))
    }
}

#[async_trait]
impl XhrTransport for ReqwestTransport {
    async fn execute(&self, request: XhrRequest) -> Result<XhrCompletion, TransportError> {
        let (status, url, response_text) =
            self.request_text(&request.method, &request.url).await?;
        Ok(XhrCompletion {
            status,
            url,
            response_text,
        })
    }
}
