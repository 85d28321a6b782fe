//! Moving a [`WireRequest`] to the web app and back.

use crate::error::{truncate_message, SheetsError, SheetsResult};
use crate::operation::{Method, WireRequest};
use crate::response::ApiResponse;
use async_trait::async_trait;
use std::time::Duration;

/// One network round trip.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and decode the envelope. Error envelopes come back as
    /// `Err`.
    async fn send(&self, request: &WireRequest) -> SheetsResult<ApiResponse>;

    /// Where requests go, for logging
    fn describe(&self) -> String;
}

/// HTTPS transport to the deployed web app.
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>, timeout: Duration) -> SheetsResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SheetsError::Internal(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &WireRequest) -> SheetsResult<ApiResponse> {
        let builder = match request.method {
            Method::Get => self.client.get(&self.url).query(&request.params),
            Method::Post => {
                let builder = self.client.post(&self.url).query(&request.params);
                match &request.body {
                    Some(body) => builder.json(body),
                    None => builder,
                }
            }
        };

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        match serde_json::from_str::<ApiResponse>(&text) {
            Ok(envelope) => envelope.into_result(Some(status.as_u16())),
            Err(_) if !status.is_success() => Err(SheetsError::from_remote(
                Some(status.as_u16()),
                &format!("HTTP {}: {}", status.as_u16(), text),
            )),
            Err(e) => Err(SheetsError::InvalidResponse(truncate_message(&format!(
                "{e}: {text}"
            )))),
        }
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
