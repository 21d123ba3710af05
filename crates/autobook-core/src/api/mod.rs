//! Client for the provider's v5 REST API: catalog listing, password-grant
//! login, and booking.
//!
//! Every call is a single attempt. Retry profiles are applied by the callers
//! (poll loop, claim sequencer) so each call site picks its own budget.

mod auth;
mod booking;
mod catalog;
mod parse;

use std::sync::Arc;
use url::Url;

use crate::http::{HttpRequest, HttpResponse, Transport, TransportError, TransportErrorKind};
use crate::retry::ApiError;

pub use auth::Credentials;
pub use parse::parse_start_time;

/// Static API parameters from the `[api]` config section.
#[derive(Clone)]
pub struct ApiSettings {
    pub base_url: Url,
    pub client_id: String,
    pub client_secret: String,
    /// Sent on every request (user agent, accept language, ...).
    pub default_headers: Vec<(String, String)>,
}

impl std::fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiSettings")
            .field("base_url", &self.base_url.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("default_headers", &self.default_headers)
            .finish()
    }
}

pub struct ApiClient {
    transport: Arc<dyn Transport>,
    settings: ApiSettings,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, settings: ApiSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// `base_url` with `segments` appended as path segments.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.settings.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                TransportError::new(
                    TransportErrorKind::Other,
                    format!("base URL {} cannot take a path", self.settings.base_url),
                )
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send(&self, mut request: HttpRequest) -> Result<HttpResponse, ApiError> {
        for (name, value) in &self.settings.default_headers {
            request.headers.push((name.clone(), value.clone()));
        }
        tracing::debug!(method = %request.method, path = request.path(), "request");
        let response = self.transport.send(&request)?;
        tracing::debug!(status = response.status, path = request.path(), "response");
        Ok(response)
    }
}
