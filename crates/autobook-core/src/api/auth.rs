//! Password-grant login.

use url::form_urlencoded;

use crate::http::HttpRequest;
use crate::retry::{ApiError, Rejection};

use super::{parse, ApiClient};

/// Account login from the `[account]` config section.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl ApiClient {
    /// Exchange credentials for a bearer token.
    ///
    /// 400/401 are invalid credentials and 403 is a forbidden client; both are
    /// final. Other non-2xx statuses are left to the retry policy.
    pub fn authenticate(&self, credentials: &Credentials) -> Result<String, ApiError> {
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("username", &credentials.email)
            .append_pair("password", &credentials.password)
            .append_pair("client_secret", &self.settings.client_secret)
            .append_pair("client_id", &self.settings.client_id)
            .append_pair("grant_type", "password")
            .finish();
        let url = self.endpoint(&["auth", "token"])?;

        tracing::info!(email = %credentials.email, "logging in");
        let response = self.send(HttpRequest::post_form(url.as_str(), body))?;
        let status = response.status;
        if response.is_success() {
            return parse::parse_token(&response.body);
        }

        let message = parse::error_message(&response.body).unwrap_or_default();
        tracing::debug!(status, message = %message, "login rejected");
        match status {
            400 | 401 => Err(ApiError::Rejected {
                status,
                reason: Rejection::InvalidCredentials,
            }),
            403 => Err(ApiError::Rejected {
                status,
                reason: Rejection::Forbidden,
            }),
            _ => Err(ApiError::Status { status }),
        }
    }
}
