//! Booking (claim) of one class slot.

use url::form_urlencoded;

use crate::http::HttpRequest;
use crate::model::{ItemId, Session};
use crate::retry::{ApiError, Rejection};

use super::{parse, ApiClient};

impl ApiClient {
    /// Book `item_id` with the session's bearer token; returns the booking id.
    ///
    /// 409 (full or already booked), 401 (token refused) and 403 are final.
    /// A 2xx without a booking id is `Unconfirmed` and must not be repeated.
    pub fn claim(&self, item_id: &ItemId, session: &Session) -> Result<String, ApiError> {
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("courseId", &item_id.0)
            .finish();
        let url = self.endpoint(&["bookings"])?;
        let request = HttpRequest::post_form(url.as_str(), body)
            .header("authorization", &format!("Bearer {}", session.bearer_token));

        tracing::info!(id = %item_id, "attempting to book class");
        let response = self.send(request)?;
        let status = response.status;
        if response.is_success() {
            return parse::parse_confirmation(&response.body).ok_or_else(|| {
                tracing::warn!(status, body = %response.body_snippet(), "booking response without id");
                ApiError::Unconfirmed { status }
            });
        }

        let message = parse::error_message(&response.body).unwrap_or_default();
        tracing::debug!(status, message = %message, "booking refused");
        let reason = match status {
            409 => Rejection::Conflict,
            401 => Rejection::TokenExpired,
            403 => Rejection::Forbidden,
            _ => return Err(ApiError::Status { status }),
        };
        Err(ApiError::Rejected { status, reason })
    }
}
