//! Catalog listing: one page of classes for one location and one day.

use chrono::NaiveDate;

use crate::http::HttpRequest;
use crate::model::CandidateItem;
use crate::retry::ApiError;

use super::{parse, ApiClient};

impl ApiClient {
    /// Fetch the classes at `location_id` for the one-day window starting at
    /// `date`. An empty listing is `Ok(vec![])`, not an error.
    ///
    /// Non-2xx → `ApiError::Status`, bad body → `ApiError::Malformed`; both
    /// are transient for the read retry profile.
    pub fn search(
        &self,
        location_id: u64,
        date: NaiveDate,
        page_size: u32,
    ) -> Result<Vec<CandidateItem>, ApiError> {
        let mut url = self.endpoint(&["courses"])?;
        url.query_pairs_mut()
            .append_pair("forDurationOfDays", "1")
            .append_pair("query", "")
            .append_pair("pageSize", &page_size.to_string())
            .append_pair("page", "1")
            .append_pair("locationId", &location_id.to_string())
            .append_pair("startDate", &date.format("%Y-%m-%d").to_string());

        let response = self.send(HttpRequest::get(url.as_str()))?;
        if !response.is_success() {
            tracing::debug!(body = %response.body_snippet(), "course listing failed");
            return Err(ApiError::Status {
                status: response.status,
            });
        }
        let items = parse::parse_listing(&response.body)?;
        tracing::debug!(location_id, %date, count = items.len(), "course listing parsed");
        Ok(items)
    }
}
