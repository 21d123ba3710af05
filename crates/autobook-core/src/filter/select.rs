//! First-match selection over a catalog listing.

use crate::model::CandidateItem;

use super::{is_eligible, FilterCriteria};

/// Returns the first eligible item in listing order. Listing order is the
/// provider's; no sorting or scoring happens here.
pub fn select<'a>(items: &'a [CandidateItem], criteria: &FilterCriteria) -> Option<&'a CandidateItem> {
    items.iter().find(|item| is_eligible(item, criteria))
}
