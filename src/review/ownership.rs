//! Ownership checks for review mutations.

use crate::auth::Principal;
use crate::review::error::ReviewError;

/// Allow the operation only when a principal is present and its id equals
/// `owner`. Both ids are already integers, so `"1"` and `1` compare equal.
/// Returns the verified owner id.
pub fn authorize(principal: Option<&Principal>, owner: Option<i64>) -> Result<i64, ReviewError> {
    match (principal, owner) {
        (Some(p), Some(owner)) if p.id == owner => Ok(owner),
        (principal, owner) => {
            tracing::debug!(
                principal = ?principal.map(|p| p.id),
                owner = ?owner,
                "Ownership check failed"
            );
            Err(ReviewError::Unauthorized)
        }
    }
}
