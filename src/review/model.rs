//! Inbound and upstream review shapes.
//!
//! Inbound bodies use camelCase (`userId`, `reviewRating`); the upstream API
//! speaks PascalCase (`UserId`, `ReviewRating`).

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// An integer identifier that tolerates both `7` and `"7"` on the wire.
///
/// Every identity comparison in the proxy goes through this type, so a
/// string user id from a form body and a numeric id from a token compare
/// equal when they denote the same integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NumericId(i64);

impl NumericId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }

    /// Coerce a JSON value: integral numbers and base-10 integer strings.
    pub fn from_value(value: &Value) -> Option<Self> {
        let id = match value {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            }),
            Value::String(s) => s.parse::<i64>().ok(),
            _ => None,
        };
        id.map(Self)
    }
}

impl fmt::Display for NumericId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for NumericId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value)
            .ok_or_else(|| de::Error::custom(format!("expected an integer id, got {value}")))
    }
}

/// A validated create request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub user_id: i64,
    pub product_id: i64,
    pub rating: f64,
    pub message: String,
}

/// A validated sparse update. `None` means the client did not send the field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewPatch {
    pub rating: Option<f64>,
    pub message: Option<String>,
}

/// Body of `POST /api/reviews`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateReviewRequest {
    pub user_id: i64,
    pub product_id: i64,
    pub review_rating: f64,
    pub review_message: String,
}

impl From<NewReview> for CreateReviewRequest {
    fn from(review: NewReview) -> Self {
        Self {
            user_id: review.user_id,
            product_id: review.product_id,
            review_rating: review.rating,
            review_message: review.message,
        }
    }
}

/// Body of `PUT /api/reviews/{id}`.
///
/// Identity fields come from the stored record, never from the client.
/// Optional fields are omitted entirely when absent so the upstream applies
/// a partial update.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateReviewRequest {
    pub id: i64,
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_message: Option<String>,
}

impl UpdateReviewRequest {
    pub fn new(id: i64, owner: &ReviewOwner, user_id: i64, patch: ReviewPatch) -> Self {
        Self {
            id,
            user_id,
            product_id: owner.product_id.map(NumericId::get),
            review_rating: patch.rating,
            review_message: patch.message,
        }
    }
}

/// The ownership slice of a stored review as returned by the upstream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewOwner {
    #[serde(rename = "UserId", alias = "userId", default)]
    pub user_id: Option<NumericId>,
    #[serde(rename = "ProductId", alias = "productId", default)]
    pub product_id: Option<NumericId>,
}

impl ReviewOwner {
    /// Read the owner out of an upstream body. An unreadable body yields an
    /// owner with no user, which never matches any caller.
    /// Only a JSON object is considered; serde would otherwise read a
    /// sequence like `[1,2]` positionally.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(record @ Value::Object(_)) => Self::deserialize(record).unwrap_or_default(),
            _ => Self::default(),
        }
    }
}
