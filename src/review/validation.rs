//! Field rules for inbound review bodies and path parameters.
//!
//! Bodies arrive as loosely typed JSON (or form fields, which are always
//! strings), so each rule coerces before it checks. Every failing field is
//! reported, in declaration order, before any upstream call is made.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::review::model::{NewReview, NumericId, ReviewPatch};

const USER_ID_MSG: &str = "User ID must be a positive integer";
const PRODUCT_ID_MSG: &str = "Product ID must be a positive integer";
const REVIEW_ID_MSG: &str = "Review ID must be a positive integer";
const RATING_MSG: &str = "Review rating must be between 0 and 5";
const MESSAGE_REQUIRED_MSG: &str = "Review message is required";
const MESSAGE_EMPTY_MSG: &str = "Review message cannot be empty";

/// One entry of the `errors` array in a 400 response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub location: &'static str,
}

impl FieldError {
    fn field(location: &'static str, path: &str, value: Option<&Value>, msg: &str) -> Self {
        Self {
            kind: "field",
            value: value.cloned(),
            msg: msg.to_string(),
            path: Some(path.to_string()),
            location,
        }
    }

    /// The whole body could not be understood.
    pub fn body(msg: impl Into<String>) -> Self {
        Self {
            kind: "body",
            value: None,
            msg: msg.into(),
            path: None,
            location: "body",
        }
    }
}

fn positive_int(value: Option<&Value>) -> Option<i64> {
    value
        .and_then(NumericId::from_value)
        .map(NumericId::get)
        .filter(|id| *id >= 1)
}

fn rating(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }?;
    (parsed.is_finite() && (0.0..=5.0).contains(&parsed)).then_some(parsed)
}

/// Scalars are taken as their string form, so `5` reads as `"5"`.
fn non_empty_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Validate an `add-review` body.
pub fn new_review(body: &Map<String, Value>) -> Result<NewReview, Vec<FieldError>> {
    let mut errors = Vec::new();

    let user_id = body.get("userId");
    let product_id = body.get("productId");
    let review_rating = body.get("reviewRating");
    let review_message = body.get("reviewMessage");

    let user = positive_int(user_id);
    if user.is_none() {
        errors.push(FieldError::field("body", "userId", user_id, USER_ID_MSG));
    }
    let product = positive_int(product_id);
    if product.is_none() {
        errors.push(FieldError::field("body", "productId", product_id, PRODUCT_ID_MSG));
    }
    let stars = rating(review_rating);
    if stars.is_none() {
        errors.push(FieldError::field("body", "reviewRating", review_rating, RATING_MSG));
    }
    let message = non_empty_text(review_message);
    if message.is_none() {
        errors.push(FieldError::field(
            "body",
            "reviewMessage",
            review_message,
            MESSAGE_REQUIRED_MSG,
        ));
    }

    match (user, product, stars, message) {
        (Some(user_id), Some(product_id), Some(rating), Some(message)) => Ok(NewReview {
            user_id,
            product_id,
            rating,
            message,
        }),
        _ => Err(errors),
    }
}

/// Validate an update body. Absent keys are skipped; a present key,
/// including an explicit `null`, must satisfy its rule.
pub fn review_patch(body: &Map<String, Value>) -> Result<ReviewPatch, Vec<FieldError>> {
    let mut errors = Vec::new();
    let mut patch = ReviewPatch::default();

    if let Some(value) = body.get("reviewRating") {
        match rating(Some(value)) {
            Some(r) => patch.rating = Some(r),
            None => errors.push(FieldError::field("body", "reviewRating", Some(value), RATING_MSG)),
        }
    }
    if let Some(value) = body.get("reviewMessage") {
        match non_empty_text(Some(value)) {
            Some(m) => patch.message = Some(m),
            None => errors.push(FieldError::field(
                "body",
                "reviewMessage",
                Some(value),
                MESSAGE_EMPTY_MSG,
            )),
        }
    }

    if errors.is_empty() {
        Ok(patch)
    } else {
        Err(errors)
    }
}

/// Parse the review id path segment of an update.
pub fn review_id(raw: &str) -> Result<i64, Vec<FieldError>> {
    let value = Value::String(raw.to_string());
    positive_int(Some(&value))
        .ok_or_else(|| vec![FieldError::field("params", "id", Some(&value), REVIEW_ID_MSG)])
}
