//! Contract with the remote discount service
//!
//! | Operation  | Method | Path          |
//! |------------|--------|---------------|
//! | long poll  | GET    | `/poll/long`  |
//! | short poll | GET    | `/poll/short` |
//! | insert     | POST   | `/insert`     |
//!
//! Response bodies are validated here so the channels only ever see typed
//! results.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::sync_error::RemoteError;
use crate::domain::Product;

pub const LONG_POLL_PATH: &str = "poll/long";
pub const SHORT_POLL_PATH: &str = "poll/short";
pub const INSERT_PATH: &str = "insert";

#[async_trait]
pub trait DiscountApi: Send + Sync {
    /// Wait for the next discount notification and return its count.
    async fn long_poll(&self) -> Result<u64, RemoteError>;

    /// Fetch products the service has not handed out yet.
    async fn short_poll(&self) -> Result<Vec<Product>, RemoteError>;

    /// Submit a product; returns the echoed product.
    async fn insert(&self, product: &Product) -> Result<Product, RemoteError>;
}

#[derive(Debug, Deserialize)]
struct LongPollBody {
    #[serde(default)]
    cantidad: Option<u64>,
}

/// Decode a long-poll body. An empty body or a missing count means zero.
pub fn parse_long_poll_body(url: &str, body: &str) -> Result<u64, RemoteError> {
    if body.trim().is_empty() {
        return Ok(0);
    }
    serde_json::from_str::<LongPollBody>(body)
        .map(|parsed| parsed.cantidad.unwrap_or(0))
        .map_err(|e| RemoteError::decode(url, e.to_string()))
}

/// Decode a short-poll body into products.
///
/// `204 No Content` and empty bodies mean "nothing new". Anything that is not
/// a JSON array of products is an [`RemoteError::UnexpectedShape`].
pub fn parse_short_poll_body(url: &str, status: u16, body: &str) -> Result<Vec<Product>, RemoteError> {
    if status == 204 || body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let shape_error = |actual: String| RemoteError::UnexpectedShape {
        url: url.to_string(),
        expected: "array of products",
        actual,
    };

    let value: Value = serde_json::from_str(body).map_err(|_| shape_error("non-JSON text".to_string()))?;
    if !value.is_array() {
        return Err(shape_error(json_kind(&value).to_string()));
    }

    serde_json::from_value::<Vec<Product>>(value)
        .map_err(|e| shape_error(format!("array with an invalid product ({e})")))
}

/// Use the echoed product when the body carries one, else the submitted product.
pub fn parse_insert_body(body: &str, submitted: &Product) -> Product {
    serde_json::from_str::<Product>(body).unwrap_or_else(|_| submitted.clone())
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
