use axum::{extract::rejection::JsonRejection, Json};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// Turn a JSON body into a typed request, reporting both syntax and shape
/// problems as 400 `INVALID_JSON` instead of axum's default rejections.
pub fn parse_body<T: DeserializeOwned>(payload: Result<Json<Value>, JsonRejection>) -> Result<T, ApiError> {
    let Json(value) = payload?;

    if !value.is_object() {
        return Err(ApiError::invalid_json("Request body must be a JSON object"));
    }

    serde_json::from_value(value).map_err(|e| ApiError::invalid_json(format!("Invalid request body: {}", e)))
}
