use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;
use crate::resource::{validate_payload, Record, ResourceSchema, WriteMode};

/// Record ids are UUIDs; anything else is a client error rather than a miss
pub fn parse_record_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::bad_request(format!("Invalid record id '{}'", id)))
}

/// Unwrap the JSON body and validate it against the resource schema
pub fn validated_body(
    schema: &ResourceSchema,
    body: Result<Json<Value>, JsonRejection>,
    mode: WriteMode,
) -> Result<Record, ApiError> {
    let Json(payload) = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::payload_too_large(rejection.body_text())
        } else {
            ApiError::invalid_json(rejection.body_text())
        }
    })?;
    Ok(validate_payload(schema, &payload, mode)?)
}

pub fn record_not_found(resource: &str, id: Uuid) -> ApiError {
    ApiError::not_found(format!("Record {} not found in {}", id, resource))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_uuid_ids() {
        assert!(matches!(parse_record_id("42"), Err(ApiError::BadRequest(_))));
        assert!(parse_record_id("6f1c2d8e-3a4b-4c5d-8e9f-0a1b2c3d4e5f").is_ok());
    }
}
