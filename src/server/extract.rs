//! Request body extraction and field validation.

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::runtime::Runtime;

use super::error::ServerError;

/// A JSON object request body whose string fields are within the configured length limit.
#[derive(Debug)]
pub struct JsonObject(pub Map<String, Value>);

impl FromRequest<Runtime> for JsonObject {
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &Runtime) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|_| ServerError::BadRequest("JSON body required.".to_string()))?;

        let Value::Object(map) = value else {
            return Err(ServerError::BadRequest("JSON body required.".to_string()));
        };

        let max = state.config.max_field_length;
        if map.values().filter_map(Value::as_str).any(|s| s.chars().count() > max) {
            return Err(ServerError::BadRequest(format!("Request field exceeds maximum length ({max} characters).")));
        }

        Ok(Self(map))
    }
}

impl JsonObject {
    /// Reject the body unless every field in `fields` is present and non-blank.
    pub fn require(&self, fields: &[&str]) -> Result<(), ServerError> {
        let missing = fields
            .iter()
            .filter(|field| match self.0.get(**field) {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.trim().is_empty(),
                Some(_) => false,
            })
            .copied()
            .collect::<Vec<_>>();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ServerError::BadRequest(format!("Missing field(s): {}", missing.join(", "))))
        }
    }

    /// An optional string field.
    pub fn str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Deserialize the object into a typed request.
    pub fn parse<T: DeserializeOwned>(self) -> Result<T, ServerError> {
        serde_json::from_value(Value::Object(self.0)).map_err(|e| ServerError::BadRequest(format!("Invalid request: {e}")))
    }
}
