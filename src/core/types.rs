use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::{Result, StoreError};

/// A stored user record.
///
/// The schema is open: `id` and `name` are the only fields the store knows
/// about, everything else a client submits is kept verbatim in `extra` and
/// round-trips through persistence untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Inbound create/update payload. `name` is the only validated field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserPayload {
    /// Returns the trimmed name, or a validation error when it is missing
    /// or empty.
    pub fn validated_name(&self) -> Result<String> {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Ok(name.to_string()),
            _ => Err(StoreError::Validation(
                "Name is a required field".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_name_is_trimmed() {
        let payload: UserPayload = serde_json::from_value(json!({"name": "  Diana  "})).unwrap();
        assert_eq!(payload.validated_name().unwrap(), "Diana");
    }

    #[test]
    fn missing_and_blank_names_are_rejected() {
        for body in [json!({}), json!({"name": ""}), json!({"name": "   "})] {
            let payload: UserPayload = serde_json::from_value(body).unwrap();
            match payload.validated_name() {
                Err(StoreError::Validation(message)) => {
                    assert_eq!(message, "Name is a required field");
                }
                other => panic!("expected validation error, got {other:?}"),
            }
        }
    }

    #[test]
    fn extra_fields_survive_record_round_trip() {
        let user: User = serde_json::from_value(json!({
            "id": 7,
            "name": "Diana",
            "role": "admin",
            "age": 34
        }))
        .unwrap();
        assert_eq!(user.extra.get("role"), Some(&json!("admin")));

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value.get("age"), Some(&json!(34)));
        assert_eq!(value.get("id"), Some(&json!(7)));
    }
}
