use crate::core::{AppError, Result};

/// Validate free-form metadata before it is marshaled into a JSON column.
///
/// Metadata is always a JSON object (a map of caller-chosen keys); scalars
/// and arrays are rejected so downstream consumers can rely on object shape.
pub fn ensure_object(field: &str, metadata: Option<&serde_json::Value>) -> Result<()> {
    match metadata {
        None => Ok(()),
        Some(value) if value.is_object() => Ok(()),
        Some(_) => Err(AppError::invalid_metadata(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepts_absent_and_object() {
        assert!(ensure_object("metadata", None).is_ok());
        assert!(ensure_object("metadata", Some(&json!({"note": "cash"}))).is_ok());
    }

    #[test]
    fn test_rejects_non_object() {
        for value in [json!("text"), json!(42), json!([1, 2, 3]), json!(null)] {
            let err = ensure_object("metadata", Some(&value)).unwrap_err();
            assert!(matches!(err, AppError::BadRequest { .. }));
        }
    }
}
