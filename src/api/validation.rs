use actix_web::{http::StatusCode, web, HttpResponse};

use crate::api::error::ErrorBody;

const VALIDATION_STATUS: &str = "JOB_VALIDATION";

fn reject(message: &str, reason: &str, fields: serde_json::Map<String, serde_json::Value>) -> actix_web::Error {
    let body = ErrorBody::new(StatusCode::BAD_REQUEST, message, VALIDATION_STATUS, reason)
        .with_metadata(serde_json::Value::Object(fields));
    actix_web::error::InternalError::from_response("", HttpResponse::BadRequest().json(body)).into()
}

/// Field name as it appears on the wire, e.g. `client_name` -> `ClientName`
fn wire_name(field: &str) -> String {
    if field == "id" {
        return "ID".to_string();
    }

    field
        .split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// JSON body config shared by every endpoint: validation and parse failures
/// become a 400 `ErrorBody` with per-field messages in its metadata.
pub fn json_config() -> actix_web_validator::JsonConfig {
    actix_web_validator::JsonConfig::default().error_handler(|err, _req| {
        let mut fields = serde_json::Map::new();

        match err {
            actix_web_validator::Error::Validate(validation_errors) => {
                for (field, errors) in validation_errors.field_errors() {
                    let messages: Vec<String> = errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| format!("Validation error in field: {}", field))
                        })
                        .collect();
                    fields.insert(wire_name(field), serde_json::json!({"errors": messages}));
                }

                reject("Validation failed", "JV-1", fields)
            }
            actix_web_validator::Error::Deserialize(de_err) => {
                let err_string = de_err.to_string();

                let message = if err_string.contains("EOF while parsing") {
                    "Request body is empty. Expected JSON payload".to_string()
                } else if err_string.contains("unknown variant") {
                    "Invalid enum value. Check allowed values for this field".to_string()
                } else if err_string.contains("missing field") {
                    err_string
                } else {
                    "Invalid JSON format".to_string()
                };
                fields.insert("message".to_string(), serde_json::json!(message));

                reject("Request validation failed", "JV-1", fields)
            }
            other => {
                fields.insert("message".to_string(), serde_json::json!(other.to_string()));
                reject("Validation failed", "JV-1", fields)
            }
        }
    })
}

/// Query string errors, e.g. an unknown `stage` value
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let mut fields = serde_json::Map::new();
        fields.insert("message".to_string(), serde_json::json!(err.to_string()));
        reject("Invalid query parameters", "JV-2", fields)
    })
}

/// Path errors, e.g. an id that is not a UUID
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        let mut fields = serde_json::Map::new();
        fields.insert("message".to_string(), serde_json::json!(err.to_string()));
        reject("Invalid path parameters", "JV-3", fields)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_keys_use_wire_names() {
        assert_eq!(wire_name("title"), "Title");
        assert_eq!(wire_name("client_name"), "ClientName");
        assert_eq!(wire_name("installation_date"), "InstallationDate");
        assert_eq!(wire_name("id"), "ID");
        assert_eq!(wire_name("StaffName"), "StaffName");
    }
}
