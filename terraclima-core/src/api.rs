//! Framework-free humidity endpoint: raw method and body in, status and JSON
//! body out. HTTP servers only have to forward requests here.

use serde_json::{Value, json};
use tracing::warn;

use crate::{
    error::{FieldErrors, HumidityError},
    service::WeatherService,
    validation,
};

const INVALID_INPUT: &str = "Invalid input data";
const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn from_error(err: &HumidityError) -> Self {
        let body = match err {
            HumidityError::MethodNotAllowed { .. } => {
                json!({ "success": false, "error": "Method not allowed" })
            }
            HumidityError::Validation(fields) => {
                json!({ "success": false, "error": INVALID_INPUT, "details": fields })
            }
            HumidityError::UnsupportedProvider(_) => {
                json!({ "success": false, "error": err.to_string() })
            }
            HumidityError::Service(message) => {
                let message = match message.as_str() {
                    "" => INTERNAL_ERROR,
                    message => message,
                };
                json!({ "success": false, "error": message })
            }
        };

        Self {
            status: err.status_code(),
            body,
        }
    }
}

pub async fn handle(service: &WeatherService, method: &str, body: &[u8]) -> ApiResponse {
    match process(service, method, body).await {
        Ok(body) => ApiResponse::ok(body),
        Err(err) => {
            warn!(status = err.status_code(), error = %err, "humidity request rejected");
            ApiResponse::from_error(&err)
        }
    }
}

async fn process(
    service: &WeatherService,
    method: &str,
    body: &[u8],
) -> Result<Value, HumidityError> {
    if method != "POST" {
        return Err(HumidityError::MethodNotAllowed {
            method: method.to_string(),
        });
    }

    let raw: Value = serde_json::from_slice(body).map_err(|e| {
        let mut fields = FieldErrors::new();
        fields.add("body", format!("Request body must be valid JSON: {e}"));
        HumidityError::Validation(fields)
    })?;

    let query = validation::validate(&raw).map_err(HumidityError::Validation)?;

    let reading = service
        .try_reading(query.location, query.date, query.provider.as_str())
        .await?;

    Ok(json!({ "success": true, "data": reading }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn non_post_is_rejected_before_reading_the_body() {
        let service = WeatherService::default();

        for method in ["GET", "PUT", "DELETE"] {
            let res = handle(&service, method, b"not even json").await;
            assert_eq!(res.status, 405);
            assert_eq!(res.body["success"], false);
        }
    }

    #[tokio::test]
    async fn method_match_is_case_sensitive() {
        let today = chrono::Local::now().date_naive().format("%Y-%m-%d");
        let body = json!({
            "latitude": 0,
            "longitude": 0,
            "date": today.to_string(),
            "provider": "openweather",
        });
        let body = serde_json::to_vec(&body).unwrap();
        let service = WeatherService::default();

        let res = handle(&service, "post", &body).await;
        assert_eq!(res.status, 405);
        assert_eq!(res.body["error"], "Method not allowed");

        assert_eq!(handle(&service, "POST", &body).await.status, 200);
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let res = handle(&WeatherService::default(), "POST", b"{latitude:").await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["error"], INVALID_INPUT);
        assert!(res.body["details"]["body"].as_str().unwrap().contains("valid JSON"));
    }

    #[test]
    fn unsupported_provider_maps_to_400_with_message() {
        let err = HumidityError::UnsupportedProvider("darksky".into());
        let res = ApiResponse::from_error(&err);

        assert_eq!(res.status, 400);
        assert_eq!(res.body["error"], "Unsupported provider: darksky");
        assert!(res.body.get("details").is_none());
    }

    #[test]
    fn empty_service_error_gets_generic_message() {
        let res = ApiResponse::from_error(&HumidityError::Service(String::new()));
        assert_eq!(res.status, 500);
        assert_eq!(res.body["error"], INTERNAL_ERROR);
    }

    #[test]
    fn service_errors_map_to_500_with_message() {
        let res = ApiResponse::from_error(&HumidityError::Service("provider exploded".into()));
        assert_eq!(res.status, 500);
        assert_eq!(res.body["error"], "provider exploded");
    }
}
