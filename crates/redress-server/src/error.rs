use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use redress_core::store::StoreError;
use redress_core::RedressError;

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(RedressError::InvalidRequest(msg.into()).into())
    }

    /// Construct a 404 Not Found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(RedressError::OrderNotFound(msg.into()).into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if let Some(e) = self.0.downcast_ref::<RedressError>() {
            match e {
                RedressError::CustomerNotFound(_) | RedressError::OrderNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                RedressError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                RedressError::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
                RedressError::Store(_) => StatusCode::NOT_FOUND,
                RedressError::Decision(_) => StatusCode::BAD_GATEWAY,
                RedressError::Io(_) | RedressError::Yaml(_) | RedressError::Json(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decision_agent::DecisionAgentError;

    #[test]
    fn invalid_request_maps_to_400() {
        let err = AppError(RedressError::InvalidRequest("customerId is required".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn order_not_found_maps_to_404() {
        let err = AppError::not_found("order-9999");
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn customer_not_found_maps_to_404() {
        let err = AppError(RedressError::CustomerNotFound("customer-404".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn store_outage_maps_to_503() {
        let err = AppError(RedressError::Store(StoreError::Unavailable("down".into())).into());
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn decision_failure_maps_to_502() {
        let err = AppError(
            RedressError::Decision(DecisionAgentError::RateLimited { attempts: 3 }).into(),
        );
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn unknown_error_maps_to_500() {
        let err = AppError(anyhow::anyhow!("something unexpected"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn response_body_is_json_with_error_field() {
        let response = AppError::bad_request("nope").into_response();
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(ct.to_str().unwrap().contains("application/json"));
    }
}
