use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use newbond_market::MarketError;
use serde::Serialize;

/// API-layer error type
#[derive(Debug)]
pub enum ApiError {
    /// 400 - Bad ticker or date
    BadRequest(String),

    /// 422 - Upstream data or request payload has an unusable shape
    Unprocessable(String),

    /// 502 - A provider call failed
    BadGateway(String),

    /// 500 - Everything else
    Internal(String),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_type, message) = match self {
            ApiError::BadRequest(msg) => ("bad_request", msg),
            ApiError::Unprocessable(msg) => ("unprocessable", msg),
            ApiError::BadGateway(msg) => ("provider_error", msg),
            ApiError::Internal(msg) => ("internal_error", msg),
        };
        if status.is_server_error() {
            tracing::error!(%status, reason = %message, "request failed");
        }

        let body = ErrorBody {
            error: error_type.into(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<MarketError> for ApiError {
    fn from(err: MarketError) -> Self {
        match err {
            MarketError::InvalidInput(msg) => ApiError::BadRequest(msg),
            MarketError::DataShape(msg) => ApiError::Unprocessable(msg),
            e @ MarketError::ProviderFetch { .. } => ApiError::BadGateway(e.to_string()),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<minijinja::Error> for ApiError {
    fn from(err: minijinja::Error) -> Self {
        ApiError::Internal(format!("page render error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_error_mapping() {
        let cases = [
            (MarketError::InvalidInput("bad ticker".into()), StatusCode::BAD_REQUEST),
            (MarketError::DataShape("no calendar entry".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (MarketError::fetch("Finnhub", "HTTP 503"), StatusCode::BAD_GATEWAY),
            (MarketError::Chart("backend".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (MarketError::Config("FRED_API_KEY".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_response_status() {
        let response = ApiError::BadGateway("FRED timed out".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
