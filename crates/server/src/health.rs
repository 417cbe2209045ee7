use axum::{http::StatusCode, routing::get, Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

pub async fn health() -> (StatusCode, Json<HealthResponse>) {
    let payload = HealthResponse {
        status: "ok",
        version: SERVICE_VERSION,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    };

    (StatusCode::OK, Json(payload))
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, Json};
    use chrono::DateTime;

    use crate::health::{health, SERVICE_VERSION};

    #[tokio::test]
    async fn health_is_always_ok() {
        let (status, Json(payload)) = health().await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ok");
        assert_eq!(payload.version, SERVICE_VERSION);
    }

    #[tokio::test]
    async fn timestamp_is_utc_iso_8601() {
        let (_, Json(payload)) = health().await;

        assert!(payload.timestamp.ends_with('Z'), "{}", payload.timestamp);
        DateTime::parse_from_rfc3339(&payload.timestamp).expect("rfc3339 timestamp");
    }
}
