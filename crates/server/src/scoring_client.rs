use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use swallow_core::scoring::{ScoringEngine, ScoringError, ScoringRequest};
use swallow_core::QuoteResult;
use tracing::debug;

/// Longest upstream error body kept in a [`ScoringError`].
const MAX_ERROR_BODY: usize = 512;

/// Client for the proprietary scoring engine, reached over HTTP.
///
/// The request body is `{ "project": .., "quote": .., "debug": bool }` and the
/// engine answers `{ "result": number, "valid": bool, "debug"?: any }`.
pub struct RemoteScoringEngine {
    client: Client,
    endpoint: String,
    api_key: Option<SecretString>,
}

impl RemoteScoringEngine {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint: endpoint.into(), api_key })
    }
}

#[async_trait]
impl ScoringEngine for RemoteScoringEngine {
    async fn score(&self, request: ScoringRequest<'_>) -> Result<QuoteResult, ScoringError> {
        let mut call = self.client.post(&self.endpoint).json(&request);
        if let Some(api_key) = &self.api_key {
            call = call.bearer_auth(api_key.expose_secret());
        }

        let response =
            call.send().await.map_err(|error| ScoringError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(ScoringError::Rejected(format!("engine returned {status}: {body}")));
        }

        let result: QuoteResult = response
            .json()
            .await
            .map_err(|error| ScoringError::InvalidResponse(error.to_string()))?;
        debug!(
            event_name = "scoring.remote.completed",
            endpoint = %self.endpoint,
            valid = result.valid,
            "remote scoring engine answered"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use swallow_core::scoring::{ScoringEngine, ScoringError, ScoringRequest};
    use swallow_core::{AnimalSpecies, ProjectDefinition, QuoteInput};

    use super::RemoteScoringEngine;

    async fn spawn_engine(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let address = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("fake engine");
        });
        format!("http://{address}/score")
    }

    fn quote() -> QuoteInput {
        QuoteInput {
            proposer_name: "Test User".to_string(),
            proposer_email: "test@example.com".to_string(),
            proposer_postcode: "SW1A1AA".to_string(),
            base: Some(1000.0),
            commission_rate: Some(0.15),
            tax_rate: None,
            animal_species: AnimalSpecies::Cat,
            animal_breed: "Ragdoll".to_string(),
            animal_age: 3,
            animal_neutered: true,
        }
    }

    #[tokio::test]
    async fn posts_project_quote_and_debug_flag() {
        let endpoint = spawn_engine(Router::new().route(
            "/score",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(
                    headers.get("authorization").and_then(|v| v.to_str().ok()),
                    Some("Bearer swl-test")
                );
                assert_eq!(body["project"]["id"], "pet-insurance");
                assert_eq!(body["quote"]["animal_species"], "Cat");
                assert_eq!(body["quote"]["commission_rate"], 0.15);
                assert!(body["quote"].get("tax_rate").is_none());
                assert_eq!(body["debug"], true);
                Json(json!({ "result": 3500.0, "valid": true, "debug": { "trace": [] } }))
            }),
        ))
        .await;

        let engine = RemoteScoringEngine::new(
            endpoint,
            Some("swl-test".to_string().into()),
            Duration::from_secs(5),
        )
        .expect("client");
        let project = ProjectDefinition(json!({ "id": "pet-insurance" }));
        let quote = quote();

        let result = engine
            .score(ScoringRequest { project: &project, quote: &quote, debug: true })
            .await
            .expect("score");

        assert_eq!(result.result, 3500.0);
        assert!(result.valid);
        assert_eq!(result.diagnostics, Some(json!({ "trace": [] })));
    }

    #[tokio::test]
    async fn upstream_error_status_is_rejected() {
        let endpoint = spawn_engine(Router::new().route(
            "/score",
            post(|| async { (StatusCode::UNPROCESSABLE_ENTITY, "bad project") }),
        ))
        .await;
        let engine = RemoteScoringEngine::new(endpoint, None, Duration::from_secs(5)).expect("client");
        let project = ProjectDefinition(json!({}));
        let quote = quote();

        let error = engine
            .score(ScoringRequest { project: &project, quote: &quote, debug: true })
            .await
            .expect_err("rejected");

        assert!(matches!(error, ScoringError::Rejected(ref message) if message.contains("422")));
    }

    #[tokio::test]
    async fn incomplete_payload_is_invalid_response() {
        let endpoint = spawn_engine(Router::new().route(
            "/score",
            post(|| async { Json(json!({ "result": 10.0 })) }),
        ))
        .await;
        let engine = RemoteScoringEngine::new(endpoint, None, Duration::from_secs(5)).expect("client");
        let project = ProjectDefinition(json!({}));
        let quote = quote();

        let error = engine
            .score(ScoringRequest { project: &project, quote: &quote, debug: true })
            .await
            .expect_err("missing valid");

        assert!(matches!(error, ScoringError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn unreachable_engine_is_transport_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let address = listener.local_addr().expect("addr");
        drop(listener);

        let engine = RemoteScoringEngine::new(
            format!("http://{address}/score"),
            None,
            Duration::from_secs(5),
        )
        .expect("client");
        let project = ProjectDefinition(json!({}));
        let quote = quote();

        let error = engine
            .score(ScoringRequest { project: &project, quote: &quote, debug: true })
            .await
            .expect_err("unreachable");

        assert!(matches!(error, ScoringError::Transport(_)));
    }
}
