use std::sync::Arc;

use axum::http::Method;
use axum::Router;
use swallow_core::config::{AppConfig, ConfigError, ScoringProvider};
use swallow_core::scoring::deterministic::DeterministicScoringEngine;
use swallow_core::{QuoteOrchestrator, ScoringEngine};
use swallow_store::FileProjectStore;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::scoring_client::RemoteScoringEngine;
use crate::{docs, health, quote};

pub struct Application {
    pub config: AppConfig,
    pub orchestrator: Arc<QuoteOrchestrator>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("scoring client could not be built: {0}")]
    ScoringClient(#[source] reqwest::Error),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    config.validate()?;

    let store = FileProjectStore::new(config.projects.directory.clone());
    info!(
        event_name = "system.bootstrap.projects_configured",
        correlation_id = "bootstrap",
        directory = %store.directory().display(),
        "project store configured"
    );

    let scoring: Arc<dyn ScoringEngine> = match config.scoring.provider {
        ScoringProvider::Remote => {
            let endpoint = config.scoring.endpoint.clone().ok_or_else(|| {
                ConfigError::Validation(
                    "scoring.endpoint is required for the remote scoring provider".to_string(),
                )
            })?;
            let engine = RemoteScoringEngine::new(
                endpoint,
                config.scoring.api_key.clone(),
                config.scoring.timeout(),
            )
            .map_err(BootstrapError::ScoringClient)?;
            Arc::new(engine)
        }
        ScoringProvider::Deterministic => Arc::new(DeterministicScoringEngine),
    };
    info!(
        event_name = "system.bootstrap.scoring_configured",
        correlation_id = "bootstrap",
        provider = ?config.scoring.provider,
        timeout_ms = config.scoring.timeout_ms,
        "scoring engine configured"
    );

    let orchestrator = QuoteOrchestrator::new(Arc::new(store), scoring)
        .with_scoring_timeout(config.scoring.timeout());

    Ok(Application { config, orchestrator: Arc::new(orchestrator) })
}

impl Application {
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any);

        Router::new()
            .merge(quote::router(self.orchestrator.clone()))
            .merge(health::router())
            .merge(docs::router())
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use swallow_core::config::{AppConfig, ScoringProvider};
    use tower::ServiceExt;

    use crate::bootstrap::bootstrap_with_config;

    fn deterministic_config(directory: &std::path::Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.projects.directory = directory.to_path_buf();
        config.scoring.provider = ScoringProvider::Deterministic;
        config
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_without_scoring_endpoint() {
        let result = bootstrap_with_config(AppConfig::default()).await;

        let message = result.err().expect("error").to_string();
        assert!(message.contains("scoring.endpoint"), "{message}");
    }

    #[tokio::test]
    async fn remote_provider_bootstraps_with_endpoint() {
        let mut config = AppConfig::default();
        config.scoring.endpoint = Some("http://127.0.0.1:9/score".to_string());

        let app = bootstrap_with_config(config).await.expect("bootstrap");
        assert_eq!(app.orchestrator.scoring_timeout().as_millis(), 10_000);
    }

    #[tokio::test]
    async fn deterministic_bootstrap_serves_quotes_from_project_directory() {
        let directory = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            directory.path().join("pet-insurance.json"),
            json!({ "id": "pet-insurance", "meta": { "name": "Pet Insurance" } }).to_string(),
        )
        .expect("write project");

        let app = bootstrap_with_config(deterministic_config(directory.path()))
            .await
            .expect("bootstrap");
        let response = app
            .router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/quote/pet-insurance")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({
                            "proposer_name": "Test User",
                            "proposer_email": "test@example.com",
                            "proposer_postcode": "SW1A1AA",
                            "animal_species": "Cat",
                            "animal_breed": "Ragdoll",
                            "animal_age": 3,
                            "animal_neutered": true
                        })
                        .to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body, json!({ "result": 3500.0, "valid": true }));
    }

    #[tokio::test]
    async fn cors_mirrors_request_origin() {
        let directory = tempfile::tempdir().expect("tempdir");
        let app = bootstrap_with_config(deterministic_config(directory.path()))
            .await
            .expect("bootstrap");

        let response = app
            .router()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "https://broker.example")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|value| value.to_str().ok()),
            Some("https://broker.example")
        );
    }
}
