use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::domain::project::{ProjectDefinition, ProjectId};
use crate::domain::quote::{InternalFailure, QuoteInput, QuoteOutcome};
use crate::errors::DomainError;
use crate::projects::{ProjectResolver, ProjectStoreError};
use crate::scoring::{ScoringEngine, ScoringRequest};
use crate::validation::parse_quote_input;

pub const DEFAULT_SCORING_TIMEOUT: Duration = Duration::from_secs(10);

/// Validates a quote request, resolves its pricing project and asks the
/// scoring engine for a premium. Every path ends in a [`QuoteOutcome`]; no
/// error escapes to the caller.
///
/// Holds no per-request state, so one instance serves all requests.
#[derive(Clone)]
pub struct QuoteOrchestrator {
    resolver: Arc<dyn ProjectResolver>,
    scoring: Arc<dyn ScoringEngine>,
    scoring_timeout: Duration,
}

impl QuoteOrchestrator {
    pub fn new(resolver: Arc<dyn ProjectResolver>, scoring: Arc<dyn ScoringEngine>) -> Self {
        Self { resolver, scoring, scoring_timeout: DEFAULT_SCORING_TIMEOUT }
    }

    pub fn with_scoring_timeout(mut self, scoring_timeout: Duration) -> Self {
        self.scoring_timeout = scoring_timeout;
        self
    }

    pub fn scoring_timeout(&self) -> Duration {
        self.scoring_timeout
    }

    pub async fn handle(&self, project_id: &str, raw_quote: &Value) -> QuoteOutcome {
        let (project_id, quote) = match validate(project_id, raw_quote) {
            Ok(validated) => validated,
            Err(error) => {
                info!(
                    event_name = "quote.validation_failed",
                    project_id = %project_id,
                    reason = %error,
                    "quote request rejected"
                );
                return QuoteOutcome::ValidationFailed { reason: error.to_string() };
            }
        };

        let project = match self.resolver.resolve(&project_id).await {
            Ok(project) => project,
            Err(ProjectStoreError::NotFound(project_id)) => {
                info!(
                    event_name = "quote.project_not_found",
                    project_id = %project_id,
                    "no pricing project for quote"
                );
                return QuoteOutcome::ProjectNotFound { project_id };
            }
            Err(error) => {
                error!(
                    event_name = "quote.project_store_failed",
                    project_id = %project_id,
                    error = %error,
                    "project definition could not be loaded"
                );
                return QuoteOutcome::ScoringFailed(InternalFailure::ProjectStore);
            }
        };

        self.score(&project_id, &project, &quote).await
    }

    async fn score(
        &self,
        project_id: &ProjectId,
        project: &ProjectDefinition,
        quote: &QuoteInput,
    ) -> QuoteOutcome {
        let request = ScoringRequest { project, quote, debug: true };

        match tokio::time::timeout(self.scoring_timeout, self.scoring.score(request)).await {
            Ok(Ok(result)) => {
                info!(
                    event_name = "quote.scored",
                    project_id = %project_id,
                    valid = result.valid,
                    has_diagnostics = result.diagnostics.is_some(),
                    "quote scored"
                );
                QuoteOutcome::Success(result)
            }
            Ok(Err(error)) => {
                error!(
                    event_name = "quote.scoring_failed",
                    project_id = %project_id,
                    error = %error,
                    "scoring engine failed"
                );
                QuoteOutcome::ScoringFailed(InternalFailure::ScoringEngine)
            }
            Err(_elapsed) => {
                warn!(
                    event_name = "quote.scoring_timeout",
                    project_id = %project_id,
                    timeout_ms = self.scoring_timeout.as_millis() as u64,
                    "scoring engine did not answer in time"
                );
                QuoteOutcome::ScoringFailed(InternalFailure::ScoringTimeout)
            }
        }
    }
}

fn validate(project_id: &str, raw_quote: &Value) -> Result<(ProjectId, QuoteInput), DomainError> {
    let project_id = ProjectId::parse(project_id)?;
    let quote = parse_quote_input(raw_quote)?;
    Ok((project_id, quote))
}
