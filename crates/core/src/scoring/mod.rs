//! Boundary to the external premium scoring capability.
//!
//! The engine is opaque: it receives the project definition and the validated
//! quote, and answers with a premium and a validity flag. How it prices is not
//! this crate's concern. [`deterministic::DeterministicScoringEngine`] is a
//! reproducible stand-in for tests and local runs.

pub mod deterministic;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::domain::project::ProjectDefinition;
use crate::domain::quote::{QuoteInput, QuoteResult};

#[derive(Clone, Copy, Debug, Serialize)]
pub struct ScoringRequest<'a> {
    pub project: &'a ProjectDefinition,
    pub quote: &'a QuoteInput,
    pub debug: bool,
}

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("scoring engine rejected the request: {0}")]
    Rejected(String),
    #[error("scoring engine transport failure: {0}")]
    Transport(String),
    #[error("scoring engine returned an unreadable response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait ScoringEngine: Send + Sync {
    async fn score(&self, request: ScoringRequest<'_>) -> Result<QuoteResult, ScoringError>;
}
