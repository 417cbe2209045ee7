use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::project::ProjectId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimalSpecies {
    Cat,
    Dog,
    Rabbit,
    Horse,
    Bird,
}

impl AnimalSpecies {
    pub const ALL: [AnimalSpecies; 5] =
        [Self::Cat, Self::Dog, Self::Rabbit, Self::Horse, Self::Bird];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cat => "Cat",
            Self::Dog => "Dog",
            Self::Rabbit => "Rabbit",
            Self::Horse => "Horse",
            Self::Bird => "Bird",
        }
    }
}

impl fmt::Display for AnimalSpecies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnimalSpecies {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|species| species.as_str() == value).ok_or(())
    }
}

/// Validated quote parameters. Only built by
/// [`crate::validation::parse_quote_input`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QuoteInput {
    pub proposer_name: String,
    pub proposer_email: String,
    pub proposer_postcode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<f64>,
    pub animal_species: AnimalSpecies,
    pub animal_breed: String,
    pub animal_age: u32,
    pub animal_neutered: bool,
}

/// What the scoring engine returns for one quote.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteResult {
    pub result: f64,
    pub valid: bool,
    /// Engine diagnostics returned when debug output was requested. Kept for
    /// logging; never part of the public response.
    #[serde(default, rename = "debug", skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Value>,
}

impl QuoteResult {
    pub fn to_response(&self) -> QuoteResponse {
        QuoteResponse { result: self.result, valid: self.valid }
    }
}

/// Public body of a successful quote.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub result: f64,
    pub valid: bool,
}

/// Stage at which an operational failure happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InternalFailure {
    ProjectStore,
    ScoringEngine,
    ScoringTimeout,
}

impl InternalFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProjectStore => "project_store",
            Self::ScoringEngine => "scoring_engine",
            Self::ScoringTimeout => "scoring_timeout",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum QuoteOutcome {
    Success(QuoteResult),
    ProjectNotFound { project_id: ProjectId },
    ValidationFailed { reason: String },
    ScoringFailed(InternalFailure),
}

impl QuoteOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::ProjectNotFound { .. } => "project_not_found",
            Self::ValidationFailed { .. } => "validation_failed",
            Self::ScoringFailed(_) => "scoring_failed",
        }
    }
}
