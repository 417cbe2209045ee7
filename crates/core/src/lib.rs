//! Quote orchestration for the Swallow pricing API.
//!
//! A quote request flows through three collaborators:
//! 1. **Validation** (`validation`) - untyped JSON body → [`QuoteInput`]
//! 2. **Project resolution** (`projects`) - [`ProjectId`] → [`ProjectDefinition`]
//! 3. **Scoring** (`scoring`) - opaque external engine → [`QuoteResult`]
//!
//! [`QuoteOrchestrator`] ties them together and reduces every path to a
//! [`QuoteOutcome`]. Pricing itself is never decided here.

pub mod config;
pub mod domain;
pub mod errors;
pub mod orchestrator;
pub mod projects;
pub mod scoring;
pub mod validation;

pub use domain::project::{ProjectDefinition, ProjectId};
pub use domain::quote::{
    AnimalSpecies, InternalFailure, QuoteInput, QuoteOutcome, QuoteResponse, QuoteResult,
};
pub use errors::{DomainError, InterfaceError, QuoteValidationError};
pub use orchestrator::QuoteOrchestrator;
pub use projects::{ProjectResolver, ProjectStoreError};
pub use scoring::{ScoringEngine, ScoringError, ScoringRequest};
