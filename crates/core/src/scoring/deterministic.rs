use async_trait::async_trait;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::json;

use super::{ScoringEngine, ScoringError, ScoringRequest};
use crate::domain::quote::{AnimalSpecies, QuoteInput, QuoteResult};

const DEFAULT_BASE: i64 = 1000;

/// Fixed-rule engine: cats score at 3.5x the base, everything else at 1.2x.
/// Cats and non-Collie dogs are insurable; nothing else is.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeterministicScoringEngine;

#[async_trait]
impl ScoringEngine for DeterministicScoringEngine {
    async fn score(&self, request: ScoringRequest<'_>) -> Result<QuoteResult, ScoringError> {
        score_quote(request.quote, request.debug)
    }
}

pub fn is_insurable(quote: &QuoteInput) -> bool {
    match quote.animal_species {
        AnimalSpecies::Cat => true,
        AnimalSpecies::Dog => quote.animal_breed != "Collie",
        _ => false,
    }
}

fn species_multiplier(species: AnimalSpecies) -> Decimal {
    match species {
        AnimalSpecies::Cat => Decimal::new(35, 1),
        _ => Decimal::new(12, 1),
    }
}

pub fn score_quote(quote: &QuoteInput, debug: bool) -> Result<QuoteResult, ScoringError> {
    let base = match quote.base {
        // a zero base falls back to the default, like an absent one
        Some(value) if value != 0.0 => Decimal::from_f64(value)
            .ok_or_else(|| ScoringError::Rejected(format!("base {value} is not representable")))?,
        _ => Decimal::from(DEFAULT_BASE),
    };
    let multiplier = species_multiplier(quote.animal_species);
    let premium = base
        .checked_mul(multiplier)
        .ok_or_else(|| ScoringError::Rejected(format!("premium for base {base} overflows")))?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let result = premium
        .to_f64()
        .ok_or_else(|| ScoringError::Rejected(format!("premium {premium} overflows")))?;

    let diagnostics = debug.then(|| {
        json!({
            "base": base.to_string(),
            "multiplier": multiplier.to_string(),
            "premium": premium.to_string(),
            "species": quote.animal_species.as_str(),
        })
    });

    Ok(QuoteResult { result, valid: is_insurable(quote), diagnostics })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::DeterministicScoringEngine;
    use crate::domain::project::ProjectDefinition;
    use crate::domain::quote::{AnimalSpecies, QuoteInput};
    use crate::scoring::{ScoringEngine, ScoringError, ScoringRequest};

    fn quote(species: AnimalSpecies, breed: &str) -> QuoteInput {
        QuoteInput {
            proposer_name: "Test User".to_string(),
            proposer_email: "test@example.com".to_string(),
            proposer_postcode: "SW1A1AA".to_string(),
            base: None,
            commission_rate: None,
            tax_rate: None,
            animal_species: species,
            animal_breed: breed.to_string(),
            animal_age: 3,
            animal_neutered: true,
        }
    }

    #[tokio::test]
    async fn cat_scores_valid_at_default_base() {
        let project = ProjectDefinition(json!({ "id": "pet-insurance" }));
        let quote = quote(AnimalSpecies::Cat, "Ragdoll");

        let result = DeterministicScoringEngine
            .score(ScoringRequest { project: &project, quote: &quote, debug: false })
            .await
            .expect("score");

        assert!(result.valid);
        assert_eq!(result.result, 3500.0);
        assert!(result.diagnostics.is_none());
    }

    #[tokio::test]
    async fn collie_is_not_insurable() {
        let project = ProjectDefinition(json!({}));
        let quote = quote(AnimalSpecies::Dog, "Collie");

        let result = DeterministicScoringEngine
            .score(ScoringRequest { project: &project, quote: &quote, debug: true })
            .await
            .expect("score");

        assert!(!result.valid);
        assert_eq!(result.result, 1200.0);
        assert_eq!(result.diagnostics.expect("debug payload")["species"], "Dog");
    }

    #[test]
    fn other_dogs_are_insurable_and_other_species_are_not() {
        assert!(super::is_insurable(&quote(AnimalSpecies::Dog, "Labrador")));
        assert!(!super::is_insurable(&quote(AnimalSpecies::Horse, "Shire")));
    }

    #[test]
    fn premium_is_rounded_to_pennies() {
        let mut input = quote(AnimalSpecies::Rabbit, "Lop");
        input.base = Some(10.004);

        let result = super::score_quote(&input, false).expect("score");
        assert_eq!(result.result, 12.0);
    }

    #[test]
    fn oversized_base_is_rejected_instead_of_overflowing() {
        let mut input = quote(AnimalSpecies::Cat, "Ragdoll");
        input.base = Some(7.0e28);

        let error = super::score_quote(&input, true).expect_err("overflow");
        assert!(
            matches!(error, ScoringError::Rejected(ref message) if message.contains("overflows"))
        );
    }
}
