//! Shape and range checks that turn an untyped request body into a
//! [`QuoteInput`]. The first violation found is reported; required fields are
//! checked before any field is type-checked.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::domain::quote::{AnimalSpecies, QuoteInput};
use crate::errors::QuoteValidationError;

pub const REQUIRED_FIELDS: [&str; 7] = [
    "proposer_name",
    "proposer_email",
    "proposer_postcode",
    "animal_species",
    "animal_breed",
    "animal_age",
    "animal_neutered",
];

const EMAIL_PATTERN: &str = r"(?i)^[a-z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?)*$";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"))
}

pub fn parse_quote_input(raw: &Value) -> Result<QuoteInput, QuoteValidationError> {
    let body = raw.as_object().ok_or(QuoteValidationError::NotAnObject)?;

    if let Some(missing) = REQUIRED_FIELDS.iter().find(|field| !body.contains_key(**field)) {
        return Err(QuoteValidationError::MissingField(*missing));
    }

    let proposer_name = required_text(body, "proposer_name")?;
    let proposer_email = required_text(body, "proposer_email")?;
    if !email_regex().is_match(&proposer_email) {
        return Err(QuoteValidationError::InvalidFormat {
            field: "proposer_email",
            format: "email",
        });
    }
    let proposer_postcode = required_text(body, "proposer_postcode")?;

    let base = optional_number(body, "base")?;
    let commission_rate = optional_rate(body, "commission_rate")?;
    let tax_rate = optional_rate(body, "tax_rate")?;

    let animal_species = species(body)?;
    let animal_breed = required_text(body, "animal_breed")?;
    let animal_age = age(body)?;
    let animal_neutered = body
        .get("animal_neutered")
        .and_then(Value::as_bool)
        .ok_or(QuoteValidationError::WrongType { field: "animal_neutered", expected: "boolean" })?;

    Ok(QuoteInput {
        proposer_name,
        proposer_email,
        proposer_postcode,
        base,
        commission_rate,
        tax_rate,
        animal_species,
        animal_breed,
        animal_age,
        animal_neutered,
    })
}

fn required_text(
    body: &Map<String, Value>,
    field: &'static str,
) -> Result<String, QuoteValidationError> {
    body.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(QuoteValidationError::WrongType { field, expected: "string" })
}

fn optional_number(
    body: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<f64>, QuoteValidationError> {
    match body.get(field) {
        None => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or(QuoteValidationError::WrongType { field, expected: "number" }),
    }
}

fn optional_rate(
    body: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<f64>, QuoteValidationError> {
    let rate = optional_number(body, field)?;
    if let Some(value) = rate {
        if !(0.0..=1.0).contains(&value) {
            let bound = if value < 0.0 { ">= 0" } else { "<= 1" };
            return Err(QuoteValidationError::OutOfRange { field, bound: bound.to_string() });
        }
    }
    Ok(rate)
}

fn species(body: &Map<String, Value>) -> Result<AnimalSpecies, QuoteValidationError> {
    let field = "animal_species";
    let raw = body
        .get(field)
        .and_then(Value::as_str)
        .ok_or(QuoteValidationError::WrongType { field, expected: "string" })?;

    raw.parse::<AnimalSpecies>().map_err(|()| QuoteValidationError::NotAllowed {
        field,
        allowed: AnimalSpecies::ALL
            .iter()
            .map(AnimalSpecies::as_str)
            .collect::<Vec<_>>()
            .join(", "),
    })
}

fn age(body: &Map<String, Value>) -> Result<u32, QuoteValidationError> {
    let field = "animal_age";
    let wrong_type = QuoteValidationError::WrongType { field, expected: "integer" };
    let number = match body.get(field) {
        Some(Value::Number(number)) => number,
        _ => return Err(wrong_type),
    };

    let whole = if let Some(value) = number.as_u64() {
        value
    } else if number.as_i64().is_some() {
        return Err(QuoteValidationError::OutOfRange { field, bound: ">= 0".to_string() });
    } else {
        let value = number.as_f64().ok_or(wrong_type.clone())?;
        if value.fract() != 0.0 {
            return Err(wrong_type);
        }
        if value < 0.0 {
            return Err(QuoteValidationError::OutOfRange { field, bound: ">= 0".to_string() });
        }
        if value > f64::from(u32::MAX) {
            return Err(QuoteValidationError::OutOfRange {
                field,
                bound: format!("<= {}", u32::MAX),
            });
        }
        value as u64
    };

    u32::try_from(whole).map_err(|_| QuoteValidationError::OutOfRange {
        field,
        bound: format!("<= {}", u32::MAX),
    })
}
