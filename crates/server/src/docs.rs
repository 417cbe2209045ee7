//! OpenAPI description of the public endpoints, served at
//! `GET /docs/openapi.json`.

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use swallow_core::validation::REQUIRED_FIELDS;
use swallow_core::AnimalSpecies;

use crate::health::SERVICE_VERSION;

pub fn router() -> Router {
    Router::new().route("/docs/openapi.json", get(openapi))
}

async fn openapi() -> Json<Value> {
    Json(openapi_document())
}

fn error_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "error": { "type": "string" },
            "message": { "type": "string" }
        }
    })
}

pub fn openapi_document() -> Value {
    let species: Vec<&str> = AnimalSpecies::ALL.iter().map(AnimalSpecies::as_str).collect();

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Swallow Pricing API",
            "description": "API for generating insurance quotes using the Swallow pricing engine",
            "version": SERVICE_VERSION
        },
        "tags": [
            { "name": "quotes", "description": "Quote generation endpoints" },
            { "name": "health", "description": "Health check endpoints" }
        ],
        "paths": {
            "/quote/{project_id}": {
                "post": {
                    "tags": ["quotes"],
                    "operationId": "generateQuote",
                    "summary": "Generate insurance quote",
                    "description": "Generate an insurance quote based on the provided parameters and pricing project",
                    "parameters": [{
                        "name": "project_id",
                        "in": "path",
                        "required": true,
                        "description": "ID of the pricing project to use",
                        "schema": { "type": "string" }
                    }],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/QuoteInput" },
                                "example": {
                                    "proposer_name": "John Smith",
                                    "proposer_email": "john@example.com",
                                    "proposer_postcode": "SW1A1AA",
                                    "animal_species": "Cat",
                                    "animal_breed": "Ragdoll",
                                    "animal_age": 3,
                                    "animal_neutered": true,
                                    "base": 1000,
                                    "commission_rate": 0.15,
                                    "tax_rate": 0.125
                                }
                            }
                        }
                    },
                    "responses": {
                        "200": {
                            "description": "Successful quote generation",
                            "content": { "application/json": {
                                "schema": { "$ref": "#/components/schemas/QuoteResponse" },
                                "example": { "result": 3500, "valid": true }
                            } }
                        },
                        "400": {
                            "description": "Bad request - invalid input parameters",
                            "content": { "application/json": { "schema": error_schema() } }
                        },
                        "404": {
                            "description": "Project not found",
                            "content": { "application/json": {
                                "schema": error_schema(),
                                "example": {
                                    "error": "Project not found",
                                    "message": "No project found with ID: pet_insurance"
                                }
                            } }
                        },
                        "500": {
                            "description": "Internal server error",
                            "content": { "application/json": { "schema": error_schema() } }
                        }
                    }
                }
            },
            "/health": {
                "get": {
                    "tags": ["health"],
                    "operationId": "healthCheck",
                    "summary": "API health check",
                    "responses": {
                        "200": {
                            "description": "Successful response",
                            "content": { "application/json": { "schema": {
                                "type": "object",
                                "properties": {
                                    "status": { "type": "string", "enum": ["ok"] },
                                    "version": { "type": "string" },
                                    "timestamp": { "type": "string", "format": "date-time" }
                                }
                            } } }
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "QuoteInput": {
                    "type": "object",
                    "required": REQUIRED_FIELDS,
                    "properties": {
                        "base": { "type": "number", "description": "Base premium amount" },
                        "proposer_name": { "type": "string" },
                        "proposer_email": { "type": "string", "format": "email" },
                        "proposer_postcode": { "type": "string" },
                        "commission_rate": { "type": "number", "minimum": 0, "maximum": 1 },
                        "tax_rate": { "type": "number", "minimum": 0, "maximum": 1 },
                        "animal_species": { "type": "string", "enum": species },
                        "animal_breed": { "type": "string" },
                        "animal_age": { "type": "integer", "minimum": 0 },
                        "animal_neutered": { "type": "boolean" }
                    }
                },
                "QuoteResponse": {
                    "type": "object",
                    "properties": {
                        "result": { "type": "number", "description": "The calculated premium amount" },
                        "valid": { "type": "boolean", "description": "Whether the quote passes business rules" }
                    }
                }
            }
        }
    })
}
