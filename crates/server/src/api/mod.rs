//! Enrichment request handling independent of the HTTP layer.

use axum::http::StatusCode;
use serde_json::Value;
use shared::{
    error::ApiError,
    protocol::{EnrichRequest, EnrichedResult},
};
use tracing::{info, warn};

use crate::generator::ContentGenerator;

pub const MISSING_INPUT_MESSAGE: &str = "Missing input data";
pub const REQUIRED_FIELDS_MESSAGE: &str = "Company name and website are required";
pub const GENERATION_FAILED_MESSAGE: &str = "AI model generation error";
pub const PARSE_FAILED_MESSAGE: &str = "Error parsing AI response";
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected server error occurred";

pub type ApiFailure = (StatusCode, ApiError);

/// Extracts the request fields from a decoded JSON body.
///
/// Both fields must be non-blank strings. Any other value (`123`, `true`,
/// an object) is reported as missing rather than coerced into the prompt.
pub fn validate_input(body: &Value) -> Result<EnrichRequest, ApiFailure> {
    let fields = match body.as_object() {
        Some(fields) if !fields.is_empty() => fields,
        _ => return Err(bad_request(MISSING_INPUT_MESSAGE)),
    };

    let field = |name: &str| {
        fields
            .get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    match (field("company_name"), field("website")) {
        (Some(company_name), Some(website)) => Ok(EnrichRequest::new(company_name, website)),
        _ => Err(bad_request(REQUIRED_FIELDS_MESSAGE)),
    }
}

pub fn build_prompt(request: &EnrichRequest) -> String {
    let company_name = &request.company_name;
    let website = &request.website;
    format!(
        r#"
Provide a detailed profile for {company_name} with the website: {website}.
The response should be in JSON format, with the following structure:
{{
    "company_name": "{company_name}",
    "website": "{website}",
    "description": "A brief description",
    "industry": "Primary industry",
    "estimated_size": "Approximate number of employees",
    "products_services": ["Service or product 1", "Service or product 2"],
    "headquarters": "Company location, if known",
    "year_founded": "Founding year, if known",
    "key_features": ["Feature 1", "Feature 2"]
}}
"#
    )
}

/// Strips surrounding whitespace and a Markdown code fence from model output.
pub fn extract_json(generated: &str) -> &str {
    let trimmed = generated.trim();
    let Some(rest) = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
    else {
        return trimmed;
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

pub async fn enrich_company(
    generator: &dyn ContentGenerator,
    request: &EnrichRequest,
) -> Result<EnrichedResult, ApiFailure> {
    let prompt = build_prompt(request);
    let generated = generator.generate(&prompt).await.map_err(|error| {
        warn!(%error, "enrich: model generation failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new(GENERATION_FAILED_MESSAGE).with_details(error.to_string()),
        )
    })?;

    let generated = generated.trim();
    let enriched: EnrichedResult = serde_json::from_str(extract_json(generated)).map_err(|error| {
        warn!(%error, "enrich: model output is not a company profile");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new(PARSE_FAILED_MESSAGE)
                .with_details(error.to_string())
                .with_raw_response(generated),
        )
    })?;

    info!(company_name = %enriched.company_name, "enrich: profile generated");
    Ok(enriched)
}

fn bad_request(message: &str) -> ApiFailure {
    (StatusCode::BAD_REQUEST, ApiError::new(message))
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
