use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};

pub const ENRICH_ROUTE: &str = "/api/enrich";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichRequest {
    pub company_name: String,
    pub website: String,
}

impl EnrichRequest {
    pub fn new(company_name: impl Into<String>, website: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            website: website.into(),
        }
    }
}

/// Company profile returned by the enrichment service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedResult {
    #[serde(deserialize_with = "scalar_string")]
    pub company_name: String,
    #[serde(deserialize_with = "scalar_string")]
    pub website: String,
    #[serde(deserialize_with = "scalar_string")]
    pub description: String,
    #[serde(deserialize_with = "scalar_string")]
    pub industry: String,
    #[serde(deserialize_with = "scalar_string")]
    pub estimated_size: String,
    pub products_services: Vec<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub headquarters: String,
    #[serde(deserialize_with = "scalar_string")]
    pub year_founded: String,
    pub key_features: Vec<String>,
}

/// Accepts a string, number or boolean and keeps its textual form.
/// Model output often answers `"year_founded": 1998`.
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct ScalarVisitor;

    impl de::Visitor<'_> for ScalarVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a string, number or boolean")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
            Ok(value.to_owned())
        }

        fn visit_string<E: de::Error>(self, value: String) -> Result<String, E> {
            Ok(value)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_bool<E: de::Error>(self, value: bool) -> Result<String, E> {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(ScalarVisitor)
}
