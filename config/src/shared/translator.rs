use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Settings of statement generation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TranslatorConfig {
    /// Name of the registered dialect statements are generated for.
    #[serde(default = "default_dialect")]
    pub dialect: String,
    /// Schema that replaces the schema of every change event, when set.
    #[serde(default)]
    pub target_schema: Option<String>,
}

impl TranslatorConfig {
    /// Dialect used when none is configured.
    pub const DEFAULT_DIALECT: &'static str = "mysql";

    /// Validates translator settings.
    ///
    /// Ensures the dialect and the target schema, when set, are not blank.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.dialect.trim().is_empty() {
            return Err(ValidationError::InvalidFieldValue {
                field: "translator.dialect".to_string(),
                constraint: "must not be empty".to_string(),
            });
        }

        if let Some(target_schema) = &self.target_schema
            && target_schema.trim().is_empty()
        {
            return Err(ValidationError::InvalidFieldValue {
                field: "translator.target_schema".to_string(),
                constraint: "must not be empty when set".to_string(),
            });
        }

        Ok(())
    }

    /// Returns the schema statements of an event captured in `schema` are generated for.
    pub fn schema_for<'a>(&'a self, schema: &'a str) -> &'a str {
        self.target_schema.as_deref().unwrap_or(schema)
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            dialect: default_dialect(),
            target_schema: None,
        }
    }
}

fn default_dialect() -> String {
    TranslatorConfig::DEFAULT_DIALECT.to_string()
}
