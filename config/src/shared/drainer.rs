use serde::{Deserialize, Serialize};

use crate::shared::{SourceConfig, TranslatorConfig, ValidationError};

/// Complete configuration of the drainer binary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DrainerConfig {
    /// Statement generation settings.
    #[serde(default)]
    pub translator: TranslatorConfig,
    /// Change event source settings.
    pub source: SourceConfig,
}

impl DrainerConfig {
    /// Validates every section of the configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.translator.validate()?;
        self.source.validate()
    }
}
