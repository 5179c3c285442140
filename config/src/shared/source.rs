use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Where captured change events are read from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SourceConfig {
    /// Path of a JSON file holding an array of change events.
    pub events_path: PathBuf,
}

impl SourceConfig {
    /// Validates source settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.events_path.as_os_str().is_empty() {
            return Err(ValidationError::InvalidFieldValue {
                field: "source.events_path".to_string(),
                constraint: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
