use std::collections::HashMap;
use std::sync::Arc;

use crate::bail;
use crate::error::{ErrorKind, TranslateResult};
use crate::translator::{MysqlTranslator, Translator};

/// Maps dialect names to translators.
///
/// The registry is built once at startup and only read afterwards, so it can be shared across
/// threads by reference or behind an [`Arc`].
#[derive(Debug, Default, Clone)]
pub struct TranslatorRegistry {
    translators: HashMap<String, Arc<dyn Translator>>,
}

impl TranslatorRegistry {
    /// Creates an empty [`TranslatorRegistry`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a [`TranslatorRegistry`] holding every built-in dialect.
    ///
    /// Built-in dialects are added with [`TranslatorRegistry::register`] and fail the same way
    /// on a duplicate name.
    pub fn with_default_dialects() -> TranslateResult<Self> {
        let mut registry = Self::new();
        registry.register(MysqlTranslator::DIALECT, Arc::new(MysqlTranslator))?;

        Ok(registry)
    }

    /// Registers `translator` under `name`.
    ///
    /// Registering a name twice is an error, the first translator stays registered.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        translator: Arc<dyn Translator>,
    ) -> TranslateResult<()> {
        let name = name.into();
        if self.translators.contains_key(&name) {
            bail!(
                ErrorKind::InvalidState,
                "Translator already registered",
                format!("A translator is already registered for dialect `{name}`")
            );
        }

        self.translators.insert(name, translator);

        Ok(())
    }

    /// Returns the translator registered under `name`.
    pub fn lookup(&self, name: &str) -> TranslateResult<Arc<dyn Translator>> {
        match self.translators.get(name) {
            Some(translator) => Ok(translator.clone()),
            None => bail!(
                ErrorKind::UnknownDialect,
                "Translator not registered",
                format!(
                    "No translator is registered for dialect `{name}` (registered: {})",
                    self.dialects().join(", ")
                )
            ),
        }
    }

    /// Returns the registered dialect names in lexicographic order.
    pub fn dialects(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.translators.keys().map(String::as_str).collect();
        names.sort_unstable();

        names
    }
}
