//! Language type: validated catalog language.
//!
//! A `Language` can only be built for codes known to the registry, so code
//! holding one never has to handle an unknown language.

use crate::i18n::{LanguageConfig, LanguageRegistry};
use anyhow::{bail, Result};

/// A validated language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    /// Catalog language code (e.g. "en", "zh_CN")
    code: &'static str,
}

impl Language {
    pub const ENGLISH: Language = Language { code: "en" };
    pub const POLISH: Language = Language { code: "pl" };
    pub const RUSSIAN: Language = Language { code: "ru" };
    pub const SWEDISH: Language = Language { code: "sv" };
    pub const CHINESE: Language = Language { code: "zh_CN" };

    /// Create a Language from a language code string.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is valid and the language is enabled
    /// * `Err` if the code is not found or the language is disabled
    ///
    /// # Example
    /// ```ignore
    /// let polish = Language::from_code("pl")?;
    /// ```
    pub fn from_code(code: &str) -> Result<Language> {
        let registry = LanguageRegistry::get();

        match registry.get_by_code(code) {
            Some(config) if config.enabled => Ok(Language {
                code: config.code, // Use the static str from the registry
            }),
            Some(_) => bail!("Language '{}' is not enabled", code),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// Get the reference language, whose source texts are canonical.
    pub fn canonical() -> Language {
        let config = LanguageRegistry::get().canonical();
        Language { code: config.code }
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Panics if the language code is not found in the registry. This cannot
    /// happen for a Language built through `from_code` or the constants.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    pub fn is_canonical(&self) -> bool {
        self.config().is_canonical
    }

    /// Index of the plural form this language uses for `n`.
    pub fn plural_form(&self, n: u64) -> usize {
        self.config().plural_rule.form_index(n)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code)
    }
}
