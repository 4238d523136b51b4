//! Language registry: Single source of truth for all catalog languages.
//!
//! This module provides a centralized registry of the languages My Backup ships
//! catalogs for. It uses a singleton pattern with `OnceLock` to ensure
//! thread-safe initialization and access.

use std::sync::OnceLock;

/// How a language selects a plural form for a count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralRule {
    /// A single form for every count (e.g. Chinese)
    Single,

    /// "one" for 1, "other" otherwise (e.g. English, Swedish)
    OneOther,

    /// Three forms: one, few (2-4 except 12-14), many (Polish)
    Polish,

    /// Three forms: one (1, 21, 31, ...), few, many (Russian)
    EastSlavic,
}

impl PluralRule {
    /// Number of forms a plural translation should carry.
    pub fn form_count(&self) -> usize {
        match self {
            PluralRule::Single => 1,
            PluralRule::OneOther => 2,
            PluralRule::Polish | PluralRule::EastSlavic => 3,
        }
    }

    /// Index of the plural form to use for `n`.
    pub fn form_index(&self, n: u64) -> usize {
        let few = (2..=4).contains(&(n % 10)) && !(12..=14).contains(&(n % 100));
        match self {
            PluralRule::Single => 0,
            PluralRule::OneOther => usize::from(n != 1),
            PluralRule::Polish => {
                if n == 1 {
                    0
                } else if few {
                    1
                } else {
                    2
                }
            }
            PluralRule::EastSlavic => {
                if n % 10 == 1 && n % 100 != 11 {
                    0
                } else if few {
                    1
                } else {
                    2
                }
            }
        }
    }
}

/// Configuration for a supported language.
///
/// Contains all metadata for a specific language, including its code, names,
/// enabled status, plural rule, and whether it's the reference language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// Catalog language code (e.g., "en", "pl", "zh_CN")
    pub code: &'static str,

    /// English name of the language (e.g., "English", "Polish")
    pub name: &'static str,

    /// Native name of the language (e.g., "English", "Polski")
    pub native_name: &'static str,

    /// Whether this is the reference language (only one should be true)
    pub is_canonical: bool,

    /// Whether this language is enabled for use
    pub enabled: bool,

    pub plural_rule: PluralRule,
}

/// Global language registry singleton.
///
/// This registry contains all supported languages and provides methods to query
/// and access them. It's initialized once on first access and remains immutable
/// thereafter.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    ///
    /// # Arguments
    /// * `code` - The catalog language code (e.g., "en", "zh_CN")
    ///
    /// # Returns
    /// * `Some(&LanguageConfig)` if the language exists
    /// * `None` if the language is not found
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get all enabled languages.
    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// Get all languages (including disabled ones).
    pub fn list_all(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().collect()
    }

    /// Get the reference language configuration.
    ///
    /// The reference language is the one whose `source` texts are canonical
    /// for translators (English).
    ///
    /// # Panics
    /// Panics if no reference language is found or if multiple reference
    /// languages are defined (this indicates a configuration error).
    pub fn canonical(&self) -> &LanguageConfig {
        let canonical_langs: Vec<_> = self
            .languages
            .iter()
            .filter(|lang| lang.is_canonical)
            .collect();

        match canonical_langs.len() {
            0 => panic!("No canonical language found in registry"),
            1 => canonical_langs[0],
            _ => panic!("Multiple canonical languages found in registry"),
        }
    }

    /// Plural rule of a language, defaulting to one/other for unknown codes.
    pub fn plural_rule(&self, code: &str) -> PluralRule {
        self.get_by_code(code)
            .map(|lang| lang.plural_rule)
            .unwrap_or(PluralRule::OneOther)
    }

    /// Check if a language code is supported and enabled.
    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|lang| lang.enabled)
            .unwrap_or(false)
    }
}

/// Languages with a shipped catalog.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            is_canonical: true,
            enabled: true,
            plural_rule: PluralRule::OneOther,
        },
        LanguageConfig {
            code: "pl",
            name: "Polish",
            native_name: "Polski",
            is_canonical: false,
            enabled: true,
            plural_rule: PluralRule::Polish,
        },
        LanguageConfig {
            code: "ru",
            name: "Russian",
            native_name: "Русский",
            is_canonical: false,
            enabled: true,
            plural_rule: PluralRule::EastSlavic,
        },
        LanguageConfig {
            code: "sv",
            name: "Swedish",
            native_name: "Svenska",
            is_canonical: false,
            enabled: true,
            plural_rule: PluralRule::OneOther,
        },
        LanguageConfig {
            code: "zh_CN",
            name: "Chinese (Simplified)",
            native_name: "简体中文",
            is_canonical: false,
            enabled: true,
            plural_rule: PluralRule::Single,
        },
    ]
}
