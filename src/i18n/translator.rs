//! Runtime text lookup by message identifier.
//!
//! A missing or unfinished translation is never an error: lookups fall back to
//! the reference translation, then the reference source text, and finally the
//! identifier itself.

use crate::i18n::{bundled, Catalog, Language, LanguageRegistry, LookupMetrics, Message, PluralRule};
use anyhow::Result;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

static ARG_REGEX: OnceLock<Regex> = OnceLock::new();
static COUNT_REGEX: OnceLock<Regex> = OnceLock::new();

/// Text lookup for one target language.
pub struct Translator {
    language: String,
    plural_rule: PluralRule,
    reference_rule: PluralRule,
    translations: HashMap<String, Message>,
    reference: HashMap<String, Message>,
}

impl Translator {
    /// Create a translator from the reference catalog and an optional target
    /// catalog. Without a target every lookup resolves to reference text.
    pub fn new(reference: Catalog, catalog: Option<Catalog>) -> Self {
        let language = catalog
            .as_ref()
            .map(|c| c.language.clone())
            .unwrap_or_else(|| reference.language.clone());

        Self {
            plural_rule: LanguageRegistry::get().plural_rule(&language),
            reference_rule: LanguageRegistry::get().plural_rule(&reference.language),
            language,
            translations: catalog.map(index_by_key).unwrap_or_default(),
            reference: index_by_key(reference),
        }
    }

    /// Translator backed by the catalogs compiled into the library.
    pub fn bundled(language: Language) -> Result<Self> {
        let reference = bundled::reference()?;
        let catalog = bundled::catalog(language)?;
        Ok(Self::new(reference, Some(catalog)))
    }

    /// Target language code.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Whether either catalog defines `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.translations.contains_key(id) || self.reference.contains_key(id)
    }

    /// Look up the localized text for `id`.
    pub fn tr<'a>(&'a self, id: &'a str) -> &'a str {
        let metrics = LookupMetrics::global();
        let target = self.translations.get(id);

        if let Some(text) = target.and_then(Message::localized_text) {
            metrics.record_translated_hit();
            return text;
        }

        match self.fallback_record(id, target) {
            Some(msg) => {
                debug!(
                    "No translation for '{}' in '{}', using reference text",
                    id, self.language
                );
                metrics.record_reference_fallback();
                msg.localized_text()
                    .filter(|text| !text.is_empty())
                    .or_else(|| non_empty(&msg.source))
                    .unwrap_or(id)
            }
            None => {
                debug!("Unknown message identifier '{}'", id);
                metrics.record_unknown_id();
                id
            }
        }
    }

    /// Look up a plural message and substitute `%n` with `n`.
    ///
    /// An empty plural form is never served; the lookup falls back as if the
    /// record were untranslated.
    pub fn tr_n(&self, id: &str, n: u64) -> String {
        let metrics = LookupMetrics::global();
        let target = self.translations.get(id);

        let translated = target
            .filter(|msg| msg.is_translated())
            .and_then(|msg| msg.translation.form(self.plural_rule.form_index(n)))
            .and_then(non_empty);

        let text = match translated {
            Some(text) => {
                metrics.record_translated_hit();
                text
            }
            None => match self.fallback_record(id, target) {
                Some(msg) => {
                    metrics.record_reference_fallback();
                    let rule = if self.reference.contains_key(id) {
                        self.reference_rule
                    } else {
                        self.plural_rule
                    };
                    Some(msg)
                        .filter(|msg| msg.is_translated())
                        .and_then(|msg| msg.translation.form(rule.form_index(n)))
                        .and_then(non_empty)
                        .or_else(|| non_empty(&msg.source))
                        .unwrap_or(id)
                }
                None => {
                    metrics.record_unknown_id();
                    id
                }
            },
        };

        let count = COUNT_REGEX
            .get_or_init(|| Regex::new(r"%L?n").expect("count pattern is valid"));
        count.replace_all(text, n.to_string().as_str()).into_owned()
    }

    /// Record serving reference-language text for `id`: the reference record,
    /// else the target record, whose `source` is reference text as well.
    fn fallback_record<'a>(
        &'a self,
        id: &str,
        target: Option<&'a Message>,
    ) -> Option<&'a Message> {
        self.reference.get(id).or(target)
    }

    /// Replace `%1`..`%99` (and `%L1` forms) with `args`. Markers without a
    /// matching argument are left untouched.
    pub fn arg(text: &str, args: &[&str]) -> String {
        let regex = ARG_REGEX
            .get_or_init(|| Regex::new(r"%L?([1-9][0-9]?)").expect("arg pattern is valid"));

        regex
            .replace_all(text, |caps: &Captures| {
                let index: usize = caps[1].parse().unwrap_or(0);
                match args.get(index.wrapping_sub(1)) {
                    Some(value) => value.to_string(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

fn non_empty(text: &str) -> Option<&str> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn index_by_key(catalog: Catalog) -> HashMap<String, Message> {
    let mut index = HashMap::with_capacity(catalog.len());
    for context in catalog.contexts {
        for msg in context.messages {
            if msg.state.is_retired() {
                continue;
            }
            index.entry(msg.key().to_string()).or_insert(msg);
        }
    }
    index
}
