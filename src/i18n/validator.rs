//! Catalog quality validation module.
//!
//! This module checks a translated catalog against the reference catalog:
//! identifier uniqueness, identifier parity, empty translations that are not
//! marked unfinished, stale source texts, and preservation of `%1`/`%n`
//! placeholders.

use crate::i18n::{Catalog, LanguageRegistry, Message, Translation};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Validation report containing errors and warnings about a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Violations of catalog invariants
    pub errors: Vec<String>,

    /// Issues that degrade to reference-text fallback at runtime
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Create a new empty validation report
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Check if the report has any errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if the report has any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if the report is clean (no errors or warnings)
    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifier drift between a catalog and the reference.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ParityReport {
    /// Reference identifiers absent from the catalog (sorted)
    pub missing: Vec<String>,

    /// Catalog identifiers absent from the reference (sorted)
    pub extra: Vec<String>,
}

impl ParityReport {
    /// The catalog's identifiers are a subset of the reference's.
    pub fn is_subset(&self) -> bool {
        self.extra.is_empty()
    }

    /// Both identifier sets are equal.
    pub fn is_equal(&self) -> bool {
        self.missing.is_empty() && self.extra.is_empty()
    }
}

/// Validator for catalog quality.
pub struct CatalogValidator;

// Qt argument markers: %1..%99, localized %L1, plural count %n / %Ln
static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

impl CatalogValidator {
    /// Validate a catalog against the reference catalog.
    ///
    /// Errors:
    /// - duplicate identifiers
    /// - identifiers the reference does not define
    /// - empty translations not marked unfinished
    ///
    /// Warnings:
    /// - reference identifiers missing from the catalog
    /// - unfinished translations
    /// - source text differing from the reference (stale translation)
    /// - placeholder mismatch between source and translation
    pub fn validate(reference: &Catalog, catalog: &Catalog) -> ValidationReport {
        let mut report = Self::validate_records(catalog);

        let parity = Self::parity(reference, catalog);
        for id in &parity.extra {
            report
                .errors
                .push(format!("Identifier '{}' is not defined by the reference catalog", id));
        }
        for id in &parity.missing {
            report
                .warnings
                .push(format!("Identifier '{}' is missing from the catalog", id));
        }

        let reference_index = reference.index();
        for msg in catalog.messages().filter(|msg| !msg.state.is_retired()) {
            if let Some(reference_msg) = reference_index.get(msg.key()) {
                if reference_msg.source != msg.source {
                    report.warnings.push(format!(
                        "Stale translation for '{}': source is {:?}, reference has {:?}",
                        msg.key(),
                        msg.source,
                        reference_msg.source
                    ));
                }
            }
        }

        report
    }

    /// Validate a catalog file: `validate` plus a check that the declared
    /// language matches the one implied by the file name.
    pub fn validate_file(
        reference: &Catalog,
        catalog: &Catalog,
        expected_language: &str,
    ) -> ValidationReport {
        let mut report = Self::validate(reference, catalog);
        if catalog.language != expected_language {
            report.warnings.push(format!(
                "Catalog declares language '{}', expected '{}'",
                catalog.language, expected_language
            ));
        }
        report
    }

    /// Checks that only need the catalog itself. Also used for the reference.
    pub fn validate_records(catalog: &Catalog) -> ValidationReport {
        let mut report = ValidationReport::new();
        let form_count = LanguageRegistry::get()
            .plural_rule(&catalog.language)
            .form_count();

        for key in catalog.duplicate_keys() {
            report
                .errors
                .push(format!("Duplicate identifier '{}'", key));
        }

        for msg in catalog.messages().filter(|msg| !msg.state.is_retired()) {
            if msg.translation.is_empty() {
                if msg.state.is_finished() {
                    report.errors.push(format!(
                        "Empty translation for '{}' is not marked unfinished",
                        msg.key()
                    ));
                    continue;
                }
            } else if let Some(warning) = Self::validate_placeholders(msg) {
                report.warnings.push(warning);
            }

            if let Translation::Plural(forms) = &msg.translation {
                Self::validate_plural_forms(msg, forms, form_count, &mut report);
            }

            if !msg.state.is_finished() {
                report
                    .warnings
                    .push(format!("Unfinished translation for '{}'", msg.key()));
            }
        }

        report
    }

    /// Identifier parity between a catalog and the reference.
    ///
    /// Retired records on either side do not count.
    pub fn parity(reference: &Catalog, catalog: &Catalog) -> ParityReport {
        let reference_ids = active_keys(reference);
        let catalog_ids = active_keys(catalog);

        ParityReport {
            missing: reference_ids
                .difference(&catalog_ids)
                .map(|id| id.to_string())
                .collect(),
            extra: catalog_ids
                .difference(&reference_ids)
                .map(|id| id.to_string())
                .collect(),
        }
    }

    /// Every plural form of a finished record must carry text, and the number
    /// of forms must match the language's plural rule.
    fn validate_plural_forms(
        msg: &Message,
        forms: &[String],
        form_count: usize,
        report: &mut ValidationReport,
    ) {
        if msg.state.is_finished() {
            for (index, _) in forms.iter().enumerate().filter(|(_, form)| form.is_empty()) {
                report.errors.push(format!(
                    "Empty plural form {} for '{}' is not marked unfinished",
                    index,
                    msg.key()
                ));
            }
        }

        if forms.len() != form_count {
            report.warnings.push(format!(
                "Plural translation for '{}' has {} form(s), language expects {}",
                msg.key(),
                forms.len(),
                form_count
            ));
        }
    }

    /// Check that every non-empty translation keeps the source's placeholders.
    fn validate_placeholders(msg: &Message) -> Option<String> {
        let expected = Self::extract_placeholders(&msg.source);

        let forms: Vec<&str> = match &msg.translation {
            Translation::Missing => Vec::new(),
            Translation::Text(text) => vec![text.as_str()],
            Translation::Plural(forms) => forms
                .iter()
                .map(String::as_str)
                .filter(|form| !form.is_empty())
                .collect(),
        };

        forms.into_iter().find_map(|form| {
            let found = Self::extract_placeholders(form);
            // Plural forms may drop %n when the wording implies the count
            let tolerated = msg.numerus && without_count(&expected) == without_count(&found);
            if found != expected && !tolerated {
                Some(format!(
                    "Placeholder mismatch for '{}': source has {:?}, translation has {:?}",
                    msg.key(),
                    expected,
                    found
                ))
            } else {
                None
            }
        })
    }

    /// Extract placeholders, normalized (`%L1` → `%1`) and sorted.
    fn extract_placeholders(text: &str) -> Vec<String> {
        let regex = PLACEHOLDER_REGEX.get_or_init(|| {
            Regex::new(r"%L?([1-9][0-9]?|n)").expect("placeholder pattern is valid")
        });

        let mut placeholders: Vec<String> = regex
            .captures_iter(text)
            .filter_map(|cap| cap.get(1).map(|m| format!("%{}", m.as_str())))
            .collect();
        placeholders.sort();
        placeholders
    }
}

fn active_keys(catalog: &Catalog) -> BTreeSet<&str> {
    catalog
        .messages()
        .filter(|msg| !msg.state.is_retired())
        .map(Message::key)
        .collect()
}

fn without_count(placeholders: &[String]) -> Vec<&String> {
    placeholders.iter().filter(|p| p.as_str() != "%n").collect()
}
