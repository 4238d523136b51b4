//! Catalog completion statistics and lookup observability.
//!
//! `MetricsReport` summarizes how complete a catalog is relative to the
//! reference. `LookupMetrics` counts how runtime lookups were resolved.

use crate::i18n::{Catalog, CatalogValidator, Message};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Completion statistics of one catalog against the reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    /// Catalog language code
    pub language: String,

    /// Number of active records in the reference catalog
    pub reference_total: usize,

    /// Reference records with a finished, non-empty translation
    pub translated: usize,

    /// Reference records present but unfinished or empty
    pub unfinished: usize,

    /// Reference records absent from the catalog
    pub missing: usize,

    /// Active catalog records the reference does not define
    pub extra: usize,

    /// Vanished or obsolete records kept in the catalog
    pub retired: usize,

    /// Translated share of the reference as a percentage (0-100)
    pub completion_rate: f64,
}

impl MetricsReport {
    /// Compute completion statistics for `catalog`.
    pub fn compute(reference: &Catalog, catalog: &Catalog) -> MetricsReport {
        let parity = CatalogValidator::parity(reference, catalog);
        let mut index: HashMap<&str, &Message> = HashMap::with_capacity(catalog.len());
        for msg in catalog.messages().filter(|msg| !msg.state.is_retired()) {
            index.entry(msg.key()).or_insert(msg);
        }

        let reference_keys: Vec<&str> = reference
            .messages()
            .filter(|msg| !msg.state.is_retired())
            .map(|msg| msg.key())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut translated = 0;
        let mut unfinished = 0;
        for key in &reference_keys {
            match index.get(key) {
                Some(msg) if msg.is_translated() => translated += 1,
                Some(_) => unfinished += 1,
                None => {}
            }
        }

        let reference_total = reference_keys.len();
        let completion_rate = if reference_total > 0 {
            (translated as f64 / reference_total as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            language: catalog.language.clone(),
            reference_total,
            translated,
            unfinished,
            missing: parity.missing.len(),
            extra: parity.extra.len(),
            retired: catalog
                .messages()
                .filter(|msg| msg.state.is_retired())
                .count(),
            completion_rate,
        }
    }
}

/// Global lookup metrics singleton.
pub struct LookupMetrics {
    /// Lookups served from the target catalog
    translated_hits: AtomicUsize,

    /// Lookups that fell back to reference text
    reference_fallbacks: AtomicUsize,

    /// Lookups for identifiers no catalog defines
    unknown_ids: AtomicUsize,
}

/// Global metrics instance (initialized lazily)
static METRICS: OnceLock<LookupMetrics> = OnceLock::new();

impl LookupMetrics {
    /// Get the global lookup metrics instance.
    pub fn global() -> &'static LookupMetrics {
        METRICS.get_or_init(|| LookupMetrics {
            translated_hits: AtomicUsize::new(0),
            reference_fallbacks: AtomicUsize::new(0),
            unknown_ids: AtomicUsize::new(0),
        })
    }

    pub fn record_translated_hit(&self) {
        self.translated_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reference_fallback(&self) {
        self.reference_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unknown_id(&self) {
        self.unknown_ids.fetch_add(1, Ordering::Relaxed);
    }

    pub fn translated_hits(&self) -> usize {
        self.translated_hits.load(Ordering::Relaxed)
    }

    pub fn reference_fallbacks(&self) -> usize {
        self.reference_fallbacks.load(Ordering::Relaxed)
    }

    pub fn unknown_ids(&self) -> usize {
        self.unknown_ids.load(Ordering::Relaxed)
    }

    /// Generate a lookup report.
    pub fn report(&self) -> LookupReport {
        let hits = self.translated_hits();
        let fallbacks = self.reference_fallbacks();
        let unknown = self.unknown_ids();
        let total = hits + fallbacks + unknown;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        LookupReport {
            translated_hits: hits,
            reference_fallbacks: fallbacks,
            unknown_ids: unknown,
            hit_rate,
        }
    }

    /// Reset all metrics to zero (useful for testing).
    #[cfg(test)]
    pub fn reset(&self) {
        self.translated_hits.store(0, Ordering::Relaxed);
        self.reference_fallbacks.store(0, Ordering::Relaxed);
        self.unknown_ids.store(0, Ordering::Relaxed);
    }
}

/// Lookup report containing current runtime statistics.
#[derive(Debug, Clone, Serialize)]
pub struct LookupReport {
    pub translated_hits: usize,
    pub reference_fallbacks: usize,
    pub unknown_ids: usize,

    /// Share of lookups served by the target catalog (0-100)
    pub hit_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{Message, TranslationState};
    use serial_test::serial;

    fn reference() -> Catalog {
        let mut catalog = Catalog::new("en");
        catalog.push("", Message::new("mybackup-app_name", "My Backup", "My Backup"));
        catalog.push("", Message::new("mybackup-menu-remove", "Remove", "Remove"));
        catalog.push("", Message::new("mybackup-remorse-removing", "Removing", "Removing"));
        catalog.push("", Message::new("mybackup-cover-last_backup", "Last backup", "Last backup"));
        catalog
    }

    // ==================== Completion Tests ====================

    #[test]
    fn test_compute_complete_catalog() {
        let report = MetricsReport::compute(&reference(), &reference());
        assert_eq!(report.language, "en");
        assert_eq!(report.reference_total, 4);
        assert_eq!(report.translated, 4);
        assert_eq!(report.unfinished, 0);
        assert_eq!(report.missing, 0);
        assert_eq!(report.completion_rate, 100.0);
    }

    #[test]
    fn test_compute_partial_catalog() {
        let mut catalog = Catalog::new("sv");
        catalog.push("", Message::new("mybackup-app_name", "My Backup", "My Backup"));
        catalog.push(
            "",
            Message::new("mybackup-menu-remove", "Remove", "Ta bort")
                .with_state(TranslationState::Unfinished),
        );
        catalog.push("", Message::new("mybackup-remorse-removing", "Removing", ""));
        catalog.push(
            "",
            Message::new("mybackup-main_page-description", "To be added", "Att läggas"),
        );
        catalog.push(
            "",
            Message::new("mybackup-old", "Old", "Gammal").with_state(TranslationState::Vanished),
        );

        let report = MetricsReport::compute(&reference(), &catalog);
        assert_eq!(report.reference_total, 4);
        assert_eq!(report.translated, 1);
        assert_eq!(report.unfinished, 2);
        assert_eq!(report.missing, 1);
        assert_eq!(report.extra, 1);
        assert_eq!(report.retired, 1);
        assert_eq!(report.completion_rate, 25.0);
    }

    #[test]
    fn test_compute_skips_retired_copy_of_active_record() {
        let mut catalog = reference();
        catalog.contexts[0].messages.insert(
            0,
            Message::new("mybackup-menu-remove", "Remove", "Old remove")
                .with_state(TranslationState::Vanished),
        );

        let report = MetricsReport::compute(&reference(), &catalog);
        assert_eq!(report.translated, 4);
        assert_eq!(report.unfinished, 0);
        assert_eq!(report.missing, 0);
        assert_eq!(report.retired, 1);
    }

    #[test]
    fn test_compute_empty_reference() {
        let report = MetricsReport::compute(&Catalog::new("en"), &Catalog::new("pl"));
        assert_eq!(report.reference_total, 0);
        assert_eq!(report.completion_rate, 0.0);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = MetricsReport::compute(&reference(), &reference());
        let json = serde_json::to_value(&report).expect("Should serialize");
        assert_eq!(json["language"], "en");
        assert_eq!(json["translated"], 4);
        assert_eq!(json["completion_rate"], 100.0);
    }

    // ==================== Lookup Counter Tests ====================

    #[test]
    #[serial]
    fn test_record_counters() {
        let metrics = LookupMetrics::global();
        metrics.reset();

        metrics.record_translated_hit();
        metrics.record_translated_hit();
        metrics.record_reference_fallback();
        metrics.record_unknown_id();

        assert_eq!(metrics.translated_hits(), 2);
        assert_eq!(metrics.reference_fallbacks(), 1);
        assert_eq!(metrics.unknown_ids(), 1);
    }

    #[test]
    #[serial]
    fn test_report_empty() {
        let metrics = LookupMetrics::global();
        metrics.reset();

        let report = metrics.report();
        assert_eq!(report.translated_hits, 0);
        assert_eq!(report.hit_rate, 0.0);
    }

    #[test]
    #[serial]
    fn test_report_hit_rate() {
        let metrics = LookupMetrics::global();
        metrics.reset();

        // 3 hits, 1 fallback = 75% hit rate
        metrics.record_translated_hit();
        metrics.record_translated_hit();
        metrics.record_translated_hit();
        metrics.record_reference_fallback();

        assert_eq!(metrics.report().hit_rate, 75.0);
    }

    #[test]
    fn test_global_returns_same_instance() {
        let metrics1 = LookupMetrics::global();
        let metrics2 = LookupMetrics::global();

        // Should return the same instance (same memory address)
        assert!(std::ptr::eq(metrics1, metrics2));
    }
}
