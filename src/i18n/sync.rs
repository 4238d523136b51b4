//! Bring a translated catalog in line with the reference catalog.
//!
//! Records follow the reference: new text is added as unfinished, changed
//! source text marks the translation unfinished, and text the reference no
//! longer has is retired as vanished (or dropped).

use crate::i18n::{Catalog, LanguageRegistry, Message, Translation, TranslationState};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Remove records the reference no longer defines instead of retiring them
    pub drop_obsolete: bool,
}

/// What a sync changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    /// Records carried over unchanged
    pub kept: usize,

    /// New records, added with an empty unfinished translation
    pub added: usize,

    /// Records whose source changed; translation kept but marked unfinished
    pub updated: usize,

    /// Retired records the reference defines again
    pub revived: usize,

    /// Records no longer in the reference, now vanished
    pub retired: usize,

    /// Records removed (dropped obsolete text or duplicates)
    pub dropped: usize,
}

impl SyncSummary {
    /// Whether the sync changed anything.
    pub fn has_changes(&self) -> bool {
        self.added + self.updated + self.revived + self.retired + self.dropped > 0
    }
}

/// Synchronize `catalog` with `reference`.
///
/// The result keeps the catalog's header and follows the reference order and
/// context names. Records only the catalog has are appended afterwards.
pub fn sync(reference: &Catalog, catalog: &Catalog, options: SyncOptions) -> (Catalog, SyncSummary) {
    let mut summary = SyncSummary::default();
    let index = catalog.index();
    let form_count = LanguageRegistry::get()
        .plural_rule(&catalog.language)
        .form_count();

    let mut out = Catalog {
        version: catalog.version.clone(),
        language: catalog.language.clone(),
        source_language: catalog.source_language.clone(),
        contexts: Vec::new(),
    };
    let mut consumed: HashSet<&str> = HashSet::new();

    for context in &reference.contexts {
        for reference_msg in context.messages.iter().filter(|m| !m.state.is_retired()) {
            let key = reference_msg.key();
            if !consumed.insert(key) {
                warn!("Reference catalog repeats '{}', keeping the first", key);
                continue;
            }

            let merged = match index.get(key) {
                Some(existing) => merge(reference_msg, existing, form_count, &mut summary),
                None => {
                    summary.added += 1;
                    Message {
                        translation: empty_translation(reference_msg.numerus, form_count),
                        state: TranslationState::Unfinished,
                        translatorcomment: None,
                        ..reference_msg.clone()
                    }
                }
            };
            out.push(&context.name, merged);
        }
    }

    for context in &catalog.contexts {
        for msg in &context.messages {
            let key = msg.key();
            let first = index.get(key).is_some_and(|first| std::ptr::eq(*first, msg));
            if !first {
                warn!("Dropping duplicate '{}' from '{}'", key, catalog.language);
                summary.dropped += 1;
                continue;
            }
            if consumed.contains(key) {
                continue;
            }

            if options.drop_obsolete {
                summary.dropped += 1;
                continue;
            }

            let mut retired = msg.clone();
            if !retired.state.is_retired() {
                retired.state = TranslationState::Vanished;
                summary.retired += 1;
            } else {
                summary.kept += 1;
            }
            out.push(&context.name, retired);
        }
    }

    info!(
        "Synchronized '{}': {} kept, {} added, {} updated, {} revived, {} retired, {} dropped",
        out.language,
        summary.kept,
        summary.added,
        summary.updated,
        summary.revived,
        summary.retired,
        summary.dropped
    );

    (out, summary)
}

fn merge(
    reference: &Message,
    existing: &Message,
    form_count: usize,
    summary: &mut SyncSummary,
) -> Message {
    let mut merged = Message {
        id: reference.id.clone(),
        source: reference.source.clone(),
        comment: reference.comment.clone(),
        extracomment: reference.extracomment.clone(),
        translatorcomment: existing.translatorcomment.clone(),
        locations: reference.locations.clone(),
        numerus: reference.numerus,
        translation: existing.translation.clone(),
        state: existing.state,
    };

    if existing.numerus != reference.numerus {
        merged.translation = empty_translation(reference.numerus, form_count);
        merged.state = TranslationState::Unfinished;
        summary.updated += 1;
    } else if existing.source != reference.source {
        merged.state = TranslationState::Unfinished;
        summary.updated += 1;
    } else if existing.state.is_retired() {
        merged.state = TranslationState::Unfinished;
        summary.revived += 1;
    } else {
        summary.kept += 1;
    }

    merged
}

fn empty_translation(numerus: bool, form_count: usize) -> Translation {
    if numerus {
        Translation::Plural(vec![String::new(); form_count])
    } else {
        Translation::Text(String::new())
    }
}

/// Sync every translation of a set against its reference.
pub fn sync_all<'a>(
    reference: &Catalog,
    catalogs: impl IntoIterator<Item = &'a Catalog>,
    options: SyncOptions,
) -> HashMap<String, (Catalog, SyncSummary)> {
    catalogs
        .into_iter()
        .map(|catalog| (catalog.language.clone(), sync(reference, catalog, options)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::CatalogValidator;

    fn reference() -> Catalog {
        let mut catalog = Catalog::new("en");
        catalog.push(
            "",
            Message::new("mybackup-app_name", "My Backup", "My Backup")
                .with_extracomment("Application title"),
        );
        catalog.push("", Message::new("mybackup-menu-remove", "Remove", "Remove"));
        catalog.push(
            "",
            Message::new("mybackup-cover-last_backup", "Last backup", "Last backup")
                .with_extracomment("Cover label"),
        );
        catalog
    }

    fn swedish() -> Catalog {
        let mut catalog = Catalog::new("sv");
        catalog.push(
            "",
            Message::new("mybackup-app_name", "My Backup", "My Backup")
                .with_extracomment("Application title"),
        );
        catalog.push(
            "",
            Message::new("mybackup-main_page-description", "To be added to the backup", "Att läggas")
                .with_state(TranslationState::Unfinished),
        );
        catalog.push("", Message::new("mybackup-menu-remove", "Delete", "Ta bort"));
        catalog
    }

    #[test]
    fn test_sync_follows_reference_order() {
        let (synced, _) = sync(&reference(), &swedish(), SyncOptions::default());
        let keys: Vec<&str> = synced.messages().map(Message::key).collect();
        assert_eq!(
            keys,
            vec![
                "mybackup-app_name",
                "mybackup-menu-remove",
                "mybackup-cover-last_backup",
                "mybackup-main_page-description",
            ]
        );
        assert_eq!(synced.language, "sv");
    }

    #[test]
    fn test_sync_summary() {
        let (_, summary) = sync(&reference(), &swedish(), SyncOptions::default());
        assert_eq!(
            summary,
            SyncSummary {
                kept: 1,
                added: 1,
                updated: 1,
                revived: 0,
                retired: 1,
                dropped: 0,
            }
        );
        assert!(summary.has_changes());
    }

    #[test]
    fn test_sync_adds_missing_as_unfinished() {
        let (synced, _) = sync(&reference(), &swedish(), SyncOptions::default());
        let added = synced.get("mybackup-cover-last_backup").unwrap();
        assert_eq!(added.state, TranslationState::Unfinished);
        assert_eq!(added.translation, Translation::Text(String::new()));
        assert_eq!(added.source, "Last backup");
        assert_eq!(added.extracomment.as_deref(), Some("Cover label"));
    }

    #[test]
    fn test_sync_marks_changed_source_stale() {
        let (synced, _) = sync(&reference(), &swedish(), SyncOptions::default());
        let updated = synced.get("mybackup-menu-remove").unwrap();
        assert_eq!(updated.source, "Remove");
        assert_eq!(updated.translation.text(), Some("Ta bort"));
        assert_eq!(updated.state, TranslationState::Unfinished);
    }

    #[test]
    fn test_sync_retires_extra_records() {
        let (synced, _) = sync(&reference(), &swedish(), SyncOptions::default());
        let retired = synced.get("mybackup-main_page-description").unwrap();
        assert_eq!(retired.state, TranslationState::Vanished);
        assert_eq!(retired.translation.text(), Some("Att läggas"));
    }

    #[test]
    fn test_sync_drop_obsolete() {
        let options = SyncOptions {
            drop_obsolete: true,
        };
        let (synced, summary) = sync(&reference(), &swedish(), options);
        assert!(synced.get("mybackup-main_page-description").is_none());
        assert_eq!(summary.dropped, 1);
        assert_eq!(summary.retired, 0);
    }

    #[test]
    fn test_sync_revives_retired_record() {
        let mut catalog = swedish();
        catalog.push(
            "",
            Message::new("mybackup-cover-last_backup", "Last backup", "Senaste")
                .with_state(TranslationState::Vanished),
        );

        let (synced, summary) = sync(&reference(), &catalog, SyncOptions::default());
        let revived = synced.get("mybackup-cover-last_backup").unwrap();
        assert_eq!(revived.state, TranslationState::Unfinished);
        assert_eq!(revived.translation.text(), Some("Senaste"));
        assert_eq!(summary.revived, 1);
        assert_eq!(summary.added, 0);
    }

    #[test]
    fn test_sync_drops_duplicates() {
        let mut catalog = swedish();
        catalog.push("", Message::new("mybackup-app_name", "My Backup", "Min backup"));

        let (synced, summary) = sync(&reference(), &catalog, SyncOptions::default());
        assert!(synced.duplicate_keys().is_empty());
        assert_eq!(synced.get("mybackup-app_name").unwrap().translation.text(), Some("My Backup"));
        assert_eq!(summary.dropped, 1);
    }

    #[test]
    fn test_sync_plural_forms_follow_language() {
        let mut reference = reference();
        let mut files = Message::new("mybackup-files", "%n file(s)", "");
        files.numerus = true;
        files.translation = Translation::Plural(vec!["%n file".to_string(), "%n files".to_string()]);
        reference.push("", files);

        let (synced, _) = sync(&reference, &Catalog::new("ru"), SyncOptions::default());
        let added = synced.get("mybackup-files").unwrap();
        assert!(added.numerus);
        assert_eq!(added.translation, Translation::Plural(vec![String::new(); 3]));
    }

    #[test]
    fn test_sync_already_in_line() {
        let (synced, summary) = sync(&reference(), &reference(), SyncOptions::default());
        assert_eq!(synced, reference());
        assert!(!summary.has_changes());
        assert_eq!(summary.kept, 3);
    }

    #[test]
    fn test_synced_catalog_has_parity() {
        let options = SyncOptions {
            drop_obsolete: true,
        };
        let (synced, _) = sync(&reference(), &swedish(), options);
        let report = CatalogValidator::validate(&reference(), &synced);
        assert!(!report.has_errors(), "{:?}", report);
        assert!(CatalogValidator::parity(&reference(), &synced).is_equal());
    }

    #[test]
    fn test_sync_all() {
        let swedish = swedish();
        let polish = Catalog::new("pl");
        let results = sync_all(&reference(), [&swedish, &polish], SyncOptions::default());
        assert_eq!(results.len(), 2);
        assert_eq!(results["pl"].1.added, 3);
    }
}
