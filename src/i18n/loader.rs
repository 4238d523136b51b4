//! Catalog files on disk.
//!
//! Catalogs follow a naming convention: `<prefix>.ts` is the reference catalog
//! and `<prefix>-<language>.ts` holds one translation each.

use crate::i18n::{ts, Catalog};
use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File extension of catalog documents.
pub const CATALOG_EXTENSION: &str = "ts";

/// A catalog together with the file it was read from.
#[derive(Debug, Clone)]
pub struct CatalogFile {
    pub path: PathBuf,

    /// Language implied by the file name
    pub language: String,

    pub catalog: Catalog,
}

/// The reference catalog and every translation found in a directory.
#[derive(Debug, Clone)]
pub struct CatalogSet {
    pub reference: CatalogFile,

    /// Translations keyed by language code
    pub translations: BTreeMap<String, CatalogFile>,
}

/// Work out which language a catalog file holds.
///
/// # Returns
/// * `Some(None)` for the reference file (`<prefix>.ts`)
/// * `Some(Some(lang))` for a translation (`<prefix>-<lang>.ts`)
/// * `None` if the name does not belong to this catalog family
pub fn language_from_file_name(prefix: &str, file_name: &str) -> Option<Option<String>> {
    let stem = file_name.strip_suffix(&format!(".{}", CATALOG_EXTENSION))?;
    let rest = stem.strip_prefix(prefix)?;

    if rest.is_empty() {
        return Some(None);
    }

    let language = rest.strip_prefix('-')?;
    if language.is_empty() {
        None
    } else {
        Some(Some(language.to_string()))
    }
}

/// File name of a catalog; `None` names the reference file.
pub fn file_name(prefix: &str, language: Option<&str>) -> String {
    match language {
        Some(language) => format!("{}-{}.{}", prefix, language, CATALOG_EXTENSION),
        None => format!("{}.{}", prefix, CATALOG_EXTENSION),
    }
}

/// Read and parse a single catalog file.
pub fn load_file(path: &Path) -> Result<Catalog> {
    let document = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    ts::parse(&document).with_context(|| format!("Failed to parse catalog {}", path.display()))
}

/// Serialize a catalog and write it to `path`.
pub fn save_file(path: &Path, catalog: &Catalog) -> Result<()> {
    fs::write(path, ts::write(catalog))
        .with_context(|| format!("Failed to write catalog {}", path.display()))
}

impl CatalogSet {
    /// Load every catalog of the family `prefix` from `dir`.
    ///
    /// The reference is `<prefix>.ts`, or `<prefix>-<reference_language>.ts`
    /// when the unsuffixed file does not exist.
    pub fn load_dir(dir: &Path, prefix: &str, reference_language: &str) -> Result<CatalogSet> {
        let entries = fs::read_dir(dir)
            .with_context(|| format!("Failed to read translations directory {}", dir.display()))?;

        let mut reference = None;
        let mut translations = BTreeMap::new();

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
            paths.push(entry.path());
        }
        paths.sort();

        for path in paths {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(language) = language_from_file_name(prefix, name) else {
                debug!("Ignoring {}", path.display());
                continue;
            };

            let catalog = load_file(&path)?;
            match language {
                None => {
                    reference = Some(CatalogFile {
                        path,
                        language: reference_language.to_string(),
                        catalog,
                    });
                }
                Some(language) => {
                    translations.insert(
                        language.clone(),
                        CatalogFile {
                            path,
                            language,
                            catalog,
                        },
                    );
                }
            }
        }

        let reference = match reference {
            Some(reference) => {
                if translations.contains_key(reference_language) {
                    warn!(
                        "Both {} and {} exist; using the unsuffixed file as reference",
                        file_name(prefix, None),
                        file_name(prefix, Some(reference_language))
                    );
                }
                reference
            }
            None => match translations.remove(reference_language) {
                Some(reference) => reference,
                None => bail!(
                    "Reference catalog {} not found in {}",
                    file_name(prefix, None),
                    dir.display()
                ),
            },
        };

        info!(
            "Loaded reference catalog ({} messages) and {} translations from {}",
            reference.catalog.len(),
            translations.len(),
            dir.display()
        );

        Ok(CatalogSet {
            reference,
            translations,
        })
    }

    /// Look up a catalog by language, including the reference.
    pub fn get(&self, language: &str) -> Option<&CatalogFile> {
        if self.reference.language == language {
            Some(&self.reference)
        } else {
            self.translations.get(language)
        }
    }

    /// Languages with a translation catalog, sorted.
    pub fn languages(&self) -> Vec<&str> {
        self.translations.keys().map(String::as_str).collect()
    }
}
