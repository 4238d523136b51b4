//! Catalogs compiled into the library.
//!
//! The application ships its translations alongside the binary, so lookups
//! never depend on the working directory.

use crate::i18n::{ts, Catalog, Language};
use anyhow::{Context, Result};

/// Raw catalog documents keyed by language code. The reference comes first.
pub const CATALOGS: &[(&str, &str)] = &[
    ("en", include_str!("../../translations/harbour-mybackup.ts")),
    ("pl", include_str!("../../translations/harbour-mybackup-pl.ts")),
    ("ru", include_str!("../../translations/harbour-mybackup-ru.ts")),
    ("sv", include_str!("../../translations/harbour-mybackup-sv.ts")),
    ("zh_CN", include_str!("../../translations/harbour-mybackup-zh_CN.ts")),
];

/// Raw document for a language, if one is bundled.
pub fn source(code: &str) -> Option<&'static str> {
    CATALOGS
        .iter()
        .find(|(lang, _)| *lang == code)
        .map(|(_, document)| *document)
}

/// Parse the bundled catalog of a language.
pub fn catalog(language: Language) -> Result<Catalog> {
    let document = source(language.code())
        .with_context(|| format!("No bundled catalog for language '{}'", language))?;
    ts::parse(document).with_context(|| format!("Bundled catalog '{}' is malformed", language))
}

/// Parse the bundled reference catalog.
pub fn reference() -> Result<Catalog> {
    catalog(Language::canonical())
}
