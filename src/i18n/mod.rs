//! Internationalization (i18n) module: My Backup message catalogs.
//!
//! This module holds everything needed to read, check, maintain and serve the
//! per-language message catalogs of the application.
//!
//! # Architecture
//!
//! - `message` / `catalog`: in-memory data model
//! - `ts`: catalog file format (parse and write)
//! - `registry`: single source of truth for supported languages
//! - `language`: type-safe Language type validated against the registry
//! - `loader`: catalog files on disk, by naming convention
//! - `validator`: uniqueness, parity and completeness checks
//! - `metrics`: completion statistics and lookup counters
//! - `translator`: runtime lookup with reference fallback
//! - `sync`: bring a translation in line with the reference
//! - `bundled`: catalogs compiled into the library
//!
//! # Example
//!
//! ```rust,ignore
//! use mybackup_i18n::i18n::{Language, Translator};
//!
//! let translator = Translator::bundled(Language::POLISH)?;
//! assert_eq!(translator.tr("mybackup-menu-remove"), "Usuń");
//! ```

pub mod bundled;
mod catalog;
mod language;
pub mod loader;
mod message;
mod metrics;
mod registry;
pub mod sync;
mod translator;
pub mod ts;
mod validator;

pub use catalog::{Catalog, Context, DEFAULT_FORMAT_VERSION};
pub use language::Language;
pub use loader::{CatalogFile, CatalogSet};
pub use message::{Location, Message, Translation, TranslationState};
pub use metrics::{LookupMetrics, LookupReport, MetricsReport};
pub use registry::{LanguageConfig, LanguageRegistry, PluralRule};
pub use sync::{SyncOptions, SyncSummary};
pub use translator::Translator;
pub use ts::CatalogError;
pub use validator::{CatalogValidator, ParityReport, ValidationReport};
