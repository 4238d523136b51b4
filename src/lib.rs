//! Message catalogs and translation tooling for My Backup.

pub mod config;
pub mod i18n;
