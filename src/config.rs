use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // Catalog location
    pub translations_dir: PathBuf,
    pub catalog_prefix: String,

    // Language whose source texts are canonical
    pub reference_language: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            translations_dir: std::env::var("MYBACKUP_TRANSLATIONS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("translations")),
            catalog_prefix: std::env::var("MYBACKUP_CATALOG_PREFIX")
                .unwrap_or_else(|_| "harbour-mybackup".to_string()),
            reference_language: std::env::var("MYBACKUP_REFERENCE_LANGUAGE")
                .unwrap_or_else(|_| "en".to_string()),
        }
    }
}
