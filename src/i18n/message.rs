//! Message records: the entries of a catalog.
//!
//! A message maps a stable identifier to its reference (`source`) text and its
//! localized translation, together with optional notes for translators.

use serde::Serialize;
use std::fmt;

/// Completion status of a translation.
///
/// Mirrors the `type` attribute of the `<translation>` element. A translation
/// without the attribute is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationState {
    #[default]
    Finished,
    Unfinished,
    Vanished,
    Obsolete,
}

impl TranslationState {
    /// Parse the value of a `type` attribute.
    pub fn from_attr(value: &str) -> Option<TranslationState> {
        match value {
            "unfinished" => Some(TranslationState::Unfinished),
            "vanished" => Some(TranslationState::Vanished),
            "obsolete" => Some(TranslationState::Obsolete),
            _ => None,
        }
    }

    /// The `type` attribute value, or `None` for finished translations.
    pub fn as_attr(&self) -> Option<&'static str> {
        match self {
            TranslationState::Finished => None,
            TranslationState::Unfinished => Some("unfinished"),
            TranslationState::Vanished => Some("vanished"),
            TranslationState::Obsolete => Some("obsolete"),
        }
    }

    pub fn is_finished(&self) -> bool {
        *self == TranslationState::Finished
    }

    /// Retired records are kept for reuse but never served.
    pub fn is_retired(&self) -> bool {
        matches!(self, TranslationState::Vanished | TranslationState::Obsolete)
    }
}

impl fmt::Display for TranslationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_attr().unwrap_or("finished"))
    }
}

/// Localized text of a message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Translation {
    /// No `<translation>` element at all.
    #[default]
    Missing,
    Text(String),
    /// One entry per plural form, in the order of the language's plural rule.
    Plural(Vec<String>),
}

impl Translation {
    /// True when there is no text to show (absent, empty, or all forms empty).
    pub fn is_empty(&self) -> bool {
        match self {
            Translation::Missing => true,
            Translation::Text(text) => text.is_empty(),
            Translation::Plural(forms) => forms.iter().all(|form| form.is_empty()),
        }
    }

    /// The singular text, or the first plural form.
    pub fn text(&self) -> Option<&str> {
        match self {
            Translation::Missing => None,
            Translation::Text(text) => Some(text),
            Translation::Plural(forms) => forms.first().map(String::as_str),
        }
    }

    /// Plural form by index, falling back to the last available form.
    pub fn form(&self, index: usize) -> Option<&str> {
        match self {
            Translation::Plural(forms) => forms
                .get(index)
                .or_else(|| forms.last())
                .map(String::as_str),
            other => other.text(),
        }
    }
}

/// Where a message is used in the application sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub filename: Option<String>,
    pub line: Option<String>,
}

/// A single localized message record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Message {
    /// Stable identifier (e.g. "mybackup-cover-last_backup")
    pub id: Option<String>,

    /// Reference-language text
    pub source: String,

    /// Disambiguation comment
    pub comment: Option<String>,

    /// Note for translators, not used at runtime
    pub extracomment: Option<String>,

    /// Note written by a translator
    pub translatorcomment: Option<String>,

    pub locations: Vec<Location>,

    /// Plural message (`numerus="yes"`)
    pub numerus: bool,

    pub translation: Translation,

    pub state: TranslationState,
}

impl Message {
    /// Create a finished message with a plain translation.
    pub fn new(id: &str, source: &str, translation: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            source: source.to_string(),
            translation: Translation::Text(translation.to_string()),
            ..Default::default()
        }
    }

    /// Set the translator-facing comment.
    pub fn with_extracomment(mut self, comment: &str) -> Self {
        self.extracomment = Some(comment.to_string());
        self
    }

    /// Set the completion state.
    pub fn with_state(mut self, state: TranslationState) -> Self {
        self.state = state;
        self
    }

    /// Lookup key: the identifier, or the source text for id-less messages.
    pub fn key(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.source)
    }

    /// Finished and carrying non-empty text.
    pub fn is_translated(&self) -> bool {
        self.state == TranslationState::Finished && !self.translation.is_empty()
    }

    /// The text to show at runtime, if this record can serve one.
    pub fn localized_text(&self) -> Option<&str> {
        if self.is_translated() {
            self.translation.text()
        } else {
            None
        }
    }
}
