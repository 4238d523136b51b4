//! In-memory message catalog for one language.

use crate::i18n::Message;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Default format version written by current translation tooling.
pub const DEFAULT_FORMAT_VERSION: &str = "2.1";

/// A named grouping of messages. The shipped catalogs use a single untitled one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Context {
    pub name: String,
    pub messages: Vec<Message>,
}

impl Context {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            messages: Vec::new(),
        }
    }
}

/// A per-language message catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    /// Format version declared by the document (e.g. "2.1")
    pub version: String,

    /// Target language code (e.g. "pl", "zh_CN")
    pub language: String,

    /// Language of the `source` texts, when declared
    pub source_language: Option<String>,

    pub contexts: Vec<Context>,
}

impl Catalog {
    /// Create an empty catalog for a language.
    pub fn new(language: &str) -> Self {
        Self {
            version: DEFAULT_FORMAT_VERSION.to_string(),
            language: language.to_string(),
            source_language: None,
            contexts: Vec::new(),
        }
    }

    /// All messages, in file order.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.contexts.iter().flat_map(|ctx| ctx.messages.iter())
    }

    /// Number of messages across all contexts.
    pub fn len(&self) -> usize {
        self.contexts.iter().map(|ctx| ctx.messages.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First message with the given key.
    pub fn get(&self, key: &str) -> Option<&Message> {
        self.messages().find(|msg| msg.key() == key)
    }

    /// Set of message keys.
    pub fn ids(&self) -> BTreeSet<&str> {
        self.messages().map(Message::key).collect()
    }

    /// Keys that appear more than once, sorted.
    pub fn duplicate_keys(&self) -> Vec<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for msg in self.messages() {
            *counts.entry(msg.key()).or_insert(0) += 1;
        }

        let mut duplicates: Vec<String> = counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(key, _)| key.to_string())
            .collect();
        duplicates.sort();
        duplicates
    }

    /// Append a message to the named context, creating the context if needed.
    pub fn push(&mut self, context: &str, message: Message) {
        match self.contexts.iter_mut().find(|ctx| ctx.name == context) {
            Some(ctx) => ctx.messages.push(message),
            None => {
                let mut ctx = Context::new(context);
                ctx.messages.push(message);
                self.contexts.push(ctx);
            }
        }
    }

    /// Build a key → message index for repeated lookups.
    pub fn index(&self) -> HashMap<&str, &Message> {
        let mut index = HashMap::with_capacity(self.len());
        for msg in self.messages() {
            // First occurrence wins, matching `get`
            index.entry(msg.key()).or_insert(msg);
        }
        index
    }
}
