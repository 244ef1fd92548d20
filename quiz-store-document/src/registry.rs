//! Lookup table from document key to document source.
//!
//! A key is a prefix followed by a language code (`quiz_en`, `quiz_pl`).
//! The table is built once at configuration time; resolving a localized
//! document is a plain map lookup with a single fallback to the default
//! language.

use std::collections::HashMap;
use std::path::PathBuf;

use quiz_store_model::Quiz;

use crate::error::DocumentError;
use crate::locale::language_code;
use crate::xml::{parse_quiz, parse_quiz_file};

/// Key prefix of the documents shipped with this crate.
pub const DEFAULT_PREFIX: &str = "quiz_";

/// Language used when the requested one has no document.
pub const DEFAULT_LANGUAGE: &str = "en";

const BUNDLED: [(&str, &[u8]); 2] = [
    ("quiz_en", include_bytes!("../data/quiz_en.xml")),
    ("quiz_pl", include_bytes!("../data/quiz_pl.xml")),
];

/// Where the bytes of a document come from.
#[derive(Debug, Clone)]
pub enum DocumentResource {
    /// Compiled into the binary.
    Bundled(&'static [u8]),
    /// Read from disk on every load.
    File(PathBuf),
    /// Owned in memory.
    Bytes(Vec<u8>),
}

impl DocumentResource {
    /// Read and parse the document. Nothing is cached.
    pub fn parse(&self) -> Result<Quiz, DocumentError> {
        match self {
            Self::Bundled(bytes) => parse_quiz(*bytes),
            Self::Bytes(bytes) => parse_quiz(bytes.as_slice()),
            Self::File(path) => parse_quiz_file(path),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocumentRegistry {
    resources: HashMap<String, DocumentResource>,
}

impl DocumentRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the documents bundled with this crate.
    pub fn bundled() -> Self {
        let mut registry = Self::new();
        for (key, bytes) in BUNDLED {
            registry.register(key, DocumentResource::Bundled(bytes));
        }
        registry
    }

    /// Register a document under `key`, returning any resource it replaces.
    pub fn register(
        &mut self,
        key: impl Into<String>,
        resource: DocumentResource,
    ) -> Option<DocumentResource> {
        self.resources.insert(key.into(), resource)
    }

    pub fn get(&self, key: &str) -> Option<&DocumentResource> {
        self.resources.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.resources.contains_key(key)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.resources.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Resolve `prefix + language(locale)`, falling back once to
    /// `prefix + language(default_locale)`.
    ///
    /// Returns the key that matched together with its resource.
    pub fn resolve_localized(
        &self,
        prefix: &str,
        locale: &str,
        default_locale: &str,
    ) -> Result<(&str, &DocumentResource), DocumentError> {
        let requested = format!("{prefix}{}", language_code(locale));
        if let Some((key, resource)) = self.resources.get_key_value(&requested) {
            log::debug!("Resolved quiz document '{key}'");
            return Ok((key.as_str(), resource));
        }

        let fallback = format!("{prefix}{}", language_code(default_locale));
        match self.resources.get_key_value(&fallback) {
            Some((key, resource)) => {
                log::info!("No quiz document for '{requested}', using '{key}'");
                Ok((key.as_str(), resource))
            }
            None => Err(DocumentError::NotFound {
                requested,
                fallback,
            }),
        }
    }
}
