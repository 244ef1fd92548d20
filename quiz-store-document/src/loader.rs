use quiz_store_model::Quiz;

use crate::error::DocumentError;
use crate::registry::{DEFAULT_LANGUAGE, DEFAULT_PREFIX, DocumentRegistry};

/// Resolves a localized quiz document and parses it.
///
/// Holds only its registry and key prefix; every load resolves and parses
/// again.
#[derive(Debug, Clone)]
pub struct DocumentLoader {
    registry: DocumentRegistry,
    prefix: String,
    default_language: String,
}

impl DocumentLoader {
    pub fn new(
        registry: DocumentRegistry,
        prefix: impl Into<String>,
        default_language: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            prefix: prefix.into(),
            default_language: default_language.into(),
        }
    }

    /// Loader over the bundled documents with the default prefix and language.
    pub fn bundled() -> Self {
        Self::new(DocumentRegistry::bundled(), DEFAULT_PREFIX, DEFAULT_LANGUAGE)
    }

    pub fn registry(&self) -> &DocumentRegistry {
        &self.registry
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Load the document for `locale`, or for `default_locale` if `locale`
    /// has none.
    ///
    /// Fails with [`DocumentError::NotFound`] when neither resolves, or with a
    /// parse error when the resolved document is malformed.
    pub fn load_document(&self, locale: &str, default_locale: &str) -> Result<Quiz, DocumentError> {
        let (key, resource) = self
            .registry
            .resolve_localized(&self.prefix, locale, default_locale)?;
        let quiz = resource.parse().inspect_err(|e| {
            log::warn!("Quiz document '{key}' is invalid: {e}");
        })?;
        log::debug!(
            "Loaded quiz document '{key}': {} levels, {} exercises",
            quiz.levels.len(),
            quiz.exercise_count()
        );
        Ok(quiz)
    }

    /// Load the document for `locale` using the configured default language.
    pub fn load(&self, locale: &str) -> Result<Quiz, DocumentError> {
        self.load_document(locale, &self.default_language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::DocumentResource;

    const MINIMAL: &str = r#"<quiz><level value="1"><scoring correct="5"/>
        <exercise><question>Q</question><answer correct="true">A</answer></exercise>
    </level></quiz>"#;

    #[test]
    fn bundled_loader_picks_requested_language() {
        let loader = DocumentLoader::bundled();
        let pl = loader.load("pl_PL").unwrap();
        let en = loader.load("en_GB").unwrap();
        assert_ne!(
            pl.levels[0].exercises[0].question.content,
            en.levels[0].exercises[0].question.content
        );
    }

    #[test]
    fn unknown_language_falls_back_to_default() {
        let loader = DocumentLoader::bundled();
        let fallback = loader.load("xx").unwrap();
        let en = loader.load("en").unwrap();
        assert_eq!(fallback, en);
    }

    #[test]
    fn missing_default_is_not_found() {
        let loader = DocumentLoader::bundled();
        let err = loader.load_document("xx", "yy").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn malformed_document_is_parse_error() {
        let mut registry = DocumentRegistry::new();
        registry.register("quiz_en", DocumentResource::Bytes(b"<quiz><level>".to_vec()));
        let loader = DocumentLoader::new(registry, "quiz_", "en");
        let err = loader.load("en").unwrap_err();
        assert!(err.is_parse_error());
        assert!(!err.is_not_found());
    }

    #[test]
    fn file_documents_are_reread_on_every_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trivia_de.xml");
        std::fs::write(&path, MINIMAL).unwrap();

        let mut registry = DocumentRegistry::new();
        registry.register("trivia_de", DocumentResource::File(path.clone()));
        let loader = DocumentLoader::new(registry, "trivia_", "de");

        assert_eq!(loader.load("de").unwrap().levels[0].scoring.points_correct, 5);

        std::fs::write(&path, MINIMAL.replace("correct=\"5\"", "correct=\"7\"")).unwrap();
        assert_eq!(loader.load("de").unwrap().levels[0].scoring.points_correct, 7);
    }
}
