/// Errors that can occur while resolving or parsing a quiz document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("Invalid quiz document: {0}")]
    InvalidDocument(String),

    #[error("No quiz document registered for '{requested}' or fallback '{fallback}'")]
    NotFound { requested: String, fallback: String },
}

impl DocumentError {
    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }

    /// Neither the requested nor the fallback document is registered.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The document resolved but its contents could not be turned into a quiz.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::Xml(_) | Self::XmlAttribute(_) | Self::InvalidDocument(_)
        )
    }
}
