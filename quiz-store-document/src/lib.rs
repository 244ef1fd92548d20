pub mod error;
pub mod loader;
pub mod locale;
pub mod registry;
pub mod xml;

pub use error::DocumentError;
pub use loader::DocumentLoader;
pub use locale::{language_code, system_language};
pub use registry::{DEFAULT_LANGUAGE, DEFAULT_PREFIX, DocumentRegistry, DocumentResource};
pub use xml::{parse_quiz, parse_quiz_file};
