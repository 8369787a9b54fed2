//! Message translation.
//!
//! The [`Translator`] scopes a message name under a domain prefix
//! (`success` or `errors`), asks a [`MessageCatalog`] for the text, and
//! decides whether a translation actually happened. Catalogs signal a miss
//! by echoing the requested path back, optionally behind a `namespace::`
//! prefix.

use crate::message::Attributes;
use std::fmt;
use std::sync::Arc;

/// Source of translated message text.
///
/// Implementations return `path` itself (optionally namespace-prefixed)
/// when they have no translation for it.
pub trait MessageCatalog: Send + Sync {
    /// Translate `path`, substituting `attributes` into placeholders.
    fn translate(&self, path: &str, attributes: &Attributes) -> String;
}

impl<F> MessageCatalog for F
where
    F: Fn(&str, &Attributes) -> String + Send + Sync,
{
    fn translate(&self, path: &str, attributes: &Attributes) -> String {
        self(path, attributes)
    }
}

/// A catalog that never translates anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct EchoCatalog;

impl MessageCatalog for EchoCatalog {
    fn translate(&self, path: &str, _attributes: &Attributes) -> String {
        path.to_string()
    }
}

/// Outcome of a translation attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranslationResult {
    /// Slug of the last path segment, only when translation happened.
    pub key: Option<String>,
    /// Translated text, or the original name on a miss.
    pub message: String,
}

impl TranslationResult {
    /// Whether the catalog produced a translation.
    #[must_use]
    pub const fn is_translated(&self) -> bool {
        self.key.is_some()
    }
}

/// Resolves message names against a catalog.
#[derive(Clone)]
pub struct Translator {
    catalog: Arc<dyn MessageCatalog>,
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator").finish_non_exhaustive()
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(Arc::new(EchoCatalog))
    }
}

impl Translator {
    /// Create a translator over a catalog.
    #[must_use]
    pub fn new(catalog: Arc<dyn MessageCatalog>) -> Self {
        Self { catalog }
    }

    /// Resolve `name` under an optional domain prefix.
    ///
    /// # Examples
    ///
    /// ```
    /// use api_envelope_core::message::Attributes;
    /// use api_envelope_core::translation::Translator;
    ///
    /// let translator = Translator::default();
    /// let result = translator.resolve("A literal message", &Attributes::new(), Some("errors"));
    /// assert_eq!(result.message, "A literal message");
    /// assert_eq!(result.key, None);
    /// ```
    #[must_use]
    pub fn resolve(
        &self,
        name: &str,
        attributes: &Attributes,
        domain: Option<&str>,
    ) -> TranslationResult {
        let path = match domain {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}.{name}"),
            _ => name.to_string(),
        };

        let translated = self.catalog.translate(&path, attributes);

        if is_echo(&translated, &path) {
            tracing::trace!(path = %path, "No translation found");
            return TranslationResult {
                key: None,
                message: name.to_string(),
            };
        }

        let last_segment = path.rsplit('.').next().unwrap_or(&path);
        TranslationResult {
            key: Some(slugify(last_segment)),
            message: translated,
        }
    }
}

fn is_echo(translated: &str, path: &str) -> bool {
    translated.starts_with(path)
        || translated
            .split_once("::")
            .is_some_and(|(_, rest)| rest.starts_with(path))
}

/// Turn text into a lowercase, underscore-separated slug.
///
/// Letters and digits are kept, `@` becomes `at`, whitespace, `-` and `_`
/// become separators, and everything else is dropped. Runs of separators
/// collapse and leading or trailing separators are trimmed.
///
/// ```
/// use api_envelope_core::translation::slugify;
///
/// assert_eq!(slugify("Example Error"), "example_error");
/// assert_eq!(slugify("error_code_name"), "error_code_name");
/// ```
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for ch in input.chars() {
        if ch.is_alphanumeric() {
            current.extend(ch.to_lowercase());
        } else if ch == '@' {
            words.extend((!current.is_empty()).then(|| std::mem::take(&mut current)));
            words.push("at".to_string());
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            words.extend((!current.is_empty()).then(|| std::mem::take(&mut current)));
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    words.join("_")
}
