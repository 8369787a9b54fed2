//! In-memory message catalog.
//!
//! Messages are organised in groups (one per translation domain, e.g.
//! `errors`), each a nested tree addressed with dotted paths. Groups may
//! live under a namespace, addressed as `namespace::group.key`.
//!
//! Text may contain `:placeholder` markers. `:name` is replaced with the
//! attribute value, `:Name` with the value's first letter upper-cased and
//! `:NAME` with the value upper-cased.

use crate::error::Result;
use crate::message::Attributes;
use crate::translation::MessageCatalog;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A catalog backed by nested JSON message groups.
///
/// # Examples
///
/// ```
/// use api_envelope_core::catalog::InMemoryCatalog;
/// use api_envelope_core::message::Attributes;
/// use api_envelope_core::translation::MessageCatalog;
/// use serde_json::json;
///
/// let catalog = InMemoryCatalog::new()
///     .with_group(None, "errors", json!({"quota": "Limit of :limit reached"}));
///
/// let attrs: Attributes = [("limit", "10")].into_iter().collect();
/// assert_eq!(catalog.translate("errors.quota", &attrs), "Limit of 10 reached");
/// assert_eq!(catalog.translate("errors.other", &attrs), "errors.other");
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryCatalog {
    namespaces: HashMap<Option<String>, Map<String, Value>>,
}

impl InMemoryCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a message group.
    #[must_use]
    pub fn with_group(mut self, namespace: Option<&str>, group: &str, messages: Value) -> Self {
        self.insert_group(namespace, group, messages);
        self
    }

    /// Add (or replace) a message group in place.
    pub fn insert_group(&mut self, namespace: Option<&str>, group: &str, messages: Value) {
        self.namespaces
            .entry(namespace.map(str::to_string))
            .or_default()
            .insert(group.to_string(), messages);
    }

    /// Load every top-level table of a TOML document as a group.
    ///
    /// ```
    /// use api_envelope_core::catalog::InMemoryCatalog;
    /// use api_envelope_core::message::Attributes;
    /// use api_envelope_core::translation::MessageCatalog;
    ///
    /// let catalog = InMemoryCatalog::from_toml_str(None, r#"
    ///     [success]
    ///     created = "Created :what"
    /// "#).unwrap();
    ///
    /// let attrs: Attributes = [("what", "a user")].into_iter().collect();
    /// assert_eq!(catalog.translate("success.created", &attrs), "Created a user");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`crate::EnvelopeError::ConfigParse`] if the text is not valid TOML.
    pub fn from_toml_str(namespace: Option<&str>, text: &str) -> Result<Self> {
        let groups: Map<String, Value> = toml::from_str(text)?;
        let mut catalog = Self::new();
        for (group, messages) in groups {
            catalog.insert_group(namespace, &group, messages);
        }
        Ok(catalog)
    }

    fn lookup(&self, path: &str) -> Option<&str> {
        let (namespace, rest) = match path.split_once("::") {
            Some((ns, rest)) => (Some(ns.to_string()), rest),
            None => (None, path),
        };

        let groups = self.namespaces.get(&namespace)?;
        let mut segments = rest.split('.');
        let mut node = groups.get(segments.next()?)?;
        for segment in segments {
            node = node.as_object()?.get(segment)?;
        }
        node.as_str()
    }
}

impl MessageCatalog for InMemoryCatalog {
    fn translate(&self, path: &str, attributes: &Attributes) -> String {
        self.lookup(path).map_or_else(
            || path.to_string(),
            |text| substitute(text, attributes),
        )
    }
}

/// Replace `:key`, `:Key` and `:KEY` placeholders, longest key first.
fn substitute(text: &str, attributes: &Attributes) -> String {
    let mut pairs: Vec<(&str, &str)> = attributes.iter().filter(|(k, _)| !k.is_empty()).collect();
    pairs.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut out = text.to_string();
    for (key, value) in pairs {
        out = out
            .replace(&format!(":{}", upper_first(key)), &upper_first(value))
            .replace(&format!(":{}", key.to_uppercase()), &value.to_uppercase())
            .replace(&format!(":{key}"), value);
    }
    out
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
