//! Envelope configuration.
//!
//! Loaded once at startup and shared read-only afterwards. Every field has a
//! default, so an empty TOML document is a valid configuration.
//!
//! ```toml
//! render_html_on_exception = false
//! no_content_statuses = [204]
//! debug = false
//!
//! [validation]
//! status = 422
//! message = "validation_failed"
//!
//! [translation]
//! success = "success"
//! errors = "errors"
//!
//! [data_wrappers]
//! 2xx = "data"
//! 422 = "errors"
//! 4xx = "error"
//! 5xx = "error"
//! ```

use crate::error::{EnvelopeError, Result};
use crate::status::{ResponseStatus, WrapperTable};
use serde::Deserialize;

/// Settings for validation-failure responses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Status used for validation failures.
    ///
    /// Default: 422
    pub status: u16,

    /// Message (or message identifier) used when none is supplied.
    ///
    /// Default: `"validation_failed"`
    pub message: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            status: 422,
            message: "validation_failed".to_string(),
        }
    }
}

/// Domain prefixes for message lookups.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TranslationDomains {
    /// Prefix for 2xx responses.
    ///
    /// Default: `"success"`
    pub success: String,

    /// Prefix for every other response.
    ///
    /// Default: `"errors"`
    pub errors: String,
}

impl Default for TranslationDomains {
    fn default() -> Self {
        Self {
            success: "success".to_string(),
            errors: "errors".to_string(),
        }
    }
}

/// Envelope configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// Validation-failure settings.
    pub validation: ValidationConfig,

    /// Delegate unclassified faults to the HTML fallback renderer.
    ///
    /// Default: false
    pub render_html_on_exception: bool,

    /// Statuses whose body is always `{}`.
    ///
    /// Default: `[204]`
    pub no_content_statuses: Vec<u16>,

    /// Translation domain prefixes.
    pub translation: TranslationDomains,

    /// Status pattern → data wrapper key.
    pub data_wrappers: WrapperTable,

    /// Include diagnostic details in unclassified fault responses.
    ///
    /// Default: false
    pub debug: bool,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            validation: ValidationConfig::default(),
            render_html_on_exception: false,
            no_content_statuses: vec![204],
            translation: TranslationDomains::default(),
            data_wrappers: WrapperTable::default(),
            debug: false,
        }
    }
}

impl ResponseConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::ConfigParse`] for malformed TOML or wrapper
    /// patterns, and [`EnvelopeError::InvalidConfig`] when [`Self::validate`]
    /// fails.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every configured status is a registered HTTP status.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::InvalidConfig`] naming the offending setting.
    pub fn validate(&self) -> Result<()> {
        ResponseStatus::new(self.validation.status).map_err(|_| {
            EnvelopeError::InvalidConfig(format!(
                "validation.status {} is not a registered HTTP status",
                self.validation.status
            ))
        })?;

        if let Some(code) = self
            .no_content_statuses
            .iter()
            .find(|code| ResponseStatus::new(**code).is_err())
        {
            return Err(EnvelopeError::InvalidConfig(format!(
                "no_content_statuses contains unregistered status {code}"
            )));
        }

        Ok(())
    }

    /// Whether responses with this status carry an empty body.
    #[must_use]
    pub fn is_no_content(&self, status: ResponseStatus) -> bool {
        self.no_content_statuses.contains(&status.code())
    }

    /// Translation domain for a status.
    #[must_use]
    pub fn domain_for(&self, status: ResponseStatus) -> &str {
        if status.is_success() {
            &self.translation.success
        } else {
            &self.translation.errors
        }
    }

    /// Set the validation status and default message.
    #[must_use]
    pub fn with_validation(mut self, status: u16, message: impl Into<String>) -> Self {
        self.validation = ValidationConfig {
            status,
            message: message.into(),
        };
        self
    }

    /// Enable or disable HTML rendering of unclassified faults.
    #[must_use]
    pub const fn with_render_html_on_exception(mut self, enabled: bool) -> Self {
        self.render_html_on_exception = enabled;
        self
    }

    /// Replace the no-content status set.
    #[must_use]
    pub fn with_no_content_statuses(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.no_content_statuses = statuses.into_iter().collect();
        self
    }

    /// Replace the translation domain prefixes.
    #[must_use]
    pub fn with_translation_domains(
        mut self,
        success: impl Into<String>,
        errors: impl Into<String>,
    ) -> Self {
        self.translation = TranslationDomains {
            success: success.into(),
            errors: errors.into(),
        };
        self
    }

    /// Replace the data wrapper table.
    #[must_use]
    pub fn with_data_wrappers(mut self, table: WrapperTable) -> Self {
        self.data_wrappers = table;
        self
    }

    /// Enable or disable diagnostic payloads.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
