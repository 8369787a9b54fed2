//! HTTP status modelling: validated statuses and the wrapper-key table.
//!
//! A [`ResponseStatus`] can only be built from a registered HTTP status, so
//! everything downstream of construction is infallible. The [`WrapperTable`]
//! maps statuses to the key under which response data is nested, using
//! digit-class patterns such as `"4xx"` and exact codes such as `"422"`.

use crate::error::{EnvelopeError, Result};
use http::StatusCode;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use std::fmt;
use std::str::FromStr;

/// A registered HTTP status code.
///
/// # Examples
///
/// ```
/// use api_envelope_core::status::ResponseStatus;
///
/// let status = ResponseStatus::new(422).unwrap();
/// assert!(!status.is_success());
/// assert!(ResponseStatus::new(1000).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResponseStatus(StatusCode);

impl ResponseStatus {
    /// 200 OK.
    pub const OK: Self = Self(StatusCode::OK);
    /// 201 Created.
    pub const CREATED: Self = Self(StatusCode::CREATED);
    /// 202 Accepted.
    pub const ACCEPTED: Self = Self(StatusCode::ACCEPTED);
    /// 204 No Content.
    pub const NO_CONTENT: Self = Self(StatusCode::NO_CONTENT);
    /// 400 Bad Request.
    pub const BAD_REQUEST: Self = Self(StatusCode::BAD_REQUEST);
    /// 401 Unauthorized.
    pub const UNAUTHORIZED: Self = Self(StatusCode::UNAUTHORIZED);
    /// 403 Forbidden.
    pub const FORBIDDEN: Self = Self(StatusCode::FORBIDDEN);
    /// 404 Not Found.
    pub const NOT_FOUND: Self = Self(StatusCode::NOT_FOUND);
    /// 422 Unprocessable Entity.
    pub const UNPROCESSABLE_ENTITY: Self = Self(StatusCode::UNPROCESSABLE_ENTITY);
    /// 500 Internal Server Error.
    pub const INTERNAL_SERVER_ERROR: Self = Self(StatusCode::INTERNAL_SERVER_ERROR);

    /// Validate a numeric status code.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::InvalidStatusCode`] when the code is not a
    /// registered HTTP status.
    pub fn new(code: u16) -> Result<Self> {
        StatusCode::from_u16(code)
            .ok()
            .filter(|status| status.canonical_reason().is_some())
            .map(Self)
            .ok_or(EnvelopeError::InvalidStatusCode(code))
    }

    /// The numeric code.
    #[must_use]
    pub const fn code(self) -> u16 {
        self.0.as_u16()
    }

    /// The underlying `http` status.
    #[must_use]
    pub const fn as_http(self) -> StatusCode {
        self.0
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub fn is_success(self) -> bool {
        self.0.is_success()
    }

    /// The canonical reason phrase (e.g. `"Not Found"`).
    #[must_use]
    pub fn status_text(self) -> &'static str {
        self.0.canonical_reason().unwrap_or_default()
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for ResponseStatus {
    type Error = EnvelopeError;

    fn try_from(code: u16) -> Result<Self> {
        Self::new(code)
    }
}

impl TryFrom<StatusCode> for ResponseStatus {
    type Error = EnvelopeError;

    fn try_from(status: StatusCode) -> Result<Self> {
        Self::new(status.as_u16())
    }
}

impl From<ResponseStatus> for StatusCode {
    fn from(status: ResponseStatus) -> Self {
        status.0
    }
}

/// Every registered status code, in ascending order.
#[must_use]
pub fn known_status_codes() -> Vec<u16> {
    (100..=999).filter(|code| ResponseStatus::new(*code).is_ok()).collect()
}

/// A three-position status pattern where each position is a digit or a wildcard.
///
/// `"4xx"` matches every client error, `"422"` matches exactly 422 and
/// `"42x"` matches 420 through 429.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusPattern {
    digits: [Option<u8>; 3],
}

impl StatusPattern {
    /// Whether this pattern matches the given status.
    #[must_use]
    pub fn matches(&self, status: ResponseStatus) -> bool {
        let code = status.code();
        let actual = [code / 100, (code / 10) % 10, code % 10];
        self.digits
            .iter()
            .zip(actual)
            .all(|(expected, digit)| expected.is_none_or(|d| u16::from(d) == digit))
    }

    /// Number of fixed digits. Higher is more specific.
    #[must_use]
    pub fn specificity(&self) -> usize {
        self.digits.iter().filter(|d| d.is_some()).count()
    }
}

impl FromStr for StatusPattern {
    type Err = EnvelopeError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || EnvelopeError::InvalidStatusPattern(s.to_string());
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != 3 {
            return Err(invalid());
        }

        let mut digits = [None; 3];
        for (slot, ch) in digits.iter_mut().zip(chars) {
            *slot = match ch {
                'x' | 'X' => None,
                _ => Some(
                    ch.to_digit(10)
                        .and_then(|d| u8::try_from(d).ok())
                        .ok_or_else(invalid)?,
                ),
            };
        }
        Ok(Self { digits })
    }
}

impl fmt::Display for StatusPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for digit in self.digits {
            match digit {
                Some(d) => write!(f, "{d}")?,
                None => write!(f, "x")?,
            }
        }
        Ok(())
    }
}

/// Ordered table of status patterns and the data wrapper key each selects.
///
/// Resolution picks the most specific matching pattern; among equally
/// specific matches the earliest entry wins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrapperTable {
    entries: Vec<(StatusPattern, String)>,
}

impl WrapperTable {
    /// Build a table from `(pattern, key)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::InvalidStatusPattern`] for a malformed pattern.
    pub fn from_pairs<I, P, K>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, K)>,
        P: AsRef<str>,
        K: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(pattern, key)| Ok((pattern.as_ref().parse()?, key.into())))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    /// A table with no entries: data is never nested.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The wrapper key for a status, if any pattern matches.
    #[must_use]
    pub fn resolve(&self, status: ResponseStatus) -> Option<&str> {
        let mut best: Option<&(StatusPattern, String)> = None;
        for entry in self.entries.iter().filter(|(p, _)| p.matches(status)) {
            if best.is_none_or(|(current, _)| entry.0.specificity() > current.specificity()) {
                best = Some(entry);
            }
        }
        best.map(|(_, key)| key.as_str())
    }

    /// Iterate over the entries in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = (&StatusPattern, &str)> {
        self.entries.iter().map(|(p, k)| (p, k.as_str()))
    }
}

impl Default for WrapperTable {
    fn default() -> Self {
        let entries = [("2xx", "data"), ("422", "errors"), ("4xx", "error"), ("5xx", "error")]
            .into_iter()
            .filter_map(|(pattern, key)| Some((pattern.parse().ok()?, key.to_string())))
            .collect();
        Self { entries }
    }
}

impl<'de> Deserialize<'de> for WrapperTable {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = WrapperTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of status patterns to wrapper keys")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<WrapperTable, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut pairs = Vec::new();
                while let Some((pattern, key)) = access.next_entry::<String, String>()? {
                    pairs.push((pattern, key));
                }
                WrapperTable::from_pairs(pairs).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn status(code: u16) -> ResponseStatus {
        ResponseStatus::new(code).unwrap()
    }

    #[test]
    fn test_rejects_unregistered_codes() {
        assert!(matches!(
            ResponseStatus::new(1000),
            Err(EnvelopeError::InvalidStatusCode(1000))
        ));
        assert!(ResponseStatus::new(99).is_err());
        assert!(ResponseStatus::new(299).is_err());
    }

    #[test]
    fn test_status_text_is_canonical() {
        assert_eq!(status(400).status_text(), "Bad Request");
        assert_eq!(ResponseStatus::OK.status_text(), "OK");
    }

    #[test]
    fn test_known_codes_include_common_statuses() {
        let codes = known_status_codes();
        for code in [200, 201, 204, 301, 400, 401, 403, 404, 422, 500, 503] {
            assert!(codes.contains(&code), "missing {code}");
        }
        assert!(!codes.contains(&299));
    }

    #[test]
    fn test_pattern_parsing() {
        let pattern: StatusPattern = "4xx".parse().unwrap();
        assert_eq!(pattern.specificity(), 1);
        assert_eq!(pattern.to_string(), "4xx");
        assert!(pattern.matches(status(404)));
        assert!(!pattern.matches(status(500)));

        assert!("4x".parse::<StatusPattern>().is_err());
        assert!("4y2".parse::<StatusPattern>().is_err());
        assert!("4xxx".parse::<StatusPattern>().is_err());
    }

    #[test]
    fn test_exact_code_beats_class_pattern() {
        let table = WrapperTable::default();
        assert_eq!(table.resolve(status(422)), Some("errors"));
        assert_eq!(table.resolve(status(404)), Some("error"));
        assert_eq!(table.resolve(status(200)), Some("data"));
        assert_eq!(table.resolve(status(503)), Some("error"));
        assert_eq!(table.resolve(status(301)), None);
    }

    #[test]
    fn test_specificity_ignores_declaration_order() {
        let table =
            WrapperTable::from_pairs([("4xx", "error"), ("42x", "problems"), ("422", "errors")])
                .unwrap();
        assert_eq!(table.resolve(status(422)), Some("errors"));
        assert_eq!(table.resolve(status(429)), Some("problems"));
        assert_eq!(table.resolve(status(400)), Some("error"));
    }

    #[test]
    fn test_ties_go_to_first_entry() {
        let table = WrapperTable::from_pairs([("4xx", "first"), ("x0x", "second")]).unwrap();
        assert_eq!(table.resolve(status(404)), Some("first"));
    }
}
