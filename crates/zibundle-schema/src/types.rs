//! Requested dependency pairs and their feed URLs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single requested dependency: a package name and an exact version.
///
/// Specs are immutable inputs. The pipeline preserves the order they were
/// supplied in and imposes no uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySpec {
    /// Package name as published in the feed index (e.g. `left-pad`).
    pub name: String,

    /// Exact version string (e.g. `1.0.0`). Treated as opaque text; the
    /// external resolver owns version ordering semantics.
    pub version: String,
}

/// Errors produced when parsing or validating a [`DependencySpec`].
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SpecError {
    /// The spec string did not contain a `@` separating name and version.
    #[error("Missing version in '{0}': expected name@version")]
    MissingVersion(String),

    /// A required field (name or version) is empty.
    #[error("Empty field: {0}")]
    EmptyField(&'static str),
}

impl DependencySpec {
    /// Create a spec from already-separated parts.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Validates that both fields are non-empty.
    ///
    /// Deliberately does NOT reject XML metacharacters: the descriptor
    /// generator embeds these fields verbatim, and narrowing the accepted
    /// inputs would change which requests reach the external resolver.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::EmptyField`] if `name` or `version` is empty.
    pub fn validate(&self) -> Result<(), SpecError> {
        if self.name.is_empty() {
            return Err(SpecError::EmptyField("name"));
        }
        if self.version.is_empty() {
            return Err(SpecError::EmptyField("version"));
        }
        Ok(())
    }

    /// The feed URL for this dependency under the given feed base,
    /// `<base>/<name>.xml`.
    pub fn feed_url(&self, feed_base: &str) -> String {
        format!("{}/{}.xml", feed_base.trim_end_matches('/'), self.name)
    }
}

impl FromStr for DependencySpec {
    type Err = SpecError;

    /// Parse `name@version`. The split is on the last `@`, so scoped names
    /// like `@babel/core@7.0.0` keep their leading `@`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, version) = s
            .rsplit_once('@')
            .ok_or_else(|| SpecError::MissingVersion(s.to_string()))?;
        let spec = Self::new(name, version);
        spec.validate().map_err(|e| match e {
            SpecError::EmptyField(_) => SpecError::MissingVersion(s.to_string()),
            other => other,
        })?;
        Ok(spec)
    }
}

impl fmt::Display for DependencySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}
