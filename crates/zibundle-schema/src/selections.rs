//! The resolved-selections document.

/// The concrete resolved dependency graph produced by the external
/// resolver from a descriptor.
///
/// Treated as opaque XML text: written to disk once, handed to the gather
/// tool once, never parsed. Whatever the resolver printed is what the
/// gather tool receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionsDocument(String);

impl SelectionsDocument {
    /// Wrap the resolver's stdout.
    pub fn new(xml: impl Into<String>) -> Self {
        Self(xml.into())
    }

    /// The document text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper, yielding the document text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for SelectionsDocument {
    fn from(xml: String) -> Self {
        Self(xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_round_trip() {
        let xml = "<?xml version='1.0' ?>\n<selections/>\n";
        let doc = SelectionsDocument::new(xml);
        assert_eq!(doc.as_str(), xml);
        assert_eq!(doc.into_string(), xml);
    }
}
