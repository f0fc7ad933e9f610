//! Wire serialization settings
//!
//! Field naming (kebab-case) and enum encoding (string names) are attached
//! to the wire types through serde attributes. What varies per process is
//! captured in [`WireFormat`], which is built once at startup and handed to
//! every encode/decode call.

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Immutable serialization configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireFormat {
    pretty: bool,
}

impl WireFormat {
    /// Create a wire format with the given output style
    pub const fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Compact single-line output
    pub const fn compact() -> Self {
        Self::new(false)
    }

    /// Whether encoded output is indented
    pub fn is_pretty(&self) -> bool {
        self.pretty
    }

    /// Decode a value from JSON text
    pub fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Encode a value as JSON text
    pub fn encode<T: Serialize>(&self, value: &T) -> Result<String, serde_json::Error> {
        if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
    }
}

impl Default for WireFormat {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_default_is_pretty() {
        assert!(WireFormat::default().is_pretty());
        assert!(!WireFormat::compact().is_pretty());
    }

    #[test]
    fn test_encode_pretty_vs_compact() {
        let mut value = BTreeMap::new();
        value.insert("base-commit-sha", "abc123");

        let pretty = WireFormat::default().encode(&value).unwrap();
        assert!(pretty.contains('\n'));

        let compact = WireFormat::compact().encode(&value).unwrap();
        assert_eq!(compact, r#"{"base-commit-sha":"abc123"}"#);
    }

    #[test]
    fn test_decode_error() {
        let result: Result<BTreeMap<String, String>, _> = WireFormat::default().decode("{");
        assert!(result.is_err());
    }
}
