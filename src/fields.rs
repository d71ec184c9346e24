//! Certificate name and extension data types.

use serde::Serialize;

/// Distinguished name with ordered components.
///
/// Equality is structural: two names are equal when their component
/// sequences are identical. This is the comparison used to match a child
/// certificate's issuer field against a candidate issuer's subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistinguishedName {
    /// Ordered list of (attribute_type, value) pairs.
    /// Attribute types use short names where known (e.g., "CN", "O", "C").
    pub components: Vec<(String, String)>,
}

impl DistinguishedName {
    /// Format as a comma-separated one-line string matching OpenSSL's default format.
    /// Example: "C = US, O = Org, CN = example.com"
    ///
    /// Values containing commas, equals signs, or backslashes are escaped
    /// to prevent ambiguous output.
    pub fn to_oneline(&self) -> String {
        let mut result = String::new();
        for (i, (k, v)) in self.components.iter().enumerate() {
            if i > 0 {
                result.push_str(", ");
            }
            result.push_str(k);
            result.push_str(" = ");
            for ch in v.chars() {
                match ch {
                    '\\' => result.push_str("\\\\"),
                    ',' => result.push_str("\\,"),
                    '=' => result.push_str("\\="),
                    _ => result.push(ch),
                }
            }
        }
        result
    }
}

impl std::fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_oneline())
    }
}

/// A certificate extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extension {
    /// OID as a dotted-decimal string.
    pub oid: String,
    /// Human-readable name (or OID string if unknown).
    pub name: String,
    /// Whether this extension is marked critical.
    pub critical: bool,
    /// Parsed extension value.
    pub value: ExtensionValue,
}

/// Strongly-typed extension values.
///
/// Only the extensions that influence issuer resolution are parsed into
/// dedicated variants; everything else falls back to [`ExtensionValue::Raw`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum ExtensionValue {
    BasicConstraints {
        ca: bool,
        path_len: Option<u32>,
    },
    /// Key identifier as colon-separated uppercase hex.
    SubjectKeyIdentifier(String),
    AuthorityKeyIdentifier {
        /// Key identifier as colon-separated uppercase hex. `None` when the
        /// extension names the authority by issuer/serial only.
        key_id: Option<String>,
    },
    /// Fallback for extensions we don't parse into a specific variant
    /// (hex-encoded raw value).
    Raw(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dn(components: &[(&str, &str)]) -> DistinguishedName {
        DistinguishedName {
            components: components
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn oneline_plain() {
        let name = dn(&[("C", "US"), ("O", "Org"), ("CN", "example.com")]);
        assert_eq!(name.to_oneline(), "C = US, O = Org, CN = example.com");
    }

    #[test]
    fn oneline_escapes_separators() {
        let name = dn(&[("O", "Acme, Inc."), ("CN", "a=b\\c")]);
        assert_eq!(name.to_oneline(), "O = Acme\\, Inc., CN = a\\=b\\\\c");
    }

    #[test]
    fn structural_equality_is_order_sensitive() {
        let a = dn(&[("C", "US"), ("CN", "x")]);
        let b = dn(&[("CN", "x"), ("C", "US")]);
        assert_ne!(a, b);
        assert_eq!(a, dn(&[("C", "US"), ("CN", "x")]));
    }
}
