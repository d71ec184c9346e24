//! Centralized OID string constants used throughout certlineage.
//!
//! Object Identifiers (OIDs) are defined by ITU-T X.660 and referenced
//! extensively in RFC 5280 (X.509). Grouping them here avoids magic strings
//! scattered across modules and gives each OID a readable name.

// ── X.509 Distinguished Name attributes (RFC 4519 / X.520) ──────────────

pub const COMMON_NAME: &str = "2.5.4.3";
pub const SURNAME: &str = "2.5.4.4";
pub const SERIAL_NUMBER: &str = "2.5.4.5";
pub const COUNTRY: &str = "2.5.4.6";
pub const LOCALITY: &str = "2.5.4.7";
pub const STATE_OR_PROVINCE: &str = "2.5.4.8";
pub const STREET_ADDRESS: &str = "2.5.4.9";
pub const ORGANIZATION: &str = "2.5.4.10";
pub const ORGANIZATIONAL_UNIT: &str = "2.5.4.11";
pub const TITLE: &str = "2.5.4.12";
pub const POSTAL_CODE: &str = "2.5.4.17";
pub const GIVEN_NAME: &str = "2.5.4.42";
pub const EMAIL_ADDRESS: &str = "1.2.840.113549.1.9.1"; // PKCS#9
pub const DOMAIN_COMPONENT: &str = "0.9.2342.19200300.100.1.25";

// ── X.509v3 extensions (RFC 5280 Section 4.2) ───────────────────────────

pub const EXT_SUBJECT_KEY_ID: &str = "2.5.29.14";
pub const EXT_KEY_USAGE: &str = "2.5.29.15";
pub const EXT_SUBJECT_ALT_NAME: &str = "2.5.29.17";
pub const EXT_BASIC_CONSTRAINTS: &str = "2.5.29.19";
pub const EXT_CRL_DISTRIBUTION_POINTS: &str = "2.5.29.31";
pub const EXT_CERTIFICATE_POLICIES: &str = "2.5.29.32";
pub const EXT_AUTHORITY_KEY_ID: &str = "2.5.29.35";
pub const EXT_EXTENDED_KEY_USAGE: &str = "2.5.29.37";
pub const EXT_AUTHORITY_INFO_ACCESS: &str = "1.3.6.1.5.5.7.1.1";

/// Resolve a symbolic extension name to its OID.
///
/// Accepts both the RFC 5280 module names (`id-ce-authorityKeyIdentifier`)
/// and the bare extension names (`authorityKeyIdentifier`).
pub fn lookup_extension_id(name: &str) -> Option<&'static str> {
    match name {
        "id-ce-subjectKeyIdentifier" | "subjectKeyIdentifier" => Some(EXT_SUBJECT_KEY_ID),
        "id-ce-authorityKeyIdentifier" | "authorityKeyIdentifier" => Some(EXT_AUTHORITY_KEY_ID),
        "id-ce-basicConstraints" | "basicConstraints" => Some(EXT_BASIC_CONSTRAINTS),
        "id-ce-keyUsage" | "keyUsage" => Some(EXT_KEY_USAGE),
        "id-ce-subjectAltName" | "subjectAltName" => Some(EXT_SUBJECT_ALT_NAME),
        "id-ce-cRLDistributionPoints" | "cRLDistributionPoints" => {
            Some(EXT_CRL_DISTRIBUTION_POINTS)
        }
        "id-ce-certificatePolicies" | "certificatePolicies" => Some(EXT_CERTIFICATE_POLICIES),
        "id-ce-extKeyUsage" | "extKeyUsage" => Some(EXT_EXTENDED_KEY_USAGE),
        "id-pe-authorityInfoAccess" | "authorityInfoAccess" => Some(EXT_AUTHORITY_INFO_ACCESS),
        _ => None,
    }
}
