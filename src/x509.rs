//! Bridge from DER/PEM input to [`CertificateRecord`]s via `x509-parser`,
//! plus the default signature verifier.
//!
//! Decoding is otherwise external to the hierarchy core; these constructors
//! cover the common case of records coming straight from certificate files.

use crate::fields::{DistinguishedName, Extension, ExtensionValue};
use crate::hierarchy::SignatureVerifier;
use crate::oid;
use crate::record::{CertificateRecord, Provenance};
use crate::util;
use crate::LineageError;
use x509_parser::prelude::*;

/// Build a record from a DER-encoded certificate.
///
/// `origin` and `index` become the record's provenance; pass `index = None`
/// when the origin held exactly one certificate.
pub fn record_from_der(
    input: &[u8],
    origin: &str,
    index: Option<usize>,
) -> Result<CertificateRecord, LineageError> {
    let (remaining, x509) =
        X509Certificate::from_der(input).map_err(|e| LineageError::DerError(format!("{}", e)))?;

    if x509.tbs_certificate.version.0 > 2 {
        return Err(LineageError::ParseError(format!(
            "unsupported X.509 version {} (expected v1, v2, or v3)",
            x509.tbs_certificate.version.0 + 1
        )));
    }

    // Keep only the actual certificate bytes, not any trailing data, so
    // duplicate detection compares the correct content.
    let cert_len = input.len() - remaining.len();
    let cert_der = input.get(..cert_len).unwrap_or(input);

    let tbs = &x509.tbs_certificate;
    Ok(CertificateRecord::new(
        Provenance::new(origin, index),
        build_dn(&tbs.subject),
        build_dn(&tbs.issuer),
        tbs.extensions().iter().map(build_extension).collect(),
        cert_der.to_vec(),
    ))
}

/// Build records from a PEM buffer holding one or more certificates.
///
/// Position indices are assigned in order of appearance; a buffer with a
/// single certificate yields a record without a position index.
pub fn records_from_pem(input: &[u8], origin: &str) -> Result<Vec<CertificateRecord>, LineageError> {
    let mut ders = Vec::new();
    for pem_result in Pem::iter_from_buffer(input) {
        match pem_result {
            Ok(pem) => {
                if pem.label == "CERTIFICATE" || pem.label == "TRUSTED CERTIFICATE" {
                    ders.push(pem.contents);
                }
            }
            Err(e) => {
                // If we already have some certs, stop at first error (trailing garbage)
                if !ders.is_empty() {
                    break;
                }
                return Err(LineageError::PemError(format!("failed to parse PEM: {}", e)));
            }
        }
    }

    if ders.is_empty() {
        return Err(LineageError::PemError(
            "no certificates found in PEM input".into(),
        ));
    }

    let single = ders.len() == 1;
    ders.iter()
        .enumerate()
        .map(|(i, der)| record_from_der(der, origin, if single { None } else { Some(i) }))
        .collect()
}

pub(crate) fn build_dn(name: &X509Name) -> DistinguishedName {
    let mut components = Vec::new();
    for rdn in name.iter() {
        for attr in rdn.iter() {
            let key = util::oid_short_name(&attr.attr_type().to_id_string());
            let value = attr.as_str().unwrap_or("<binary>").to_string();
            components.push((key, value));
        }
    }
    DistinguishedName { components }
}

fn build_extension(ext: &X509Extension) -> Extension {
    let oid_str = ext.oid.to_id_string();
    let value = match ext.parsed_extension() {
        ParsedExtension::BasicConstraints(bc) => ExtensionValue::BasicConstraints {
            ca: bc.ca,
            path_len: bc.path_len_constraint,
        },
        ParsedExtension::SubjectKeyIdentifier(kid) => {
            ExtensionValue::SubjectKeyIdentifier(util::hex_colon_upper(kid.0))
        }
        ParsedExtension::AuthorityKeyIdentifier(akid) => ExtensionValue::AuthorityKeyIdentifier {
            key_id: akid
                .key_identifier
                .as_ref()
                .map(|k| util::hex_colon_upper(k.0)),
        },
        _ => ExtensionValue::Raw(util::hex_colon_upper(ext.value)),
    };

    Extension {
        oid: oid_str.clone(),
        name: extension_name(&oid_str),
        critical: ext.critical,
        value,
    }
}

fn extension_name(oid_str: &str) -> String {
    match oid_str {
        oid::EXT_SUBJECT_KEY_ID => "subjectKeyIdentifier",
        oid::EXT_KEY_USAGE => "keyUsage",
        oid::EXT_SUBJECT_ALT_NAME => "subjectAltName",
        oid::EXT_BASIC_CONSTRAINTS => "basicConstraints",
        oid::EXT_CRL_DISTRIBUTION_POINTS => "cRLDistributionPoints",
        oid::EXT_CERTIFICATE_POLICIES => "certificatePolicies",
        oid::EXT_AUTHORITY_KEY_ID => "authorityKeyIdentifier",
        oid::EXT_EXTENDED_KEY_USAGE => "extKeyUsage",
        oid::EXT_AUTHORITY_INFO_ACCESS => "authorityInfoAccess",
        other => return other.to_string(),
    }
    .to_string()
}

/// Signature verifier backed by `x509-parser`.
///
/// Re-parses both records' original DER bytes and checks the child's
/// signature against the issuer's public key. Records that no longer parse
/// simply fail verification.
#[derive(Debug, Clone, Copy, Default)]
pub struct DerVerifier;

impl SignatureVerifier for DerVerifier {
    fn is_issuer_signature_valid(
        &self,
        issuer: &CertificateRecord,
        child: &CertificateRecord,
    ) -> bool {
        let Ok((_, issuer_x509)) = X509Certificate::from_der(&issuer.raw_der) else {
            return false;
        };
        let Ok((_, child_x509)) = X509Certificate::from_der(&child.raw_der) else {
            return false;
        };
        child_x509
            .verify_signature(Some(issuer_x509.public_key()))
            .is_ok()
    }
}
