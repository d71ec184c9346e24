//! certlineage: Library for reconstructing the issuance hierarchy of a pool
//! of X.509 certificates.
//!
//! Given a set of certificates already decoded into structured fields, the
//! library determines which certificate issued which, removes byte-identical
//! duplicates, and deterministically breaks circular issuance claims so that
//! the resulting parent/child graph is acyclic. Signature verification and
//! diagnostic reporting are pluggable collaborators ([`SignatureVerifier`]
//! and [`DiagnosticSink`]); a DER-backed verifier and record constructors
//! built on `x509-parser` are provided for convenience.
//!
//! The library does not decide trust anchoring, path validation against a
//! trust store, or revocation: it only establishes structural parent/child
//! edges over the pool handed to it.

mod diag;
mod fields;
mod hierarchy;
pub mod oid;
mod record;
mod util;
mod x509;

pub use diag::{DiagnosticSink, LogSink, MemorySink, NullSink, Severity};
pub use fields::{DistinguishedName, Extension, ExtensionValue};
pub use hierarchy::{
    break_cycle, build_links, compute_hierarchy, find_cycle, is_issuer, is_self_signed,
    prune_duplicates, SignatureVerifier,
};
pub use record::{CertId, CertificatePool, CertificateRecord, LinkSet, Provenance};
pub use x509::{record_from_der, records_from_pem, DerVerifier};

/// Errors returned by certlineage.
#[derive(Debug, thiserror::Error)]
pub enum LineageError {
    #[error("Failed to parse certificate: {0}")]
    ParseError(String),

    #[error("Invalid PEM format: {0}")]
    PemError(String),

    #[error("Invalid DER format: {0}")]
    DerError(String),
}
