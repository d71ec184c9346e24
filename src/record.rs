//! Certificate records, parent/child link sets, and the owning pool.
//!
//! All records live in a [`CertificatePool`] arena and refer to each other
//! by stable [`CertId`] index, never by owned copies. Link sets are only
//! mutated through the pool so that every edge stays symmetric: A is in
//! B's parents exactly when B is in A's children.

use crate::fields::{DistinguishedName, Extension, ExtensionValue};
use crate::oid;
use serde::Serialize;

/// Where a certificate came from: an origin label (typically a file name)
/// and an optional position within that origin. The position is `None` when
/// the origin held exactly one certificate.
///
/// Provenance is used only for diagnostics, never for comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provenance {
    pub origin: String,
    pub index: Option<usize>,
}

impl Provenance {
    pub fn new(origin: impl Into<String>, index: Option<usize>) -> Self {
        Self {
            origin: origin.into(),
            index,
        }
    }
}

impl std::fmt::Display for Provenance {
    /// Render as `origin` or `origin:index`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}:{}", self.origin, i),
            None => write!(f, "{}", self.origin),
        }
    }
}

/// Stable index of a record within its [`CertificatePool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CertId(pub(crate) usize);

impl CertId {
    /// Position of the record in the pool.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Deduplicated set of [`CertId`] with stable insertion-order iteration.
///
/// Iteration order is the order edges were added, which makes cycle
/// discovery and repair deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkSet {
    ids: Vec<CertId>,
}

impl LinkSet {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: CertId) -> bool {
        self.ids.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = CertId> + '_ {
        self.ids.iter().copied()
    }

    pub fn as_slice(&self) -> &[CertId] {
        &self.ids
    }

    /// Insert `id`, returning `false` if it was already present.
    pub(crate) fn insert(&mut self, id: CertId) -> bool {
        if self.ids.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Remove `id`, returning `false` if it was not present.
    /// Preserves the order of the remaining entries.
    pub(crate) fn remove(&mut self, id: CertId) -> bool {
        match self.ids.iter().position(|&n| n == id) {
            Some(pos) => {
                self.ids.remove(pos);
                true
            }
            None => false,
        }
    }
}

/// One certificate of the working set: decoded fields, the exact original
/// encoding, and its links to issuers and issued certificates.
///
/// Records are constructed once from decoded certificates and handed to the
/// pool; the hierarchy builder only removes duplicates and mutates link
/// sets, it never alters certificate content.
#[derive(Debug, Clone, Serialize)]
pub struct CertificateRecord {
    pub provenance: Provenance,
    pub subject: DistinguishedName,
    pub issuer: DistinguishedName,
    pub extensions: Vec<Extension>,
    /// Exact original byte sequence, used solely for duplicate detection.
    #[serde(skip)]
    pub raw_der: Vec<u8>,

    children: LinkSet,
    parents: LinkSet,
}

impl CertificateRecord {
    pub fn new(
        provenance: Provenance,
        subject: DistinguishedName,
        issuer: DistinguishedName,
        extensions: Vec<Extension>,
        raw_der: Vec<u8>,
    ) -> Self {
        Self {
            provenance,
            subject,
            issuer,
            extensions,
            raw_der,
            children: LinkSet::default(),
            parents: LinkSet::default(),
        }
    }

    /// Certificates this one issued.
    pub fn children(&self) -> &LinkSet {
        &self.children
    }

    /// Certificates that issued this one.
    pub fn parents(&self) -> &LinkSet {
        &self.parents
    }

    /// Provenance rendered for diagnostics (`origin` or `origin:index`).
    pub fn location(&self) -> String {
        self.provenance.to_string()
    }

    /// Find an extension by OID.
    pub fn extension(&self, oid_str: &str) -> Option<&Extension> {
        self.extensions.iter().find(|ext| ext.oid == oid_str)
    }

    /// The subjectKeyIdentifier value, if the extension is present.
    pub fn subject_key_id(&self) -> Option<&str> {
        self.extension(oid::EXT_SUBJECT_KEY_ID)
            .and_then(|ext| match &ext.value {
                ExtensionValue::SubjectKeyIdentifier(kid) => Some(kid.as_str()),
                _ => None,
            })
    }

    /// The authorityKeyIdentifier key-identifier value, if the extension is
    /// present and carries one. May be empty, which issuer matching treats
    /// as non-discriminating.
    pub fn authority_key_id(&self) -> Option<&str> {
        self.extension(oid::EXT_AUTHORITY_KEY_ID)
            .and_then(|ext| match &ext.value {
                ExtensionValue::AuthorityKeyIdentifier { key_id } => key_id.as_deref(),
                _ => None,
            })
    }
}

/// Arena owning every record of the working set.
///
/// Records are addressed by [`CertId`]; the pool's element count and order
/// must not change once links exist, so [`CertificatePool::push`] panics
/// after relationship building has begun. Duplicate pruning therefore runs
/// before any link is created.
#[derive(Debug, Default)]
pub struct CertificatePool {
    records: Vec<CertificateRecord>,
    linked: bool,
}

impl CertificatePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<CertificateRecord>) -> Self {
        Self {
            records,
            linked: false,
        }
    }

    /// Add a record to the pool.
    ///
    /// # Panics
    /// Panics if called after relationship building has begun, since link
    /// sets hold indices into the pool.
    pub fn push(&mut self, record: CertificateRecord) {
        assert!(
            !self.linked,
            "certificate pool must not grow once links exist"
        );
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record.
    ///
    /// # Panics
    /// Panics if `id` does not come from this pool.
    #[allow(clippy::indexing_slicing)] // CertId is only handed out by this pool
    pub fn get(&self, id: CertId) -> &CertificateRecord {
        &self.records[id.0]
    }

    pub fn ids(&self) -> impl Iterator<Item = CertId> {
        (0..self.records.len()).map(CertId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CertId, &CertificateRecord)> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, r)| (CertId(i), r))
    }

    pub fn records(&self) -> &[CertificateRecord] {
        &self.records
    }

    /// Records with no parents: the tops of the surviving lineages. A
    /// renderer walks the children relation downward from these.
    pub fn roots(&self) -> impl Iterator<Item = CertId> + '_ {
        self.iter()
            .filter(|(_, r)| r.parents.is_empty())
            .map(|(id, _)| id)
    }

    /// Total number of parent/child edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.records.iter().map(|r| r.children.len()).sum()
    }

    /// Mutable access to the backing store, for duplicate pruning.
    ///
    /// # Panics
    /// Panics once links exist: removal would invalidate them.
    pub(crate) fn records_mut(&mut self) -> &mut Vec<CertificateRecord> {
        assert!(
            !self.linked,
            "certificate pool must not be restructured once links exist"
        );
        &mut self.records
    }

    /// Forbid further structural mutation; called when linking begins.
    pub(crate) fn seal(&mut self) {
        self.linked = true;
    }

    /// Record that `parent` issued `child`, updating both link sets.
    /// Idempotent: adding an existing edge is a no-op.
    #[allow(clippy::indexing_slicing)] // ids come from this pool
    pub(crate) fn link(&mut self, parent: CertId, child: CertId) {
        assert_ne!(parent, child, "a certificate cannot be its own parent");
        self.linked = true;
        self.records[parent.0].children.insert(child);
        self.records[child.0].parents.insert(parent);
    }

    /// Remove the edge `parent` -> `child` from both link sets.
    #[allow(clippy::indexing_slicing)] // ids come from this pool
    pub(crate) fn unlink(&mut self, parent: CertId, child: CertId) {
        let had_child = self.records[parent.0].children.remove(child);
        let had_parent = self.records[child.0].parents.remove(parent);
        debug_assert_eq!(had_child, had_parent, "parent/child link sets out of sync");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dn(cn: &str) -> DistinguishedName {
        DistinguishedName {
            components: vec![("CN".to_string(), cn.to_string())],
        }
    }

    fn record(origin: &str) -> CertificateRecord {
        CertificateRecord::new(
            Provenance::new(origin, None),
            dn(origin),
            dn(origin),
            Vec::new(),
            origin.as_bytes().to_vec(),
        )
    }

    #[test]
    fn provenance_display_with_and_without_index() {
        assert_eq!(Provenance::new("bundle.pem", Some(3)).to_string(), "bundle.pem:3");
        assert_eq!(Provenance::new("leaf.pem", None).to_string(), "leaf.pem");
    }

    #[test]
    fn link_set_deduplicates_and_keeps_order() {
        let mut set = LinkSet::default();
        assert!(set.insert(CertId(2)));
        assert!(set.insert(CertId(0)));
        assert!(!set.insert(CertId(2)));
        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice(), &[CertId(2), CertId(0)]);
    }

    #[test]
    fn link_set_remove_preserves_order() {
        let mut set = LinkSet::default();
        set.insert(CertId(1));
        set.insert(CertId(2));
        set.insert(CertId(3));
        assert!(set.remove(CertId(2)));
        assert!(!set.remove(CertId(2)));
        assert_eq!(set.as_slice(), &[CertId(1), CertId(3)]);
    }

    #[test]
    fn link_and_unlink_stay_symmetric() {
        let mut pool = CertificatePool::from_records(vec![record("a"), record("b")]);
        let (a, b) = (CertId(0), CertId(1));
        pool.link(a, b);
        assert!(pool.get(a).children().contains(b));
        assert!(pool.get(b).parents().contains(a));
        assert_eq!(pool.edge_count(), 1);

        pool.unlink(a, b);
        assert!(pool.get(a).children().is_empty());
        assert!(pool.get(b).parents().is_empty());
        assert_eq!(pool.edge_count(), 0);
    }

    #[test]
    fn duplicate_link_is_noop() {
        let mut pool = CertificatePool::from_records(vec![record("a"), record("b")]);
        pool.link(CertId(0), CertId(1));
        pool.link(CertId(0), CertId(1));
        assert_eq!(pool.edge_count(), 1);
    }

    #[test]
    #[should_panic(expected = "must not grow")]
    fn push_after_linking_panics() {
        let mut pool = CertificatePool::from_records(vec![record("a"), record("b")]);
        pool.link(CertId(0), CertId(1));
        pool.push(record("c"));
    }

    #[test]
    fn roots_are_parentless_records() {
        let mut pool =
            CertificatePool::from_records(vec![record("a"), record("b"), record("c")]);
        pool.link(CertId(0), CertId(1));
        let roots: Vec<CertId> = pool.roots().collect();
        assert_eq!(roots, vec![CertId(0), CertId(2)]);
    }

    #[test]
    fn key_identifier_accessors() {
        let mut rec = record("a");
        rec.extensions = vec![
            Extension {
                oid: crate::oid::EXT_SUBJECT_KEY_ID.to_string(),
                name: "subjectKeyIdentifier".to_string(),
                critical: false,
                value: ExtensionValue::SubjectKeyIdentifier("AB:CD".to_string()),
            },
            Extension {
                oid: crate::oid::EXT_AUTHORITY_KEY_ID.to_string(),
                name: "authorityKeyIdentifier".to_string(),
                critical: false,
                value: ExtensionValue::AuthorityKeyIdentifier { key_id: None },
            },
        ];
        assert_eq!(rec.subject_key_id(), Some("AB:CD"));
        assert_eq!(rec.authority_key_id(), None);
    }
}
