//! Issuance hierarchy construction over a certificate pool.
//!
//! The entry point is [`compute_hierarchy`]:
//! - remove byte-identical duplicates,
//! - draw parent/child relationships by testing every pair of certificates
//!   in both directions,
//! - break circular issuance claims until the children graph is acyclic.
//!
//! Certificates that chain to nothing simply end up with empty link sets;
//! no input is ever rejected. Malicious inputs can claim arbitrary issuance
//! relationships, including cycles, so cycle repair must terminate and be
//! deterministic: each repair removes exactly one edge, chosen by a fixed
//! heuristic.
//!
//! A later step, collapsing redundant non-cyclic multiple parents (same
//! authority and key, different validity windows) in favor of the longest
//! lineage, is a known extension point and deliberately not implemented.

use crate::diag::DiagnosticSink;
use crate::record::{CertId, CertificatePool, CertificateRecord};

/// Cryptographic collaborator: reports whether `child`'s signature
/// validates under `issuer`'s public key and signing algorithm.
///
/// Failure is not an error, just a negative answer; any detail worth
/// reporting is the implementation's own business.
pub trait SignatureVerifier {
    fn is_issuer_signature_valid(
        &self,
        issuer: &CertificateRecord,
        child: &CertificateRecord,
    ) -> bool;
}

/// Tell if a certificate is a valid issuer of another certificate.
///
/// All three checks must pass:
/// - the child's issuer name equals the candidate's subject name,
/// - the child's authorityKeyIdentifier (when present and non-empty)
///   matches the candidate's subjectKeyIdentifier,
/// - the child's signature verifies under the candidate's public key.
///
/// A name mismatch fails silently (the common case when scanning pairs);
/// the other failures emit a diagnostic naming both parties. Diagnostics
/// never affect the result, and the result depends only on the two records
/// and the verifier: calling twice with the same pair yields the same
/// answer.
pub fn is_issuer(
    issuer: &CertificateRecord,
    child: &CertificateRecord,
    verifier: &dyn SignatureVerifier,
    sink: &mut dyn DiagnosticSink,
) -> bool {
    if child.issuer != issuer.subject {
        return false;
    }

    // Match the child's authorityKeyIdentifier against the issuer's
    // subjectKeyIdentifier. An absent or empty key identifier does not
    // discriminate between candidate issuers.
    if let Some(akid) = child.authority_key_id().filter(|k| !k.is_empty()) {
        match issuer.subject_key_id() {
            None => {
                sink.info(&format!(
                    "issuer without subjectKeyIdentifier (issuer {}, child {})",
                    issuer.location(),
                    child.location()
                ));
                return false;
            }
            Some(skid) if skid != akid => {
                sink.info(&format!(
                    "issuer with different subjectKeyIdentifier (issuer {}, child {})",
                    issuer.location(),
                    child.location()
                ));
                return false;
            }
            Some(_) => {}
        }
    }

    if !verifier.is_issuer_signature_valid(issuer, child) {
        sink.error(&format!(
            "claimed child {} not verified by authority certificate {}",
            child.location(),
            issuer.location()
        ));
        return false;
    }

    true
}

/// Tell if a certificate is its own issuer.
///
/// The hierarchy builder never pairs a record with itself, so this is for
/// callers that need to single out self-signed (root) certificates.
pub fn is_self_signed(
    record: &CertificateRecord,
    verifier: &dyn SignatureVerifier,
    sink: &mut dyn DiagnosticSink,
) -> bool {
    is_issuer(record, record, verifier, sink)
}

/// Remove byte-identical duplicate certificates from the pool, keeping the
/// first occurrence in input order.
///
/// Must run to completion before any link is created: removal changes
/// record indices.
#[allow(clippy::indexing_slicing)] // i and j stay below records.len()
pub fn prune_duplicates(pool: &mut CertificatePool, sink: &mut dyn DiagnosticSink) {
    let records = pool.records_mut();
    let mut i = 0;
    while i < records.len() {
        let mut j = i + 1;
        while j < records.len() {
            if records[i].raw_der == records[j].raw_der {
                sink.warning(&format!(
                    "duplicate certificate {} ignored (same as {})",
                    records[j].location(),
                    records[i].location()
                ));
                records.remove(j);
            } else {
                j += 1;
            }
        }
        i += 1;
    }
}

/// Draw parent/child relationships between every pair of certificates.
///
/// Each unordered pair is tested in both directions independently; both
/// directions can hold at once (a cross-issuance pair), which the cycle
/// repair pass later resolves like any other cycle. Linking is idempotent.
pub fn build_links(
    pool: &mut CertificatePool,
    verifier: &dyn SignatureVerifier,
    sink: &mut dyn DiagnosticSink,
) {
    pool.seal();
    let n = pool.len();
    for a in 0..n {
        let id_a = CertId(a);
        for b in (a + 1)..n {
            let id_b = CertId(b);
            if is_issuer(pool.get(id_a), pool.get(id_b), verifier, sink) {
                pool.link(id_a, id_b);
            }
            if is_issuer(pool.get(id_b), pool.get(id_a), verifier, sink) {
                pool.link(id_b, id_a);
            }
        }
        sink.debug(&format!(
            "cert {} has {} parent(s)",
            pool.get(id_a).location(),
            pool.get(id_a).parents().len()
        ));
    }
}

/// Look for a cycle in the children graph reachable from `start`.
///
/// Returns a sequence `[n0, n1, ..., nk]` where each element is a child of
/// the one before it and `n0` is also a child of `nk`, or `None` when no
/// cycle is reachable. The search is depth-first over the current path, not
/// a global visited set: a record may legitimately be reached along several
/// non-cyclic paths. The first cycle found short-circuits the search, and
/// children are tried in link insertion order, so the result is
/// deterministic.
///
/// Uses an explicit stack of (record, child position) frames; a long chain
/// of certificates must not overflow the call stack.
#[allow(clippy::indexing_slicing)] // `at` comes from position() on the same stack
pub fn find_cycle(pool: &CertificatePool, start: CertId) -> Option<Vec<CertId>> {
    let mut stack: Vec<(CertId, usize)> = vec![(start, 0)];
    while let Some(frame) = stack.last_mut() {
        let (id, pos) = *frame;
        match pool.get(id).children().as_slice().get(pos).copied() {
            None => {
                // All children exhausted, backtrack.
                stack.pop();
            }
            Some(child) => {
                frame.1 += 1;
                if let Some(at) = stack.iter().position(|&(n, _)| n == child) {
                    return Some(stack[at..].iter().map(|&(n, _)| n).collect());
                }
                stack.push((child, 0));
            }
        }
    }
    None
}

/// Break a cycle found by [`find_cycle`] by removing exactly one of its
/// edges.
///
/// The edge to cut is chosen by the first applicable rule:
/// 1. if some cycle node has more than one parent overall, take the node
///    with the most parents (ties: first in cycle order) and cut the edge
///    from its cycle predecessor to it; a node with several parents keeps
///    its alternate lineages;
/// 2. else, if some cycle node has more than one child overall, take the
///    node with the most children and cut the edge to its cycle successor;
/// 3. else the cycle has no branching at all: cut the edge from the last
///    node back to the first.
///
/// # Panics
/// Panics if the cycle has fewer than two nodes; callers must only pass
/// results of [`find_cycle`].
#[allow(clippy::indexing_slicing)] // cycle indices are computed modulo cycle.len()
pub fn break_cycle(pool: &mut CertificatePool, cycle: &[CertId], sink: &mut dyn DiagnosticSink) {
    assert!(
        cycle.len() >= 2,
        "cycle must contain at least two certificates"
    );

    // 1. Look for the node with the most parents.
    let mut target = 0;
    for (i, &id) in cycle.iter().enumerate() {
        if pool.get(id).parents().len() > pool.get(cycle[target]).parents().len() {
            target = i;
        }
        sink.debug(&format!(
            "cert {} has {} parent(s)",
            pool.get(id).location(),
            pool.get(id).parents().len()
        ));
    }
    if pool.get(cycle[target]).parents().len() > 1 {
        // Eg: C -> B and A -> B -> C: B has two parents, so drop the one
        // that is part of the cycle (its predecessor in the list).
        let node = cycle[target];
        let previous = cycle[(target + cycle.len() - 1) % cycle.len()];
        sink.warning(&format!(
            "ignoring {} as a child of {} (circular issuance)",
            pool.get(node).location(),
            pool.get(previous).location()
        ));
        pool.unlink(previous, node);
        return;
    }

    // 2. Look for the node with the most children.
    let mut target = 0;
    for (i, &id) in cycle.iter().enumerate() {
        if pool.get(id).children().len() > pool.get(cycle[target]).children().len() {
            target = i;
        }
        sink.debug(&format!(
            "cert {} has {} child(ren)",
            pool.get(id).location(),
            pool.get(id).children().len()
        ));
    }
    if pool.get(cycle[target]).children().len() > 1 {
        // Eg: A -> B -> C -> A and B -> D: B has two children, so drop the
        // one that is part of the cycle (its successor in the list).
        let node = cycle[target];
        let next = cycle[(target + 1) % cycle.len()];
        sink.warning(&format!(
            "ignoring {} as a child of {} (circular issuance)",
            pool.get(next).location(),
            pool.get(node).location()
        ));
        pool.unlink(node, next);
        return;
    }

    // 3. Every node has exactly one parent and one child: a pure cycle.
    // Cut the edge that closes it.
    let first = cycle[0];
    let last = cycle[cycle.len() - 1];
    sink.warning(&format!(
        "ignoring {} as a child of {} (circular issuance)",
        pool.get(first).location(),
        pool.get(last).location()
    ));
    pool.unlink(last, first);
}

/// Render a cycle as `a -> b -> c -> a` for diagnostics.
fn cycle_to_string(pool: &CertificatePool, cycle: &[CertId]) -> String {
    let mut result = String::new();
    for &id in cycle {
        if !result.is_empty() {
            result.push_str(" -> ");
        }
        result.push_str(&pool.get(id).location());
    }
    if let Some(&first) = cycle.first() {
        result.push_str(" -> ");
        result.push_str(&pool.get(first).location());
    }
    result
}

/// Compute the issuance hierarchy of the pool in place.
///
/// Prunes byte-identical duplicates, draws parent/child links, then breaks
/// circular issuance claims until no cycle is reachable from any record.
/// Every record is used as a search origin because removing an edge can
/// expose or hide cycles reachable from elsewhere. On return the children
/// graph is acyclic (though not necessarily a tree: a record may keep
/// several parents).
///
/// Terminates always: each detected cycle removes one edge from a finite
/// edge set.
pub fn compute_hierarchy(
    pool: &mut CertificatePool,
    verifier: &dyn SignatureVerifier,
    sink: &mut dyn DiagnosticSink,
) {
    sink.info(&format!(
        "computing hierarchy of {} certificate(s)",
        pool.len()
    ));

    prune_duplicates(pool, sink);
    build_links(pool, verifier, sink);

    let ids: Vec<CertId> = pool.ids().collect();
    for start in ids {
        while let Some(cycle) = find_cycle(pool, start) {
            sink.info(&format!("found cycle: {}", cycle_to_string(pool, &cycle)));
            break_cycle(pool, &cycle, sink);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::diag::{MemorySink, NullSink};
    use crate::fields::DistinguishedName;
    use crate::record::Provenance;

    struct AcceptAll;

    impl SignatureVerifier for AcceptAll {
        fn is_issuer_signature_valid(
            &self,
            _issuer: &CertificateRecord,
            _child: &CertificateRecord,
        ) -> bool {
            true
        }
    }

    struct RejectAll;

    impl SignatureVerifier for RejectAll {
        fn is_issuer_signature_valid(
            &self,
            _issuer: &CertificateRecord,
            _child: &CertificateRecord,
        ) -> bool {
            false
        }
    }

    fn dn(cn: &str) -> DistinguishedName {
        DistinguishedName {
            components: vec![("CN".to_string(), cn.to_string())],
        }
    }

    fn cert(origin: &str, subject: &str, issuer: &str) -> CertificateRecord {
        CertificateRecord::new(
            Provenance::new(origin, None),
            dn(subject),
            dn(issuer),
            Vec::new(),
            format!("der:{}", origin).into_bytes(),
        )
    }

    /// Pool with edges drawn directly, bypassing the issuer predicate.
    fn linked_pool(n: usize, edges: &[(usize, usize)]) -> CertificatePool {
        let records = (0..n)
            .map(|i| cert(&format!("c{}", i), &format!("s{}", i), "unused"))
            .collect();
        let mut pool = CertificatePool::from_records(records);
        for &(parent, child) in edges {
            pool.link(CertId(parent), CertId(child));
        }
        pool
    }

    #[test]
    fn find_cycle_none_on_chain() {
        let pool = linked_pool(3, &[(0, 1), (1, 2)]);
        for id in pool.ids() {
            assert_eq!(find_cycle(&pool, id), None);
        }
    }

    #[test]
    fn find_cycle_detects_two_cycle() {
        let pool = linked_pool(2, &[(0, 1), (1, 0)]);
        assert_eq!(find_cycle(&pool, CertId(0)), Some(vec![CertId(0), CertId(1)]));
        assert_eq!(find_cycle(&pool, CertId(1)), Some(vec![CertId(1), CertId(0)]));
    }

    #[test]
    fn find_cycle_returns_subpath_not_prefix() {
        // 0 -> 1 -> 2 -> 1: the cycle is [1, 2], node 0 is only the way in.
        let pool = linked_pool(3, &[(0, 1), (1, 2), (2, 1)]);
        assert_eq!(find_cycle(&pool, CertId(0)), Some(vec![CertId(1), CertId(2)]));
    }

    #[test]
    fn find_cycle_tolerates_diamond() {
        // Two certificates with the same subject both issue node 3. The
        // path-based search must not mistake re-reaching node 3 for a cycle.
        let pool = linked_pool(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
        for id in pool.ids() {
            assert_eq!(find_cycle(&pool, id), None);
        }
    }

    #[test]
    fn find_cycle_survives_long_chain() {
        let edges: Vec<(usize, usize)> = (0..4999).map(|i| (i, i + 1)).collect();
        let pool = linked_pool(5000, &edges);
        assert_eq!(find_cycle(&pool, CertId(0)), None);
    }

    #[test]
    fn break_cycle_removes_exactly_one_edge() {
        let mut pool = linked_pool(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        let cycle = find_cycle(&pool, CertId(0)).unwrap();
        assert_eq!(cycle.len(), 4);
        let before = pool.edge_count();
        break_cycle(&mut pool, &cycle, &mut NullSink);
        assert_eq!(pool.edge_count(), before - 1);
        // Pure cycle: rule 3 cuts last -> first.
        assert!(!pool.get(CertId(3)).children().contains(CertId(0)));
    }

    #[test]
    #[should_panic(expected = "at least two")]
    fn break_cycle_rejects_single_node() {
        let mut pool = linked_pool(2, &[(0, 1), (1, 0)]);
        break_cycle(&mut pool, &[CertId(0)], &mut NullSink);
    }

    #[test]
    fn issuer_predicate_requires_name_match() {
        let a = cert("a", "Root", "Root");
        let b = cert("b", "Leaf", "Other");
        assert!(!is_issuer(&a, &b, &AcceptAll, &mut NullSink));
    }

    #[test]
    fn issuer_predicate_requires_signature() {
        let a = cert("a", "Root", "Root");
        let b = cert("b", "Leaf", "Root");
        let mut sink = MemorySink::new();
        assert!(!is_issuer(&a, &b, &RejectAll, &mut sink));
        assert!(is_issuer(&a, &b, &AcceptAll, &mut sink));
        // The signature failure was reported, the name mismatch path is silent.
        assert_eq!(sink.messages_at(crate::Severity::Error).count(), 1);
    }

    #[test]
    fn issuer_predicate_is_pure() {
        let a = cert("a", "Root", "Root");
        let b = cert("b", "Leaf", "Root");
        let first = is_issuer(&a, &b, &AcceptAll, &mut NullSink);
        let second = is_issuer(&a, &b, &AcceptAll, &mut NullSink);
        assert_eq!(first, second);
    }

    #[test]
    fn self_signed_uses_the_same_predicate() {
        let root = cert("root", "Root", "Root");
        let leaf = cert("leaf", "Leaf", "Root");
        assert!(is_self_signed(&root, &AcceptAll, &mut NullSink));
        assert!(!is_self_signed(&leaf, &AcceptAll, &mut NullSink));
        assert!(!is_self_signed(&root, &RejectAll, &mut NullSink));
    }

    #[test]
    fn build_links_is_idempotent() {
        let mut pool = CertificatePool::from_records(vec![
            cert("root", "Root", "Root"),
            cert("leaf", "Leaf", "Root"),
        ]);
        build_links(&mut pool, &AcceptAll, &mut NullSink);
        assert_eq!(pool.edge_count(), 1);
        build_links(&mut pool, &AcceptAll, &mut NullSink);
        assert_eq!(pool.edge_count(), 1);
    }
}
