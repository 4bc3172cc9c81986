//! Alias fixpoint propagation
//!
//! Two phases over the facts gathered during statement extraction:
//! a direct pass in document order (`p = &x`, `p = q`, `p = *q`), then an
//! iterated transitivity pass (`p→a`, `a→b` ⇒ `p→b`) bounded by a hard cap.
//! The cap is a termination guarantee; on exhaustion the still-changing
//! classes are widened into one merged equivalence class instead of being
//! silently truncated.

use crate::features::aliasing::domain::{AliasStats, AliasTable};
use crate::features::statements::domain::{AliasFactKind, StatementTable};
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

pub const DEFAULT_MAX_ITERATIONS: usize = 10;

pub struct AliasPropagator {
    max_iterations: usize,
}

impl Default for AliasPropagator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITERATIONS)
    }
}

impl AliasPropagator {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    /// Build the may-alias table and annotate the statements that
    /// established each direct edge.
    pub fn propagate(&self, table: &mut StatementTable) -> (AliasTable, AliasStats) {
        let mut aliases = AliasTable::default();
        let mut stats = AliasStats::default();

        // Phase 1: direct edges, in document order. `p = q` only inherits
        // when q already has aliases at this point.
        let facts = std::mem::take(&mut table.alias_facts);
        for fact in &facts {
            match fact.kind {
                AliasFactKind::AddressOf => {
                    aliases
                        .entry(fact.lhs.clone())
                        .or_default()
                        .insert(fact.rhs.clone());
                    stats.direct_edges += 1;
                    let established: FxHashSet<String> =
                        std::iter::once(fact.rhs.clone()).collect();
                    for line in fact.span.lines() {
                        if let Some(stmt) = table.get_mut(line) {
                            stmt.may_alias
                                .insert(fact.lhs.clone(), established.clone());
                        }
                    }
                }
                AliasFactKind::Copy => {
                    let Some(inherited) = aliases.get(&fact.rhs).cloned() else {
                        continue;
                    };
                    if inherited.is_empty() {
                        continue;
                    }
                    aliases
                        .entry(fact.lhs.clone())
                        .or_default()
                        .extend(inherited.iter().cloned());
                    stats.direct_edges += 1;
                    for line in fact.span.lines() {
                        if let Some(stmt) = table.get_mut(line) {
                            stmt.may_alias.insert(fact.lhs.clone(), inherited.clone());
                        }
                    }
                }
                AliasFactKind::LoadDeref => {
                    let Some(inherited) = aliases.get(&fact.rhs).cloned() else {
                        continue;
                    };
                    if inherited.is_empty() {
                        continue;
                    }
                    aliases
                        .entry(fact.lhs.clone())
                        .or_default()
                        .extend(inherited);
                    stats.direct_edges += 1;
                }
            }
        }
        table.alias_facts = facts;

        // Phase 2: transitivity to a fixpoint, capped
        let mut changed_last: FxHashSet<String> = FxHashSet::default();
        let mut converged = false;
        while stats.iterations < self.max_iterations {
            stats.iterations += 1;
            changed_last.clear();

            let snapshot = aliases.clone();
            for (ptr, alias_set) in &snapshot {
                for alias in alias_set {
                    let Some(next) = snapshot.get(alias) else {
                        continue;
                    };
                    let current = aliases.entry(ptr.clone()).or_default();
                    let before = current.len();
                    current.extend(next.iter().cloned());
                    if current.len() > before {
                        changed_last.insert(ptr.clone());
                    }
                }
            }

            if changed_last.is_empty() {
                converged = true;
                break;
            }
        }

        if !converged && !changed_last.is_empty() {
            self.widen(&mut aliases, &changed_last);
            stats.widened = true;
            warn!(
                "alias propagation hit the {}-iteration cap; widened {} unresolved classes",
                self.max_iterations,
                changed_last.len()
            );
        }

        debug!(
            "alias propagation: {} pointers, {} direct edges, {} iterations",
            aliases.len(),
            stats.direct_edges,
            stats.iterations
        );
        (aliases, stats)
    }

    /// Merge every still-changing class (the names plus everything they may
    /// point to) into one equivalence class.
    fn widen(&self, aliases: &mut AliasTable, unresolved: &FxHashSet<String>) {
        let mut merged: FxHashSet<String> = FxHashSet::default();
        for name in unresolved {
            merged.insert(name.clone());
            if let Some(set) = aliases.get(name) {
                merged.extend(set.iter().cloned());
            }
        }
        for name in unresolved {
            aliases.insert(name.clone(), merged.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::indexing::ProgramIndexer;
    use crate::features::parsing::{Dialect, TranslationUnitParser};
    use crate::features::statements::StatementExtractor;

    fn propagate(code: &str, max_iterations: usize) -> (AliasTable, AliasStats, StatementTable) {
        let mut parser = TranslationUnitParser::new();
        let unit = parser
            .parse_source("test.c", Dialect::C, code.to_string())
            .unwrap();
        let index = ProgramIndexer::build(&unit);
        let mut table = StatementExtractor::extract(&unit, &index);
        let (aliases, stats) = AliasPropagator::new(max_iterations).propagate(&mut table);
        (aliases, stats, table)
    }

    #[test]
    fn test_address_of_edge() {
        let (aliases, _, table) =
            propagate("void f(int x) {\nint *p;\np = &x;\n}", DEFAULT_MAX_ITERATIONS);
        assert!(aliases.get("p").unwrap().contains("x"));
        let stmt = table.get(3).unwrap();
        assert!(stmt.may_alias.get("p").unwrap().contains("x"));
    }

    #[test]
    fn test_copy_inherits_existing_aliases_only() {
        let code = "void f(int x) {\nint *p = &x;\nint *q;\nint *r;\nq = p;\nr = s;\n}";
        let (aliases, _, _) = propagate(code, DEFAULT_MAX_ITERATIONS);
        assert!(aliases.get("q").unwrap().contains("x"));
        // s never aliased anything, so r inherits nothing
        assert!(!aliases.contains_key("r"));
    }

    #[test]
    fn test_transitive_closure() {
        // p aliases a; a (as a name) aliases b through its own edge
        let code = "void f(int b) {\nint *a;\na = &b;\nint **p;\np = &a;\n}";
        let (aliases, stats, _) = propagate(code, DEFAULT_MAX_ITERATIONS);
        // direct edges: a→b, p→a; transitivity adds p→b
        assert!(aliases.get("p").unwrap().contains("a"));
        assert!(aliases.get("p").unwrap().contains("b"));
        assert!(!stats.widened);
    }

    #[test]
    fn test_cap_widens_instead_of_truncating() {
        let code = "void f(int b) {\nint *a;\na = &b;\nint **p;\np = &a;\n}";
        // one iteration is not enough for this chain to converge: the pass
        // that adds p→b reports a change, and no verifying pass remains
        let (aliases, stats, _) = propagate(code, 1);
        assert!(stats.widened);
        assert_eq!(stats.iterations, 1);
        let merged = aliases.get("p").unwrap();
        assert!(merged.contains("a"));
        assert!(merged.contains("b"));
    }

    #[test]
    fn test_deref_load_inherits_pointee_aliases() {
        let code = "void f(int x) {\nint *q;\nq = &x;\nint *p;\np = *q;\n}";
        let (aliases, _, _) = propagate(code, DEFAULT_MAX_ITERATIONS);
        assert!(aliases.get("p").unwrap().contains("x"));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::features::statements::domain::{AliasFact, AliasFactKind, StatementTable};
    use crate::shared::models::Span;
    use proptest::prelude::*;

    fn names() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["a", "b", "c", "d", "e", "f"]).prop_map(str::to_string)
    }

    proptest! {
        /// After propagation, if p may alias a and a may alias b, then p may
        /// alias b (small inputs always converge under the default cap).
        #[test]
        fn alias_table_is_transitively_closed(
            edges in prop::collection::vec((names(), names()), 1..12)
        ) {
            let mut table = StatementTable::default();
            for (i, (lhs, rhs)) in edges.iter().enumerate() {
                table.alias_facts.push(AliasFact {
                    span: Span::new(i as u32 + 1, i as u32 + 1),
                    kind: AliasFactKind::AddressOf,
                    lhs: lhs.clone(),
                    rhs: rhs.clone(),
                });
            }
            let (aliases, stats) = AliasPropagator::default().propagate(&mut table);
            prop_assert!(!stats.widened);
            for (p, alias_set) in &aliases {
                for a in alias_set {
                    if let Some(next) = aliases.get(a) {
                        for b in next {
                            prop_assert!(
                                aliases.get(p).unwrap().contains(b),
                                "{p} -> {a} -> {b} not closed"
                            );
                        }
                    }
                }
            }
        }
    }
}
