//! Bidirectional worklist slicer
//!
//! Two independent passes over the statement table, unioned at the end.
//! Both passes share one scope-crossing rule (`ProgramIndex::
//! crosses_into_scope`): dataflow crosses a function boundary only through a
//! global shadowed in neither endpoint function. The backward pass chases
//! definitions of relevant variables (resolving pointer uses through the
//! alias table) and pulls in governing conditions; the forward pass chases
//! uses of variables defined so far and statements governed by included
//! lines. Interprocedural mode extends the backward pass through callee
//! effect summaries, each callee expanded at most once.

use crate::features::aliasing::AliasTable;
use crate::features::indexing::ProgramIndex;
use crate::features::slicing::domain::SliceConfig;
use crate::features::statements::domain::{StatementKind, StatementTable};
use rustc_hash::FxHashSet;
use std::collections::BTreeSet;
use tracing::debug;

pub struct SlicingEngine<'a> {
    index: &'a ProgramIndex,
    statements: &'a StatementTable,
    aliases: &'a AliasTable,
    config: &'a SliceConfig,
}

impl<'a> SlicingEngine<'a> {
    pub fn new(
        index: &'a ProgramIndex,
        statements: &'a StatementTable,
        aliases: &'a AliasTable,
        config: &'a SliceConfig,
    ) -> Self {
        Self {
            index,
            statements,
            aliases,
            config,
        }
    }

    /// Union of the backward and forward passes; always contains the target
    pub fn slice(&self, target_line: u32, anchors: &BTreeSet<String>) -> BTreeSet<u32> {
        let mut slice_lines = BTreeSet::from([target_line]);
        self.backward_pass(target_line, anchors, &mut slice_lines);
        self.forward_pass(target_line, anchors, &mut slice_lines);
        debug!(
            "slice at line {target_line}: {} lines",
            slice_lines.len()
        );
        slice_lines
    }

    fn backward_pass(
        &self,
        target_line: u32,
        anchors: &BTreeSet<String>,
        slice_lines: &mut BTreeSet<u32>,
    ) {
        let mut worklist: Vec<u32> = vec![target_line];
        let mut visited: FxHashSet<u32> = FxHashSet::default();
        let mut relevant: FxHashSet<String> = anchors.iter().cloned().collect();
        let mut analyzed_callees: FxHashSet<String> = FxHashSet::default();

        while let Some(line) = worklist.pop() {
            if !visited.insert(line) {
                continue;
            }
            let Some(stmt) = self.statements.get(line) else {
                continue;
            };
            let current_fn = stmt.function.as_deref();

            // Relevant variables read here, with pointer uses resolved
            // through the alias table, plus array and field bases
            let mut tracked: FxHashSet<String> = FxHashSet::default();
            for var in &stmt.uses {
                if relevant.contains(var) {
                    tracked.insert(var.clone());
                }
            }
            for ptr in &stmt.pointer_uses {
                if relevant.contains(ptr) {
                    tracked.insert(ptr.clone());
                    if let Some(aliased) = self.aliases.get(ptr) {
                        tracked.extend(aliased.iter().cloned());
                    }
                }
            }
            for base in &stmt.array_accesses {
                if relevant.contains(base) {
                    tracked.insert(base.clone());
                }
            }
            for base in stmt.field_accesses.keys() {
                if relevant.contains(base) {
                    tracked.insert(base.clone());
                }
            }

            for var in &tracked {
                for (other_line, other) in self.statements.iter() {
                    if other_line >= line || slice_lines.contains(&other_line) {
                        continue;
                    }

                    // direct definition
                    if other.defs.contains(var)
                        && self
                            .index
                            .crosses_into_scope(var, current_fn, other.function.as_deref())
                    {
                        slice_lines.insert(other_line);
                        worklist.push(other_line);
                        relevant.extend(other.uses.iter().cloned());
                        if let Some(established) = other.may_alias.get(var) {
                            relevant.extend(established.iter().cloned());
                        }
                        continue;
                    }

                    // store through a pointer whose alias set covers var
                    if other.function == stmt.function {
                        let through = other.pointer_defs.iter().find(|ptr| {
                            self.aliases
                                .get(*ptr)
                                .is_some_and(|aliased| aliased.contains(var))
                        });
                        if let Some(ptr) = through {
                            slice_lines.insert(other_line);
                            worklist.push(other_line);
                            relevant.insert(ptr.clone());
                            continue;
                        }

                        // modification through a call argument
                        if other.modified_by_call.contains(var) {
                            slice_lines.insert(other_line);
                            worklist.push(other_line);
                        }
                    }
                }
            }

            if self.config.interprocedural && self.config.max_call_depth > 0 && current_fn.is_some()
            {
                self.expand_callees(
                    stmt,
                    &relevant,
                    &mut analyzed_callees,
                    slice_lines,
                    &mut worklist,
                );
            }

            // governing conditions, same function, earlier in the file
            for &dep_line in &stmt.control_deps {
                if dep_line >= line || slice_lines.contains(&dep_line) {
                    continue;
                }
                if let Some(dep_stmt) = self.statements.get(dep_line) {
                    if dep_stmt.function == stmt.function {
                        slice_lines.insert(dep_line);
                        worklist.push(dep_line);
                        relevant.extend(dep_stmt.uses.iter().cloned());
                    }
                }
            }
        }
    }

    /// Pull callee-side lines into the slice when a called function's
    /// summary touches the relevant set. Recursive callees are skipped;
    /// each callee is expanded at most once per slice.
    fn expand_callees(
        &self,
        stmt: &crate::features::statements::domain::Statement,
        relevant: &FxHashSet<String>,
        analyzed_callees: &mut FxHashSet<String>,
        slice_lines: &mut BTreeSet<u32>,
        worklist: &mut Vec<u32>,
    ) {
        for callee in &stmt.called_functions {
            if analyzed_callees.contains(callee) {
                continue;
            }
            let Some(info) = self.index.functions.get(callee) else {
                continue;
            };
            if info.is_recursive {
                continue;
            }

            let modified_relevant: Vec<&String> = info
                .modifies_globals
                .iter()
                .filter(|global| relevant.contains(*global))
                .collect();
            if !modified_relevant.is_empty() {
                for (other_line, other) in self.statements.iter() {
                    if other.function.as_deref() != Some(callee.as_str()) {
                        continue;
                    }
                    if modified_relevant.iter().any(|var| other.defs.contains(*var))
                        && !slice_lines.contains(&other_line)
                    {
                        slice_lines.insert(other_line);
                        worklist.push(other_line);
                    }
                }
                analyzed_callees.insert(callee.clone());
            }

            if info.return_vars.iter().any(|var| relevant.contains(var)) {
                for (other_line, other) in self.statements.iter() {
                    if other.function.as_deref() == Some(callee.as_str())
                        && other.kind == StatementKind::Return
                        && !slice_lines.contains(&other_line)
                    {
                        slice_lines.insert(other_line);
                        worklist.push(other_line);
                    }
                }
            }
        }
    }

    fn forward_pass(
        &self,
        target_line: u32,
        anchors: &BTreeSet<String>,
        slice_lines: &mut BTreeSet<u32>,
    ) {
        let mut worklist: Vec<u32> = vec![target_line];
        let mut visited: FxHashSet<u32> = FxHashSet::default();
        let mut forward_vars: FxHashSet<String> = anchors.iter().cloned().collect();
        if let Some(stmt) = self.statements.get(target_line) {
            forward_vars.extend(stmt.defs.iter().cloned());
        }

        while let Some(line) = worklist.pop() {
            if !visited.insert(line) {
                continue;
            }
            let Some(stmt) = self.statements.get(line) else {
                continue;
            };
            let current_fn = stmt.function.as_deref();

            forward_vars.extend(stmt.defs.iter().cloned());
            for ptr in &stmt.pointer_defs {
                forward_vars.insert(ptr.clone());
                if let Some(aliased) = self.aliases.get(ptr) {
                    forward_vars.extend(aliased.iter().cloned());
                }
            }
            forward_vars.extend(stmt.modified_by_call.iter().cloned());

            for (other_line, other) in self.statements.iter() {
                if other_line <= line || slice_lines.contains(&other_line) {
                    continue;
                }

                let mut hit = other.uses.iter().any(|var| {
                    forward_vars.contains(var)
                        && self
                            .index
                            .crosses_into_scope(var, current_fn, other.function.as_deref())
                });

                // pointer, array and field uses stay within the function
                if !hit && other.function == stmt.function {
                    hit = other
                        .pointer_uses
                        .iter()
                        .any(|ptr| forward_vars.contains(ptr))
                        || other
                            .array_accesses
                            .iter()
                            .any(|base| forward_vars.contains(base))
                        || other
                            .field_accesses
                            .keys()
                            .any(|base| forward_vars.contains(base));
                }

                if hit {
                    slice_lines.insert(other_line);
                    worklist.push(other_line);
                }
            }

            // statements governed by this line, same function
            for (other_line, other) in self.statements.iter() {
                if other.control_deps.contains(&line)
                    && !slice_lines.contains(&other_line)
                    && other.function == stmt.function
                {
                    slice_lines.insert(other_line);
                    worklist.push(other_line);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::aliasing::AliasPropagator;
    use crate::features::indexing::ProgramIndexer;
    use crate::features::parsing::{Dialect, TranslationUnitParser};
    use crate::features::slicing::infrastructure::AnchorExtractor;
    use crate::features::statements::{ControlDependencyBuilder, StatementExtractor};

    fn slice_at(code: &str, line: u32, config: &SliceConfig) -> BTreeSet<u32> {
        let mut parser = TranslationUnitParser::new();
        let unit = parser
            .parse_source("test.c", Dialect::C, code.to_string())
            .unwrap();
        let index = ProgramIndexer::build(&unit);
        let mut table = StatementExtractor::extract(&unit, &index);
        ControlDependencyBuilder::build(&unit, &mut table);
        let (aliases, _) =
            AliasPropagator::new(config.alias_max_iterations).propagate(&mut table);
        let anchors = AnchorExtractor::extract(&unit, line);
        SlicingEngine::new(&index, &table, &aliases, config).slice(line, &anchors)
    }

    #[test]
    fn test_target_line_always_included() {
        let code = "void f(void) {\nint x = 1;\n}";
        let slice = slice_at(code, 2, &SliceConfig::default());
        assert!(slice.contains(&2));
    }

    #[test]
    fn test_backward_dataflow_chain() {
        let code = "int g = 0;\nvoid f(int x) {\nint y = x + 1;\ng = y;\nprintf(\"%d\", g);\n}";
        let slice = slice_at(code, 5, &SliceConfig::default());
        // y feeds g, x feeds y and stops at the parameter; the global's
        // declaration line never joins through dataflow
        assert_eq!(slice, BTreeSet::from([3, 4, 5]));
    }

    #[test]
    fn test_control_dependencies_join_backward() {
        let code = r#"
void f(int n) {
    int total = 0;
    if (n > 0) {
        total = n;
    }
    printf("%d", total);
}
"#;
        let slice = slice_at(code, 7, &SliceConfig::default());
        assert!(slice.contains(&5));
        assert!(slice.contains(&4));
        assert!(slice.contains(&3));
    }

    #[test]
    fn test_scope_soundness_same_named_locals() {
        let code = r#"
void first(void) {
    int i = 1;
    use(i);
}
void second(void) {
    int i = 2;
    use(i);
}
"#;
        let slice = slice_at(code, 8, &SliceConfig::default());
        // nothing from `first` may leak in through the unrelated local i
        assert!(!slice.contains(&3));
        assert!(!slice.contains(&4));
    }

    #[test]
    fn test_global_crosses_when_unshadowed() {
        let code = r#"
int shared = 0;
void writer(void) {
    shared = 42;
}
void reader(void) {
    printf("%d", shared);
}
"#;
        let slice = slice_at(code, 7, &SliceConfig::default());
        assert!(slice.contains(&4));
    }

    #[test]
    fn test_shadowed_global_does_not_cross() {
        let code = r#"
int shared = 0;
void writer(void) {
    int shared = 1;
    shared = 42;
}
void reader(void) {
    printf("%d", shared);
}
"#;
        let slice = slice_at(code, 8, &SliceConfig::default());
        assert!(!slice.contains(&5));
    }

    #[test]
    fn test_forward_propagation() {
        let code = r#"
void f(int x) {
    int y = x + 1;
    int z = y * 2;
    printf("%d", z);
}
"#;
        let slice = slice_at(code, 3, &SliceConfig::default());
        assert!(slice.contains(&4));
        assert!(slice.contains(&5));
    }

    #[test]
    fn test_alias_aware_backward() {
        let code = r#"
void f(int x) {
    int v = 0;
    int *p = &v;
    *p = x;
    printf("%d", v);
}
"#;
        let slice = slice_at(code, 6, &SliceConfig::default());
        // the store through p defines v's storage
        assert!(slice.contains(&5));
    }

    #[test]
    fn test_interprocedural_callee_expansion() {
        // add is defined after the caller, so the plain backward search
        // (earlier lines only) cannot reach its write to the global
        let code = r#"
int total = 0;
void run(void) {
    printf("%d", add(3), total);
}
int add(int x) {
    total = total + x;
    return total;
}
"#;
        let interprocedural = slice_at(code, 4, &SliceConfig::default());
        // callee write to the relevant global, and its return statement
        assert!(interprocedural.contains(&7));
        assert!(interprocedural.contains(&8));

        let intraprocedural = slice_at(code, 4, &SliceConfig::intraprocedural());
        assert!(!intraprocedural.contains(&7));
    }

    #[test]
    fn test_recursive_callee_not_expanded() {
        let code = r#"
int depth = 0;
void probe(void) {
    spin(depth);
}
void spin(int n) {
    depth = n;
    if (n > 0) spin(n - 1);
}
"#;
        let slice = slice_at(code, 4, &SliceConfig::default());
        // spin reaches itself through the call graph, so its body is never
        // pulled in through the effect summary
        assert!(!slice.contains(&7));
        assert_eq!(slice, BTreeSet::from([4]));
    }

    #[test]
    fn test_line_without_statement_degenerates() {
        let code = "void f(void) {\nint x = 1;\n}\n\n";
        let slice = slice_at(code, 4, &SliceConfig::default());
        assert_eq!(slice, BTreeSet::from([4]));
    }
}
