//! Slice → reconstruct end-to-end tests

use semslice_core::{reconstruct, Dialect, FileAnalysis, SliceConfig};

fn analyze(code: &str) -> FileAnalysis {
    FileAnalysis::analyze_source("test.c", Dialect::C, code.to_string(), &SliceConfig::default())
        .unwrap()
}

const DATAFLOW_EXAMPLE: &str = "int g = 0;\nvoid f(int x) {\nint y = x + 1;\ng = y;\nprintf(\"%d\", g);\n}";

#[test]
fn sliced_function_reconstructs_with_recovered_header() {
    let analysis = analyze(DATAFLOW_EXAMPLE);
    let result = analysis.slice(5);
    let output = analysis.reconstruct(&result);

    assert!(output.contains("void f(int x)"));
    assert!(output.contains("int y = x + 1;  // Line 3"));
    assert!(output.contains("g = y;  // Line 4"));
    assert!(output.contains("printf(\"%d\", g);  // Line 5"));

    // contiguous lines: no elision marker, and a closing brace at the end
    assert!(!output.contains("/* ... */"));
    assert!(output.trim_end().ends_with('}'));
}

#[test]
fn reconstruction_is_balanced_per_function() {
    let analysis = analyze(DATAFLOW_EXAMPLE);
    let result = analysis.slice(5);
    let output = analysis.reconstruct(&result);

    let opens = output.matches('{').count();
    let closes = output.matches('}').count();
    assert_eq!(opens, closes);
}

#[test]
fn sparse_slice_gets_gap_markers() {
    let code = r#"
void f(int n) {
    int a = n;
    unrelated();
    other();
    printf("%d", a);
}
"#;
    let analysis = analyze(code);
    let result = analysis.slice(6);
    let output = analysis.reconstruct(&result);

    assert!(result.slice_lines.contains(&3));
    assert!(!result.slice_lines.contains(&4));
    assert!(output.contains("/* ... */"));
}

#[test]
fn multi_function_slice_emits_each_involved_function_once() {
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
    let analysis = analyze(code);
    let result = analysis.slice(4);
    let output = analysis.reconstruct(&result);

    assert_eq!(output.matches("int add(int x)").count(), 1);
    assert_eq!(output.matches("void run(void)").count(), 1);
    assert!(output.contains("total = total + x;  // Line 7"));
}

#[test]
fn reconstruction_works_standalone_from_serialized_result() {
    // the reconstructor is an independent downstream stage: only the raw
    // source text and the slice result cross the boundary
    let analysis = analyze(DATAFLOW_EXAMPLE);
    let result = analysis.slice(5);
    let json = serde_json::to_string(&result).unwrap();

    let revived: semslice_core::SliceResult = serde_json::from_str(&json).unwrap();
    let output = reconstruct(DATAFLOW_EXAMPLE, &revived.slice_lines, &revived.function_map);
    assert!(output.contains("void f(int x)"));
    assert!(output.contains("// Line 4"));
}

#[test]
fn global_lines_in_slice_are_lifted_conservatively() {
    let code = "int limit = 8;\nvoid f(void) {\nint v = limit;\nprintf(\"%d\", v);\n}";
    let analysis = analyze(code);
    let mut result = analysis.slice(4);
    // force the global's line into the slice the way a caller merging
    // neighboring context would
    result.slice_lines.insert(1);
    let output = analysis.reconstruct(&result);

    assert!(output.contains("int limit;  /* initializer removed */"));
    assert!(!output.contains("int limit = 8;"));
}
