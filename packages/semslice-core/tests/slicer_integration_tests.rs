//! End-to-end slicing tests over in-memory and on-disk fixtures

use semslice_core::{
    slice_file, slice_finding, slice_findings, Dialect, FileAnalysis, Finding, SliceConfig,
    REASON_FILE_NOT_FOUND,
};
use std::collections::BTreeSet;
use std::fs;

fn analyze(code: &str) -> FileAnalysis {
    FileAnalysis::analyze_source("test.c", Dialect::C, code.to_string(), &SliceConfig::default())
        .unwrap()
}

const DATAFLOW_EXAMPLE: &str = "int g = 0;\nvoid f(int x) {\nint y = x + 1;\ng = y;\nprintf(\"%d\", g);\n}";

#[test]
fn backward_chain_through_local_and_global() {
    let analysis = analyze(DATAFLOW_EXAMPLE);
    let result = analysis.slice(5);

    assert_eq!(result.target_line, 5);
    assert!(result.anchors.contains("g"));
    assert_eq!(result.slice_lines, BTreeSet::from([3, 4, 5]));
    // the global's declaration line stays out: dataflow follows assigning
    // statements, not declarations
    assert!(!result.slice_lines.contains(&1));
    assert_eq!(result.function_map.get(&3).map(String::as_str), Some("f"));
    assert_eq!(result.function_map.get(&5).map(String::as_str), Some("f"));
}

#[test]
fn slice_always_contains_target_line() {
    let analysis = analyze(DATAFLOW_EXAMPLE);
    for line in 1..=6 {
        let result = analysis.slice(line);
        assert!(
            result.slice_lines.contains(&line),
            "line {line} missing from its own slice"
        );
    }
}

#[test]
fn unanchorable_line_degenerates_to_sentinel() {
    let analysis = analyze("void f(void) {\nint x = 1;\n}\n\n\n");
    let result = analysis.slice(5);
    assert_eq!(result.anchors, BTreeSet::from(["__dummy__".to_string()]));
    assert_eq!(result.slice_lines, BTreeSet::from([5]));
}

#[test]
fn same_named_locals_never_cross_functions() {
    let code = r#"
void first(void) {
    int i = 1;
    consume(i);
}
void second(void) {
    int i = 2;
    consume(i);
}
"#;
    let analysis = analyze(code);
    let result = analysis.slice(8);
    for line in [3, 4] {
        assert!(
            !result.slice_lines.contains(&line),
            "line {line} from `first` leaked into a slice of `second`"
        );
    }
}

#[test]
fn multi_function_slice_spans_caller_and_callee() {
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
    assert!(result.slice_lines.contains(&7));
    assert!(result.slice_lines.contains(&8));
    assert_eq!(result.function_map.get(&7).map(String::as_str), Some("add"));
    assert_eq!(result.function_map.get(&4).map(String::as_str), Some("run"));
    assert!(result.functions().len() >= 2);
}

#[test]
fn serialized_result_matches_downstream_schema() {
    let analysis = analyze(DATAFLOW_EXAMPLE);
    let result = analysis.slice(5);
    let json = serde_json::to_value(&result).unwrap();

    assert!(json["anchors"].is_array());
    assert_eq!(json["slice_lines"], serde_json::json!([3, 4, 5]));
    assert_eq!(json["function_map"]["4"], "f");
    assert_eq!(json["target_file"], "test.c");
}

#[test]
fn cpp_dialect_is_parsed() {
    let code = "namespace util {\nint scale(int v) {\nint doubled = v * 2;\nreturn doubled;\n}\n}";
    let analysis =
        FileAnalysis::analyze_source("u.cpp", Dialect::Cpp, code.to_string(), &SliceConfig::default())
            .unwrap();
    let result = analysis.slice(4);
    assert!(result.slice_lines.contains(&3));
}

#[test]
fn slice_file_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.c");
    fs::write(&path, DATAFLOW_EXAMPLE).unwrap();

    let result = slice_file(&path, 5, &SliceConfig::default()).unwrap();
    assert_eq!(result.slice_lines, BTreeSet::from([3, 4, 5]));
}

#[test]
fn finding_records_report_missing_files_in_band() {
    let dir = tempfile::tempdir().unwrap();
    let finding = Finding::new("proj-1.0", "src/missing.c", 10);
    let record = slice_finding(dir.path(), &finding, &SliceConfig::default());

    assert!(record.result.is_none());
    assert_eq!(record.error.as_deref(), Some(REASON_FILE_NOT_FOUND));
    assert_eq!(record.line, 10);
}

#[test]
fn batch_slicing_is_independent_per_query() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join("proj-1.0").join("src");
    fs::create_dir_all(&project).unwrap();
    fs::write(project.join("a.c"), DATAFLOW_EXAMPLE).unwrap();

    let findings = vec![
        Finding::new("proj-1.0", "src/a.c", 5),
        Finding::new("proj-1.0", "src/a.c", 4),
        Finding::new("proj-1.0", "src/missing.c", 1),
    ];
    let records = slice_findings(dir.path(), &findings, &SliceConfig::default());

    assert_eq!(records.len(), 3);
    assert!(records[0].result.is_some());
    assert!(records[1].result.is_some());
    assert_eq!(records[2].error.as_deref(), Some(REASON_FILE_NOT_FOUND));
}
