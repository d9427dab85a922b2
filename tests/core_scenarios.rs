//! End-to-end scenarios over the indexing and retrieval core: indexing a
//! project through the service façade, asking questions, and checking the
//! structural guarantees (line coverage, deterministic ordering, budget
//! respect) hold across the whole pipeline.

use pretty_assertions::assert_eq;
use project_qa::index_store::IndexStore;
use project_qa::service::QaService;
use project_qa::types::{Query, SourceFile, UnitKind};

/// A 50-line Python file whose only definition is parseConfig on lines 10-20
fn fifty_line_file() -> SourceFile {
    let mut lines = Vec::new();
    for i in 1..=9 {
        lines.push(format!("# header {}", i));
    }
    lines.push("def parseConfig(path):".to_string());
    for i in 1..=10 {
        lines.push(format!("    value_{} = {}", i, i));
    }
    for i in 21..=50 {
        lines.push(format!("# trailer {}", i));
    }
    SourceFile::new("settings.py", lines.join("\n") + "\n")
}

#[test]
fn scenario_parse_config_is_top_result_with_exact_lines() {
    let service = QaService::with_defaults();
    service.analyze("p", &[fifty_line_file()]).unwrap();

    let payload = service
        .prepare(&Query::new("p", "where is parseConfig defined"), Some(3))
        .unwrap();

    assert!(payload.project_known);
    let top = &payload.citations[0];
    assert_eq!(top.element, "parseConfig");
    assert_eq!(top.kind, UnitKind::Function);
    assert_eq!(top.lines, [10, 20]);
    assert!(payload.context.contains("settings.py:10-20"));
}

#[test]
fn scenario_unsupported_extension_skipped_and_absent() {
    let store = IndexStore::new();
    let files = vec![
        SourceFile::new("model.bin", vec![0u8, 159, 146, 150]),
        SourceFile::new("app.py", "def run():\n    pass\n"),
    ];
    let result = store.build("p", &files).unwrap();

    assert_eq!(result.skipped_files.len(), 1);
    assert_eq!(result.skipped_files[0].file_path, "model.bin");
    assert!(store
        .all_units("p")
        .iter()
        .all(|u| u.file_path != "model.bin"));
}

#[test]
fn scenario_empty_query_is_invalid() {
    let service = QaService::with_defaults();
    service
        .analyze("p", &[SourceFile::new("app.py", "def run():\n    pass\n")])
        .unwrap();

    let err = service.prepare(&Query::new("p", "   "), None).unwrap_err();
    assert!(matches!(err, project_qa::error::QaError::InvalidQuery));
}

#[test]
fn scenario_duplicate_main_ordered_by_file_path() {
    let store = IndexStore::new();
    let files = vec![
        SourceFile::new("worker.py", "def main():\n    return 'worker'\n"),
        SourceFile::new("cli.py", "def main():\n    return 'cli'\n"),
    ];
    store.build("p", &files).unwrap();

    let hits = store.lookup_by_name("p", "main");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].file_path, "cli.py");
    assert_eq!(hits[1].file_path, "worker.py");
}

#[test]
fn property_every_line_covered_exactly_once() {
    let text = "\
import os

def first(a):
    return a

CONSTANT = 1

class Thing:
    def method(self):
        return CONSTANT

tail = first(CONSTANT)
";
    let store = IndexStore::new();
    store
        .build("p", &[SourceFile::new("thing.py", text)])
        .unwrap();

    let units = store.all_units("p");
    let line_count = text.lines().count();

    // Top-level units are those not strictly contained inside another unit
    let mut coverage = vec![0usize; line_count + 1];
    for (i, unit) in units.iter().enumerate() {
        let nested = units.iter().enumerate().any(|(j, outer)| {
            i != j
                && outer.start_line <= unit.start_line
                && outer.end_line >= unit.end_line
                && (outer.start_line, outer.end_line) != (unit.start_line, unit.end_line)
        });
        if nested {
            continue;
        }
        for line in unit.start_line..=unit.end_line {
            coverage[line] += 1;
        }
    }
    for line in 1..=line_count {
        assert_eq!(coverage[line], 1, "line {} coverage", line);
    }
}

#[test]
fn property_build_is_deterministic_regardless_of_arrival_order() {
    let a = SourceFile::new("a.py", "def alpha():\n    return 1\n\nA = 2\n");
    let b = SourceFile::new("b.rs", "fn beta() -> u32 {\n    1\n}\n");
    let c = SourceFile::new("c.js", "function gamma() {\n    return 1;\n}\n");

    let forward = IndexStore::new();
    forward.build("p", &[a.clone(), b.clone(), c.clone()]).unwrap();
    let backward = IndexStore::new();
    backward.build("p", &[c, b, a]).unwrap();

    let fingerprint = |store: &IndexStore| -> Vec<String> {
        store
            .all_units("p")
            .iter()
            .map(|u| format!("{}:{}:{}:{}:{}", u.file_path, u.start_line, u.end_line, u.kind, u.name))
            .collect()
    };
    assert_eq!(fingerprint(&forward), fingerprint(&backward));
}

#[test]
fn property_rebuild_replaces_index_wholesale() {
    let store = IndexStore::new();
    store
        .build("p", &[SourceFile::new("old.py", "def old():\n    pass\n")])
        .unwrap();
    store
        .build("p", &[SourceFile::new("new.py", "def new():\n    pass\n")])
        .unwrap();

    let units = store.all_units("p");
    assert!(
        units.iter().all(|u| u.file_path == "new.py"),
        "no unit from the replaced index may survive"
    );
}

#[test]
fn property_rank_stability_bit_identical() {
    let service = QaService::with_defaults();
    let files = vec![
        SourceFile::new("auth.py", "def check_token(token):\n    return token\n"),
        SourceFile::new("db.py", "def check_connection():\n    return True\n"),
        SourceFile::new("util.py", "def misc():\n    return None\n"),
    ];
    service.analyze("p", &files).unwrap();

    let query = Query::new("p", "how does the token check work");
    let first = serde_json::to_string(&service.prepare(&query, Some(5)).unwrap()).unwrap();
    let second = serde_json::to_string(&service.prepare(&query, Some(5)).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn property_context_respects_budget_and_never_truncates() {
    let mut files = Vec::new();
    for i in 0..8 {
        let body: String = (0..30)
            .map(|j| format!("    order_line_{} = {}\n", j, j))
            .collect();
        files.push(SourceFile::new(
            format!("orders_{}.py", i),
            format!("def process_orders_{}():\n{}", i, body),
        ));
    }
    let service = QaService::with_defaults();
    service.analyze("p", &files).unwrap();

    let retrieval = service
        .search(&Query::new("p", "where are orders processed"), Some(8))
        .unwrap();
    assert!(retrieval.hits.len() > 1);

    let budget = 1_500usize;
    let (context, citations) =
        project_qa::context::assemble(&retrieval.hits, budget, true);
    assert!(context.chars().count() <= budget);
    assert!(!citations.is_empty());
    for citation in &citations {
        let unit = retrieval
            .hits
            .iter()
            .map(|h| &h.unit)
            .find(|u| u.file_path == citation.file && u.start_line == citation.lines[0])
            .expect("citation must come from a retrieved unit");
        assert!(
            context.contains(&unit.source_text),
            "cited unit must appear untruncated"
        );
    }
}

#[test]
fn unparsed_files_remain_retrievable_end_to_end() {
    let service = QaService::with_defaults();
    let result = service
        .analyze(
            "p",
            &[SourceFile::new(
                "legacy.js",
                "function broken( {\n  const databaseRetryLimit = 3;\n",
            )],
        )
        .unwrap();
    assert_eq!(result.errors.len(), 1);

    let payload = service
        .prepare(&Query::new("p", "what is the database retry limit"), None)
        .unwrap();
    assert_eq!(payload.citations.len(), 1);
    assert_eq!(payload.citations[0].kind, UnitKind::Unparsed);
    assert!(payload.context.contains("databaseRetryLimit"));
}
