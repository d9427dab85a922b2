//! Structural segmentation of one source file into code units
//!
//! Every line of a parsed file ends up covered by exactly one top-level unit:
//! grammar-defined definitions (functions, classes, methods) are emitted as
//! named units, and the top-level lines between them are coalesced into
//! `module`-kind gap units. Nested definitions produce nested units whose
//! line ranges sit inside their parent's; partial overlap between siblings
//! is a segmenter defect, not a runtime condition.
//!
//! Files the grammar rejects degrade to a single `unparsed` whole-file unit
//! so they stay reachable through plain-text matching.

use super::language::{DefKind, Language};
use crate::types::{CodeUnit, UnitKind};
use tree_sitter::{Node, Parser};

/// Result of segmenting one file
#[derive(Debug)]
pub struct Segmented {
    pub units: Vec<CodeUnit>,
    /// True when the file degraded to the unparsed whole-file fallback
    pub parse_failed: bool,
}

/// A definition captured during the tree walk, before gap coalescing
struct Captured {
    kind: UnitKind,
    name: String,
    parent_name: Option<String>,
    start_line: usize,
    end_line: usize,
    /// Not nested inside another captured definition; only top-level
    /// captures participate in the line-coverage computation
    top_level: bool,
}

/// Segment a file's text into code units for the given language
pub fn segment(project_id: &str, file_path: &str, language: Language, text: &str) -> Segmented {
    if text.is_empty() {
        return Segmented {
            units: vec![make_unit(
                project_id,
                file_path,
                language.name(),
                UnitKind::Module,
                String::new(),
                None,
                1,
                1,
                String::new(),
            )],
            parse_failed: false,
        };
    }

    let line_count = text.lines().count().max(1);

    let mut parser = Parser::new();
    let tree = match parser.set_language(&language.grammar()) {
        Ok(()) => parser.parse(text, None),
        Err(e) => {
            tracing::warn!("grammar rejected for {}: {}", language.name(), e);
            None
        }
    };

    let tree = match tree {
        Some(tree) if !tree.root_node().has_error() => tree,
        _ => {
            tracing::debug!("parse failed for {}, falling back to unparsed unit", file_path);
            return Segmented {
                units: vec![make_unit(
                    project_id,
                    file_path,
                    language.name(),
                    UnitKind::Unparsed,
                    String::new(),
                    None,
                    1,
                    line_count,
                    text.to_string(),
                )],
                parse_failed: true,
            };
        }
    };

    let mut captured = Vec::new();
    walk(tree.root_node(), language, None, false, text, &mut captured);

    captured.sort_by(|a, b| {
        a.start_line
            .cmp(&b.start_line)
            .then(b.end_line.cmp(&a.end_line))
    });
    // Identical spans collapse into one unit carrying every captured name:
    // the unit key (file, start, end) must stay unique, but a name captured
    // on that span must stay reachable by lookup (one-line sibling
    // definitions, grammar quirks surfacing the same node twice)
    let mut merged: Vec<Captured> = Vec::new();
    for c in captured {
        match merged.last_mut() {
            Some(prev) if prev.start_line == c.start_line && prev.end_line == c.end_line => {
                if !c.name.is_empty() && prev.name != c.name {
                    if prev.name.is_empty() {
                        prev.name = c.name;
                    } else {
                        prev.name.push_str(", ");
                        prev.name.push_str(&c.name);
                    }
                }
                prev.top_level |= c.top_level;
            }
            _ => merged.push(c),
        }
    }

    let lines: Vec<&str> = text.lines().collect();
    let mut units = Vec::new();

    // One pass in line order: emit module gap units for uncovered top-level
    // ranges and assign every line to exactly one top-level owner. Sibling
    // definitions may share a boundary line (valid in brace languages), so a
    // capture starting on an already-owned line is clamped to the first
    // unowned one; a capture left without any line keeps its name reachable
    // on the sibling that owns its span.
    let mut covered_until = 0usize;
    let mut last_top: Option<usize> = None;
    for c in merged {
        let end = c.end_line.min(line_count);
        let start = c.start_line.min(end);
        if !c.top_level {
            units.push(make_unit(
                project_id,
                file_path,
                language.name(),
                c.kind,
                c.name,
                c.parent_name,
                start,
                end,
                lines[start - 1..end].join("\n"),
            ));
            continue;
        }
        if start > covered_until + 1 {
            units.push(gap_unit(
                project_id,
                file_path,
                language.name(),
                &lines,
                covered_until + 1,
                start - 1,
            ));
        }
        let start = start.max(covered_until + 1);
        if start > end {
            if let (Some(i), false) = (last_top, c.name.is_empty()) {
                let owner = &mut units[i];
                if owner.name.is_empty() {
                    owner.name = c.name;
                } else if owner.name != c.name {
                    owner.name.push_str(", ");
                    owner.name.push_str(&c.name);
                }
            }
            continue;
        }
        units.push(make_unit(
            project_id,
            file_path,
            language.name(),
            c.kind,
            c.name,
            c.parent_name,
            start,
            end,
            lines[start - 1..end].join("\n"),
        ));
        covered_until = end;
        last_top = Some(units.len() - 1);
    }
    if covered_until < line_count {
        units.push(gap_unit(
            project_id,
            file_path,
            language.name(),
            &lines,
            covered_until + 1,
            line_count,
        ));
    }

    units.sort_by(|a, b| {
        a.start_line
            .cmp(&b.start_line)
            .then(b.end_line.cmp(&a.end_line))
    });

    Segmented {
        units,
        parse_failed: false,
    }
}

fn walk(
    node: Node,
    language: Language,
    enclosing: Option<&str>,
    inside_captured: bool,
    source: &str,
    out: &mut Vec<Captured>,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match language.definition_kind(child.kind()) {
            Some(def) => {
                let name = extract_name(child, source);
                let kind = match def {
                    DefKind::Callable if enclosing.is_some() => UnitKind::Method,
                    DefKind::Callable => UnitKind::Function,
                    DefKind::Container => UnitKind::Class,
                };
                out.push(Captured {
                    kind,
                    name: name.clone(),
                    parent_name: if kind == UnitKind::Method {
                        enclosing.map(String::from)
                    } else {
                        None
                    },
                    start_line: child.start_position().row + 1,
                    end_line: child.end_position().row + 1,
                    top_level: !inside_captured,
                });
                let next_enclosing = if def == DefKind::Container && !name.is_empty() {
                    Some(name)
                } else {
                    enclosing.map(String::from)
                };
                walk(child, language, next_enclosing.as_deref(), true, source, out);
            }
            None => walk(child, language, enclosing, inside_captured, source, out),
        }
    }
}

/// Pull the identifier out of a definition node via grammar name fields
fn extract_name(node: Node, source: &str) -> String {
    if let Some(name) = node.child_by_field_name("name") {
        return node_text(name, source);
    }
    // Rust impl blocks carry the implemented type instead of a name
    if let Some(ty) = node.child_by_field_name("type") {
        return node_text(ty, source);
    }
    // Wrapper declarations (e.g. Go type_declaration around type_spec) keep
    // the name one level down
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(name) = child.child_by_field_name("name") {
            return node_text(name, source);
        }
    }
    String::new()
}

fn node_text(node: Node, source: &str) -> String {
    node.utf8_text(source.as_bytes())
        .map(str::to_string)
        .unwrap_or_default()
}

fn gap_unit(
    project_id: &str,
    file_path: &str,
    language: &str,
    lines: &[&str],
    start: usize,
    end: usize,
) -> CodeUnit {
    make_unit(
        project_id,
        file_path,
        language,
        UnitKind::Module,
        String::new(),
        None,
        start,
        end,
        lines[start - 1..end.min(lines.len())].join("\n"),
    )
}

#[allow(clippy::too_many_arguments)]
fn make_unit(
    project_id: &str,
    file_path: &str,
    language: &str,
    kind: UnitKind,
    name: String,
    parent_name: Option<String>,
    start_line: usize,
    end_line: usize,
    source_text: String,
) -> CodeUnit {
    CodeUnit {
        project_id: project_id.to_string(),
        file_path: file_path.to_string(),
        language: language.to_string(),
        kind,
        name,
        start_line,
        end_line,
        source_text,
        parent_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn segment_py(text: &str) -> Segmented {
        segment("p1", "app.py", Language::Python, text)
    }

    /// Every line covered exactly once by the top-level units
    fn assert_full_coverage(units: &[CodeUnit], line_count: usize) {
        let mut coverage = vec![0usize; line_count + 1];
        // Nested units (methods inside classes) share lines with their
        // parent; coverage is over sibling top-level units only
        let top_level: Vec<&CodeUnit> = units
            .iter()
            .filter(|u| {
                !units.iter().any(|outer| {
                    !std::ptr::eq(*u, outer)
                        && outer.start_line <= u.start_line
                        && outer.end_line >= u.end_line
                        && (outer.start_line, outer.end_line) != (u.start_line, u.end_line)
                })
            })
            .collect();
        for unit in top_level {
            for line in unit.start_line..=unit.end_line {
                coverage[line] += 1;
            }
        }
        for line in 1..=line_count {
            assert_eq!(coverage[line], 1, "line {} covered {} times", line, coverage[line]);
        }
    }

    #[test]
    fn test_python_function_and_class() {
        let text = "def run():\n    return 1\n\nclass App:\n    def start(self):\n        pass\n";
        let seg = segment_py(text);
        assert!(!seg.parse_failed);

        let run = seg.units.iter().find(|u| u.name == "run").unwrap();
        assert_eq!(run.kind, UnitKind::Function);
        assert_eq!((run.start_line, run.end_line), (1, 2));
        assert_eq!(run.source_text, "def run():\n    return 1");

        let app = seg.units.iter().find(|u| u.name == "App").unwrap();
        assert_eq!(app.kind, UnitKind::Class);

        let start = seg.units.iter().find(|u| u.name == "start").unwrap();
        assert_eq!(start.kind, UnitKind::Method);
        assert_eq!(start.parent_name.as_deref(), Some("App"));
        // Nested range sits inside the class range
        assert!(start.start_line >= app.start_line && start.end_line <= app.end_line);
    }

    #[test]
    fn test_gap_units_cover_interleaved_top_level_code() {
        let text = "import os\n\ndef a():\n    pass\n\nX = 1\n\ndef b():\n    pass\n\nY = 2\n";
        let seg = segment_py(text);
        let line_count = text.lines().count();
        assert_full_coverage(&seg.units, line_count);

        let gaps: Vec<&CodeUnit> = seg
            .units
            .iter()
            .filter(|u| u.kind == UnitKind::Module)
            .collect();
        assert!(gaps.len() >= 3, "expected gap units before, between, after");
        assert!(gaps.iter().all(|g| g.name.is_empty()));
    }

    #[test]
    fn test_empty_file_single_module_unit() {
        let seg = segment_py("");
        assert_eq!(seg.units.len(), 1);
        let unit = &seg.units[0];
        assert_eq!(unit.kind, UnitKind::Module);
        assert_eq!((unit.start_line, unit.end_line), (1, 1));
        assert_eq!(unit.source_text, "");
    }

    #[test]
    fn test_whitespace_only_file_covered() {
        let seg = segment_py("\n\n\n");
        assert_eq!(seg.units.len(), 1);
        assert_eq!(seg.units[0].kind, UnitKind::Module);
        assert_eq!(seg.units[0].start_line, 1);
        assert_eq!(seg.units[0].end_line, 3);
    }

    #[test]
    fn test_malformed_file_degrades_to_unparsed() {
        let text = "def broken(:\n    ???\n";
        let seg = segment_py(text);
        assert!(seg.parse_failed);
        assert_eq!(seg.units.len(), 1);
        let unit = &seg.units[0];
        assert_eq!(unit.kind, UnitKind::Unparsed);
        assert_eq!(unit.source_text, text);
        assert_eq!((unit.start_line, unit.end_line), (1, 2));
    }

    #[test]
    fn test_rust_impl_method_parent() {
        let text = "struct Point {\n    x: i32,\n}\n\nimpl Point {\n    fn norm(&self) -> i32 {\n        self.x\n    }\n}\n";
        let seg = segment("p1", "lib.rs", Language::Rust, text);

        let imp = seg.units.iter().find(|u| u.kind == UnitKind::Class && u.name == "Point" && u.start_line == 5);
        assert!(imp.is_some(), "impl block should be captured with its type as name");

        let norm = seg.units.iter().find(|u| u.name == "norm").unwrap();
        assert_eq!(norm.kind, UnitKind::Method);
        assert_eq!(norm.parent_name.as_deref(), Some("Point"));
    }

    #[test]
    fn test_go_type_declaration_name() {
        let text = "package main\n\ntype Config struct {\n\tHost string\n}\n\nfunc Load() Config {\n\treturn Config{}\n}\n";
        let seg = segment("p1", "main.go", Language::Go, text);
        assert!(seg.units.iter().any(|u| u.name == "Config" && u.kind == UnitKind::Class));
        assert!(seg.units.iter().any(|u| u.name == "Load" && u.kind == UnitKind::Function));
    }

    #[test]
    fn test_siblings_sharing_a_line_own_disjoint_ranges() {
        // Valid JS: `b` starts on the line closing `a`
        let text = "function a() {\n} function b() {\n}";
        let seg = segment("p1", "app.js", Language::JavaScript, text);
        assert!(!seg.parse_failed);
        assert_full_coverage(&seg.units, 3);

        let a = seg.units.iter().find(|u| u.name == "a").unwrap();
        assert_eq!((a.start_line, a.end_line), (1, 2));
        let b = seg.units.iter().find(|u| u.name == "b").unwrap();
        // The shared line stays with `a`; `b` owns the remainder
        assert_eq!((b.start_line, b.end_line), (3, 3));
        assert_eq!(b.source_text, "}");
    }

    #[test]
    fn test_one_line_siblings_keep_every_name() {
        let text = "function a() {} function b() {}";
        let seg = segment("p1", "app.js", Language::JavaScript, text);
        assert_full_coverage(&seg.units, 1);
        assert_eq!(seg.units.len(), 1);

        let unit = &seg.units[0];
        assert_eq!(unit.kind, UnitKind::Function);
        assert_eq!((unit.start_line, unit.end_line), (1, 1));
        // Both definitions share the span; neither name may be lost
        assert!(unit.name.contains('a') && unit.name.contains('b'));
    }

    #[test]
    fn test_source_text_matches_line_slice() {
        let text = "A = 1\ndef f():\n    return A\nB = 2\n";
        let seg = segment_py(text);
        let lines: Vec<&str> = text.lines().collect();
        for unit in &seg.units {
            assert_eq!(
                unit.source_text,
                lines[unit.start_line - 1..unit.end_line].join("\n"),
                "unit {:?} text drifted from its line range",
                unit.name
            );
        }
    }

    #[test]
    fn test_units_ordered_by_start_line() {
        let text = "def a():\n    pass\n\ndef b():\n    pass\n";
        let seg = segment_py(text);
        let starts: Vec<usize> = seg.units.iter().map(|u| u.start_line).collect();
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        assert_eq!(starts, sorted);
    }
}
