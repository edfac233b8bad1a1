//! Fixture-driven end-to-end runs. Each directory under `tests/cases/` holds:
//! `meta.json`, `prompts.txt`, `manifest.json`, a `before/` tree that is
//! copied into a sandbox, and the `after/` tree the sandbox must match.

use promptpatch_core::allow::AllowList;
use promptpatch_core::config::Config;
use promptpatch_core::logger::Logger;
use promptpatch_core::PromptPatcher;
use serde::Deserialize;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tempfile::TempDir;

#[derive(Deserialize, Debug)]
struct CaseMeta {
    description: String,
    #[serde(default)]
    allow: Option<Vec<String>>,
    expect_outcomes: Vec<String>,
}

fn cases_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("cases")
}

fn copy_dir_all(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            copy_dir_all(&entry.path(), &dst.join(entry.file_name()))?;
        } else {
            fs::copy(entry.path(), dst.join(entry.file_name()))?;
        }
    }
    Ok(())
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) {
    for entry in fs::read_dir(dir).unwrap().flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(root, &path, out);
        } else {
            out.push(path.strip_prefix(root).unwrap().to_path_buf());
        }
    }
}

fn assert_dirs_match(case: &str, actual: &Path, expected: &Path) {
    let mut actual_files = Vec::new();
    let mut expected_files = Vec::new();
    collect_files(actual, actual, &mut actual_files);
    collect_files(expected, expected, &mut expected_files);
    actual_files.sort();
    expected_files.sort();
    assert_eq!(actual_files, expected_files, "[{case}] file sets differ");

    for rel in &expected_files {
        let want = fs::read(expected.join(rel)).unwrap();
        let got = fs::read(actual.join(rel)).unwrap();
        assert_eq!(
            String::from_utf8_lossy(&got),
            String::from_utf8_lossy(&want),
            "[{case}] content mismatch in {}",
            rel.display()
        );
    }
}

fn run_case(case_path: &Path) {
    let case = case_path.file_name().unwrap().to_string_lossy().to_string();
    let meta: CaseMeta =
        serde_json::from_str(&fs::read_to_string(case_path.join("meta.json")).unwrap()).unwrap();

    let sandbox = TempDir::new().unwrap();
    copy_dir_all(&case_path.join("before"), sandbox.path()).unwrap();

    let mut config = Config::new(case_path.join("prompts.txt"));
    config.manifest_path = Some(case_path.join("manifest.json"));
    config.base_dir = sandbox.path().to_path_buf();
    if let Some(names) = meta.allow.clone() {
        config.allow_list = AllowList::new(names);
    }

    let log = Rc::new(RefCell::new(String::new()));
    let logger = Logger::new_for_test(1, Some(log.clone()));
    let summary = PromptPatcher::new(config, &logger)
        .run()
        .unwrap_or_else(|e| panic!("[{case}] {}: run failed: {e}", meta.description));

    let labels: Vec<&str> = summary.reports.iter().map(|r| r.outcome.label()).collect();
    assert_eq!(labels, meta.expect_outcomes, "[{case}] {}", meta.description);
    assert_eq!(
        log.borrow().matches("\"subsystem\":\"orchestrate\"").count(),
        meta.expect_outcomes.len() + 1,
        "[{case}] one log line per entry plus the summary"
    );

    assert_dirs_match(&case, sandbox.path(), &case_path.join("after"));
}

#[test]
fn fixture_cases() {
    let mut cases: Vec<PathBuf> = fs::read_dir(cases_root())
        .unwrap()
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    cases.sort();
    assert!(!cases.is_empty(), "no fixture cases found");

    for case in &cases {
        run_case(case);
    }
}

#[test]
fn second_run_stacks_another_injection() {
    let case_path = cases_root().join("greeting");
    let sandbox = TempDir::new().unwrap();
    copy_dir_all(&case_path.join("before"), sandbox.path()).unwrap();

    let mut config = Config::new(case_path.join("prompts.txt"));
    config.manifest_path = Some(case_path.join("manifest.json"));
    config.base_dir = sandbox.path().to_path_buf();
    config.allow_list = AllowList::new(["GREETING"]);

    let logger = Logger::disabled();
    let patcher = PromptPatcher::new(config, &logger);
    patcher.run().unwrap();
    patcher.run().unwrap();

    let text = fs::read_to_string(sandbox.path().join("src/greeting.ts")).unwrap();
    assert_eq!(text.matches("// Injected by patcher.py").count(), 2);
    let original = fs::read_to_string(case_path.join("before/src/greeting.ts")).unwrap();
    assert_eq!(text.lines().count(), original.lines().count() + 4);
}
