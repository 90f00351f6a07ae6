//! Fixture runner: every `fixtures/<case>/` holds `*.java` sources and an
//! `expected.json` of the form `{ "type": "...", "mock": <value> }`.
//!
//! ```bash
//! cargo run -p dev-test-runner -- fixtures
//! ```
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use colored::Colorize;
use serde::Deserialize;
use serde_json::Value;

use postman_mock::java::SourceIndex;
use postman_mock::mock::mock_json;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Expected {
    #[serde(rename = "type")]
    type_name: String,
    mock: Value,
}

fn load_expected(path: &Path) -> anyhow::Result<Expected> {
    let src = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let de = &mut serde_json::Deserializer::from_str(&src);
    serde_path_to_error::deserialize(de).map_err(|err| {
        let at = err.path().to_string();
        anyhow!("{} at JSON path {at} → {}", path.display(), err.into_inner())
    })
}

fn run_case(dir: &Path) -> anyhow::Result<()> {
    let expected = load_expected(&dir.join("expected.json"))?;
    let mut sources = Vec::new();
    for entry in glob::glob(&format!("{}/*.java", dir.display()))? {
        let path = entry?;
        let src = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        sources.push((path.to_string_lossy().to_string(), src));
    }
    let index = SourceIndex::from_sources(sources.iter().map(|(p, s)| (p.as_str(), s.as_str())))?;
    let ty = index.resolve_type_text(&expected.type_name)?;
    let actual = mock_json(&index, &ty)?;
    if actual != expected.mock {
        return Err(anyhow!(
            "mismatch for `{}`\n  expected: {}\n  actual:   {}",
            expected.type_name,
            expected.mock,
            actual
        ));
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let root = std::env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("fixtures"));
    let mut cases: Vec<PathBuf> = glob::glob(&format!("{}/*/expected.json", root.display()))?
        .filter_map(Result::ok)
        .filter_map(|p| p.parent().map(Path::to_path_buf))
        .collect();
    cases.sort();

    let mut failed = 0usize;
    for case in &cases {
        let name = case.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        match run_case(case) {
            Ok(()) => eprintln!("{} {name}", "pass".green().bold()),
            Err(error) => {
                failed += 1;
                eprintln!("{} {name}: {error:#}", "FAIL".red().bold());
            }
        }
    }
    eprintln!("{} cases, {failed} failed", cases.len());
    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
