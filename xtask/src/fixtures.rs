//! Golden fixture corpus maintenance.
//!
//! Each `tests/fixtures/<name>.html` in narration-text has a `<name>.json`
//! recording the canonical text and word count every consumer must reproduce.

use anyhow::{Context, Result};
use narration_text::{html_to_text, tokenize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Get the workspace root directory.
pub fn workspace_root() -> Result<PathBuf> {
    let output = Command::new("cargo")
        .args(["locate-project", "--workspace", "--message-format=plain"])
        .output()
        .context("Failed to run cargo locate-project")?;

    if !output.status.success() {
        anyhow::bail!("cargo locate-project failed");
    }

    let cargo_toml = String::from_utf8(output.stdout)
        .context("Invalid UTF-8 in cargo output")?
        .trim()
        .to_string();

    Ok(PathBuf::from(cargo_toml)
        .parent()
        .context("No parent directory")?
        .to_path_buf())
}

/// Get the fixture corpus directory.
pub fn fixtures_dir() -> Result<PathBuf> {
    Ok(workspace_root()?
        .join("narration-text")
        .join("tests")
        .join("fixtures"))
}

/// Render the golden JSON for one HTML fixture.
pub fn golden_for(html: &str) -> Result<String> {
    let text = html_to_text(html);
    let word_count = tokenize(&text).len();
    let golden = serde_json::json!({
        "text": text,
        "word_count": word_count,
    });
    Ok(format!("{}\n", serde_json::to_string_pretty(&golden)?))
}

/// List HTML fixtures in sorted order.
pub fn html_fixtures(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut fixtures = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().map(|e| e == "html").unwrap_or(false) {
            fixtures.push(path);
        }
    }
    fixtures.sort();
    Ok(fixtures)
}

/// Regenerate golden files, or with `check_only` report the ones that differ.
///
/// Returns the fixtures whose golden file was missing or out of date.
pub fn bless(dir: &Path, check_only: bool) -> Result<Vec<PathBuf>> {
    let mut changed = Vec::new();

    for fixture in html_fixtures(dir)? {
        let html = fs::read_to_string(&fixture)
            .with_context(|| format!("Failed to read {}", fixture.display()))?;
        let golden_path = fixture.with_extension("json");
        let expected = golden_for(&html)?;

        let current = fs::read_to_string(&golden_path).ok();
        let matches = current
            .as_deref()
            .map(|c| same_golden(c, &expected))
            .unwrap_or(false);
        if matches {
            continue;
        }

        if !check_only {
            fs::write(&golden_path, &expected)
                .with_context(|| format!("Failed to write {}", golden_path.display()))?;
        }
        changed.push(fixture);
    }

    Ok(changed)
}

/// Compare golden files by content, not formatting.
fn same_golden(current: &str, expected: &str) -> bool {
    match (
        serde_json::from_str::<serde_json::Value>(current),
        serde_json::from_str::<serde_json::Value>(expected),
    ) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
