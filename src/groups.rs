use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// One campaign unit: a named bundle of feature flags built and run
/// together. Flag names are bare identifiers (`MUTEX`, not the full macro);
/// the patcher applies the decoration.
#[derive(Debug, Clone, Deserialize)]
pub struct TestGroup {
    pub name: String,
    #[serde(rename = "group")]
    pub flags: Vec<String>,
}

/// Loads the ordered group list. Groups run in declaration order, which is
/// user-visible in the console report.
pub fn load_groups(path: &Path) -> Result<Vec<TestGroup>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read group file '{}'", path.display()))?;
    let groups: Vec<TestGroup> = serde_json::from_str(&content)
        .with_context(|| format!("malformed group file '{}'", path.display()))?;
    Ok(groups)
}
