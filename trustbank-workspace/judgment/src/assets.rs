//! The embedded default rule table and the on-disk copy it seeds.

use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::rules::RuleTable;

pub const DEFAULT_RULES_NAME: &str = "judgment_rules.toml";
pub const DEFAULT_RULES_TOML: &str = include_str!("../assets/judgment_rules.toml");

/// Where a loaded table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSource {
    /// The on-disk default matched the embedded table byte for byte.
    Embedded,
    /// The default file was missing and has been written out.
    Seeded,
    /// The default file had drifted and was overwritten (locked mode).
    Restored,
    /// A locally edited or custom table parsed from disk.
    Local,
    /// The default file had drifted into something unparsable.
    Fallback,
}

#[derive(Debug, Clone)]
pub struct LoadedRules {
    pub table: RuleTable,
    pub source: RuleSource,
}

impl LoadedRules {
    fn builtin(source: RuleSource) -> Self {
        Self {
            table: RuleTable::builtin().clone(),
            source,
        }
    }
}

/// `<root>/rules`, where `init` seeds the default table.
pub fn rules_dir(root: &Path) -> PathBuf {
    root.join("rules")
}

/// Seed missing default rule files into a directory (idempotent).
/// Returns the names of files that were created.
pub fn write_default_rules(dir: impl AsRef<Path>) -> Result<Vec<String>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("create_dir_all({:?})", dir))?;

    let path = dir.join(DEFAULT_RULES_NAME);
    if path.exists() {
        return Ok(Vec::new());
    }
    fs::write(&path, DEFAULT_RULES_TOML).with_context(|| format!("write {:?}", path))?;
    Ok(vec![DEFAULT_RULES_NAME.to_string()])
}

/// Load a rule table from disk.
///
/// A file named [`DEFAULT_RULES_NAME`] is checked against the embedded table:
/// - missing: the embedded copy is written best-effort and used;
/// - identical: the embedded table is used;
/// - drifted and `locked`: the embedded copy is written back and used;
/// - drifted and unlocked: the local table is parsed and validated, and an
///   invalid edit falls back to the embedded table with a warning.
///
/// Any other file is parsed as-is and every failure is an error.
pub fn load_rule_table(path: &Path, locked: bool) -> Result<LoadedRules> {
    let is_default = path.file_name().and_then(|n| n.to_str()) == Some(DEFAULT_RULES_NAME);
    if !is_default {
        let table = RuleTable::load_from_file(path)
            .with_context(|| format!("loading rule table {}", path.display()))?;
        return Ok(LoadedRules { table, source: RuleSource::Local });
    }

    if !path.exists() {
        if let Err(e) = seed_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "could not seed default rule file");
        }
        return Ok(LoadedRules::builtin(RuleSource::Seeded));
    }

    let bytes = fs::read(path).with_context(|| format!("read {:?}", path))?;
    if blake3::hash(&bytes) == blake3::hash(DEFAULT_RULES_TOML.as_bytes()) {
        return Ok(LoadedRules::builtin(RuleSource::Embedded));
    }

    if locked {
        tracing::warn!(path = %path.display(), "rule file drifted from embedded copy; restoring");
        fs::write(path, DEFAULT_RULES_TOML)
            .with_context(|| format!("restore embedded {:?}", path))?;
        return Ok(LoadedRules::builtin(RuleSource::Restored));
    }

    match RuleTable::from_toml_str(&String::from_utf8_lossy(&bytes)) {
        Ok(table) => {
            tracing::warn!(path = %path.display(), rules = table.len(), "using locally edited rule file");
            Ok(LoadedRules { table, source: RuleSource::Local })
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "locally edited rule file is invalid; using embedded table"
            );
            Ok(LoadedRules::builtin(RuleSource::Fallback))
        }
    }
}

fn seed_file(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, DEFAULT_RULES_TOML)?;
    Ok(())
}
