use anyhow::{Context, Result};
use judgment::Strictness;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoreConfig {
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub judgment: JudgmentConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub logbook: LogbookConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
}

impl CoreConfig {
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join("config.toml");
        let mut cfg = if path.exists() {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            Self::from_toml_str(&text)
                .with_context(|| format!("parsing config file {}", path.display()))?
        } else {
            tracing::info!(
                "No config file found at {}. Using CoreConfig::default().",
                path.display()
            );
            CoreConfig::default()
        };
        cfg.resolve_paths(root);
        Ok(cfg)
    }

    /// Parse and validate without touching the filesystem. Paths stay relative.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let cfg = toml::from_str::<CoreConfig>(text)?;
        cfg.ledger.validate()?;
        Ok(cfg)
    }

    fn resolve_paths(&mut self, root: &Path) {
        if let Some(p) = &self.judgment.rules_path {
            self.judgment.rules_path = Some(absolutize(root, p));
        }
        self.logbook.path = absolutize(root, &self.logbook.path);
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "SystemConfig::default_name")]
    pub name: String,
    #[serde(default = "SystemConfig::default_version")]
    pub version: String,
}

impl SystemConfig {
    fn default_name() -> String {
        "trustbank".to_string()
    }

    fn default_version() -> String {
        "0.1.0".to_string()
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            name: Self::default_name(),
            version: Self::default_version(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JudgmentConfig {
    /// Unknown names fail the config parse.
    #[serde(default)]
    pub strictness: Strictness,
    /// Rule table file. `None` uses the embedded default table.
    #[serde(default)]
    pub rules_path: Option<PathBuf>,
    /// Restore the embedded default when the rule file on disk has drifted.
    #[serde(default)]
    pub locked: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "LedgerConfig::default_floor")]
    pub floor: i64,
    #[serde(default = "LedgerConfig::default_ceiling")]
    pub ceiling: i64,
}

impl LedgerConfig {
    fn default_floor() -> i64 {
        300
    }

    fn default_ceiling() -> i64 {
        900
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.floor < self.ceiling,
            "ledger floor ({}) must be below ceiling ({})",
            self.floor,
            self.ceiling
        );
        Ok(())
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            floor: Self::default_floor(),
            ceiling: Self::default_ceiling(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogbookConfig {
    #[serde(default = "LogbookConfig::default_enabled")]
    pub enabled: bool,
    #[serde(default = "LogbookConfig::default_path")]
    pub path: PathBuf,
}

impl LogbookConfig {
    fn default_enabled() -> bool {
        true
    }

    fn default_path() -> PathBuf {
        PathBuf::from("logbook/transactions.jsonl")
    }
}

impl Default for LogbookConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            path: Self::default_path(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistantConfig {
    /// Fixed seed for reply selection and ranged magnitudes; entropy when unset.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn absolutize(root: &Path, value: &Path) -> PathBuf {
    if value.is_absolute() {
        value.to_path_buf()
    } else {
        root.join(value)
    }
}
