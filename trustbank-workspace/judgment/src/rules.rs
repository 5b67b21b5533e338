use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fs, path::Path};

use crate::assets::DEFAULT_RULES_TOML;
use crate::error::JudgeError;
use crate::normalize;
use crate::types::{CategoryRule, Magnitude};

/// Rule ids whose matches count as a recorded lie on the account.
pub const DISHONESTY_FAMILY: &[&str] = &["COCOA_INCIDENT", "DISHONESTY"];
/// Rule ids whose matches pay down the recorded lie count.
pub const TRUTH_FAMILY: &[&str] = &["TRUTH"];

static BUILTIN: Lazy<RuleTable> = Lazy::new(|| {
    RuleTable::from_toml_str(DEFAULT_RULES_TOML).expect("embedded judgment_rules.toml is valid")
});

/// Ordered decision list. Evaluation is top to bottom and the first match wins;
/// there is no scoring between rules that both match.
///
/// Deserializing goes through the same validation as [`RuleTable::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRuleTable")]
pub struct RuleTable {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    rules: Vec<CategoryRule>,
}

/// Wire shape before validation.
#[derive(Deserialize)]
struct RawRuleTable {
    name: String,
    version: String,
    #[serde(default)]
    description: Option<String>,
    rules: Vec<CategoryRule>,
}

impl TryFrom<RawRuleTable> for RuleTable {
    type Error = JudgeError;

    fn try_from(raw: RawRuleTable) -> Result<Self, Self::Error> {
        let mut table = RuleTable {
            name: raw.name,
            version: raw.version,
            description: raw.description,
            rules: raw.rules,
        };
        table.validate()?;
        Ok(table)
    }
}

impl RuleTable {
    /// The embedded default table, parsed once.
    pub fn builtin() -> &'static RuleTable {
        &BUILTIN
    }

    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        rules: Vec<CategoryRule>,
    ) -> Result<Self, JudgeError> {
        let mut table = RuleTable {
            name: name.into(),
            version: version.into(),
            description: None,
            rules,
        };
        table.validate()?;
        Ok(table)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, JudgeError> {
        let raw: RawRuleTable = toml::from_str(text)?;
        RuleTable::try_from(raw)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, JudgeError> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Rules in scan order.
    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CategoryRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Position of a rule in scan order.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.id == id)
    }

    /// First rule matching `text`. Normalizes the input.
    pub fn first_match(&self, text: &str) -> Option<&CategoryRule> {
        let t = normalize::for_rules(text);
        if t.trim().is_empty() {
            return None;
        }
        self.rules.iter().find(|r| r.matches(&t))
    }

    /// Enforce table invariants and normalize keywords in place.
    fn validate(&mut self) -> Result<(), JudgeError> {
        if self.rules.is_empty() {
            return Err(JudgeError::InvalidRuleTable(format!(
                "table {:?} has no rules",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for rule in &mut self.rules {
            if rule.id.trim().is_empty() {
                return Err(JudgeError::InvalidRuleTable("rule with empty id".into()));
            }
            if !seen.insert(rule.id.clone()) {
                return Err(JudgeError::InvalidRuleTable(format!(
                    "duplicate rule id {:?}",
                    rule.id
                )));
            }
            if rule.label.trim().is_empty() || rule.rationale.trim().is_empty() {
                return Err(JudgeError::InvalidRuleTable(format!(
                    "rule {:?} needs a label and a rationale",
                    rule.id
                )));
            }

            rule.keywords = rule
                .keywords
                .iter()
                .map(|k| normalize::for_rules(k.trim()))
                .filter(|k| !k.is_empty())
                .collect();
            if rule.keywords.is_empty() {
                return Err(JudgeError::InvalidRuleTable(format!(
                    "rule {:?} has no keywords",
                    rule.id
                )));
            }

            check_range(&rule.id, rule.magnitude)?;
            for o in &rule.subject_overrides {
                if o.subject.trim().is_empty() {
                    return Err(JudgeError::InvalidRuleTable(format!(
                        "rule {:?} has an override with an empty subject",
                        rule.id
                    )));
                }
                check_range(&rule.id, o.magnitude)?;
            }
        }
        Ok(())
    }
}

fn check_range(id: &str, m: Magnitude) -> Result<(), JudgeError> {
    match m {
        Magnitude::Range(lo, hi) if lo > hi => Err(JudgeError::InvalidRuleTable(format!(
            "rule {id:?} has an inverted magnitude range [{lo}, {hi}]"
        ))),
        _ => Ok(()),
    }
}
