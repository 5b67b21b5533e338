//! Judgment engine for the trust ledger.
//!
//! Free-text action logs are classified against an ordered keyword rule table
//! into a deposit or withdrawal whose amount is scaled by a strictness tier.

pub mod assets;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod rules;
pub mod strictness;
pub mod types;

pub use assets::{load_rule_table, rules_dir, write_default_rules, LoadedRules, RuleSource};
pub use engine::{Judgment, JudgmentEngine};
pub use error::JudgeError;
pub use normalize::for_rules as normalize_for_rules;
pub use rules::RuleTable;
pub use strictness::Strictness;
pub use types::{CategoryRule, Direction, Magnitude, Severity, SubjectOverride};
