use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Credit,
    Debit,
}

impl Direction {
    /// Ledger-facing name: credits are deposits, debits are withdrawals.
    pub fn transaction_type(&self) -> &'static str {
        match self {
            Direction::Credit => "DEPOSIT",
            Direction::Debit => "WITHDRAWAL",
        }
    }

    pub fn sign(&self) -> i64 {
        match self {
            Direction::Credit => 1,
            Direction::Debit => -1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.transaction_type())
    }
}

/// Informational tier used for emphasis. Never feeds into the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Base amount of a rule, before strictness scaling.
///
/// In TOML a fixed magnitude is a bare integer (`magnitude = 25`) and a range
/// is an inclusive pair (`magnitude = [20, 30]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Magnitude {
    Fixed(u32),
    Range(u32, u32),
}

impl Magnitude {
    /// Inclusive `(min, max)`; equal for fixed magnitudes.
    pub fn bounds(&self) -> (u32, u32) {
        match *self {
            Magnitude::Fixed(v) => (v, v),
            Magnitude::Range(lo, hi) => (lo, hi),
        }
    }

    pub fn is_ranged(&self) -> bool {
        matches!(self, Magnitude::Range(lo, hi) if lo != hi)
    }

    /// Resolve to a concrete base amount. Ranges draw uniformly from `rng`.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        match *self {
            Magnitude::Fixed(v) => v,
            Magnitude::Range(lo, hi) if lo >= hi => lo,
            Magnitude::Range(lo, hi) => rng.gen_range(lo..=hi),
        }
    }
}

impl fmt::Display for Magnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Magnitude::Fixed(v) => write!(f, "{v}"),
            Magnitude::Range(lo, hi) => write!(f, "{lo}..={hi}"),
        }
    }
}

/// Per-person magnitude replacement, e.g. hiding things from Mum costs more.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectOverride {
    pub subject: String,
    pub magnitude: Magnitude,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub id: String,
    pub keywords: Vec<String>,
    pub direction: Direction,
    pub magnitude: Magnitude,
    pub label: String,
    pub rationale: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subject_overrides: Vec<SubjectOverride>,
}

impl CategoryRule {
    /// `text` must already be normalized (see [`crate::normalize::for_rules`]).
    pub fn matches(&self, text: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| !k.is_empty() && text.contains(k.as_str()))
    }

    /// Magnitude that applies to `subject`, honoring any explicit override.
    pub fn magnitude_for(&self, subject: &str) -> Magnitude {
        let subject = subject.trim();
        self.subject_overrides
            .iter()
            .find(|o| o.subject.eq_ignore_ascii_case(subject))
            .map(|o| o.magnitude)
            .unwrap_or(self.magnitude)
    }

    pub fn render_rationale(&self, subject: &str) -> String {
        let subject = subject.trim();
        let who = if subject.is_empty() { "them" } else { subject };
        self.rationale.replace("{subject}", who)
    }
}
