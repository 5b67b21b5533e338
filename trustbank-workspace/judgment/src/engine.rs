//! Judgment engine: ordered keyword scan, per-subject magnitude, strictness scaling.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::JudgeError;
use crate::rules::RuleTable;
use crate::strictness::{self, Strictness};
use crate::types::{CategoryRule, Direction, Severity};

/// Outcome of a successful classification.
///
/// Owned by the caller, which turns it into a ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Judgment {
    pub rule_id: String,
    pub direction: Direction,
    pub amount: u32,
    pub label: String,
    pub rationale: String,
    pub severity: Severity,
}

impl Judgment {
    /// Amount with the direction's sign applied.
    pub fn signed_amount(&self) -> i64 {
        self.direction.sign() * i64::from(self.amount)
    }
}

/// Stateless classifier over an immutable [`RuleTable`].
///
/// Cloning is cheap and the engine can be shared across threads; the only
/// per-call state is the random source passed to
/// [`JudgmentEngine::classify_with_rng`].
#[derive(Debug, Clone)]
pub struct JudgmentEngine {
    table: Arc<RuleTable>,
}

impl Default for JudgmentEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl JudgmentEngine {
    /// Engine over the embedded default table.
    pub fn new() -> Self {
        Self::with_table(RuleTable::builtin().clone())
    }

    pub fn with_table(table: RuleTable) -> Self {
        Self { table: Arc::new(table) }
    }

    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Classify `text` for `subject`, drawing ranged magnitudes from the thread RNG.
    ///
    /// `None` means no rule matched: the text is conversation, not a transaction.
    pub fn classify(&self, text: &str, subject: &str, strictness: Strictness) -> Option<Judgment> {
        self.classify_with_rng(text, subject, strictness, &mut rand::thread_rng())
    }

    /// Same as [`classify`](Self::classify) with an explicit random source.
    ///
    /// Direction and label depend only on the inputs; the amount of a ranged
    /// rule varies between calls unless `rng` is seeded.
    pub fn classify_with_rng<R: Rng + ?Sized>(
        &self,
        text: &str,
        subject: &str,
        strictness: Strictness,
        rng: &mut R,
    ) -> Option<Judgment> {
        self.judge(text, subject, strictness.multiplier(), rng)
    }

    /// Classify with a raw multiplier instead of a [`Strictness`] tier.
    ///
    /// # Errors
    /// * [`JudgeError::InvalidArgument`] for a negative or non-finite multiplier.
    pub fn classify_with_multiplier<R: Rng + ?Sized>(
        &self,
        text: &str,
        subject: &str,
        multiplier: f64,
        rng: &mut R,
    ) -> Result<Option<Judgment>, JudgeError> {
        // Validate up front so a bad multiplier fails even on conversational text.
        strictness::scale(0, multiplier)?;
        Ok(self.judge(text, subject, multiplier, rng))
    }

    fn judge<R: Rng + ?Sized>(
        &self,
        text: &str,
        subject: &str,
        multiplier: f64,
        rng: &mut R,
    ) -> Option<Judgment> {
        let Some(rule) = self.table.first_match(text) else {
            tracing::trace!(subject, "no rule matched");
            return None;
        };

        let amount = resolve_amount(rule, subject, multiplier, rng);
        tracing::debug!(
            rule = %rule.id,
            subject,
            direction = %rule.direction,
            amount,
            "classified"
        );

        Some(Judgment {
            rule_id: rule.id.clone(),
            direction: rule.direction,
            amount,
            label: rule.label.clone(),
            rationale: rule.render_rationale(subject),
            severity: rule.severity,
        })
    }
}

fn resolve_amount<R: Rng + ?Sized>(
    rule: &CategoryRule,
    subject: &str,
    multiplier: f64,
    rng: &mut R,
) -> u32 {
    let base = rule.magnitude_for(subject).draw(rng);
    strictness::scale_unchecked(base, multiplier)
}
