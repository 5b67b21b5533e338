//! services/ledger.rs
//! Relationship accounts and the transactions that move their balances.

use chrono::{DateTime, Duration, Utc};
use judgment::rules::{DISHONESTY_FAMILY, TRUTH_FAMILY};
use judgment::{Direction, Judgment, Severity};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::LedgerConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("unknown account {0:?}")]
    UnknownAccount(String),
    #[error("unknown transaction {tx:?} on account {account:?}")]
    UnknownTransaction { account: String, tx: String },
    #[error("goal {goal} outside [{floor}, {ceiling}]")]
    GoalOutOfRange { goal: i64, floor: i64, ceiling: i64 },
}

/// Inclusive balance range every account is clamped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceBounds {
    pub floor: i64,
    pub ceiling: i64,
}

impl BalanceBounds {
    pub const DEFAULT: BalanceBounds = BalanceBounds { floor: 300, ceiling: 900 };

    pub fn clamp(&self, value: i64) -> i64 {
        value.clamp(self.floor, self.ceiling)
    }

    pub fn contains(&self, value: i64) -> bool {
        (self.floor..=self.ceiling).contains(&value)
    }
}

impl Default for BalanceBounds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<&LedgerConfig> for BalanceBounds {
    fn from(cfg: &LedgerConfig) -> Self {
        Self { floor: cfg.floor, ceiling: cfg.ceiling }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub direction: Direction,
    pub amount: u32,
    /// What the user wrote.
    pub text: String,
    /// Category label from the judgment.
    pub action: String,
    pub rationale: String,
    pub severity: Severity,
    pub old_balance: i64,
    pub new_balance: i64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub favorite: bool,
}

impl Transaction {
    /// Balance actually moved, which is smaller than `amount` when clamped.
    pub fn applied_delta(&self) -> i64 {
        self.new_balance - self.old_balance
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub person: String,
    pub emoji: String,
    pub balance: i64,
    pub lie_count: u32,
    pub goal: i64,
    /// Newest first.
    pub transactions: Vec<Transaction>,
    pub total_deposits: u64,
    pub total_withdrawals: u64,
    pub last_active: DateTime<Utc>,
}

impl Account {
    pub fn new(
        id: impl Into<String>,
        person: impl Into<String>,
        emoji: impl Into<String>,
        balance: i64,
        goal: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            person: person.into(),
            emoji: emoji.into(),
            balance,
            lie_count: 0,
            goal,
            transactions: Vec::new(),
            total_deposits: 0,
            total_withdrawals: 0,
            last_active: now,
        }
    }

    /// Points left until the goal; zero once reached.
    pub fn points_to_goal(&self) -> i64 {
        (self.goal - self.balance).max(0)
    }

    pub fn goal_reached(&self) -> bool {
        self.balance >= self.goal
    }

    pub fn rating(&self) -> Rating {
        Rating::from_balance(self.balance)
    }

    pub fn health(&self) -> Health {
        Health::from_balance(self.balance)
    }
}

/// Badge shown next to a balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rating {
    VeryPoor,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl Rating {
    pub fn from_balance(balance: i64) -> Self {
        match balance {
            b if b >= 800 => Rating::Excellent,
            b if b >= 700 => Rating::Good,
            b if b >= 600 => Rating::Fair,
            b if b >= 500 => Rating::Poor,
            _ => Rating::VeryPoor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Rating::Excellent => "Excellent",
            Rating::Good => "Good",
            Rating::Fair => "Fair",
            Rating::Poor => "Poor",
            Rating::VeryPoor => "Very Poor",
        }
    }
}

/// Coarse three-way split used by the insights view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Health {
    Healthy,
    Watch,
    AtRisk,
}

impl Health {
    pub fn from_balance(balance: i64) -> Self {
        if balance >= 700 {
            Health::Healthy
        } else if balance >= 600 {
            Health::Watch
        } else {
            Health::AtRisk
        }
    }
}

/// Sums of judged amounts across every account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LedgerTotals {
    pub deposits: u64,
    pub withdrawals: u64,
}

/// A transaction together with the account it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Entry<'a> {
    pub account: &'a str,
    pub person: &'a str,
    #[serde(flatten)]
    pub tx: &'a Transaction,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary<'a> {
    pub id: &'a str,
    pub person: &'a str,
    pub balance: i64,
    pub goal: i64,
    pub rating: Rating,
    pub health: Health,
}

/// Dashboard view of the whole ledger.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerSummary<'a> {
    pub overall_score: i64,
    pub overall_rating: Rating,
    pub total_lies: u32,
    pub goals_reached: usize,
    pub totals: LedgerTotals,
    pub accounts: Vec<AccountSummary<'a>>,
    pub recent: Vec<Entry<'a>>,
    pub top_withdrawals: Vec<Entry<'a>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    accounts: Vec<Account>,
    bounds: BalanceBounds,
}

impl Ledger {
    pub fn new(bounds: BalanceBounds, accounts: Vec<Account>) -> Self {
        let accounts = accounts
            .into_iter()
            .map(|mut a| {
                a.balance = bounds.clamp(a.balance);
                a.goal = bounds.clamp(a.goal);
                a
            })
            .collect();
        Self { accounts, bounds }
    }

    /// The five starter accounts with their opening history.
    pub fn seeded(bounds: BalanceBounds, now: DateTime<Utc>) -> Self {
        let day = Duration::days(1);

        let mut mum = Account::new("mum", "Mum", "👩", 600, 800, now);
        mum.lie_count = 1;
        mum.total_deposits = 25;
        mum.total_withdrawals = 35;
        mum.transactions = vec![
            seed_tx("m1", Direction::Debit, 35, "I lied about the cocoa", "Lying", "Cocoa incident", Severity::Critical, 635, now - day),
            seed_tx("m2", Direction::Credit, 15, "I told mum I was sorry", "Apology", "", Severity::High, 585, now - day * 7),
        ];

        let mut me = Account::new("self", "Self", "🧘", 650, 850, now);
        me.total_deposits = 15;
        me.total_withdrawals = 5;
        me.transactions = vec![
            seed_tx("s1", Direction::Credit, 15, "I resisted buying new shoes", "Resisted Impulse", "", Severity::Medium, 635, now),
            seed_tx("s2", Direction::Debit, 5, "I mumbled when asked about school", "Mumbling", "", Severity::Low, 655, now - day),
        ];

        Self::new(
            bounds,
            vec![
                mum,
                Account::new("dad", "Dad", "👨", 700, 800, now),
                Account::new("teacher", "Teacher", "👩‍🏫", 750, 850, now),
                Account::new("friend", "Friend", "🧑", 700, 800, now),
                me,
            ],
        )
    }

    pub fn bounds(&self) -> BalanceBounds {
        self.bounds
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    fn account_mut(&mut self, id: &str) -> Result<&mut Account, LedgerError> {
        self.accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| LedgerError::UnknownAccount(id.to_string()))
    }

    /// Record `judgment` against an account.
    ///
    /// The balance is clamped into bounds; totals grow by the judged amount
    /// even when the clamp absorbs part of it.
    pub fn apply(
        &mut self,
        account_id: &str,
        text: &str,
        judgment: &Judgment,
        now: DateTime<Utc>,
    ) -> Result<Transaction, LedgerError> {
        let bounds = self.bounds;
        let acc = self.account_mut(account_id)?;

        let old_balance = acc.balance;
        let new_balance = bounds.clamp(old_balance + judgment.signed_amount());

        let tx = Transaction {
            id: Uuid::new_v4().to_string(),
            direction: judgment.direction,
            amount: judgment.amount,
            text: text.to_string(),
            action: judgment.label.clone(),
            rationale: judgment.rationale.clone(),
            severity: judgment.severity,
            old_balance,
            new_balance,
            timestamp: now,
            favorite: false,
        };

        acc.balance = new_balance;
        match judgment.direction {
            Direction::Credit => acc.total_deposits += u64::from(judgment.amount),
            Direction::Debit => acc.total_withdrawals += u64::from(judgment.amount),
        }
        let rule = judgment.rule_id.as_str();
        if DISHONESTY_FAMILY.contains(&rule) {
            acc.lie_count += 1;
        } else if TRUTH_FAMILY.contains(&rule) {
            acc.lie_count = acc.lie_count.saturating_sub(1);
        }
        acc.last_active = now;
        acc.transactions.insert(0, tx.clone());

        Ok(tx)
    }

    pub fn update_goal(&mut self, account_id: &str, goal: i64) -> Result<(), LedgerError> {
        let bounds = self.bounds;
        if !bounds.contains(goal) {
            return Err(LedgerError::GoalOutOfRange {
                goal,
                floor: bounds.floor,
                ceiling: bounds.ceiling,
            });
        }
        self.account_mut(account_id)?.goal = goal;
        Ok(())
    }

    /// Flip the favorite flag; returns the new value.
    pub fn toggle_favorite(&mut self, account_id: &str, tx_id: &str) -> Result<bool, LedgerError> {
        let acc = self.account_mut(account_id)?;
        let tx = acc
            .transactions
            .iter_mut()
            .find(|t| t.id == tx_id)
            .ok_or_else(|| LedgerError::UnknownTransaction {
                account: account_id.to_string(),
                tx: tx_id.to_string(),
            })?;
        tx.favorite = !tx.favorite;
        Ok(tx.favorite)
    }

    /// Mean balance across accounts, rounded. Zero for an empty ledger.
    pub fn overall_score(&self) -> i64 {
        if self.accounts.is_empty() {
            return 0;
        }
        let sum: i64 = self.accounts.iter().map(|a| a.balance).sum();
        (sum as f64 / self.accounts.len() as f64).round() as i64
    }

    pub fn total_lies(&self) -> u32 {
        self.accounts.iter().map(|a| a.lie_count).sum()
    }

    pub fn goals_reached(&self) -> usize {
        self.accounts.iter().filter(|a| a.goal_reached()).count()
    }

    pub fn totals(&self) -> LedgerTotals {
        self.accounts.iter().fold(LedgerTotals::default(), |t, a| LedgerTotals {
            deposits: t.deposits + a.total_deposits,
            withdrawals: t.withdrawals + a.total_withdrawals,
        })
    }

    fn entries(&self) -> impl Iterator<Item = Entry<'_>> {
        self.accounts.iter().flat_map(|a| {
            a.transactions.iter().map(move |tx| Entry {
                account: &a.id,
                person: &a.person,
                tx,
            })
        })
    }

    /// The `n` newest transactions across all accounts. Ties keep account order.
    pub fn recent(&self, n: usize) -> Vec<Entry<'_>> {
        let mut all: Vec<_> = self.entries().collect();
        all.sort_by(|a, b| b.tx.timestamp.cmp(&a.tx.timestamp));
        all.truncate(n);
        all
    }

    /// The `n` largest withdrawals across all accounts, by judged amount.
    pub fn top_withdrawals(&self, n: usize) -> Vec<Entry<'_>> {
        let mut all: Vec<_> = self
            .entries()
            .filter(|e| e.tx.direction == Direction::Debit)
            .collect();
        all.sort_by(|a, b| b.tx.amount.cmp(&a.tx.amount));
        all.truncate(n);
        all
    }

    pub fn summary(&self, recent: usize, top: usize) -> LedgerSummary<'_> {
        let overall_score = self.overall_score();
        LedgerSummary {
            overall_score,
            overall_rating: Rating::from_balance(overall_score),
            total_lies: self.total_lies(),
            goals_reached: self.goals_reached(),
            totals: self.totals(),
            accounts: self
                .accounts
                .iter()
                .map(|a| AccountSummary {
                    id: &a.id,
                    person: &a.person,
                    balance: a.balance,
                    goal: a.goal,
                    rating: a.rating(),
                    health: a.health(),
                })
                .collect(),
            recent: self.recent(recent),
            top_withdrawals: self.top_withdrawals(top),
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn seed_tx(
    id: &str,
    direction: Direction,
    amount: u32,
    text: &str,
    action: &str,
    rationale: &str,
    severity: Severity,
    old_balance: i64,
    timestamp: DateTime<Utc>,
) -> Transaction {
    Transaction {
        id: id.to_string(),
        direction,
        amount,
        text: text.to_string(),
        action: action.to_string(),
        rationale: rationale.to_string(),
        severity,
        old_balance,
        new_balance: old_balance + direction.sign() * i64::from(amount),
        timestamp,
        favorite: false,
    }
}
