//! services/teller.rs
//! Front desk for a trust ledger session: judge the text, apply it, log it, narrate it.

use anyhow::{Context, Result};
use chrono::Utc;
use judgment::{load_rule_table, JudgmentEngine, Strictness};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::json;
use std::path::Path;

use crate::config::CoreConfig;
use crate::services::assistant::{Assistant, GLOBAL_ACCOUNT};
use crate::services::ledger::{BalanceBounds, Ledger, LedgerError, Transaction};
use crate::utils::logbook;

/// Result of [`Teller::submit`].
#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    /// `None` when the text was conversation rather than a judged action.
    pub transaction: Option<Transaction>,
    pub reply: String,
}

pub struct Teller {
    config: CoreConfig,
    engine: JudgmentEngine,
    ledger: Ledger,
    assistant: Assistant,
    rng: StdRng,
}

impl Teller {
    /// Load `<root>/config.toml` (or defaults) and start from the seeded ledger.
    pub fn open(root: &Path) -> Result<Self> {
        let config = CoreConfig::load(root)?;
        Self::from_config(config)
    }

    pub fn from_config(config: CoreConfig) -> Result<Self> {
        let engine = load_engine(&config)?;
        let rng = match config.assistant.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let ledger = Ledger::seeded(BalanceBounds::from(&config.ledger), Utc::now());

        tracing::info!(
            system = %config.system.name,
            version = %config.system.version,
            rules = %engine.table().name,
            rules_version = %engine.table().version,
            strictness = %config.judgment.strictness,
            "teller ready"
        );

        Ok(Self {
            config,
            engine,
            ledger,
            assistant: Assistant::new(),
            rng,
        })
    }

    /// Replace the seeded ledger, e.g. with one restored by the caller.
    pub fn with_ledger(mut self, ledger: Ledger) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn engine(&self) -> &JudgmentEngine {
        &self.engine
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// One-line banner: system name, version, rule table and strictness.
    pub fn describe(&self) -> String {
        let table = self.engine.table();
        format!(
            "{} v{} (rules {} v{}, {} strictness)",
            self.config.system.name,
            self.config.system.version,
            table.name,
            table.version,
            self.strictness()
        )
    }

    pub fn strictness(&self) -> Strictness {
        self.config.judgment.strictness
    }

    pub fn set_strictness(&mut self, strictness: Strictness) {
        tracing::info!(from = %self.strictness(), to = %strictness, "strictness changed");
        self.config.judgment.strictness = strictness;
    }

    /// Handle one message typed into an account's chat.
    ///
    /// The global account only chats. Everywhere else the text is judged
    /// against the account's person; a match is applied to the ledger and
    /// logged, anything else gets a conversational reply.
    ///
    /// # Errors
    /// * Unknown account id.
    /// * Logbook write failure (the ledger has already been updated).
    pub fn submit(&mut self, account_id: &str, text: &str) -> Result<Reply> {
        if account_id == GLOBAL_ACCOUNT {
            let reply = self
                .assistant
                .chat_reply(GLOBAL_ACCOUNT, text, &self.ledger, &mut self.rng);
            return Ok(Reply { transaction: None, reply });
        }

        let person = self
            .ledger
            .account(account_id)
            .map(|a| a.person.clone())
            .ok_or_else(|| LedgerError::UnknownAccount(account_id.to_string()))?;

        let strictness = self.strictness();
        let Some(judgment) = self
            .engine
            .classify_with_rng(text, &person, strictness, &mut self.rng)
        else {
            tracing::debug!(account = account_id, "no judgment; replying conversationally");
            let reply = self
                .assistant
                .chat_reply(account_id, text, &self.ledger, &mut self.rng);
            return Ok(Reply { transaction: None, reply });
        };

        let tx = self.ledger.apply(account_id, text, &judgment, Utc::now())?;
        tracing::info!(
            account = account_id,
            rule = %judgment.rule_id,
            direction = %tx.direction,
            amount = tx.amount,
            old_balance = tx.old_balance,
            new_balance = tx.new_balance,
            "transaction recorded"
        );

        if self.config.logbook.enabled {
            logbook::append_transaction(&self.config.logbook.path, account_id, &tx)
                .context("append transaction to logbook")?;
        }

        let reply = self.assistant.transaction_reply(account_id, &tx, &mut self.rng);
        Ok(Reply { transaction: Some(tx), reply })
    }

    pub fn update_goal(&mut self, account_id: &str, goal: i64) -> Result<()> {
        self.ledger.update_goal(account_id, goal)?;
        if self.config.logbook.enabled {
            logbook::emit_event(
                &self.config.logbook.path,
                "goal_updated",
                json!({ "account": account_id, "goal": goal }),
                &Utc::now().to_rfc3339(),
            )?;
        }
        Ok(())
    }

    pub fn toggle_favorite(&mut self, account_id: &str, tx_id: &str) -> Result<bool> {
        Ok(self.ledger.toggle_favorite(account_id, tx_id)?)
    }
}

fn load_engine(config: &CoreConfig) -> Result<JudgmentEngine> {
    let Some(path) = &config.judgment.rules_path else {
        return Ok(JudgmentEngine::new());
    };
    let loaded = load_rule_table(path, config.judgment.locked)?;
    tracing::debug!(path = %path.display(), source = ?loaded.source, "rule table loaded");
    Ok(JudgmentEngine::with_table(loaded.table))
}
