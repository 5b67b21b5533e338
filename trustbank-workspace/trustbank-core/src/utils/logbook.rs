// src/utils/logbook.rs
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::{fs, io::Write, path::Path};

use crate::services::ledger::Transaction;

#[derive(Serialize)]
struct TransactionLine<'a> {
    ts: String,
    event: &'static str,
    account: &'a str,
    #[serde(flatten)]
    tx: &'a Transaction,
}

fn append_line(path: &Path, json: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create_dir_all({:?})", dir))?;
    }
    let mut f = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open logbook {:?}", path))?;
    writeln!(f, "{}", json)?;
    Ok(())
}

pub fn append_transaction(path: &Path, account: &str, tx: &Transaction) -> Result<()> {
    let line = TransactionLine {
        ts: tx.timestamp.to_rfc3339(),
        event: "transaction",
        account,
        tx,
    };
    append_line(path, &serde_json::to_string(&line)?)
}

pub fn emit_event(path: &Path, event: &str, data: Value, ts: &str) -> Result<()> {
    let line = serde_json::json!({
        "timestamp": ts,
        "event": event,
        "data": data
    });
    append_line(path, &serde_json::to_string(&line)?)
}
