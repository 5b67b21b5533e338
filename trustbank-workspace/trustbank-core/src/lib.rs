//! Trust ledger core: accounts, judged transactions and the assistant that narrates them.

pub mod config;
pub mod services;
pub mod utils;

pub use config::CoreConfig;
pub use services::{Assistant, Ledger, Teller};
