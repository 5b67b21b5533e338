// src/services/mod.rs

pub mod assistant;    // templated narration, no side effects
pub mod ledger;       // the ONLY writer of account balances
pub mod teller;       // judge -> apply -> log -> narrate

// Public API
pub use assistant::Assistant;
pub use ledger::Ledger;
pub use teller::Teller;
