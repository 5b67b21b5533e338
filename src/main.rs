use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use judgment::{rules_dir, write_default_rules, JudgmentEngine, RuleTable, Strictness};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;
use trustbank_core::services::ledger::Ledger;
use trustbank_core::services::teller::{Reply, Teller};

#[derive(Parser)]
#[command(
    name = "trustbank",
    about = "Log real-life actions against relationship accounts and keep score of trust"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Classify one piece of text without touching any ledger
    Judge {
        text: String,
        #[arg(long, default_value = "Self")]
        subject: String,
        #[arg(long, default_value = "balanced")]
        strictness: Strictness,
        /// Pin ranged magnitudes
        #[arg(long)]
        seed: Option<u64>,
        /// Rule table to use instead of the embedded default
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// List the rule table in scan order
    Rules {
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Write the default rule table under <root>/rules
    Init {
        #[arg(long, default_value = ".trustbank")]
        root: PathBuf,
    },
    /// Submit one entry to a fresh seeded ledger
    Log {
        #[arg(long)]
        account: String,
        text: String,
        #[arg(long, default_value = ".trustbank")]
        root: PathBuf,
    },
    /// Ratings, goals, totals, recent activity and the biggest withdrawals
    Summary {
        #[arg(long, default_value = ".trustbank")]
        root: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Chat with an account over stdin (`:quit` to leave, `:status` for the summary)
    Chat {
        #[arg(long, default_value = "self")]
        account: String,
        #[arg(long, default_value = ".trustbank")]
        root: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Judge {
            text,
            subject,
            strictness,
            seed,
            rules,
        } => judge(&text, &subject, strictness, seed, rules.as_deref()),
        Cmd::Rules { file } => list_rules(file.as_deref()),
        Cmd::Init { root } => init(&root),
        Cmd::Log {
            account,
            text,
            root,
        } => {
            let mut teller = Teller::open(&root)?;
            let out = teller.submit(&account, &text)?;
            print_reply(&out)
        }
        Cmd::Summary { root, json } => {
            let teller = Teller::open(&root)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&teller.ledger().summary(5, 3))?);
            } else {
                println!("{}", teller.describe());
                print_summary(teller.ledger());
            }
            Ok(())
        }
        Cmd::Chat { account, root } => chat(&account, &root),
    }
}

fn load_table(file: Option<&Path>) -> Result<RuleTable> {
    match file {
        Some(path) => RuleTable::load_from_file(path)
            .with_context(|| format!("loading rule table {}", path.display())),
        None => Ok(RuleTable::builtin().clone()),
    }
}

fn judge(
    text: &str,
    subject: &str,
    strictness: Strictness,
    seed: Option<u64>,
    rules: Option<&Path>,
) -> Result<()> {
    let engine = JudgmentEngine::with_table(load_table(rules)?);
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    match engine.classify_with_rng(text, subject, strictness, &mut rng) {
        Some(j) => println!("{}", serde_json::to_string_pretty(&j)?),
        None => println!("no judgment"),
    }
    Ok(())
}

fn list_rules(file: Option<&Path>) -> Result<()> {
    let table = load_table(file)?;
    println!("{} v{}", table.name, table.version);
    for (i, r) in table.rules().iter().enumerate() {
        println!(
            "{:>2}. {:<18} {:<10} {:<8} {:<8} {}",
            i + 1,
            r.id,
            r.direction.transaction_type(),
            r.magnitude.to_string(),
            r.severity,
            r.keywords.join(", ")
        );
        for o in &r.subject_overrides {
            println!("    {} -> {}", o.subject, o.magnitude);
        }
    }
    Ok(())
}

fn init(root: &Path) -> Result<()> {
    let dir = rules_dir(root);
    let created = write_default_rules(&dir)?;
    if created.is_empty() {
        println!("Rule table already present in {}.", dir.display());
    } else {
        for name in created {
            println!("Wrote {}", dir.join(name).display());
        }
    }
    Ok(())
}

fn print_reply(out: &Reply) -> Result<()> {
    if let Some(tx) = &out.transaction {
        println!("{}", serde_json::to_string_pretty(tx)?);
    }
    println!("{}", out.reply);
    Ok(())
}

fn print_summary(ledger: &Ledger) {
    let s = ledger.summary(5, 3);
    println!(
        "Overall {} ({}), {} of {} goals reached, {} recorded lies",
        s.overall_score,
        s.overall_rating.label(),
        s.goals_reached,
        s.accounts.len(),
        s.total_lies
    );
    println!("Deposits {} / withdrawals {}", s.totals.deposits, s.totals.withdrawals);
    for a in &s.accounts {
        println!(
            "  {:<8} {:>4} / {:<4} {:<10} {:?}",
            a.person,
            a.balance,
            a.goal,
            a.rating.label(),
            a.health
        );
    }
    println!("Recent:");
    for e in &s.recent {
        println!(
            "  {:<8} {} {:>3} {}",
            e.person, e.tx.direction, e.tx.amount, e.tx.action
        );
    }
    println!("Biggest withdrawals:");
    for e in &s.top_withdrawals {
        println!("  {:<8} {:>3} {}", e.person, e.tx.amount, e.tx.text);
    }
}

fn chat(account: &str, root: &Path) -> Result<()> {
    let mut teller = Teller::open(root)?;
    tracing::debug!(account, root = %root.display(), "chat session started");
    println!("{}", teller.describe());
    println!("Chatting with {account}. Type :status for the summary, :quit to leave.");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text == ":quit" {
            break;
        }
        if text == ":status" {
            print_summary(teller.ledger());
            continue;
        }
        if let Some(level) = text.strip_prefix(":strictness ") {
            match level.parse::<Strictness>() {
                Ok(s) => teller.set_strictness(s),
                Err(e) => println!("{e}"),
            }
            continue;
        }

        let out = teller.submit(account, text)?;
        if let Some(tx) = &out.transaction {
            println!(
                "[{} {} {}: {} -> {}]",
                tx.direction, tx.amount, tx.action, tx.old_balance, tx.new_balance
            );
        }
        println!("{}", out.reply);
        stdout.flush()?;
    }
    Ok(())
}
