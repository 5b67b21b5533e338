//! services/assistant.rs
//! Templated replies for the per-account chats and the global coach.
//!
//! Pure text: reads the ledger, never writes it. Line choice comes from the
//! caller's RNG so replies are reproducible under a seed.

use judgment::Direction;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::services::ledger::{Ledger, Transaction};

/// Pseudo-account that talks about the whole ledger.
pub const GLOBAL_ACCOUNT: &str = "global";

struct Persona {
    greetings: &'static [&'static str],
    deposits: &'static [&'static str],
    withdrawals: &'static [&'static str],
    casual: &'static [&'static str],
}

const MUM: Persona = Persona {
    greetings: &[
        "Hi! I'm Mum's trust assistant. How's the honesty level today?",
        "Hello! Ready to log some progress with Mum?",
        "Hey there. I'm keeping an eye on things for Mum. What's up?",
    ],
    deposits: &[
        "That's a fantastic deposit! Mum really values that kind of transparency.",
        "Great job. Being upfront like that is exactly how you build a solid foundation with Mum.",
        "Excellent. This kind of honesty goes a long way in Mum's book.",
    ],
    withdrawals: &[
        "Ouch. That's a significant withdrawal. Mum is going to be disappointed when she finds out.",
        "This is a setback. We really need to work on being more consistent with Mum.",
        "That's going to hurt your standing. Remember, trust is hard to build but easy to lose.",
    ],
    casual: &[
        "I'm listening. Mum always says consistency is key.",
        "Got it. I'll keep this in mind for Mum's records.",
        "Understood. Every small action counts towards your total trust score.",
    ],
};

const DAD: Persona = Persona {
    greetings: &[
        "Hey. I'm the trust monitor for Dad. Ready to log some progress?",
        "Hi! Dad's big on reliability. How are we doing today?",
        "Hello. Let's see how your standing with Dad is looking.",
    ],
    deposits: &[
        "Good work. Dad really respects this kind of responsibility.",
        "Solid move. Dad likes seeing you take ownership like this.",
        "Nice. This is exactly the kind of follow-through Dad expects.",
    ],
    withdrawals: &[
        "That's a withdrawal. Dad expects better consistency than that.",
        "Not great. Dad values 'doing what you say you'll do' above all else.",
        "This is a hit to your credibility with Dad. Let's try to turn it around.",
    ],
    casual: &[
        "Understood. Dad's always watching the 'big picture'.",
        "I've noted that. Reliability is a marathon, not a sprint.",
        "Got it. Let's keep pushing towards those goals Dad set.",
    ],
};

const TEACHER: Persona = Persona {
    greetings: &[
        "Hello. I'm monitoring your academic integrity for your teacher.",
        "Hi. Ready to log some classroom progress?",
        "Greetings. Let's review your professional standing today.",
    ],
    deposits: &[
        "Excellent. This builds significant professional trust in the classroom.",
        "Very good. Your teacher will definitely notice this level of integrity.",
        "Impressive. This is how you build a reputation as a reliable student.",
    ],
    withdrawals: &[
        "This is a setback for your reputation in class.",
        "Not ideal. Academic trust is very fragile.",
        "Your teacher expects a higher standard of honesty than this.",
    ],
    casual: &[
        "I've recorded your input. Professionalism is built one day at a time.",
        "Understood. Let's stay focused on your academic goals.",
        "Noted. Consistency in class is the key to long-term success.",
    ],
};

const SELF: Persona = Persona {
    greetings: &[
        "Welcome back. This is your internal integrity mirror. How are we doing?",
        "Hi. Ready for some self-reflection today?",
        "Hello. Let's check in on your personal promises.",
    ],
    deposits: &[
        "You're building self-respect. That's the most important currency you have.",
        "Great job. Keeping promises to yourself is the ultimate win.",
        "Excellent. This is how you build true confidence from the inside out.",
    ],
    withdrawals: &[
        "You let yourself down there. Remember: you can't hide from yourself.",
        "This hurts your self-trust. You deserve better from yourself.",
        "Ouch. Breaking a promise to yourself is the fastest way to lose motivation.",
    ],
    casual: &[
        "Reflecting... Your self-trust is the foundation of everything else.",
        "I'm listening. Honesty with yourself is where it all starts.",
        "Understood. You are your own most important judge.",
    ],
};

const FRIEND: Persona = Persona {
    greetings: &[
        "Yo! I'm tracking the vibes and trust for your friend. What's up?",
        "Hey! How's the friendship bank looking today?",
        "Hi! Ready to log some social points?",
    ],
    deposits: &[
        "Solid move. That's what real friends do.",
        "Nice! This kind of loyalty is what keeps friendships strong.",
        "Great. Being a reliable friend is a huge deposit.",
    ],
    withdrawals: &[
        "That's a bit snakey. Trust is hard to build and easy to break.",
        "Not cool. Friendships rely on mutual respect and honesty.",
        "This is a hit to your social standing. Let's try to make it right.",
    ],
    casual: &[
        "I hear you. Friendship is all about that balance.",
        "Got it. Vibes are being monitored.",
        "Understood. Real friends value the truth.",
    ],
};

const GLOBAL: Persona = Persona {
    greetings: &[
        "I am the Integrity Coach. I oversee your entire trust network. How can I help?",
        "Welcome. I'm analyzing your global patterns. What's on your mind?",
        "Hello. I see the big picture of your integrity. Ready for an update?",
    ],
    deposits: &["Keep this momentum."],
    withdrawals: &["This pattern is concerning for your global reputation."],
    casual: &[
        "I'm analyzing your patterns. Your overall score reflects your total reliability.",
        "I see progress in some areas, but others need work. Let's stay focused.",
        "Your global standing is a reflection of every small choice you make.",
    ],
};

fn persona(account_id: &str) -> &'static Persona {
    match account_id {
        "mum" => &MUM,
        "dad" => &DAD,
        "teacher" => &TEACHER,
        "friend" => &FRIEND,
        GLOBAL_ACCOUNT => &GLOBAL,
        _ => &SELF,
    }
}

fn pick<R: Rng + ?Sized>(lines: &'static [&'static str], rng: &mut R) -> &'static str {
    lines.choose(rng).copied().unwrap_or("I'm listening.")
}

fn has_word(text: &str, words: &[&str]) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .any(|w| words.contains(&w))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Assistant;

impl Assistant {
    pub fn new() -> Self {
        Self
    }

    /// Narrate a recorded transaction: `"<line> (+N points). <rationale>"`.
    pub fn transaction_reply<R: Rng + ?Sized>(
        &self,
        account_id: &str,
        tx: &Transaction,
        rng: &mut R,
    ) -> String {
        let p = persona(account_id);
        let (line, sign) = match tx.direction {
            Direction::Credit => (pick(p.deposits, rng), '+'),
            Direction::Debit => (pick(p.withdrawals, rng), '-'),
        };
        let mut out = format!("{line} ({sign}{} points).", tx.amount);
        if !tx.rationale.is_empty() {
            out.push(' ');
            out.push_str(&tx.rationale);
        }
        out
    }

    /// Reply to text that produced no transaction.
    ///
    /// Per-account chats answer a greeting before a status question, so
    /// "hello, how are you" gets a greeting.
    pub fn chat_reply<R: Rng + ?Sized>(
        &self,
        account_id: &str,
        text: &str,
        ledger: &Ledger,
        rng: &mut R,
    ) -> String {
        let lower = text.to_lowercase();
        if account_id == GLOBAL_ACCOUNT {
            return self.coach_reply(&lower, ledger, rng);
        }

        let p = persona(account_id);
        if has_word(&lower, &["hi", "hello", "hey"]) {
            return pick(p.greetings, rng).to_string();
        }
        if let Some(acc) = ledger.account(account_id) {
            if lower.contains("status") || lower.contains("balance") || lower.contains("how are you") {
                return format!(
                    "Your current balance with {} is {}. Your goal is {}. You are {} points away.",
                    acc.person,
                    acc.balance,
                    acc.goal,
                    acc.points_to_goal()
                );
            }
            if lower.contains("advice") || lower.contains("what should i do") {
                if acc.balance < 500 {
                    return "Priority #1: Stop the withdrawals. Don't make any promises you can't keep for the next 48 hours.".to_string();
                }
                return format!(
                    "To reach your goal with {}, focus on 'Radical Honesty': admitting small mistakes before they are found out.",
                    acc.person
                );
            }
        }
        pick(p.casual, rng).to_string()
    }

    fn coach_reply<R: Rng + ?Sized>(&self, lower: &str, ledger: &Ledger, rng: &mut R) -> String {
        let score = ledger.overall_score();
        if lower.contains("score") || lower.contains("how am i doing") {
            return if score >= 750 {
                format!("Your global standing is Excellent ({score}). You are a person of high integrity. Keep protecting your reputation.")
            } else if score >= 600 {
                format!("You're doing okay ({score}), but there's room for improvement. Focus on the accounts below 600.")
            } else {
                format!("Warning: Your global integrity is low ({score}). You need to prioritize radical honesty immediately.")
            };
        }
        if lower.contains("lie") || lower.contains("dishonest") {
            return format!(
                "I see {} recorded instances of dishonesty across all accounts. Each one creates a 'trust debt' that is expensive to pay back.",
                ledger.total_lies()
            );
        }
        if has_word(lower, &["hi", "hello", "hey"]) {
            return pick(GLOBAL.greetings, rng).to_string();
        }
        pick(GLOBAL.casual, rng).to_string()
    }
}
