use judgment::{Direction, JudgeError, JudgmentEngine, Severity, Strictness};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn engine() -> JudgmentEngine {
    JudgmentEngine::new()
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

#[test]
fn truth_scales_with_strictness() {
    let e = engine();
    let expected = [
        (Strictness::Lenient, 13), // 12.5 rounds up
        (Strictness::Balanced, 25),
        (Strictness::Strict, 38), // 37.5 rounds up
        (Strictness::Savage, 63), // 62.5 rounds up
    ];
    for (level, amount) in expected {
        let j = e
            .classify_with_rng("I told the truth about my grades", "Mum", level, &mut rng())
            .expect("truth should match");
        assert_eq!(j.rule_id, "TRUTH");
        assert_eq!(j.label, "Telling the Truth");
        assert_eq!(j.direction, Direction::Credit);
        assert_eq!(j.severity, Severity::High);
        assert_eq!(j.amount, amount, "strictness {level}");
    }
}

#[test]
fn fixed_amounts_equal_rounded_base_times_multiplier() {
    let e = engine();
    let cases = [
        ("I lied to her", 35u32),
        ("I bought a game on impulse", 15),
        ("I resisted buying new shoes", 15),
        ("I spoke up in class", 15),
        ("I did my piano practice", 10),
    ];
    for (text, base) in cases {
        for level in Strictness::ALL {
            let j = e
                .classify_with_rng(text, "Self", level, &mut rng())
                .unwrap_or_else(|| panic!("{text:?} should match"));
            let expected = (f64::from(base) * level.multiplier()).round() as u32;
            assert_eq!(j.amount, expected, "{text:?} at {level}");
        }
    }
}

#[test]
fn cocoa_overrides_truth_and_lie_keywords() {
    let e = engine();
    for text in [
        "The cocoa tin was empty",
        "I told the truth about the cocoa",
        "I lied about the COCOA",
        "sorry about the cocoa, honestly",
    ] {
        let j = e
            .classify_with_rng(text, "Mum", Strictness::Balanced, &mut rng())
            .expect("cocoa should match");
        assert_eq!(j.rule_id, "COCOA_INCIDENT", "{text:?}");
        assert_eq!(j.direction, Direction::Debit);
        assert_eq!(j.label, "The Cocoa Incident");
        assert_eq!(j.severity, Severity::Critical);
        assert_eq!(j.amount, 45);
    }

    let savage = e
        .classify_with_rng("cocoa again", "Mum", Strictness::Savage, &mut rng())
        .unwrap();
    assert_eq!(savage.amount, 113); // 112.5 rounds up
}

#[test]
fn conversational_text_is_no_match() {
    let e = engine();
    for text in ["hello, how are you", "what a day", "", "   ", "\u{200B}"] {
        assert!(
            e.classify_with_rng(text, "Self", Strictness::Balanced, &mut rng())
                .is_none(),
            "{text:?} should not be judged"
        );
    }
}

#[test]
fn lying_wins_over_apology_in_the_same_message() {
    // Regression: first match in scan order decides, not intent.
    let j = engine()
        .classify_with_rng("I lied but I'm sorry", "Dad", Strictness::Balanced, &mut rng())
        .unwrap();
    assert_eq!(j.rule_id, "DISHONESTY");
    assert_eq!(j.direction, Direction::Debit);
    assert_eq!(j.amount, 35);
}

#[test]
fn dishonesty_synonyms_are_critical_debits() {
    let e = engine();
    for text in [
        "I was dishonest with my friend",
        "I fabricated an excuse",
        "I made up a story",
        "I gave a false answer",
        "That was an untruth",
    ] {
        let j = e
            .classify_with_rng(text, "Friend", Strictness::Balanced, &mut rng())
            .unwrap();
        assert_eq!(j.rule_id, "DISHONESTY", "{text:?}");
        assert_eq!(j.severity, Severity::Critical);
    }
}

#[test]
fn phrase_keywords_are_not_stretched_across_extra_whitespace() {
    let e = engine();
    for text in ["I made  up a story", "I made\tup a story", "I came  clean"] {
        assert!(
            e.classify_with_rng(text, "Friend", Strictness::Balanced, &mut rng())
                .is_none(),
            "{text:?} should not be judged"
        );
    }

    // Zero-width characters are stripped, so the phrase still lines up.
    let j = e
        .classify_with_rng("I made\u{200B} up a story", "Friend", Strictness::Balanced, &mut rng())
        .unwrap();
    assert_eq!(j.rule_id, "DISHONESTY");
}

#[test]
fn resisting_is_checked_before_spending() {
    let j = engine()
        .classify_with_rng("I resisted buying new shoes", "Self", Strictness::Balanced, &mut rng())
        .unwrap();
    assert_eq!(j.direction, Direction::Credit);
    assert_eq!(j.label, "Resisted Impulse");
    assert_eq!(j.amount, 15);
    assert!(matches!(j.severity, Severity::Low | Severity::Medium));

    // Caller-side clamp from the end-to-end scenario.
    let new_balance = (650 + j.signed_amount()).clamp(300, 900);
    assert_eq!(new_balance, 665);
}

#[test]
fn hiding_from_mum_costs_more() {
    let e = engine();
    let mum = e
        .classify_with_rng("I hid my report card", "Mum", Strictness::Balanced, &mut rng())
        .unwrap();
    let dad = e
        .classify_with_rng("I hid my report card", "Dad", Strictness::Balanced, &mut rng())
        .unwrap();
    assert_eq!(mum.rule_id, "CONCEALMENT");
    assert_eq!(dad.rule_id, "CONCEALMENT");
    assert_eq!(mum.amount, 35);
    assert_eq!(dad.amount, 25);

    let strict_mum = e
        .classify_with_rng("kept it a secret", " mum ", Strictness::Strict, &mut rng())
        .unwrap();
    assert_eq!(strict_mum.amount, 53); // 52.5 rounds up
}

#[test]
fn ranged_rules_keep_direction_and_label_and_stay_in_bounds() {
    let e = engine();
    let mut rng = StdRng::seed_from_u64(42);
    for level in Strictness::ALL {
        let lo = (20.0 * level.multiplier()).round() as u32;
        let hi = (30.0 * level.multiplier()).round() as u32;
        for _ in 0..200 {
            let j = e
                .classify_with_rng("We argued about chores", "Dad", level, &mut rng)
                .unwrap();
            assert_eq!(j.rule_id, "CONFLICT");
            assert_eq!(j.direction, Direction::Debit);
            assert_eq!(j.label, "Defensive Behavior");
            assert!(j.amount >= lo && j.amount <= hi, "{} outside [{lo}, {hi}]", j.amount);
        }
    }
}

#[test]
fn seeded_rng_pins_ranged_amounts() {
    let e = engine();
    let draw = |seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..10)
            .map(|_| {
                e.classify_with_rng("I put off my chores", "Self", Strictness::Strict, &mut rng)
                    .unwrap()
                    .amount
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(draw(99), draw(99));
}

#[test]
fn rationale_names_the_subject() {
    let j = engine()
        .classify_with_rng("I told the truth", "Teacher", Strictness::Balanced, &mut rng())
        .unwrap();
    assert!(j.rationale.contains("Teacher"), "{}", j.rationale);
    assert!(!j.rationale.contains("{subject}"));

    let anon = engine()
        .classify_with_rng("I told the truth", "", Strictness::Balanced, &mut rng())
        .unwrap();
    assert!(!anon.rationale.is_empty());
    assert!(!anon.rationale.contains("{subject}"));
}

#[test]
fn zero_multiplier_rounds_to_zero() {
    let j = engine()
        .classify_with_multiplier("I lied", "Self", 0.0, &mut rng())
        .unwrap()
        .unwrap();
    assert_eq!(j.amount, 0);
    assert_eq!(j.direction, Direction::Debit);
}

#[test]
fn invalid_multiplier_is_rejected_even_without_a_match() {
    let e = engine();
    for bad in [-1.0, f64::NAN, f64::INFINITY] {
        let err = e
            .classify_with_multiplier("hello", "Self", bad, &mut rng())
            .unwrap_err();
        assert!(matches!(err, JudgeError::InvalidArgument(_)), "{bad}");
    }
}

#[test]
fn unknown_strictness_name_is_invalid_argument() {
    assert_eq!("savage".parse::<Strictness>().unwrap(), Strictness::Savage);
    assert_eq!(" Balanced ".parse::<Strictness>().unwrap(), Strictness::Balanced);
    let err = "brutal".parse::<Strictness>().unwrap_err();
    assert!(matches!(err, JudgeError::InvalidArgument(_)));
}

#[test]
fn engine_is_shareable_across_threads() {
    let e = engine();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let e = e.clone();
            std::thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(i);
                e.classify_with_rng("I helped with the dishes", "Dad", Strictness::Balanced, &mut rng)
                    .map(|j| j.rule_id)
            })
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap().as_deref(), Some("HELPING"));
    }
}

#[test]
fn thread_rng_entry_point_matches_deterministic_fields() {
    let j = engine()
        .classify("I yelled at my brother", "Self", Strictness::Balanced)
        .unwrap();
    assert_eq!(j.rule_id, "CONFLICT");
    assert!((20..=30).contains(&j.amount));
}
