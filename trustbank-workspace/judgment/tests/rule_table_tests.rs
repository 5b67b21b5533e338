use std::fs;

use judgment::assets::{DEFAULT_RULES_NAME, DEFAULT_RULES_TOML};
use judgment::{
    load_rule_table, rules_dir, write_default_rules, CategoryRule, Direction, JudgeError,
    JudgmentEngine, Magnitude, RuleSource, RuleTable, Severity, Strictness,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn rule(id: &str, keywords: &[&str], direction: Direction, magnitude: Magnitude) -> CategoryRule {
    CategoryRule {
        id: id.into(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        direction,
        magnitude,
        label: format!("{id} label"),
        rationale: "Because {subject}.".into(),
        severity: Severity::Medium,
        subject_overrides: vec![],
    }
}

#[test]
fn builtin_table_follows_priority_order() {
    let table = RuleTable::builtin();
    let ids: Vec<&str> = table.rules().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(
        ids,
        [
            "COCOA_INCIDENT",
            "DISHONESTY",
            "CONCEALMENT",
            "CONFLICT",
            "RESISTED_IMPULSE",
            "IMPULSE_SPENDING",
            "PROCRASTINATION",
            "TRUTH",
            "APOLOGY",
            "HELPING",
            "SPEAKING_UP",
            "CONSISTENCY",
        ]
    );

    let pos = |id| table.position(id).unwrap();
    assert!(pos("COCOA_INCIDENT") < pos("DISHONESTY"));
    assert!(pos("DISHONESTY") < pos("TRUTH"));
    assert!(pos("RESISTED_IMPULSE") < pos("IMPULSE_SPENDING"));
    assert!(pos("HELPING") < pos("CONSISTENCY"));
}

#[test]
fn builtin_severity_tiers_descend_within_each_direction() {
    let table = RuleTable::builtin();
    let debits: Vec<Severity> = table
        .rules()
        .iter()
        .filter(|r| r.direction == Direction::Debit)
        .map(|r| r.severity)
        .collect();
    assert!(debits.windows(2).all(|w| w[0] >= w[1]), "{debits:?}");

    let credits: Vec<Severity> = table
        .rules()
        .iter()
        .filter(|r| r.direction == Direction::Credit && r.id != "RESISTED_IMPULSE")
        .map(|r| r.severity)
        .collect();
    assert!(credits.windows(2).all(|w| w[0] >= w[1]), "{credits:?}");
}

#[test]
fn builtin_override_is_limited_to_concealment() {
    let table = RuleTable::builtin();
    let with_overrides: Vec<&str> = table
        .rules()
        .iter()
        .filter(|r| !r.subject_overrides.is_empty())
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(with_overrides, ["CONCEALMENT"]);
    let concealment = table.get("CONCEALMENT").unwrap();
    assert_eq!(concealment.magnitude_for("Mum"), Magnitude::Fixed(35));
    assert_eq!(concealment.magnitude_for("Friend"), Magnitude::Fixed(25));
}

#[test]
fn first_match_normalizes_case_and_zero_width() {
    let table = RuleTable::builtin();
    assert_eq!(table.first_match("I LIED").unwrap().id, "DISHONESTY");
    assert_eq!(table.first_match("I l\u{200B}ied").unwrap().id, "DISHONESTY");
    assert_eq!(table.first_match("I MADE UP a story").unwrap().id, "DISHONESTY");
    assert!(table.first_match("").is_none());
    assert!(table.first_match(" \t\n").is_none());
}

#[test]
fn phrase_keywords_need_the_literal_single_space() {
    let table = RuleTable::builtin();
    for text in [
        "I made  up a story",
        "I made\tup a story",
        "we spoke\n\nup",
        "I came  clean",
    ] {
        assert!(
            table.first_match(text).is_none(),
            "{text:?} matched {:?}",
            table.first_match(text).map(|r| &r.id)
        );
    }
}

#[test]
fn custom_table_scan_order_is_construction_order() {
    let table = RuleTable::new(
        "custom",
        "0.1.0",
        vec![
            rule("GOOD", &["Great"], Direction::Credit, Magnitude::Fixed(10)),
            rule("BAD", &["great"], Direction::Debit, Magnitude::Fixed(10)),
        ],
    )
    .unwrap();
    // Keywords are normalized at construction.
    assert_eq!(table.get("GOOD").unwrap().keywords, ["great"]);

    let engine = JudgmentEngine::with_table(table);
    let mut rng = StdRng::seed_from_u64(1);
    let j = engine
        .classify_with_rng("a great day", "Self", Strictness::Balanced, &mut rng)
        .unwrap();
    assert_eq!(j.rule_id, "GOOD");
}

#[test]
fn invalid_tables_are_rejected() {
    let dup = RuleTable::new(
        "dup",
        "1",
        vec![
            rule("A", &["x"], Direction::Credit, Magnitude::Fixed(1)),
            rule("A", &["y"], Direction::Debit, Magnitude::Fixed(1)),
        ],
    );
    assert!(matches!(dup, Err(JudgeError::InvalidRuleTable(_))));

    let empty_keywords = RuleTable::new(
        "kw",
        "1",
        vec![rule("A", &["", "  "], Direction::Credit, Magnitude::Fixed(1))],
    );
    assert!(matches!(empty_keywords, Err(JudgeError::InvalidRuleTable(_))));

    let inverted = RuleTable::new(
        "range",
        "1",
        vec![rule("A", &["x"], Direction::Credit, Magnitude::Range(9, 3))],
    );
    assert!(matches!(inverted, Err(JudgeError::InvalidRuleTable(_))));

    let mut unlabeled = rule("A", &["x"], Direction::Credit, Magnitude::Fixed(1));
    unlabeled.label = " ".into();
    assert!(matches!(
        RuleTable::new("label", "1", vec![unlabeled]),
        Err(JudgeError::InvalidRuleTable(_))
    ));

    assert!(matches!(
        RuleTable::new("none", "1", vec![]),
        Err(JudgeError::InvalidRuleTable(_))
    ));
}

#[test]
fn toml_magnitudes_parse_as_fixed_or_range() {
    let table = RuleTable::from_toml_str(
        r#"
        name = "mini"
        version = "1"

        [[rules]]
        id = "RANGED"
        keywords = ["walk"]
        direction = "CREDIT"
        magnitude = [5, 8]
        label = "Walked"
        rationale = "Fresh air."
        severity = "LOW"

        [[rules]]
        id = "FIXED"
        keywords = ["run"]
        direction = "CREDIT"
        magnitude = 12
        label = "Ran"
        rationale = "Fitness."
        severity = "LOW"
        "#,
    )
    .unwrap();
    assert_eq!(table.get("RANGED").unwrap().magnitude, Magnitude::Range(5, 8));
    assert_eq!(table.get("FIXED").unwrap().magnitude, Magnitude::Fixed(12));

    let bad = RuleTable::from_toml_str("name = \"x\"\nversion = \"1\"\nrules = 3\n");
    assert!(matches!(bad, Err(JudgeError::Parse(_))));
}

#[test]
fn write_default_rules_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let created = write_default_rules(dir.path()).unwrap();
    assert_eq!(created, [DEFAULT_RULES_NAME]);
    assert!(write_default_rules(dir.path()).unwrap().is_empty());

    let loaded = RuleTable::load_from_file(dir.path().join(DEFAULT_RULES_NAME)).unwrap();
    assert_eq!(&loaded, RuleTable::builtin());
}

const ONE_RULE_TABLE: &str = r#"
name = "house"
version = "2"

[[rules]]
id = "DISHES"
keywords = ["dishes"]
direction = "CREDIT"
magnitude = 40
label = "Did the Dishes"
rationale = "Chores done without being asked."
severity = "MEDIUM"
"#;

#[test]
fn locked_mode_restores_edited_rule_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = rules_dir(dir.path()).join(DEFAULT_RULES_NAME);
    assert_eq!(path, dir.path().join("rules").join(DEFAULT_RULES_NAME));

    let seeded = load_rule_table(&path, true).unwrap();
    assert_eq!(seeded.source, RuleSource::Seeded);
    assert_eq!(&seeded.table, RuleTable::builtin());
    assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_RULES_TOML);

    let untouched = load_rule_table(&path, true).unwrap();
    assert_eq!(untouched.source, RuleSource::Embedded);

    fs::write(&path, ONE_RULE_TABLE).unwrap();
    let locked = load_rule_table(&path, true).unwrap();
    assert_eq!(locked.source, RuleSource::Restored);
    assert_eq!(&locked.table, RuleTable::builtin());
    assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_RULES_TOML);
}

#[test]
fn unlocked_edits_are_validated_before_use() {
    let dir = tempfile::tempdir().unwrap();
    let path = rules_dir(dir.path()).join(DEFAULT_RULES_NAME);
    write_default_rules(rules_dir(dir.path())).unwrap();

    fs::write(&path, ONE_RULE_TABLE).unwrap();
    let edited = load_rule_table(&path, false).unwrap();
    assert_eq!(edited.source, RuleSource::Local);
    assert_eq!(edited.table.name, "house");
    assert_eq!(edited.table.len(), 1);
    assert_eq!(fs::read_to_string(&path).unwrap(), ONE_RULE_TABLE);

    // Duplicate ids parse as TOML but fail validation.
    let rule_block = &ONE_RULE_TABLE[ONE_RULE_TABLE.find("[[rules]]").unwrap()..];
    let duplicated = format!("{ONE_RULE_TABLE}{rule_block}");
    for broken in ["tampered", duplicated.as_str()] {
        fs::write(&path, broken).unwrap();
        let loaded = load_rule_table(&path, false).unwrap();
        assert_eq!(loaded.source, RuleSource::Fallback);
        assert_eq!(&loaded.table, RuleTable::builtin());
        assert_eq!(fs::read_to_string(&path).unwrap(), broken);
    }
}

#[test]
fn custom_rule_files_are_strict() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("house_rules.toml");

    assert!(load_rule_table(&path, false).is_err());
    assert!(!path.exists());

    fs::write(&path, "tampered").unwrap();
    assert!(load_rule_table(&path, true).is_err());

    fs::write(&path, ONE_RULE_TABLE).unwrap();
    let loaded = load_rule_table(&path, true).unwrap();
    assert_eq!(loaded.source, RuleSource::Local);
    assert!(loaded.table.get("DISHES").is_some());
}

#[test]
fn deserializing_a_table_runs_validation() {
    let ok: RuleTable = serde_json::from_str(
        r#"{"name":"j","version":"1","rules":[
            {"id":"A","keywords":["  Walk "],"direction":"CREDIT","magnitude":[5,8],
             "label":"Walked","rationale":"Fresh air.","severity":"LOW"}]}"#,
    )
    .unwrap();
    assert_eq!(ok.rules()[0].keywords, ["walk"]);

    let dup = r#"{"name":"j","version":"1","rules":[
        {"id":"A","keywords":["x"],"direction":"CREDIT","magnitude":1,"label":"L","rationale":"R","severity":"LOW"},
        {"id":"A","keywords":["y"],"direction":"DEBIT","magnitude":2,"label":"L","rationale":"R","severity":"LOW"}]}"#;
    let err = serde_json::from_str::<RuleTable>(dup).unwrap_err();
    assert!(err.to_string().contains("duplicate rule id"), "{err}");

    let inverted = r#"{"name":"j","version":"1","rules":[
        {"id":"A","keywords":["x"],"direction":"CREDIT","magnitude":[9,3],"label":"L","rationale":"R","severity":"LOW"}]}"#;
    assert!(serde_json::from_str::<RuleTable>(inverted).is_err());
    assert!(serde_json::from_str::<RuleTable>(r#"{"name":"j","version":"1","rules":[]}"#).is_err());

    let round_trip: RuleTable =
        serde_json::from_str(&serde_json::to_string(RuleTable::builtin()).unwrap()).unwrap();
    assert_eq!(&round_trip, RuleTable::builtin());
}
