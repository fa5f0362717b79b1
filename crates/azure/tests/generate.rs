use azscript_azure::{generate, generate_with_report};
use azscript_core::defaults::default_mapping;
use azscript_core::normalize::NAME_KEYS;
use azscript_core::{
    header, ConfigError, ConfigValue, Environment, FlatMapping, GenerateError, Phase, FOOTER, REQUIRED_KEYS,
};
use chrono::{NaiveDate, NaiveDateTime};
use rstest::{fixture, rstest};

#[fixture]
fn stamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(9, 30, 0).unwrap()
}

fn mapping(env: Environment) -> FlatMapping {
    default_mapping(env)
}

#[rstest]
fn identical_input_gives_identical_registry(stamp: NaiveDateTime) {
    let m = mapping(Environment::Prod);
    assert_eq!(generate(&m, stamp).unwrap(), generate(&m, stamp).unwrap());
}

#[rstest]
#[case(Environment::Dev)]
#[case(Environment::Test)]
#[case(Environment::Preprod)]
#[case(Environment::Prod)]
fn complete_script_is_exact_concatenation(#[case] env: Environment, stamp: NaiveDateTime) {
    let reg = generate(&mapping(env), stamp).unwrap();
    let sections: String = Phase::ASSEMBLY_ORDER.iter().map(|p| reg.section(*p)).collect();
    let expected = format!("{}{sections}{FOOTER}", header(env, stamp));
    assert_eq!(reg.complete().len(), expected.len());
    assert_eq!(reg.complete(), expected);
    for phase in Phase::ASSEMBLY_ORDER {
        assert!(reg.section(phase).ends_with("\n\n"), "{phase:?} keeps its trailing blank line");
    }
    assert!(reg.complete().ends_with("echo \"Deployment completed successfully!\"\n"));
}

#[rstest]
fn order_does_not_depend_on_key_order(stamp: NaiveDateTime) {
    let m = mapping(Environment::Test);
    let mut keys: Vec<_> = m.keys().collect();
    keys.reverse();
    let reversed: FlatMapping = keys.into_iter().map(|k| (k, m.get(k).cloned().unwrap())).collect();
    let a = generate(&m, stamp).unwrap();
    let b = generate(&reversed, stamp).unwrap();
    assert_eq!(a.complete(), b.complete());

    let banners: Vec<_> = Phase::ASSEMBLY_ORDER
        .iter()
        .map(|p| {
            let first_line = a.section(*p).lines().next().unwrap();
            a.complete().find(first_line).unwrap()
        })
        .collect();
    assert!(banners.windows(2).all(|w| w[0] < w[1]));
}

#[rstest]
fn every_required_key_is_required(stamp: NaiveDateTime) {
    for key in REQUIRED_KEYS {
        let mut m = mapping(Environment::Dev);
        m.remove(key);
        let err = generate(&m, stamp).unwrap_err();
        assert_eq!(err, GenerateError::Config(ConfigError::missing(key)), "removing {key}");
        assert!(err.to_string().contains(key));
    }
}

#[rstest]
fn dev_run_uses_normalized_names(stamp: NaiveDateTime) {
    let m = mapping(Environment::Dev);
    let reg = generate(&m, stamp).unwrap();
    assert!(reg.section(Phase::EnvironmentVars).contains("ENV=\"dev\"\n"));
    for key in NAME_KEYS {
        let name = m.text(key).unwrap();
        assert!(reg.complete().contains(name), "{key} = {name} not rendered");
    }
}

#[rstest]
fn prod_run_replaces_placeholders(stamp: NaiveDateTime) {
    let reg = generate(&mapping(Environment::Prod), stamp).unwrap();
    let script = reg.complete();
    assert!(script.contains("RG_NAME=\"itz-prod-jpe-001\"\n"));
    assert!(script.contains("ENVIRONMENT=\"Prod\"\n"));
    assert!(script.contains("SHARED_TAG=\"Environment=Prod Project=ITZ-Chatbot\"\n"));
    assert!(script.contains("--display-name \"ANPI Teams Bot Prod\""));
    assert!(!script.contains("-dev-"));
}

#[rstest]
fn environment_swap_only_changes_environment_text(stamp: NaiveDateTime) {
    let test = generate(&mapping(Environment::Test), stamp).unwrap();
    let prod = generate(&mapping(Environment::Prod), stamp).unwrap();
    let test_lines: Vec<_> = test.complete().lines().collect();
    let prod_lines: Vec<_> = prod.complete().lines().collect();
    assert_eq!(test_lines.len(), prod_lines.len());

    let mut differing = 0;
    for (t, p) in test_lines.iter().zip(&prod_lines) {
        if t != p {
            differing += 1;
            assert_eq!(p.replace("prod", "test").replace("Prod", "Test"), *t);
        }
    }
    assert!(differing > 0);
}

#[rstest]
fn unknown_environment_is_rejected(stamp: NaiveDateTime) {
    let mut m = mapping(Environment::Dev);
    m.insert("environment", "staging");
    assert_eq!(
        generate(&m, stamp).unwrap_err(),
        GenerateError::Config(ConfigError::UnknownEnvironment("staging".into()))
    );
}

#[rstest]
fn numeric_fields_must_be_numbers(stamp: NaiveDateTime) {
    let mut m = mapping(Environment::Dev);
    m.insert("timeout_minutes", "half an hour");
    let err = generate(&m, stamp).unwrap_err();
    assert!(matches!(err, GenerateError::Config(ConfigError::WrongType { ref key, .. }) if key == "timeout_minutes"));
}

#[rstest]
fn origins_accept_json_text(stamp: NaiveDateTime) {
    let mut m = mapping(Environment::Dev);
    m.insert("allowed_origins", r#"["https://only.example"]"#);
    let reg = generate(&m, stamp).unwrap();
    assert!(reg.section(Phase::WebApp).contains(r#"AllowedOrigins='["https://only.example"]'"#));
    assert!(reg.section(Phase::WebApp).contains("<origin>https://only.example</origin>"));

    m.insert("allowed_origins", ConfigValue::Text("https://a, https://b".into()));
    assert!(matches!(
        generate(&m, stamp).unwrap_err(),
        GenerateError::Config(ConfigError::InvalidOrigins { .. })
    ));
}

#[rstest]
fn names_without_placeholder_are_reported(stamp: NaiveDateTime) {
    let mut m = mapping(Environment::Prod);
    m.insert("kv_name", "kv-itz-shared");
    let out = generate_with_report(&m, stamp).unwrap();
    assert_eq!(out.normalized.unplaced, vec!["kv_name"]);
    assert!(out.registry.complete().contains("--vault-name \"kv-itz-shared\""));
}
