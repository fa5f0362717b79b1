use azscript_azure::generate;
use azscript_core::defaults::default_mapping;
use azscript_core::Environment;
use azscript_policy::{lint_registry, Policy};
use chrono::NaiveDate;
use rstest::rstest;

#[rstest]
#[case(Environment::Dev)]
#[case(Environment::Test)]
#[case(Environment::Preprod)]
#[case(Environment::Prod)]
fn rendered_sections_match_their_declarations(#[case] env: Environment) {
    let stamp = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    let reg = generate(&default_mapping(env), stamp).unwrap();
    assert_eq!(lint_registry(&reg), vec![]);
    Policy::new(true).check_registry(&reg).unwrap();
}
