use azscript_core::defaults::default_mapping;
use azscript_core::{Environment, Phase, SectionRegistry};
use chrono::{NaiveDate, NaiveDateTime};

fn stamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(12, 0, 0).unwrap()
}

fn registry() -> SectionRegistry {
    azscript_azure::generate(&default_mapping(Environment::Test), stamp()).unwrap()
}

#[test]
fn writes_one_script_per_entry() {
    let reg = registry();
    let dir = tempfile::tempdir().unwrap();
    let paths = azscript_export::write_registry(&reg, dir.path()).unwrap();

    let names: Vec<_> = paths.iter().map(|p| p.file_name().unwrap().to_string_lossy().into_owned()).collect();
    let expected: Vec<_> = SectionRegistry::keys().map(|k| format!("{k}.sh")).collect();
    assert_eq!(names, expected);

    let complete = std::fs::read_to_string(dir.path().join("complete_script.sh")).unwrap();
    assert_eq!(complete, reg.complete());
}

#[test]
fn markdown_has_a_block_per_phase_in_order() {
    let md = azscript_export::render_markdown(&registry());
    assert!(md.contains("Generated on 2024-05-01 12:00:00."));
    let positions: Vec<_> = Phase::ALL.iter().map(|p| md.find(&format!("## {}\n\n```bash\n", p.title())).unwrap()).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(md.matches("```bash\n").count(), Phase::ALL.len());
}

#[test]
fn json_carries_every_key() {
    let reg = registry();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.json");
    azscript_export::write_json(&reg, &path).unwrap();

    let v: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(v["environment"], "test");
    for key in SectionRegistry::keys() {
        assert_eq!(v["sections"][key].as_str(), reg.get(key));
    }
}

#[test]
fn preflight_reports_each_tool() {
    let names: Vec<_> = azscript_export::preflight().into_iter().map(|t| t.name).collect();
    assert_eq!(names, azscript_export::REQUIRED_TOOLS);
}
