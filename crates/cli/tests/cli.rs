use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn azscript() -> Command {
    Command::cargo_bin("azscript").expect("Failed to locate azscript binary")
}

fn init_config(dir: &TempDir, env: &str) -> PathBuf {
    let path = dir.path().join(format!("{env}.yaml"));
    azscript().args(["init", "--env", env, "-o"]).arg(&path).assert().success();
    path
}

fn generate(file: &Path) -> Command {
    let mut cmd = azscript();
    cmd.arg("generate").arg("-f").arg(file);
    cmd
}

#[test]
fn init_then_generate_prints_complete_script() {
    let dir = TempDir::new().unwrap();
    let cfg = init_config(&dir, "test");
    generate(&cfg)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("#!/bin/bash\n"))
        .stdout(predicate::str::contains("# For environment: test\n"))
        .stdout(predicate::str::contains("ENV=\"test\"\n"))
        .stdout(predicate::str::contains("RG_NAME=\"itz-test-jpe-001\"\n"))
        .stdout(predicate::str::ends_with("echo \"Deployment completed successfully!\"\n"));
}

#[test]
fn env_flag_overrides_file() {
    let dir = TempDir::new().unwrap();
    let cfg = init_config(&dir, "dev");
    generate(&cfg)
        .args(["--env", "prod", "--set", "timeout_minutes=45"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ENV=\"prod\"\n"))
        .stdout(predicate::str::contains("TimeoutMinutes=45 \\\n"));
}

#[test]
fn digit_only_secrets_keep_leading_zeros() {
    let dir = TempDir::new().unwrap();
    let cfg = init_config(&dir, "dev");
    generate(&cfg)
        .args(["--set", "ms_app_password=0012345", "--set", "jwt_secret_key=000987"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MS_APP_PASSWORD=\"0012345\"\n"))
        .stdout(predicate::str::contains("--value \"000987\""));
}

#[test]
fn prints_a_single_section() {
    let dir = TempDir::new().unwrap();
    let cfg = init_config(&dir, "dev");
    generate(&cfg)
        .args(["--section", "bot_service"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# ===== Bot Service =====\n"))
        .stdout(predicate::str::contains("#!/bin/bash").not());

    generate(&cfg)
        .args(["--section", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown section 'nope'"));
}

#[test]
fn missing_key_names_the_key() {
    let dir = TempDir::new().unwrap();
    let cfg = dir.path().join("partial.yaml");
    std::fs::write(&cfg, "environment: dev\n").unwrap();
    generate(&cfg)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing configuration key 'subscription_id'"));
}

#[test]
fn strict_placeholders_reject_shared_names() {
    let dir = TempDir::new().unwrap();
    let cfg = init_config(&dir, "dev");
    generate(&cfg).args(["--set", "kv_name=kv-itz-shared"]).assert().success();
    generate(&cfg)
        .args(["--set", "kv_name=kv-itz-shared", "--strict-placeholders"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("kv_name"));
}

#[test]
fn writes_scripts_markdown_and_json() {
    let dir = TempDir::new().unwrap();
    let cfg = init_config(&dir, "preprod");
    let out = dir.path().join("out");
    let md = dir.path().join("deploy.md");
    let json = dir.path().join("deploy.json");
    generate(&cfg)
        .arg("--out")
        .arg(&out)
        .arg("--markdown")
        .arg(&md)
        .arg("--json")
        .arg(&json)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(out.join("complete_script.sh").is_file());
    assert!(out.join("network_verification.sh").is_file());
    assert!(std::fs::read_to_string(&md).unwrap().contains("## Teams Integration\n"));
    assert!(std::fs::read_to_string(&json).unwrap().contains("\"environment\": \"preprod\""));
}

#[test]
fn init_can_generate_secret() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cfg.yaml");
    azscript().args(["init", "--env", "dev", "--generate-secret", "-o"]).arg(&path).assert().success();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(!text.contains("replace-with-generated-secret"));
    assert!(text.contains("jwt_secret_key:"));
}

#[test]
fn secret_is_forty_characters() {
    let out = azscript().arg("secret").assert().success().get_output().stdout.clone();
    let secret = String::from_utf8(out).unwrap();
    assert_eq!(secret.trim_end_matches('\n').chars().count(), 40);
}

#[test]
fn unknown_environment_is_a_usage_error() {
    azscript()
        .args(["init", "--env", "staging"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown environment 'staging'"));
}
