mod common;

use anyhow::Result;
use predicates::prelude::*;

use common::*;

#[test]
fn test_cli_help_command() {
    let mut cmd = fraggroup_cmd();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("group"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_group_writes_default_output() -> Result<()> {
    let env = TestEnvironment::new()?;
    let input = env.create_input_file("batch.csv", &fragment_table(&TWO_FAMILIES))?;

    let mut cmd = fraggroup_cmd();
    cmd.arg("group").arg("-i").arg(&input).arg("--quiet");
    cmd.assert().success();

    let output = env.path("batch_grouped.csv");
    assert!(output.exists(), "Output file should exist");

    let lines = read_lines(&output)?;
    assert_eq!(lines[0], "GroupId;Names;Authors;Sequence;Length");
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], "0;F1+F4;author1+author4;AAAAAAAAAACCCCCCCCCC;20");

    Ok(())
}

#[test]
fn test_group_json_output() -> Result<()> {
    let env = TestEnvironment::new()?;
    let input = env.create_input_file("batch.csv", &fragment_table(&TWO_FAMILIES))?;
    let output = env.path("orders.csv");

    let mut cmd = fraggroup_cmd();
    cmd.arg("group")
        .arg("-i").arg(&input)
        .arg("-o").arg(&output)
        .arg("--json");

    let assert = cmd.assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
    let json: serde_json::Value = serde_json::from_str(&stdout)?;

    assert_eq!(json["records"].as_array().map(|r| r.len()), Some(3));
    assert_eq!(json["converged"], serde_json::Value::Bool(true));
    assert!(output.exists());

    Ok(())
}

#[test]
fn test_group_aggressive_flag() -> Result<()> {
    let env = TestEnvironment::new()?;
    let input = env.create_input_file("batch.csv", &fragment_table(&TWO_FAMILIES))?;
    let output = env.path("merged.csv");

    let mut cmd = fraggroup_cmd();
    cmd.arg("group")
        .arg("-i").arg(&input)
        .arg("-o").arg(&output)
        .arg("--preference").arg("-1000")
        .arg("--aggressive")
        .arg("--quiet");
    cmd.assert().success();

    let lines = read_lines(&output)?;
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("0;F1+F2;"));

    Ok(())
}

#[test]
fn test_convergence_warning_reported_once() -> Result<()> {
    let env = TestEnvironment::new()?;
    let input = env.create_input_file("batch.csv", &fragment_table(&TWO_FAMILIES))?;

    let mut cmd = fraggroup_cmd();
    cmd.arg("group")
        .arg("-i").arg(&input)
        .arg("--max-iterations").arg("5")
        .arg("--convergence-window").arg("2")
        .arg("--quiet");

    let assert = cmd.assert().success();
    let stderr = String::from_utf8(assert.get_output().stderr.clone())?;
    assert_eq!(stderr.matches("did not converge").count(), 1, "stderr: {}", stderr);

    Ok(())
}

#[test]
fn test_malformed_input_exit_code() -> Result<()> {
    let env = TestEnvironment::new()?;
    let input = env.create_input_file("bad.csv", &fragment_table(&["ACGT", "ACXGT"]))?;

    let mut cmd = fraggroup_cmd();
    cmd.arg("group").arg("-i").arg(&input).arg("--quiet");

    cmd.assert()
        .code(4)
        .stderr(predicate::str::contains("Malformed input in record 2"));
    assert!(!env.path("bad_grouped.csv").exists());

    Ok(())
}

#[test]
fn test_invalid_damping_exit_code() -> Result<()> {
    let env = TestEnvironment::new()?;
    let input = env.create_input_file("batch.csv", &fragment_table(&TWO_FAMILIES))?;

    let mut cmd = fraggroup_cmd();
    cmd.arg("group").arg("-i").arg(&input).arg("--damping").arg("1.5");

    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("damping"));

    Ok(())
}

#[test]
fn test_missing_input_exit_code() -> Result<()> {
    let env = TestEnvironment::new()?;

    let mut cmd = fraggroup_cmd();
    cmd.arg("group").arg("-i").arg(env.path("nowhere.csv"));

    cmd.assert().code(3);

    Ok(())
}

#[test]
fn test_config_print_and_check() -> Result<()> {
    let env = TestEnvironment::new()?;
    let path = env.path("fraggroup.toml");

    fraggroup_cmd()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[clustering]"))
        .stdout(predicate::str::contains("CGTCTC"));

    fraggroup_cmd()
        .arg("config")
        .arg("--output").arg(&path)
        .assert()
        .success();
    assert!(path.exists());

    fraggroup_cmd()
        .arg("config")
        .arg("--check").arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"));

    Ok(())
}

#[test]
fn test_config_from_environment() -> Result<()> {
    let env = TestEnvironment::new()?;
    let input = env.create_input_file("batch.csv", &fragment_table(&TWO_FAMILIES))?;
    let config = env.create_input_file("merge.toml", "[grouping]\naggressive = true\n[clustering]\npreference = -1000.0\n")?;
    let output = env.path("out.csv");

    let mut cmd = fraggroup_cmd();
    cmd.arg("group")
        .arg("-i").arg(&input)
        .arg("-o").arg(&output)
        .arg("--quiet")
        .env("FRAGGROUP_CONFIG", &config);
    cmd.assert().success();

    assert_eq!(read_lines(&output)?.len(), 4);

    Ok(())
}
