//! End-to-end tests of the `rollcfg` binary.

use std::fs;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn rollcfg() -> Command {
    let mut cmd: Command = cargo_bin_cmd!("rollcfg");
    cmd.env_remove("NODE_ENV")
        .env_remove("RUST_LOG")
        .env_remove("ROLLCFG_LOG")
        .env_remove("API_URL")
        .env("NO_COLOR", "1");
    cmd
}

fn project(manifest: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("package.json"), manifest).unwrap();
    dir
}

fn resolved(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("stdout is JSON")
}

fn stage<'a>(config: &'a Value, name: &str) -> Option<&'a Value> {
    config["plugins"]
        .as_array()
        .unwrap()
        .iter()
        .find(|plugin| plugin["name"] == name)
}

#[test]
fn help_flag_works() {
    rollcfg()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("resolve"));
}

#[test]
fn stages_lists_pipeline_order() {
    rollcfg()
        .arg("stages")
        .assert()
        .success()
        .stdout(predicate::str::contains(" 1. styles"))
        .stdout(predicate::str::contains("10. minify      terser"));
}

#[test]
fn resolve_prints_development_config() {
    let dir = project(r#"{ "name": "app", "version": "1.0.0" }"#);

    let config = resolved(rollcfg().args(["resolve", "--root"]).arg(dir.path()));

    assert_eq!(config["input"], "src/index.ts");
    assert_eq!(config["output"][0]["dir"], "dist");
    assert_eq!(config["output"][0]["sourcemap"], true);
    assert!(stage(&config, "terser").is_none());
    assert!(stage(&config, "commonjs").is_some());
}

#[test]
fn production_flag_and_disable() {
    let dir = project(r#"{ "name": "app", "dependencies": { "react": "*" } }"#);

    let config = resolved(
        rollcfg()
            .args(["--quiet", "resolve", "--compact", "--production", "--library", "--disable", "strip"])
            .arg("--root")
            .arg(dir.path()),
    );

    assert!(stage(&config, "terser").is_some());
    assert!(stage(&config, "strip").is_none());
    assert_eq!(config["external"]["packages"], serde_json::json!(["react"]));
}

#[test]
fn json_file_then_env_then_flags() {
    let dir = project(r#"{ "name": "app" }"#);
    fs::write(
        dir.path().join("rollcfg.toml"),
        "input = \"src/from-toml.ts\"\nminify = true\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("rollcfg.json"),
        r#"{ "output": { "file": "dist/app.js", "format": "cjs" }, "minify": false }"#,
    )
    .unwrap();

    let config = resolved(
        rollcfg()
            .env("ROLLCFG_PLUGINS__JSON", "false")
            .args(["resolve", "--sourcemap", "hidden", "--root"])
            .arg(dir.path()),
    );

    assert_eq!(config["input"], "src/from-toml.ts");
    assert_eq!(config["output"][0]["file"], "dist/app.js");
    assert_eq!(config["output"][0]["sourcemap"], "hidden");
    assert!(stage(&config, "terser").is_none());
    assert!(stage(&config, "json").is_none());
}

#[test]
fn node_env_from_process_selects_production() {
    let dir = project(r#"{ "name": "app" }"#);

    let config = resolved(
        rollcfg()
            .env("NODE_ENV", "production")
            .args(["resolve", "--root"])
            .arg(dir.path()),
    );

    assert!(stage(&config, "terser").is_some());
    assert_eq!(config["output"][0]["sourcemap"], false);
}

#[test]
fn missing_manifest_fails() {
    let dir = TempDir::new().unwrap();

    rollcfg()
        .args(["resolve", "--root"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("package.json not found"));
}

#[test]
fn invalid_injection_name_fails() {
    let dir = project(r#"{ "name": "app" }"#);
    fs::write(dir.path().join("rollcfg.json"), r#"{ "inject": { "a-b": 1 } }"#).unwrap();

    rollcfg()
        .args(["resolve", "--root"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("a-b"));
}

#[test]
fn unknown_stage_in_config_file_fails() {
    let dir = project(r#"{ "name": "app" }"#);
    fs::write(dir.path().join("rollcfg.json"), r#"{ "plugins": { "uglify": false } }"#).unwrap();

    rollcfg()
        .args(["resolve", "--root"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("uglify"));
}

#[test]
fn missing_config_flag_file_fails() {
    let dir = project(r#"{ "name": "app" }"#);

    rollcfg()
        .args(["resolve", "--config", "nope.json", "--root"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

fn replaced_api_url(config: &Value) -> &Value {
    &stage(config, "replace").expect("replace stage")["options"]["values"]["process.env.API_URL"]
}

fn dotenv_project() -> TempDir {
    let dir = project(r#"{ "name": "app" }"#);
    fs::write(dir.path().join("rollcfg.json"), r#"{ "exposeEnv": ["API_URL"] }"#).unwrap();
    fs::write(dir.path().join(".env"), "API_URL=https://api.example.test\n").unwrap();
    dir
}

#[test]
fn dotenv_values_reach_replacements() {
    let dir = dotenv_project();

    let config = resolved(rollcfg().args(["resolve", "--root"]).arg(dir.path()));

    assert_eq!(replaced_api_url(&config), "\"https://api.example.test\"");
}

#[test]
fn process_environment_wins_over_dotenv() {
    let dir = dotenv_project();

    let config = resolved(
        rollcfg()
            .env("API_URL", "https://shell.test")
            .args(["resolve", "--root"])
            .arg(dir.path()),
    );

    assert_eq!(replaced_api_url(&config), "\"https://shell.test\"");
}

#[test]
fn no_dotenv_flag_skips_the_file() {
    let dir = dotenv_project();

    let config = resolved(rollcfg().args(["resolve", "--no-dotenv", "--root"]).arg(dir.path()));

    assert_eq!(replaced_api_url(&config), "\"\"");
}

#[test]
fn log_variable_is_not_a_request_field() {
    let dir = project(r#"{ "name": "app" }"#);

    let config = resolved(
        rollcfg()
            .env("ROLLCFG_LOG", "debug")
            .args(["--quiet", "resolve", "--compact", "--root"])
            .arg(dir.path()),
    );

    assert!(config.get("log").is_none());
    assert!(config.get("LOG").is_none());
}
