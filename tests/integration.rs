use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use mapkey::inject::{ApiKey, CONFIRMATION, FALLBACK_KEY, PLACEHOLDER, inject_file, substitute};

const SCRIPT_TAG: &str =
    r#"<script src="https://maps.example/api?key=YOUR_GOOGLE_MAPS_API_KEY"></script>"#;

fn run_binary(site_dir: &Path, api_key: Option<&str>, extra_args: &[&str]) -> Output {
    run_binary_with_env(site_dir, api_key, extra_args, &[])
}

fn run_binary_with_env(
    site_dir: &Path,
    api_key: Option<&str>,
    extra_args: &[&str],
    envs: &[(&str, &str)],
) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mapkey"));
    cmd.current_dir(site_dir)
        .args(extra_args)
        .env_remove("GOOGLE_MAPS_API_KEY")
        .env_remove("MAPKEY_SITE_DIR")
        .env_remove("MAPKEY_STRICT")
        .env_remove("RUST_LOG");
    if let Some(key) = api_key {
        cmd.env("GOOGLE_MAPS_API_KEY", key);
    }
    cmd.envs(envs.iter().copied());
    cmd.output().expect("failed to spawn mapkey")
}

#[test]
fn script_tag_receives_configured_key() {
    let file = tempfile::NamedTempFile::new().unwrap();
    fs::write(file.path(), SCRIPT_TAG).unwrap();

    let report = inject_file(file.path(), &ApiKey::resolve(Some("AIzaTest123".into()))).unwrap();

    assert_eq!(report.replacements, 1);
    assert_eq!(
        fs::read_to_string(file.path()).unwrap(),
        r#"<script src="https://maps.example/api?key=AIzaTest123"></script>"#
    );
}

#[test]
fn script_tag_keeps_fallback_without_key() {
    let file = tempfile::NamedTempFile::new().unwrap();
    fs::write(file.path(), SCRIPT_TAG).unwrap();

    let report = inject_file(file.path(), &ApiKey::resolve(None)).unwrap();

    assert!(report.used_fallback);
    let written = fs::read_to_string(file.path()).unwrap();
    assert!(written.contains(&format!("key={FALLBACK_KEY}")));
}

#[test]
fn replacement_count_matches_placeholder_count() {
    let page = format!(
        "<head>{SCRIPT_TAG}</head>\n<body data-key=\"{PLACEHOLDER}\">\n<!-- {PLACEHOLDER} --></body>"
    );
    let result = substitute(&page, "K-42");
    assert_eq!(result.replacements, 3);
    assert_eq!(result.text.matches("K-42").count(), 3);
    assert_eq!(result.text, page.replace(PLACEHOLDER, "K-42"));
}

#[test]
fn binary_injects_index_in_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("index.html");
    fs::write(&index, SCRIPT_TAG).unwrap();

    let output = run_binary(dir.path(), Some("AIza$&Test"), &[]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), CONFIRMATION);
    assert_eq!(
        fs::read_to_string(&index).unwrap(),
        r#"<script src="https://maps.example/api?key=AIza$&Test"></script>"#
    );
}

#[test]
fn binary_with_empty_key_uses_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("index.html");
    fs::write(&index, SCRIPT_TAG).unwrap();

    let output = run_binary(dir.path(), Some(""), &[]);

    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&index).unwrap(), SCRIPT_TAG);
}

#[test]
fn binary_fails_when_index_is_missing() {
    let dir = tempfile::tempdir().unwrap();

    let output = run_binary(dir.path(), Some("AIzaTest123"), &[]);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read"));
    assert!(!dir.path().join("index.html").exists());
}

#[test]
fn binary_strict_mode_refuses_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("index.html");
    fs::write(&index, SCRIPT_TAG).unwrap();

    let output = run_binary(dir.path(), None, &["--strict"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no API key configured"));
    assert_eq!(fs::read_to_string(&index).unwrap(), SCRIPT_TAG);
}

#[test]
fn binary_strict_env_numeric_refuses_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("index.html");
    fs::write(&index, SCRIPT_TAG).unwrap();

    let output = run_binary_with_env(dir.path(), None, &[], &[("MAPKEY_STRICT", "1")]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no API key configured"));
    assert_eq!(fs::read_to_string(&index).unwrap(), SCRIPT_TAG);
}

#[test]
fn binary_api_key_flag_overrides_env() {
    let dir = tempfile::tempdir().unwrap();
    let index = dir.path().join("index.html");
    fs::write(&index, SCRIPT_TAG).unwrap();

    let output = run_binary(dir.path(), Some("from-env"), &["--api-key", "from-flag"]);

    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(&index).unwrap(),
        r#"<script src="https://maps.example/api?key=from-flag"></script>"#
    );
}

#[test]
fn binary_site_dir_targets_other_directory() {
    let cwd = tempfile::tempdir().unwrap();
    let site = tempfile::tempdir().unwrap();
    let index = site.path().join("index.html");
    fs::write(&index, SCRIPT_TAG).unwrap();

    let site_arg = site.path().to_str().unwrap();
    let output = run_binary(cwd.path(), Some("AIzaTest123"), &["--site-dir", site_arg]);

    assert!(output.status.success());
    assert!(fs::read_to_string(&index).unwrap().contains("key=AIzaTest123"));
    assert!(!cwd.path().join("index.html").exists());
}
