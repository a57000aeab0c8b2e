use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn colloquy(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("colloquy").unwrap();
    cmd.env("COLLOQUY_DATA_DIR", dir.path());
    cmd
}

#[test]
fn test_help_lists_commands() {
    Command::cargo_bin("colloquy")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("sessions"))
        .stdout(predicate::str::contains("auth"))
        .stdout(predicate::str::contains("settings"));
}

#[test]
fn test_sessions_list_empty() {
    let dir = TempDir::new().unwrap();
    colloquy(&dir)
        .args(["sessions", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved sessions"));
}

#[test]
fn test_sessions_list_json_empty() {
    let dir = TempDir::new().unwrap();
    colloquy(&dir)
        .args(["sessions", "list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn test_auth_show_without_credential() {
    let dir = TempDir::new().unwrap();
    colloquy(&dir)
        .args(["auth", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No credential configured"));
}

#[test]
fn test_auth_set_then_show_masks_key() {
    let dir = TempDir::new().unwrap();
    colloquy(&dir)
        .args(["auth", "set", "hf_testkey12345"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Credential stored"));

    colloquy(&dir)
        .args(["auth", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hf_tes****"))
        .stdout(predicate::str::contains("hf_testkey12345").not());
}

#[test]
fn test_auth_remove_round_trip() {
    let dir = TempDir::new().unwrap();
    colloquy(&dir)
        .args(["auth", "set", "hf_testkey12345"])
        .assert()
        .success();
    colloquy(&dir).args(["auth", "remove"]).assert().success();
    colloquy(&dir)
        .args(["auth", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No credential configured"));
}

#[test]
fn test_settings_show_defaults() {
    let dir = TempDir::new().unwrap();
    colloquy(&dir)
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mistralai/Mistral-7B-Instruct-v0.2"));
}

#[test]
fn test_settings_set_clamps_and_persists() {
    let dir = TempDir::new().unwrap();
    colloquy(&dir)
        .args(["settings", "set", "--max-tokens", "9000", "--model", "phi-2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("max_tokens=1024"))
        .stdout(predicate::str::contains("microsoft/phi-2"));

    colloquy(&dir)
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("microsoft/phi-2"));
}

#[test]
fn test_settings_models_lists_catalog() {
    let dir = TempDir::new().unwrap();
    colloquy(&dir)
        .args(["settings", "models"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Zephyr 7B"))
        .stdout(predicate::str::contains("HuggingFaceH4/zephyr-7b-beta"));
}

#[test]
fn test_chat_without_credential_fails_with_hint() {
    let dir = TempDir::new().unwrap();
    colloquy(&dir)
        .arg("chat")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No API credential configured"));
}

#[test]
fn test_sessions_clear_requires_confirmation() {
    let dir = TempDir::new().unwrap();
    colloquy(&dir)
        .args(["sessions", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--yes"));
}
