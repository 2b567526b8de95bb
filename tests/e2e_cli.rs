//! CLI end-to-end tests
//!
//! Tests for the cinefeed command-line interface.

mod common;

use assert_cmd::prelude::*;
use cinefeed_common::MediaKey;
use common::{movie_json, TmdbMock};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::{tempdir, TempDir};

/// Get a command for the cinefeed binary
#[allow(deprecated)]
fn cinefeed_cmd() -> Command {
    let mut cmd = Command::cargo_bin("cinefeed").unwrap();
    cmd.env_remove("TMDB_API_KEY").env_remove("RUST_LOG");
    cmd
}

/// Write a config whose continue-watching file lives in the temp dir.
fn write_config(dir: &Path, extra: &str) -> PathBuf {
    let config_file = dir.join("cinefeed.toml");
    let storage = dir.join("continue.json");
    fs::write(
        &config_file,
        format!(
            "[storage]\ncontinue_watching_path = {:?}\n{}",
            storage.to_string_lossy(),
            extra
        ),
    )
    .unwrap();
    config_file
}

fn with_config() -> (TempDir, PathBuf) {
    let temp = tempdir().unwrap();
    let config = write_config(temp.path(), "");
    (temp, config)
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = cinefeed_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = cinefeed_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("cinefeed"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_version_flag() {
    let mut cmd = cinefeed_cmd();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cinefeed"));
}

#[test]
fn test_cli_version_command() {
    let mut cmd = cinefeed_cmd();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_hero_help() {
    let mut cmd = cinefeed_cmd();
    cmd.args(["hero", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("small-screen"));
}

#[test]
fn test_cli_config_validation() {
    let temp = tempdir().unwrap();
    let config_file = write_config(
        temp.path(),
        "[hero]\ndefault_delay_ms = 8000\nunmuted_policy = { mode = \"disable\" }\n",
    );

    let mut cmd = cinefeed_cmd();
    cmd.args(["validate", config_file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("8000 ms"))
        .stdout(predicate::str::contains("Disable"));
}

#[test]
fn test_cli_config_validation_rejects_zero_timeout() {
    let temp = tempdir().unwrap();
    let config_file = write_config(temp.path(), "[catalog]\ntimeout_secs = 0\n");

    let mut cmd = cinefeed_cmd();
    cmd.args(["validate", config_file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("timeout_secs"));
}

#[test]
fn test_cli_hero_requires_api_key() {
    let (_temp, config) = with_config();
    let mut cmd = cinefeed_cmd();
    cmd.args(["--config", config.to_str().unwrap(), "hero"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("TMDB_API_KEY"));
}

#[test]
fn test_cli_continue_empty_list() {
    let (_temp, config) = with_config();
    let mut cmd = cinefeed_cmd();
    cmd.args(["--config", config.to_str().unwrap(), "continue", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("empty"));
}

#[test]
fn test_cli_continue_add_list_remove() {
    let (temp, config) = with_config();
    let config = config.to_str().unwrap();

    cinefeed_cmd()
        .args(["--config", config, "continue", "add", "movie", "550", "--title", "Fight Club"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded movie/550"));
    cinefeed_cmd()
        .args([
            "--config", config, "continue", "add", "tv", "1399", "--season", "2", "--episode", "5",
            "--title", "Game of Thrones",
        ])
        .assert()
        .success();

    cinefeed_cmd()
        .args(["--config", config, "continue", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("movie/550  Fight Club"))
        .stdout(predicate::str::contains("tv/1399  Game of Thrones  Watching S2 Episode-5"));

    let stored = fs::read_to_string(temp.path().join("continue.json")).unwrap();
    assert!(stored.contains("\"type\": \"tv\""));

    cinefeed_cmd()
        .args(["--config", config, "continue", "remove", "movie", "550"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed movie/550"));
    cinefeed_cmd()
        .args(["--config", config, "continue", "remove", "movie", "550"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No entry"));

    cinefeed_cmd()
        .args(["--config", config, "continue", "clear"])
        .assert()
        .success();
    cinefeed_cmd()
        .args(["--config", config, "continue", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("empty"));
}

#[test]
fn test_cli_continue_rejects_unknown_kind() {
    let (_temp, config) = with_config();
    let mut cmd = cinefeed_cmd();
    cmd.args(["--config", config.to_str().unwrap(), "continue", "add", "podcast", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid media kind"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_cli_hero_against_mock_api() {
    let mock = TmdbMock::start().await;
    mock.list("/discover/movie", vec![movie_json(1, "One")]).await;
    mock.logos(MediaKey::movie(1), &[("/l1.png", Some("en"))]).await;
    mock.videos(MediaKey::movie(1), &[("yt1", "Trailer")]).await;

    let temp = tempdir().unwrap();
    let config = write_config(
        temp.path(),
        &format!(
            "[catalog]\napi_key = \"test-key\"\nbase_url = {:?}\n[hero]\nsources = [\"movie\"]\nshuffle = false\n",
            mock.server.uri()
        ),
    );

    let mut cmd = cinefeed_cmd();
    cmd.args(["--config", config.to_str().unwrap(), "hero", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"watch_link\": \"/watch/movie/1\""))
        .stdout(predicate::str::contains("original/l1.png"))
        .stdout(predicate::str::contains("youtube.com/embed/yt1"));

    let mut cmd = cinefeed_cmd();
    cmd.args(["--config", config.to_str().unwrap(), "hero", "--small-screen"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hero slides: 1"))
        .stdout(predicate::str::contains("Backdrop:"));
}
